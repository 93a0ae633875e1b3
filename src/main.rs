use clap::Parser;
use crawltree::output::JsonlWriter;
use crawltree::{CrawlConfig, Crawler, FetchStrategy, InteractionConfig, MaxPages, ScrapedPage};

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let crawler = match build_crawler(&args) {
        Ok(crawler) => crawler,
        Err(e) => {
            ::log::error!("Failed to configure crawler: {}", e);
            std::process::exit(2);
        }
    };

    let writer = match &args.output {
        Some(path) => match JsonlWriter::open(path) {
            Ok(writer) => Some(writer),
            Err(e) => {
                ::log::error!("Cannot open {}: {}", path.display(), e);
                std::process::exit(2);
            }
        },
        None => None,
    };

    ::log::info!("Starting crawler for URL: {}", args.url);
    let start_time = std::time::Instant::now();

    // Process pages as they come in
    let mut rx = crawler.generate();
    let mut pages_processed = 0;
    while let Some(page) = rx.recv().await {
        pages_processed += 1;
        process_page(&page, pages_processed);
        if let Some(writer) = &writer {
            if let Err(e) = writer.write_page(&page) {
                ::log::warn!("Failed to record {}: {}", page.url, e);
            }
        }
    }

    ::log::info!(
        "Crawling complete - processed {} pages in {:.2} seconds",
        pages_processed,
        start_time.elapsed().as_secs_f64()
    );
}

fn build_crawler(args: &Args) -> crawltree::Result<Crawler> {
    let mut config = CrawlConfig::new(&args.url);
    config.depth = args.depth;
    config.delay_ms = args.delay_ms;
    config.concurrency_limit = args.concurrency;
    config.url_follow_regex = args.follow_regex.clone();
    config.total_timeout_secs = args.total_timeout;
    config.since = args
        .since_days
        .map(|days| chrono::Utc::now() - chrono::Duration::days(days));
    if let Some(user_agent) = &args.user_agent {
        config.user_agent = user_agent.clone();
    }
    if args.rendered {
        config.fetch_strategy = FetchStrategy::Rendered;
        println!("Note: rendered crawling requires a WebDriver server (e.g., ChromeDriver).");
    }
    if let Some(url) = args.webdriver_url.as_deref().filter(|u| !u.is_empty()) {
        config.render.webdriver_url = url.to_string();
    }

    let mut crawler = Crawler::new(config);

    if let Some(path) = &args.interaction {
        let mut interaction = InteractionConfig::from_file(path)?;
        if let Some(url) = args.webdriver_url.as_deref().filter(|u| !u.is_empty()) {
            interaction.browser.webdriver_url = url.to_string();
        }
        crawler = crawler.with_interaction(interaction)?;
    }

    if let Some(limit) = args.max_pages {
        crawler = crawler.stop_when(MaxPages(limit.max(1)));
    }

    Ok(crawler)
}

fn process_page(page: &ScrapedPage, count: usize) {
    ::log::info!("Processed page {}: {} ({})", count, page.url, page.status);
    ::log::debug!("Page has {} links", page.links.len());

    if let Some(outcome) = page.interaction() {
        ::log::debug!(
            "Interaction grew links {} -> {} with {} errors",
            outcome.base_link_count,
            outcome.final_link_count,
            outcome.errors.len()
        );
    }
}
