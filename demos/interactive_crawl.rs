//! Crawls a paginated listing, letting a browser page through results that
//! only appear after choosing a page size and clicking "next".
//!
//! Requires a WebDriver server; set `WEBDRIVER_URL` if it is not on
//! `http://localhost:4444`. Usage:
//!
//! ```text
//! cargo run --example interactive_crawl -- https://listing.example.com/results out.jsonl
//! ```

use crawltree::output::JsonlWriter;
use crawltree::{CrawlConfig, Crawler, InteractionConfig, MaxPages, PageHandler, ScrapedPage};
use serde_json::json;
use std::error::Error;
use url::Url;

const DEFAULT_OUTPUT: &str = "listing_interactive.jsonl";
const DEFAULT_MAX_PAGES: usize = 200;

fn listing_interaction(host: &str, webdriver_url: &str) -> serde_json::Value {
    json!({
        "domains": [host],
        "wait_until": "domcontentloaded",
        "listbox": {
            "enabled": true,
            "trigger_text_regex": "(表示件数|件ごと|per page)",
            "select_selectors": ["select#dataDisplay", "select[name='viewCount']", "select"],
            "desired_options": ["60", "45", "30", "15"],
            "wait_after_select": {
                "load_state": "networkidle",
                "timeout_ms": 25000,
                "debounce_ms": 1800
            }
        },
        "pagination": {
            "enabled": true,
            "next_selector_candidates": [
                "text=次",
                "a:has-text('Next')",
                "button:has-text('Next')"
            ],
            "max_clicks": 50,
            "wait_after_click": {
                "load_state": "networkidle",
                "timeout_ms": 30000,
                "debounce_wait_ms": 1500
            },
            "regex_role_fallback": {
                "enabled": true,
                "name_pattern": "(次(\\s*>+)?|Next)"
            },
            "numeric_fallback": {
                "enabled": true,
                "active_selector": ".pagination .pn_active"
            }
        },
        "browser": { "webdriver_url": webdriver_url, "headless": true, "timeout_ms": 60000 }
    })
}

/// Writes each page and logs what the interaction engine did
struct Recorder {
    writer: JsonlWriter,
}

impl PageHandler for Recorder {
    fn handle(&self, page: &ScrapedPage) -> bool {
        if let Some(outcome) = page.interaction() {
            println!(
                "{}: {} -> {} links, listbox {:?}, pagination {:?}",
                page.url,
                outcome.base_link_count,
                outcome.final_link_count,
                outcome.listbox.as_ref().map(|l| l.status),
                outcome.pagination
            );
        }
        self.writer.handle(page)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let start_url = args
        .next()
        .ok_or("usage: interactive_crawl <start-url> [output.jsonl]")?;
    let output = args.next().unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
    let max_pages = std::env::var("MAX_PAGES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .map_or(DEFAULT_MAX_PAGES, |v| v.max(1));
    let webdriver_url =
        std::env::var("WEBDRIVER_URL").unwrap_or_else(|_| "http://localhost:4444".to_string());

    let host = Url::parse(&start_url)?
        .host_str()
        .ok_or("start URL has no host")?
        .to_string();

    let mut config = CrawlConfig::new(&start_url);
    config.depth = 2;
    config.delay_ms = 500;
    config.concurrency_limit = 4;

    let interaction = InteractionConfig::with_overrides(listing_interaction(&host, &webdriver_url))?;
    let recorder = Recorder {
        writer: JsonlWriter::open(&output)?,
    };

    Crawler::new(config)
        .with_interaction(interaction)?
        .on_page(recorder)
        .stop_when(MaxPages(max_pages))
        .run()
        .await?;

    println!("Records appended to {}", output);
    Ok(())
}
