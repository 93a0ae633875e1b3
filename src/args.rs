use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "crawltree")]
#[command(about = "Recursive same-site crawler with browser-driven link discovery")]
#[command(version)]
pub struct Args {
    /// URL to start crawling from
    pub url: String,

    /// Recursion depth (1 fetches only the start page)
    #[arg(short, long, default_value_t = 3)]
    pub depth: usize,

    /// Politeness delay before each recursive fetch, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub delay_ms: u64,

    /// Skip pages not modified within this many days
    #[arg(long)]
    pub since_days: Option<i64>,

    /// Only follow URLs matching this pattern (anchored at the URL start)
    #[arg(short = 'r', long)]
    pub follow_regex: Option<String>,

    /// Maximum number of fetches in flight
    #[arg(short, long, default_value_t = 8)]
    pub concurrency: usize,

    /// User-Agent header for outbound requests
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Fetch pages through a WebDriver-controlled browser
    #[arg(long)]
    pub rendered: bool,

    /// WebDriver endpoint for rendered fetches and interaction
    #[arg(long, env = "WEBDRIVER_URL")]
    pub webdriver_url: Option<String>,

    /// JSON overrides for browser-driven link extraction
    #[arg(short, long)]
    pub interaction: Option<PathBuf>,

    /// Append one JSON record per page to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Stop visiting new URLs once this many have been claimed
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Total timeout in seconds (maximum runtime)
    #[arg(long)]
    pub total_timeout: Option<u64>,
}
