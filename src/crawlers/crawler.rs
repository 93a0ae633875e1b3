use crate::results::ScrapedPage;
use std::collections::HashSet;

/// Receives every page the crawl reports, including failed fetches.
///
/// Returning `false` stops expansion from that page only; siblings and
/// ancestors keep going. Handlers run on the crawl's tasks and should return
/// quickly.
pub trait PageHandler: Send + Sync {
    fn handle(&self, page: &ScrapedPage) -> bool;
}

impl<F> PageHandler for F
where
    F: Fn(&ScrapedPage) -> bool + Send + Sync,
{
    fn handle(&self, page: &ScrapedPage) -> bool {
        self(page)
    }
}

/// Consulted before each visit with the URL, the remaining depth and a
/// snapshot of the visited set. Returning `true` abandons that visit.
pub trait StopCondition: Send + Sync {
    fn should_stop(&self, url: &str, remaining_depth: usize, visited: &HashSet<String>) -> bool;
}

impl<F> StopCondition for F
where
    F: Fn(&str, usize, &HashSet<String>) -> bool + Send + Sync,
{
    fn should_stop(&self, url: &str, remaining_depth: usize, visited: &HashSet<String>) -> bool {
        self(url, remaining_depth, visited)
    }
}

/// Stops visiting once `limit` URLs have been claimed
#[derive(Debug, Clone, Copy)]
pub struct MaxPages(pub usize);

impl StopCondition for MaxPages {
    fn should_stop(&self, _url: &str, _remaining_depth: usize, visited: &HashSet<String>) -> bool {
        visited.len() >= self.0
    }
}
