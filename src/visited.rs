use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

/// URLs already claimed for fetching during one crawl.
///
/// Cloning shares the underlying set.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `url`. Exactly one caller gets `true` for a given URL.
    pub async fn try_insert(&self, url: &str) -> bool {
        let mut seen = self.inner.lock().await;
        if seen.contains(url) {
            return false;
        }
        seen.insert(url.to_string());
        true
    }

    pub async fn contains(&self, url: &str) -> bool {
        self.inner.lock().await.contains(url)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    /// Copy of the current contents, detached from later inserts
    pub async fn snapshot(&self) -> HashSet<String> {
        self.inner.lock().await.clone()
    }
}
