use crate::crawlers::PageHandler;
use crate::error::Result;
use crate::interaction::outcome::{ListboxOutcome, PaginationOutcome};
use crate::results::ScrapedPage;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One line of the JSONL output
#[derive(Debug, Serialize)]
pub struct PageRecord<'a> {
    pub title: Option<&'a str>,
    pub page_content: &'a str,
    pub source: &'a str,
    pub status_code: u16,
    pub is_success: bool,
    pub last_modified: Option<DateTime<Utc>>,
    pub links: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactive_meta: Option<InteractiveMeta<'a>>,
}

/// Interaction summary carried by a record
#[derive(Debug, Serialize)]
pub struct InteractiveMeta<'a> {
    pub listbox: Option<&'a ListboxOutcome>,
    pub pagination: Option<PaginationOutcome>,
    pub base_link_count: usize,
    pub final_link_count: usize,
    pub errors: &'a [String],
}

impl<'a> From<&'a ScrapedPage> for PageRecord<'a> {
    fn from(page: &'a ScrapedPage) -> Self {
        Self {
            title: page.title.as_deref(),
            page_content: &page.text,
            source: &page.url,
            status_code: page.status,
            is_success: page.success,
            last_modified: page.last_modified,
            links: &page.links,
            interactive_meta: page.interaction().map(|outcome| InteractiveMeta {
                listbox: outcome.listbox.as_ref(),
                pagination: outcome.pagination,
                base_link_count: outcome.base_link_count,
                final_link_count: outcome.final_link_count,
                errors: &outcome.errors,
            }),
        }
    }
}

/// Appends one JSON record per page to a file
#[derive(Debug)]
pub struct JsonlWriter {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlWriter {
    /// Open `path` for appending, creating it if needed
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_page(&self, page: &ScrapedPage) -> Result<()> {
        let mut line = serde_json::to_vec(&PageRecord::from(page))?;
        line.push(b'\n');

        let mut file = self
            .file
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        file.write_all(&line)?;
        Ok(())
    }
}

impl PageHandler for JsonlWriter {
    fn handle(&self, page: &ScrapedPage) -> bool {
        if let Err(e) = self.write_page(page) {
            ::log::warn!("Failed to write {} to {}: {}", page.url, self.path.display(), e);
        }
        true
    }
}
