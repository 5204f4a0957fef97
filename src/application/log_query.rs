use crate::domain::log_entry::{LogEntry, Severity};
use crate::domain::ports::LogEntryStoreBox;
use crate::error::Result;
use serde::Serialize;

pub const DEFAULT_PER_PAGE: usize = 50;
pub const MAX_PER_PAGE: usize = 100;

/// A page request as it arrives from a caller, before clamping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogQuery {
    pub severity: Option<Severity>,
    pub page: i64,
    pub per_page: i64,
}

impl LogQuery {
    /// Page number, at least 1.
    pub fn page(&self) -> usize {
        if self.page < 1 { 1 } else { self.page as usize }
    }

    /// Page size. Anything outside `1..=MAX_PER_PAGE` falls back to the default.
    pub fn per_page(&self) -> usize {
        if self.per_page < 1 || self.per_page > MAX_PER_PAGE as i64 {
            DEFAULT_PER_PAGE
        } else {
            self.per_page as usize
        }
    }

    pub fn offset(&self) -> usize {
        (self.page() - 1).saturating_mul(self.per_page())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageMeta {
    pub current_page: usize,
    pub per_page: usize,
    pub total_count: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LogPage {
    pub data: Vec<LogEntry>,
    pub meta: PageMeta,
}

pub struct LogQueryService {
    store: LogEntryStoreBox,
}

impl LogQueryService {
    pub fn new(store: LogEntryStoreBox) -> Self {
        Self { store }
    }

    pub async fn append(&self, entry: LogEntry) -> Result<()> {
        self.store.append(entry).await
    }

    /// Returns one page of entries, newest first.
    pub async fn page(&self, query: &LogQuery) -> Result<LogPage> {
        let per_page = query.per_page();
        let total_count = self.store.count(query.severity).await?;
        let data = self
            .store
            .fetch(query.severity, per_page, query.offset())
            .await?;

        Ok(LogPage {
            data,
            meta: PageMeta {
                current_page: query.page(),
                per_page,
                total_count,
                total_pages: total_count.div_ceil(per_page as u64),
            },
        })
    }
}
