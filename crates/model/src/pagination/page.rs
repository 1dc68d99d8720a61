use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_LIMIT: u64 = 20;
pub const MAX_PAGE_LIMIT: u64 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageRequestError {
    #[error("Page must be >= 1, got {0}")]
    Page(u64),

    #[error("Limit must be between 1 and {MAX_PAGE_LIMIT}, got {0}")]
    Limit(u64),
}

/// A validated page selection. Holding one means `page >= 1` and
/// `1 <= limit <= MAX_PAGE_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Result<Self, PageRequestError> {
        if page < 1 {
            return Err(PageRequestError::Page(page));
        }
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(PageRequestError::Limit(limit));
        }
        Ok(PageRequest { page, limit })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Number of items preceding this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}
