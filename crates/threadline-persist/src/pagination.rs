use serde::{Deserialize, Serialize};

use crate::error::{PersistError, Result};
use crate::models::ThreadView;

pub const DEFAULT_PAGE_NUMBER: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// A 1-based page of top-level threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    number: u64,
    size: u64,
}

impl PageRequest {
    /// Validates raw page arguments. Both must be at least 1; anything lower
    /// would produce a negative skip or an unbounded page.
    pub fn new(page_number: i64, page_size: i64) -> Result<Self> {
        if page_number < 1 {
            return Err(PersistError::InvalidPagination(format!(
                "page number must be at least 1, got {}",
                page_number
            )));
        }
        if page_size < 1 {
            return Err(PersistError::InvalidPagination(format!(
                "page size must be at least 1, got {}",
                page_size
            )));
        }
        Ok(Self {
            number: page_number as u64,
            size: page_size as u64,
        })
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Documents to skip before this page starts
    pub fn skip(&self) -> u64 {
        (self.number - 1).saturating_mul(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::try_from(self.size).unwrap_or(i64::MAX)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            number: DEFAULT_PAGE_NUMBER as u64,
            size: DEFAULT_PAGE_SIZE as u64,
        }
    }
}

/// One page of top-level posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostsPage {
    pub posts: Vec<ThreadView>,
    pub is_next: bool,
}

impl PostsPage {
    /// `is_next` holds when documents remain past this page.
    pub fn new(posts: Vec<ThreadView>, page: PageRequest, total: u64) -> Self {
        let is_next = total > page.skip() + posts.len() as u64;
        Self { posts, is_next }
    }
}
