//! Catalog refresh and user reconciliation.
//!
//! Both routines page through the upstream with `pagination::collect_pages`
//! and only write once the full listing is in memory.

use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

use crate::config::Config;
use crate::leetcode::UpstreamError;
use crate::store::StoreError;

pub mod catalog;
pub mod handlers;
pub mod pagination;
pub mod reconcile;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("LEETCODE_SESSION cookie is required")]
    MissingToken,

    #[error("Username is required")]
    InvalidUsername,

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Upstream still returning full pages after {max_pages} requests")]
    PageLimitExceeded { max_pages: usize },

    #[error("Sync deadline exceeded after {requests} page requests")]
    DeadlineExceeded { requests: usize },
}

/// Per-request knobs for the sync routines.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub problem_page_size: usize,
    pub submission_page_size: usize,
    pub max_pages: usize,
    pub deadline: Option<Instant>,
}

impl SyncSettings {
    /// Settings for a request starting now; the deadline is `sync_deadline`
    /// from now.
    pub fn for_request(config: &Config) -> Self {
        Self {
            problem_page_size: config.problem_page_size,
            submission_page_size: config.submission_page_size,
            max_pages: config.max_pages,
            deadline: Some(Instant::now() + Duration::from_secs(config.sync_deadline_secs)),
        }
    }
}

#[cfg(test)]
impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            problem_page_size: 100,
            submission_page_size: 100,
            max_pages: 50,
            deadline: None,
        }
    }
}
