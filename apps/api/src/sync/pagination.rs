use std::future::Future;

use tokio::time::Instant;
use tracing::debug;

use crate::leetcode::UpstreamError;
use crate::sync::SyncError;

/// When the loop decides the upstream listing is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Stop on an absent or empty page.
    UntilEmpty,
    /// Stop on an absent, empty, or short page. A short page ends the
    /// listing without a confirming extra request.
    ShortPage,
}

#[derive(Debug, Clone)]
pub struct PagePlan {
    pub limit: usize,
    pub max_pages: usize,
    pub termination: Termination,
    pub deadline: Option<Instant>,
}

#[derive(Debug)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub requests: usize,
}

/// Pulls pages from `fetch(offset, limit)` strictly one after another until
/// the listing is exhausted.
///
/// The offset starts at 0 and advances by the size of each returned page.
/// The deadline is only checked between pages. Once `max_pages` requests
/// have been issued without the listing ending, the loop fails with
/// `PageLimitExceeded`.
pub async fn collect_pages<T, F, Fut>(plan: &PagePlan, mut fetch: F) -> Result<Paged<T>, SyncError>
where
    F: FnMut(usize, usize) -> Fut,
    Fut: Future<Output = Result<Option<Vec<T>>, UpstreamError>>,
{
    let mut items: Vec<T> = Vec::new();
    let mut requests = 0;

    loop {
        if requests >= plan.max_pages {
            return Err(SyncError::PageLimitExceeded {
                max_pages: plan.max_pages,
            });
        }
        if plan.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(SyncError::DeadlineExceeded { requests });
        }

        let offset = items.len();
        let page = fetch(offset, plan.limit).await?;
        requests += 1;

        let page = match page {
            Some(page) if !page.is_empty() => page,
            _ => break,
        };

        let short = page.len() < plan.limit;
        debug!("Page {requests} at offset {offset} returned {} items", page.len());
        items.extend(page);

        if short && plan.termination == Termination::ShortPage {
            break;
        }
    }

    Ok(Paged { items, requests })
}
