use std::collections::BTreeSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::leetcode::{ProblemSource, Submission};
use crate::models::problem::{Problem, ProblemSummary};
use crate::store::{CatalogStore, UserStore};
use crate::sync::pagination::{collect_pages, PagePlan, Termination};
use crate::sync::{SyncError, SyncSettings};

/// The only submission status that counts as solving a problem.
pub const ACCEPTED: &str = "Accepted";

/// The catalog split by whether the user has an accepted submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partition {
    pub done: Vec<Problem>,
    pub not_done: Vec<Problem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryPartition {
    pub done: Vec<ProblemSummary>,
    pub not_done: Vec<ProblemSummary>,
}

impl Partition {
    pub fn summarize(&self) -> SummaryPartition {
        SummaryPartition {
            done: self.done.iter().map(ProblemSummary::from).collect(),
            not_done: self.not_done.iter().map(ProblemSummary::from).collect(),
        }
    }
}

/// Syncs one user's submission history and partitions the stored catalog.
///
/// The token is checked before anything goes upstream. The user record is
/// only written after the whole history has been fetched, so a failure
/// part-way never leaves a truncated accepted set behind.
pub async fn reconcile_user(
    source: &dyn ProblemSource,
    catalog: &dyn CatalogStore,
    users: &dyn UserStore,
    username: &str,
    session_token: Option<&str>,
    settings: &SyncSettings,
) -> Result<Partition, SyncError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(SyncError::InvalidUsername);
    }
    let token = session_token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(SyncError::MissingToken)?;

    let session = source.authenticate(token).await?;
    let session = session.as_ref();

    let plan = PagePlan {
        limit: settings.submission_page_size,
        max_pages: settings.max_pages,
        termination: Termination::ShortPage,
        deadline: settings.deadline,
    };
    let paged = collect_pages(&plan, move |offset, limit| {
        session.list_submissions(offset, limit)
    })
    .await?;

    let accepted = accepted_slugs(&paged.items);
    info!(
        "User {username}: {} submissions in {} requests, {} accepted problems",
        paged.items.len(),
        paged.requests,
        accepted.len()
    );

    let accepted_list: Vec<String> = accepted.iter().cloned().collect();
    users.upsert_user(username, &accepted_list, Utc::now()).await?;

    let problems = catalog.all_problems().await?;
    Ok(partition(problems, &accepted))
}

/// Distinct slugs of every submission whose status is exactly `Accepted`.
pub fn accepted_slugs(submissions: &[Submission]) -> BTreeSet<String> {
    submissions
        .iter()
        .filter(|s| s.status == ACCEPTED)
        .map(|s| s.title_slug.clone())
        .collect()
}

/// Every problem lands in exactly one side; catalog order is kept.
pub fn partition(problems: Vec<Problem>, accepted: &BTreeSet<String>) -> Partition {
    let (done, not_done) = problems
        .into_iter()
        .partition(|p| accepted.contains(&p.title_slug));
    Partition { done, not_done }
}
