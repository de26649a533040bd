use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::leetcode::{ProblemSource, UpstreamError, UpstreamProblem};
use crate::models::problem::{Difficulty, Problem};
use crate::store::CatalogStore;
use crate::sync::pagination::{collect_pages, PagePlan, Termination};
use crate::sync::{SyncError, SyncSettings};

/// Result of one successful catalog refresh.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub problems: Vec<Problem>,
    pub fetched_at: DateTime<Utc>,
    pub pages: usize,
}

/// Pulls the whole catalog from upstream and swaps it into the store.
///
/// Nothing is written until every page has been fetched and mapped, and the
/// store swaps atomically, so a failed refresh leaves the previous catalog in
/// place.
pub async fn refresh_catalog(
    source: &dyn ProblemSource,
    store: &dyn CatalogStore,
    settings: &SyncSettings,
) -> Result<CatalogSnapshot, SyncError> {
    let plan = PagePlan {
        limit: settings.problem_page_size,
        max_pages: settings.max_pages,
        termination: Termination::UntilEmpty,
        deadline: settings.deadline,
    };

    info!("Refreshing problem catalog (page size {})", plan.limit);
    let paged = collect_pages(&plan, move |offset, limit| source.list_problems(offset, limit)).await?;
    info!(
        "Fetched {} problems in {} requests",
        paged.items.len(),
        paged.requests
    );

    let problems = normalize_catalog(paged.items)?;
    store.replace_catalog(&problems).await?;

    Ok(CatalogSnapshot {
        problems,
        fetched_at: Utc::now(),
        pages: paged.requests,
    })
}

/// Maps upstream records into catalog entries, keeping the first occurrence
/// of any slug seen twice.
pub fn normalize_catalog(raw: Vec<UpstreamProblem>) -> Result<Vec<Problem>, UpstreamError> {
    let mut seen = HashSet::with_capacity(raw.len());
    let mut problems = Vec::with_capacity(raw.len());

    for record in raw {
        if !seen.insert(record.title_slug.clone()) {
            warn!("Duplicate slug '{}' in upstream listing, skipping", record.title_slug);
            continue;
        }
        problems.push(to_problem(record)?);
    }

    Ok(problems)
}

fn to_problem(record: UpstreamProblem) -> Result<Problem, UpstreamError> {
    let difficulty: Difficulty = record
        .difficulty
        .parse()
        .map_err(|e| UpstreamError::Malformed(format!("{}: {e}", record.title_slug)))?;
    let (tags, tag_slugs) = record
        .topic_tags
        .into_iter()
        .map(|t| (t.name, t.slug))
        .unzip();

    Ok(Problem {
        question_id: record.question_id,
        frontend_question_id: record.frontend_question_id,
        title: record.title,
        title_slug: record.title_slug,
        difficulty,
        ac_rate: record.ac_rate,
        paid_only: record.paid_only,
        tags,
        tag_slugs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leetcode::fake::{problem_page, upstream_problem, FakeSource};
    use crate::leetcode::TopicTag;
    use crate::store::memory::MemoryStore;

    fn settings() -> SyncSettings {
        SyncSettings {
            problem_page_size: 100,
            ..Default::default()
        }
    }

    fn three_page_source() -> FakeSource {
        FakeSource::new().with_problem_pages(vec![
            problem_page(0, 100),
            problem_page(100, 100),
            problem_page(200, 37),
            Some(vec![]),
        ])
    }

    #[tokio::test]
    async fn test_refresh_stores_full_catalog() {
        let source = three_page_source();
        let store = MemoryStore::default();

        let snapshot = refresh_catalog(&source, &store, &settings()).await.unwrap();

        assert_eq!(snapshot.problems.len(), 237);
        assert_eq!(snapshot.pages, 4);
        assert_eq!(source.problem_offsets(), vec![0, 100, 200, 237]);
        let stored = store.all_problems().await.unwrap();
        assert_eq!(stored, snapshot.problems);
    }

    #[tokio::test]
    async fn test_refresh_is_idempotent() {
        let store = MemoryStore::default();

        refresh_catalog(&three_page_source(), &store, &settings()).await.unwrap();
        let first = store.all_problems().await.unwrap();
        refresh_catalog(&three_page_source(), &store, &settings()).await.unwrap();
        let second = store.all_problems().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.catalog_writes(), 2);
    }

    #[tokio::test]
    async fn test_refresh_replaces_stale_records() {
        let store = MemoryStore::with_catalog(vec![to_problem(upstream_problem(
            "retired-problem",
            "Easy",
        ))
        .unwrap()]);

        refresh_catalog(&three_page_source(), &store, &settings()).await.unwrap();

        let stored = store.all_problems().await.unwrap();
        assert!(stored.iter().all(|p| p.title_slug != "retired-problem"));
    }

    #[tokio::test]
    async fn test_upstream_failure_keeps_previous_catalog() {
        let previous = vec![to_problem(upstream_problem("two-sum", "Easy")).unwrap()];
        let store = MemoryStore::with_catalog(previous.clone());
        let source = three_page_source().failing_problems_at(1);

        let result = refresh_catalog(&source, &store, &settings()).await;

        assert!(matches!(result, Err(SyncError::Upstream(_))));
        assert_eq!(store.all_problems().await.unwrap(), previous);
        assert_eq!(store.catalog_writes(), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported_as_store_error() {
        let store = MemoryStore::default();
        store.fail_writes();

        let result = refresh_catalog(&three_page_source(), &store, &settings()).await;

        assert!(matches!(result, Err(SyncError::Store(_))));
    }

    #[tokio::test]
    async fn test_unknown_difficulty_aborts_refresh() {
        let store = MemoryStore::default();
        let source = FakeSource::new()
            .with_problem_pages(vec![Some(vec![upstream_problem("odd", "Impossible")])]);

        let result = refresh_catalog(&source, &store, &settings()).await;

        assert!(matches!(
            result,
            Err(SyncError::Upstream(UpstreamError::Malformed(_)))
        ));
        assert_eq!(store.catalog_writes(), 0);
    }

    #[test]
    fn test_tags_reduced_to_names_and_slugs() {
        let mut record = upstream_problem("two-sum", "Easy");
        record.topic_tags = vec![
            TopicTag {
                name: "Array".to_string(),
                slug: "array".to_string(),
            },
            TopicTag {
                name: "Hash Table".to_string(),
                slug: "hash-table".to_string(),
            },
        ];

        let problem = to_problem(record).unwrap();

        assert_eq!(problem.tags, vec!["Array", "Hash Table"]);
        assert_eq!(problem.tag_slugs, vec!["array", "hash-table"]);
        assert_eq!(problem.difficulty, Difficulty::Easy);
    }

    #[test]
    fn test_ids_stay_distinct() {
        let problem = to_problem(upstream_problem("two-sum", "Easy")).unwrap();
        assert_eq!(problem.question_id, "q-two-sum");
        assert_eq!(problem.frontend_question_id, "f-two-sum");
    }

    #[test]
    fn test_duplicate_slugs_collapse_to_first() {
        let mut second = upstream_problem("two-sum", "Hard");
        second.title = "shifted duplicate".to_string();
        let raw = vec![
            upstream_problem("two-sum", "Easy"),
            upstream_problem("add-two-numbers", "Medium"),
            second,
        ];

        let problems = normalize_catalog(raw).unwrap();

        assert_eq!(problems.len(), 2);
        assert_eq!(problems[0].difficulty, Difficulty::Easy);
    }
}
