//! Similarity scoring between a user's solved problems and candidate problems.
//!
//! Default: `TagProfileScorer` (cosine similarity over topic-tag counts).
//! `AppState` holds an `Arc<dyn SimilarityScorer>` so another backend can be
//! swapped in at startup without touching the ranking or the handler.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::problem::ProblemSummary;

#[async_trait]
pub trait SimilarityScorer: Send + Sync {
    /// One similarity per candidate, in candidate order. Higher is closer.
    async fn similarities(
        &self,
        done: &[ProblemSummary],
        candidates: &[ProblemSummary],
    ) -> Result<Vec<f64>, AppError>;

    /// Reported to callers next to the suggestions.
    fn backend(&self) -> &'static str;
}

/// Cosine similarity between the user's tag profile (how often each tag
/// appears across solved problems) and a candidate's tag set.
pub struct TagProfileScorer;

#[async_trait]
impl SimilarityScorer for TagProfileScorer {
    async fn similarities(
        &self,
        done: &[ProblemSummary],
        candidates: &[ProblemSummary],
    ) -> Result<Vec<f64>, AppError> {
        let profile = tag_profile(done);
        let profile_norm = profile.values().map(|c| c * c).sum::<f64>().sqrt();

        Ok(candidates
            .iter()
            .map(|candidate| cosine(&profile, profile_norm, candidate))
            .collect())
    }

    fn backend(&self) -> &'static str {
        "tag-profile"
    }
}

fn tag_profile(done: &[ProblemSummary]) -> HashMap<&str, f64> {
    let mut profile = HashMap::new();
    for problem in done {
        for tag in distinct_tags(problem) {
            *profile.entry(tag).or_insert(0.0) += 1.0;
        }
    }
    profile
}

fn distinct_tags(problem: &ProblemSummary) -> BTreeSet<&str> {
    problem.tag_slugs.iter().map(String::as_str).collect()
}

fn cosine(profile: &HashMap<&str, f64>, profile_norm: f64, candidate: &ProblemSummary) -> f64 {
    let tags = distinct_tags(candidate);
    if tags.is_empty() || profile_norm == 0.0 {
        return 0.0;
    }
    let dot: f64 = tags.iter().filter_map(|t| profile.get(t)).sum();
    dot / (profile_norm * (tags.len() as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::problem::Difficulty;

    fn summary(slug: &str, tags: &[&str]) -> ProblemSummary {
        ProblemSummary {
            slug: slug.to_string(),
            difficulty: Difficulty::Medium,
            ac_rate: 50.0,
            frontend_id: slug.to_string(),
            tag_slugs: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_identical_tag_set_scores_one() {
        let done = vec![summary("a", &["array", "hash-table"])];
        let candidates = vec![summary("b", &["hash-table", "array"])];

        let sims = TagProfileScorer.similarities(&done, &candidates).await.unwrap();

        assert!((sims[0] - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_frequent_tags_weigh_more() {
        let done = vec![
            summary("a", &["array"]),
            summary("b", &["array"]),
            summary("c", &["graph"]),
        ];
        let candidates = vec![summary("x", &["graph"]), summary("y", &["array"])];

        let sims = TagProfileScorer.similarities(&done, &candidates).await.unwrap();

        assert!(sims[1] > sims[0]);
        assert!(sims[0] > 0.0);
    }

    #[tokio::test]
    async fn test_disjoint_or_untagged_candidates_score_zero() {
        let done = vec![summary("a", &["array"])];
        let candidates = vec![summary("x", &["tree"]), summary("y", &[])];

        let sims = TagProfileScorer.similarities(&done, &candidates).await.unwrap();

        assert_eq!(sims, vec![0.0, 0.0]);
    }
}
