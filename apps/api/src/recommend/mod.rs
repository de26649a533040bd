//! Next-problem recommendations from a user's solved set.
//!
//! Ranking is `similarity + 0.2 * hardness`, where hardness rewards problems
//! with a lower acceptance rate than the user's solved average. The
//! similarity term comes from a pluggable `SimilarityScorer`.

pub mod handlers;
pub mod similarity;

use std::collections::HashSet;

use tracing::debug;

use crate::errors::AppError;
use crate::models::problem::{Difficulty, ProblemSummary};
use crate::recommend::similarity::SimilarityScorer;

pub const DEFAULT_TOP_K: usize = 50;
const HARDNESS_WEIGHT: f64 = 0.2;

/// Rank unsolved problems from `all` for a user who has solved `done`.
///
/// Solved problems are matched by frontend id. With nothing solved (or
/// nothing solved under `preferred_tag`) the unsolved pool is ordered
/// easiest-first by acceptance rate instead of being scored.
pub async fn suggest(
    scorer: &dyn SimilarityScorer,
    done: &[ProblemSummary],
    all: &[ProblemSummary],
    preferred_tag: Option<&str>,
    top_k: usize,
) -> Result<Vec<ProblemSummary>, AppError> {
    let done_ids: HashSet<&str> = done.iter().map(|p| p.frontend_id.as_str()).collect();
    let mut not_done: Vec<ProblemSummary> = all
        .iter()
        .filter(|p| !done_ids.contains(p.frontend_id.as_str()))
        .cloned()
        .collect();
    let preferred_tag = preferred_tag
        .map(normalize_tag)
        .filter(|tag| !tag.is_empty());

    let mut done: Vec<ProblemSummary> = done.to_vec();
    if let Some(tag) = &preferred_tag {
        not_done.retain(|p| has_tag(p, tag));
        done.retain(|p| has_tag(p, tag));
    }

    if done.is_empty() {
        return Ok(cold_start(not_done, top_k));
    }
    if not_done.is_empty() {
        return Ok(Vec::new());
    }

    let avg_ac = done.iter().map(|p| p.ac_rate).sum::<f64>() / done.len() as f64;
    let user_tags: HashSet<&str> = done
        .iter()
        .flat_map(|p| p.tag_slugs.iter().map(String::as_str))
        .collect();
    let candidates: Vec<ProblemSummary> = not_done
        .into_iter()
        .filter(|p| p.tag_slugs.iter().any(|t| user_tags.contains(t.as_str())))
        .collect();
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let sims = scorer.similarities(&done, &candidates).await?;
    if sims.len() != candidates.len() {
        return Err(AppError::Internal(anyhow::anyhow!(
            "{} scorer returned {} similarities for {} candidates",
            scorer.backend(),
            sims.len(),
            candidates.len()
        )));
    }

    let mut scored: Vec<(f64, ProblemSummary)> = sims
        .into_iter()
        .zip(candidates)
        .map(|(sim, p)| {
            let hardness = ((avg_ac - p.ac_rate) / 100.0).max(0.0);
            (sim + HARDNESS_WEIGHT * hardness, p)
        })
        .collect();
    // Stable, so equal scores keep catalog order.
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    debug!(
        "Scored {} candidates with {} (avg acRate {avg_ac:.2})",
        scored.len(),
        scorer.backend()
    );
    Ok(scored.into_iter().take(top_k).map(|(_, p)| p).collect())
}

/// Highest acceptance rate first, Easy ahead of the rest on ties.
fn cold_start(mut pool: Vec<ProblemSummary>, top_k: usize) -> Vec<ProblemSummary> {
    pool.sort_by(|a, b| {
        b.ac_rate
            .total_cmp(&a.ac_rate)
            .then_with(|| is_not_easy(a).cmp(&is_not_easy(b)))
    });
    pool.truncate(top_k);
    pool
}

fn is_not_easy(p: &ProblemSummary) -> bool {
    p.difficulty != Difficulty::Easy
}

/// "Dynamic Programming" and "dynamic-programming" name the same tag.
fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase().replace(' ', "-")
}

fn has_tag(p: &ProblemSummary, tag: &str) -> bool {
    p.tag_slugs.iter().any(|t| normalize_tag(t) == tag)
}
