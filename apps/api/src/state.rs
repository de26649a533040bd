use std::sync::Arc;

use crate::config::Config;
use crate::leetcode::ProblemSource;
use crate::recommend::similarity::SimilarityScorer;
use crate::store::{CatalogStore, UserStore};
use crate::sync::SyncSettings;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub users: Arc<dyn UserStore>,
    /// Upstream platform. `LeetCodeClient` in production.
    pub source: Arc<dyn ProblemSource>,
    /// Similarity term for recommendations. `TagProfileScorer` by default.
    pub scorer: Arc<dyn SimilarityScorer>,
    pub config: Config,
}

impl AppState {
    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings::for_request(&self.config)
    }
}
