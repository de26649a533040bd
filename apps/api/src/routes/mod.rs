pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::recommend::handlers as recommend;
use crate::state::AppState;
use crate::sync::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/sync/problems", get(handlers::handle_sync_problems))
        .route("/api/all", get(handlers::handle_all_problems))
        .route(
            "/api/acceptedQuestion/:username",
            get(handlers::handle_accepted_questions),
        )
        .route("/api/users/:username", get(handlers::handle_get_user))
        .route("/api/recommend", post(recommend::handle_recommend))
        .with_state(state)
}
