//! Axum route handlers for the sync and catalog API.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::leetcode::{extract_cookie, SESSION_COOKIE};
use crate::models::problem::Problem;
use crate::models::user::UserRecord;
use crate::state::AppState;
use crate::sync::catalog::refresh_catalog;
use crate::sync::reconcile::reconcile_user;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncProblemsResponse {
    pub message: String,
    pub count: usize,
    pub pages: usize,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Full,
    Summary,
}

#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    #[serde(default)]
    pub view: View,
}

/// GET /api/sync/problems
pub async fn handle_sync_problems(
    State(state): State<AppState>,
) -> Result<Json<SyncProblemsResponse>, AppError> {
    let settings = state.sync_settings();
    let snapshot =
        refresh_catalog(state.source.as_ref(), state.catalog.as_ref(), &settings).await?;

    Ok(Json(SyncProblemsResponse {
        message: "Problems synced successfully".to_string(),
        count: snapshot.problems.len(),
        pages: snapshot.pages,
        fetched_at: snapshot.fetched_at,
    }))
}

/// GET /api/all
///
/// An empty catalog is a 404, never an empty array.
pub async fn handle_all_problems(
    State(state): State<AppState>,
) -> Result<Json<Vec<Problem>>, AppError> {
    let problems = state.catalog.all_problems().await?;
    if problems.is_empty() {
        return Err(AppError::NotFound("No problems found".to_string()));
    }
    Ok(Json(problems))
}

/// GET /api/acceptedQuestion/:username
///
/// Needs the user's `LEETCODE_SESSION` cookie. `?view=summary` returns the
/// reduced projection instead of full problem records.
pub async fn handle_accepted_questions(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<ViewQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let token = session_token(&headers);
    let settings = state.sync_settings();

    let partition = reconcile_user(
        state.source.as_ref(),
        state.catalog.as_ref(),
        state.users.as_ref(),
        &username,
        token.as_deref(),
        &settings,
    )
    .await?;

    Ok(match query.view {
        View::Full => Json(partition).into_response(),
        View::Summary => Json(partition.summarize()).into_response(),
    })
}

/// GET /api/users/:username
pub async fn handle_get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserRecord>, AppError> {
    let record = state
        .users
        .get_user(username.trim())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {username} has not been synced")))?;
    Ok(Json(record))
}

/// The session cookie, looked up across every `Cookie` header.
fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| extract_cookie(v, SESSION_COOKIE))
}
