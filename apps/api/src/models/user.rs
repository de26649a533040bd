use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Cached result of the last reconciliation for a platform user.
/// `accepted_problems` is replaced wholesale on every sync.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub username: String,
    pub last_synced: DateTime<Utc>,
    pub accepted_problems: Vec<String>,
}
