//! Persistence seams for the mirrored catalog and user records.
//!
//! `AppState` carries `Arc<dyn CatalogStore>` and `Arc<dyn UserStore>`;
//! production wires both to `PgStore`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::problem::Problem;
use crate::models::user::UserRecord;

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stored record is invalid: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Swaps the stored catalog for `problems` in one atomic step. On error
    /// the previous catalog must still be readable.
    async fn replace_catalog(&self, problems: &[Problem]) -> Result<(), StoreError>;

    /// Full catalog in upstream listing order.
    async fn all_problems(&self) -> Result<Vec<Problem>, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates the record or overwrites `accepted_problems` and `last_synced`.
    async fn upsert_user(
        &self,
        username: &str,
        accepted_problems: &[String],
        synced_at: DateTime<Utc>,
    ) -> Result<UserRecord, StoreError>;

    async fn get_user(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;
}
