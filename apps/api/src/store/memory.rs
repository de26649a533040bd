//! In-memory store used by unit tests in place of PostgreSQL.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::problem::Problem;
use crate::models::user::UserRecord;
use crate::store::{CatalogStore, StoreError, UserStore};

#[derive(Default)]
pub struct MemoryStore {
    problems: Mutex<Vec<Problem>>,
    users: Mutex<HashMap<String, UserRecord>>,
    fail_writes: AtomicBool,
    catalog_writes: AtomicUsize,
}

impl MemoryStore {
    pub fn with_catalog(problems: Vec<Problem>) -> Self {
        let store = Self::default();
        *store.problems.lock().unwrap() = problems;
        store
    }

    /// Makes every subsequent write fail, as a dropped connection would.
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn catalog_writes(&self) -> usize {
        self.catalog_writes.load(Ordering::SeqCst)
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn replace_catalog(&self, problems: &[Problem]) -> Result<(), StoreError> {
        self.check_writable()?;
        self.catalog_writes.fetch_add(1, Ordering::SeqCst);
        *self.problems.lock().unwrap() = problems.to_vec();
        Ok(())
    }

    async fn all_problems(&self) -> Result<Vec<Problem>, StoreError> {
        Ok(self.problems.lock().unwrap().clone())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn upsert_user(
        &self,
        username: &str,
        accepted_problems: &[String],
        synced_at: DateTime<Utc>,
    ) -> Result<UserRecord, StoreError> {
        self.check_writable()?;
        let record = UserRecord {
            username: username.to_string(),
            last_synced: synced_at,
            accepted_problems: accepted_problems.to_vec(),
        };
        self.users
            .lock()
            .unwrap()
            .insert(username.to_string(), record.clone());
        Ok(record)
    }

    async fn get_user(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.lock().unwrap().get(username).cloned())
    }
}
