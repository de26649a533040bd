use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::info;

use crate::models::problem::{Difficulty, Problem};
use crate::models::user::UserRecord;
use crate::store::{CatalogStore, StoreError, UserStore};

// 10 binds per row keeps each statement well under the 65535 parameter cap.
const INSERT_CHUNK: usize = 1000;

#[derive(Debug, FromRow)]
struct ProblemRow {
    question_id: String,
    frontend_question_id: String,
    title: String,
    title_slug: String,
    difficulty: String,
    ac_rate: f64,
    paid_only: bool,
    tags: Vec<String>,
    tag_slugs: Vec<String>,
}

impl TryFrom<ProblemRow> for Problem {
    type Error = StoreError;

    fn try_from(row: ProblemRow) -> Result<Self, Self::Error> {
        let difficulty: Difficulty = row
            .difficulty
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("problem {}: {e}", row.title_slug)))?;
        Ok(Problem {
            question_id: row.question_id,
            frontend_question_id: row.frontend_question_id,
            title: row.title,
            title_slug: row.title_slug,
            difficulty,
            ac_rate: row.ac_rate,
            paid_only: row.paid_only,
            tags: row.tags,
            tag_slugs: row.tag_slugs,
        })
    }
}

/// PostgreSQL-backed store for both the catalog and user records.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn replace_catalog(&self, problems: &[Problem]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM problems")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        for (chunk_index, chunk) in problems.chunks(INSERT_CHUNK).enumerate() {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO problems (question_id, frontend_question_id, title, title_slug, \
                 difficulty, ac_rate, paid_only, tags, tag_slugs, position) ",
            );
            builder.push_values(chunk.iter().enumerate(), |mut row, (i, p)| {
                let position = (chunk_index * INSERT_CHUNK + i) as i32;
                row.push_bind(&p.question_id)
                    .push_bind(&p.frontend_question_id)
                    .push_bind(&p.title)
                    .push_bind(&p.title_slug)
                    .push_bind(p.difficulty.as_str())
                    .push_bind(p.ac_rate)
                    .push_bind(p.paid_only)
                    .push_bind(&p.tags)
                    .push_bind(&p.tag_slugs)
                    .push_bind(position);
            });
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;

        info!(
            "Replaced catalog: removed {deleted} rows, inserted {}",
            problems.len()
        );
        Ok(())
    }

    async fn all_problems(&self) -> Result<Vec<Problem>, StoreError> {
        let rows = sqlx::query_as::<_, ProblemRow>(
            r#"
            SELECT question_id, frontend_question_id, title, title_slug, difficulty,
                   ac_rate, paid_only, tags, tag_slugs
            FROM problems
            ORDER BY position ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Problem::try_from).collect()
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn upsert_user(
        &self,
        username: &str,
        accepted_problems: &[String],
        synced_at: DateTime<Utc>,
    ) -> Result<UserRecord, StoreError> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (username, last_synced, accepted_problems)
            VALUES ($1, $2, $3)
            ON CONFLICT (username) DO UPDATE
                SET last_synced = EXCLUDED.last_synced,
                    accepted_problems = EXCLUDED.accepted_problems
            RETURNING username, last_synced, accepted_problems
            "#,
        )
        .bind(username)
        .bind(synced_at)
        .bind(accepted_problems)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn get_user(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(sqlx::query_as::<_, UserRecord>(
            "SELECT username, last_synced, accepted_problems FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?)
    }
}
