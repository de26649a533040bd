use anyhow::{bail, Context, Result};

use crate::leetcode::MAX_UPSTREAM_ATTEMPTS;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    pub leetcode_base_url: String,
    pub problem_page_size: usize,
    pub submission_page_size: usize,
    pub max_pages: usize,
    pub sync_deadline_secs: u64,
    pub upstream_timeout_secs: u64,
    pub upstream_max_retries: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            database_url: require_env("DATABASE_URL")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            leetcode_base_url: std::env::var("LEETCODE_BASE_URL")
                .unwrap_or_else(|_| "https://leetcode.com".to_string()),
            problem_page_size: parse_env("PROBLEM_PAGE_SIZE", 1000)?,
            submission_page_size: parse_env("SUBMISSION_PAGE_SIZE", 100)?,
            max_pages: parse_env("MAX_PAGES", 200)?,
            sync_deadline_secs: parse_env("SYNC_DEADLINE_SECS", 120)?,
            upstream_timeout_secs: parse_env("UPSTREAM_TIMEOUT_SECS", 30)?,
            upstream_max_retries: parse_env("UPSTREAM_MAX_RETRIES", 3)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.problem_page_size == 0 || self.submission_page_size == 0 {
            bail!("PROBLEM_PAGE_SIZE and SUBMISSION_PAGE_SIZE must be at least 1");
        }
        if self.max_pages == 0 {
            bail!("MAX_PAGES must be at least 1");
        }
        if !(1..=MAX_UPSTREAM_ATTEMPTS).contains(&self.upstream_max_retries) {
            bail!("UPSTREAM_MAX_RETRIES must be between 1 and {MAX_UPSTREAM_ATTEMPTS}");
        }
        Ok(())
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/leetsync_test".to_string(),
        port: 0,
        rust_log: "debug".to_string(),
        leetcode_base_url: "http://127.0.0.1:9".to_string(),
        problem_page_size: 100,
        submission_page_size: 20,
        max_pages: 50,
        sync_deadline_secs: 60,
        upstream_timeout_secs: 5,
        upstream_max_retries: 1,
    }
}
