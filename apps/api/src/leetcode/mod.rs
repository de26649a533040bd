//! Upstream client for the problem platform.
//!
//! Every request to the platform goes through `LeetCodeClient`. The sync
//! routines depend only on the `ProblemSource` / `SubmissionSource` traits.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

#[cfg(test)]
pub mod fake;
pub mod queries;

use queries::PROBLEM_LIST_QUERY;

/// Cookie carrying the user's platform session.
pub const SESSION_COOKIE: &str = "LEETCODE_SESSION";
const CSRF_COOKIE: &str = "csrftoken";
const BACKOFF_BASE_MS: u64 = 1000;
/// Upper bound on attempts per upstream call, retries included.
pub const MAX_UPSTREAM_ATTEMPTS: u32 = 10;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Session rejected by upstream")]
    Unauthorized,

    #[error("Upstream did not issue a csrf token")]
    MissingCsrf,

    #[error("Malformed upstream record: {0}")]
    Malformed(String),

    #[error("Rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TopicTag {
    pub name: String,
    pub slug: String,
}

/// A problem as the platform lists it, before mapping into `Problem`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamProblem {
    pub question_id: String,
    pub frontend_question_id: String,
    pub title: String,
    pub title_slug: String,
    pub difficulty: String,
    pub ac_rate: f64,
    #[serde(default)]
    pub paid_only: bool,
    #[serde(default)]
    pub topic_tags: Vec<TopicTag>,
}

/// One entry of a user's submission history. Only lives for one sync.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Submission {
    pub title_slug: String,
    #[serde(rename = "status_display")]
    pub status: String,
}

/// Paged access to the public catalog plus session establishment.
///
/// A `None` page means upstream returned no page at all, which the
/// pagination loop treats the same as an empty one.
#[async_trait]
pub trait ProblemSource: Send + Sync {
    async fn list_problems(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Option<Vec<UpstreamProblem>>, UpstreamError>;

    async fn authenticate(
        &self,
        session_token: &str,
    ) -> Result<Box<dyn SubmissionSource>, UpstreamError>;
}

/// Paged access to the submission history of an authenticated user.
#[async_trait]
pub trait SubmissionSource: Send + Sync {
    async fn list_submissions(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Option<Vec<Submission>>, UpstreamError>;
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProblemListData {
    problemset_question_list: Option<ProblemListPage>,
}

#[derive(Debug, Deserialize)]
struct ProblemListPage {
    questions: Option<Vec<UpstreamProblem>>,
}

#[derive(Debug, Deserialize)]
struct SubmissionDump {
    submissions_dump: Option<Vec<Submission>>,
    #[serde(default)]
    has_next: bool,
}

/// reqwest-backed client for the platform's GraphQL and REST endpoints.
/// Retries on transport errors, 429 and 5xx with exponential backoff.
#[derive(Clone)]
pub struct LeetCodeClient {
    client: Client,
    base_url: String,
    max_retries: u32,
    backoff_base: Duration,
}

impl LeetCodeClient {
    pub fn new(base_url: &str, timeout: Duration, max_retries: u32) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("leetsync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: max_retries.clamp(1, MAX_UPSTREAM_ATTEMPTS),
            backoff_base: Duration::from_millis(BACKOFF_BASE_MS),
        })
    }

    #[cfg(test)]
    fn with_backoff(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    /// Sends the request built by `build`, retrying transient failures.
    /// Non-retryable error statuses are returned immediately.
    async fn send_with_retry<F>(&self, build: F) -> Result<Response, UpstreamError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut last_error: Option<UpstreamError> = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                let delay = self.backoff_base * (1 << (attempt - 1));
                warn!(
                    "Upstream call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match build().send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(UpstreamError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Upstream returned {}: {}", status, body);
                last_error = Some(if status.as_u16() == 429 {
                    UpstreamError::RateLimited {
                        attempts: attempt + 1,
                    }
                } else {
                    UpstreamError::Api {
                        status: status.as_u16(),
                        message: body,
                    }
                });
                continue;
            }

            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(UpstreamError::Unauthorized);
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(UpstreamError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            return Ok(response);
        }

        Err(last_error.unwrap_or(UpstreamError::RateLimited {
            attempts: self.max_retries,
        }))
    }

    async fn fetch_csrf_token(&self, session_token: &str) -> Result<String, UpstreamError> {
        let url = format!("{}/", self.base_url);
        let cookie = format!("{SESSION_COOKIE}={session_token}");
        let response = self
            .send_with_retry(|| self.client.get(&url).header(header::COOKIE, &cookie))
            .await?;

        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|v| extract_cookie(v, CSRF_COOKIE))
            .ok_or(UpstreamError::MissingCsrf)
    }
}

#[async_trait]
impl ProblemSource for LeetCodeClient {
    async fn list_problems(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Option<Vec<UpstreamProblem>>, UpstreamError> {
        let url = format!("{}/graphql", self.base_url);
        let body = json!({
            "query": PROBLEM_LIST_QUERY,
            "variables": {
                "categorySlug": "",
                "skip": offset,
                "limit": limit,
                "filters": {},
            },
        });

        let response = self
            .send_with_retry(|| self.client.post(&url).json(&body))
            .await?;
        let text = response.text().await?;
        let parsed: GraphQlResponse<ProblemListData> = serde_json::from_str(&text)?;

        if let Some(err) = parsed.errors.first() {
            return Err(UpstreamError::Api {
                status: 200,
                message: err.message.clone(),
            });
        }

        let page = parsed
            .data
            .and_then(|d| d.problemset_question_list)
            .and_then(|l| l.questions);
        debug!(
            "Fetched problem page offset={offset} limit={limit} size={:?}",
            page.as_ref().map(Vec::len)
        );
        Ok(page)
    }

    async fn authenticate(
        &self,
        session_token: &str,
    ) -> Result<Box<dyn SubmissionSource>, UpstreamError> {
        let csrf_token = self.fetch_csrf_token(session_token).await?;
        debug!("Established upstream session");
        Ok(Box::new(LeetCodeSession {
            client: self.clone(),
            session_token: session_token.to_string(),
            csrf_token,
        }))
    }
}

/// Authenticated handle: the user's session cookie plus the csrf token
/// issued for it.
struct LeetCodeSession {
    client: LeetCodeClient,
    session_token: String,
    csrf_token: String,
}

impl LeetCodeSession {
    async fn fetch_submission_dump(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<SubmissionDump, UpstreamError> {
        let url = format!("{}/api/submissions/", self.client.base_url);
        let referer = format!("{}/", self.client.base_url);
        let cookie = format!(
            "{SESSION_COOKIE}={}; {CSRF_COOKIE}={}",
            self.session_token, self.csrf_token
        );
        let query = [("offset", offset), ("limit", limit)];

        let response = self
            .client
            .send_with_retry(|| {
                self.client
                    .client
                    .get(&url)
                    .query(&query)
                    .header(header::COOKIE, &cookie)
                    .header("x-csrftoken", &self.csrf_token)
                    .header(header::REFERER, &referer)
            })
            .await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl SubmissionSource for LeetCodeSession {
    /// Returns up to `limit` submissions starting at `offset`.
    ///
    /// The endpoint may serve fewer rows per call than asked for, so chunks
    /// are requested until `limit` is filled or `has_next` goes false. A page
    /// shorter than `limit` therefore always means the history has ended.
    async fn list_submissions(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Option<Vec<Submission>>, UpstreamError> {
        let mut collected: Vec<Submission> = Vec::new();

        while collected.len() < limit {
            let chunk_offset = offset + collected.len();
            let dump = self
                .fetch_submission_dump(chunk_offset, limit - collected.len())
                .await?;

            let chunk = match dump.submissions_dump {
                Some(chunk) => chunk,
                None if collected.is_empty() => return Ok(None),
                None => break,
            };
            debug!(
                "Fetched submission chunk offset={chunk_offset} size={} has_next={}",
                chunk.len(),
                dump.has_next
            );

            let received = chunk.len();
            collected.extend(chunk);
            if received == 0 || !dump.has_next {
                break;
            }
        }

        collected.truncate(limit);
        Ok(Some(collected))
    }
}

/// Pulls `name=value` out of a single Set-Cookie / Cookie header value.
pub fn extract_cookie(header_value: &str, name: &str) -> Option<String> {
    header_value
        .split(';')
        .map(str::trim)
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
