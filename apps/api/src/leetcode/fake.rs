//! Scripted upstream for unit tests. Page `n` of each listing is returned on
//! the `n`-th request; requests past the script get an absent page.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::leetcode::{
    ProblemSource, Submission, SubmissionSource, TopicTag, UpstreamError, UpstreamProblem,
};

#[derive(Default)]
struct SubmissionScript {
    pages: Vec<Option<Vec<Submission>>>,
    fail_at: Option<usize>,
    offsets: Mutex<Vec<usize>>,
}

#[derive(Default)]
pub struct FakeSource {
    problem_pages: Vec<Option<Vec<UpstreamProblem>>>,
    fail_problems_at: Option<usize>,
    problem_offsets: Mutex<Vec<usize>>,
    submissions: Arc<SubmissionScript>,
    auth_calls: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_problem_pages(mut self, pages: Vec<Option<Vec<UpstreamProblem>>>) -> Self {
        self.problem_pages = pages;
        self
    }

    pub fn failing_problems_at(mut self, request: usize) -> Self {
        self.fail_problems_at = Some(request);
        self
    }

    pub fn with_submission_pages(mut self, pages: Vec<Option<Vec<Submission>>>) -> Self {
        self.submissions = Arc::new(SubmissionScript {
            pages,
            ..Default::default()
        });
        self
    }

    pub fn failing_submissions_at(mut self, request: usize) -> Self {
        let script = Arc::get_mut(&mut self.submissions).expect("script is not shared yet");
        script.fail_at = Some(request);
        self
    }

    pub fn problem_offsets(&self) -> Vec<usize> {
        self.problem_offsets.lock().unwrap().clone()
    }

    pub fn submission_offsets(&self) -> Vec<usize> {
        self.submissions.offsets.lock().unwrap().clone()
    }

    pub fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }

    /// Total upstream requests of any kind.
    pub fn total_requests(&self) -> usize {
        self.auth_calls() + self.problem_offsets().len() + self.submission_offsets().len()
    }
}

fn scripted_failure() -> UpstreamError {
    UpstreamError::Api {
        status: 502,
        message: "scripted failure".to_string(),
    }
}

#[async_trait]
impl ProblemSource for FakeSource {
    async fn list_problems(
        &self,
        offset: usize,
        _limit: usize,
    ) -> Result<Option<Vec<UpstreamProblem>>, UpstreamError> {
        let request = {
            let mut offsets = self.problem_offsets.lock().unwrap();
            offsets.push(offset);
            offsets.len() - 1
        };
        if self.fail_problems_at == Some(request) {
            return Err(scripted_failure());
        }
        Ok(self.problem_pages.get(request).cloned().flatten())
    }

    async fn authenticate(
        &self,
        _session_token: &str,
    ) -> Result<Box<dyn SubmissionSource>, UpstreamError> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            script: Arc::clone(&self.submissions),
        }))
    }
}

struct FakeSession {
    script: Arc<SubmissionScript>,
}

#[async_trait]
impl SubmissionSource for FakeSession {
    async fn list_submissions(
        &self,
        offset: usize,
        _limit: usize,
    ) -> Result<Option<Vec<Submission>>, UpstreamError> {
        let request = {
            let mut offsets = self.script.offsets.lock().unwrap();
            offsets.push(offset);
            offsets.len() - 1
        };
        if self.script.fail_at == Some(request) {
            return Err(scripted_failure());
        }
        Ok(self.script.pages.get(request).cloned().flatten())
    }
}

pub fn upstream_problem(slug: &str, difficulty: &str) -> UpstreamProblem {
    UpstreamProblem {
        question_id: format!("q-{slug}"),
        frontend_question_id: format!("f-{slug}"),
        title: slug.replace('-', " "),
        title_slug: slug.to_string(),
        difficulty: difficulty.to_string(),
        ac_rate: 50.0,
        paid_only: false,
        topic_tags: vec![TopicTag {
            name: "Array".to_string(),
            slug: "array".to_string(),
        }],
    }
}

/// A page of `count` distinct problems whose slugs start at `first`.
pub fn problem_page(first: usize, count: usize) -> Option<Vec<UpstreamProblem>> {
    Some(
        (first..first + count)
            .map(|i| upstream_problem(&format!("problem-{i}"), "Medium"))
            .collect(),
    )
}

pub fn submission(slug: &str, status: &str) -> Submission {
    Submission {
        title_slug: slug.to_string(),
        status: status.to_string(),
    }
}
