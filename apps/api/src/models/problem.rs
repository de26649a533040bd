use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown difficulty '{0}'")]
pub struct UnknownDifficulty(pub String);

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Easy" => Ok(Difficulty::Easy),
            "Medium" => Ok(Difficulty::Medium),
            "Hard" => Ok(Difficulty::Hard),
            other => Err(UnknownDifficulty(other.to_string())),
        }
    }
}

/// A single catalog entry. `title_slug` is the join key against submissions.
///
/// `question_id` is the platform-internal id and `frontend_question_id` the
/// number shown to users; they diverge for a number of older problems.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub question_id: String,
    pub frontend_question_id: String,
    pub title: String,
    pub title_slug: String,
    pub difficulty: Difficulty,
    pub ac_rate: f64,
    pub paid_only: bool,
    pub tags: Vec<String>,
    pub tag_slugs: Vec<String>,
}

/// Reduced projection of a `Problem` for lightweight clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProblemSummary {
    pub slug: String,
    pub difficulty: Difficulty,
    pub ac_rate: f64,
    pub frontend_id: String,
    pub tag_slugs: Vec<String>,
}

impl From<&Problem> for ProblemSummary {
    fn from(p: &Problem) -> Self {
        Self {
            slug: p.title_slug.clone(),
            difficulty: p.difficulty,
            ac_rate: p.ac_rate,
            frontend_id: p.frontend_question_id.clone(),
            tag_slugs: p.tag_slugs.clone(),
        }
    }
}
