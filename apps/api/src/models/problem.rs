use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::user::Location;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ProblemStatus {
    Open,
    InProgress,
    Resolved,
}

impl ProblemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemStatus::Open => "open",
            ProblemStatus::InProgress => "in-progress",
            ProblemStatus::Resolved => "resolved",
        }
    }

    /// Parses the wire label. Case-sensitive, matching the serde representation.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "open" => Some(ProblemStatus::Open),
            "in-progress" => Some(ProblemStatus::InProgress),
            "resolved" => Some(ProblemStatus::Resolved),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub problem_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_avatar: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub author_id: String,
    pub author_name: String,
    pub author_avatar: Option<String>,
    pub status: ProblemStatus,
    pub location: Option<Location>,
    pub helper_id: Option<String>,
    pub helper_name: Option<String>,
    pub comments: Vec<Comment>,
    pub upvotes: u32,
}

/// Caller-supplied fields for a new problem. Everything else is assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProblem {
    pub title: String,
    pub description: String,
    pub category: String,
    pub author_id: String,
    pub author_name: String,
    pub author_avatar: Option<String>,
    pub location: Option<Location>,
}
