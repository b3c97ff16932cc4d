use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::problem::{Problem, ProblemStatus};

/// Label meaning "no filter" for category and status.
pub const ALL: &str = "All";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Newest first.
    #[default]
    Recent,
    /// Most upvoted first.
    Votes,
    /// Most commented first.
    Activity,
}

/// Parses a status filter label. Absent or `all` (any case) means no filter;
/// anything that is not a known status is rejected.
pub fn parse_status_filter(label: Option<&str>) -> Result<Option<ProblemStatus>, AppError> {
    match label.map(str::trim) {
        None | Some("") => Ok(None),
        Some(label) if label.eq_ignore_ascii_case(ALL) => Ok(None),
        Some(label) => ProblemStatus::parse(label)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("Unknown status '{label}'"))),
    }
}

/// Browse-page filter. Absent fields do not filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProblemQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
}

impl ProblemQuery {
    fn matches_search(&self, problem: &Problem) -> bool {
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                problem.title.to_lowercase().contains(&needle)
                    || problem.description.to_lowercase().contains(&needle)
            }
        }
    }

    fn matches_category(&self, problem: &Problem) -> bool {
        match self.category.as_deref() {
            None | Some(ALL) => true,
            Some(category) => problem.category == category,
        }
    }

    pub fn status_filter(&self) -> Result<Option<ProblemStatus>, AppError> {
        parse_status_filter(self.status.as_deref())
    }

    fn matches_status(&self, problem: &Problem) -> bool {
        match self.status_filter() {
            Ok(None) => true,
            Ok(Some(status)) => problem.status == status,
            Err(_) => false,
        }
    }

    pub fn matches(&self, problem: &Problem) -> bool {
        self.matches_search(problem) && self.matches_category(problem) && self.matches_status(problem)
    }

    /// Filters then sorts. The sort is stable, so ties keep collection order.
    pub fn apply(&self, problems: &[Problem]) -> Vec<Problem> {
        let mut selected: Vec<Problem> = problems
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect();
        sort_problems(&mut selected, self.sort);
        selected
    }
}

pub fn sort_problems(problems: &mut [Problem], order: SortOrder) {
    match order {
        SortOrder::Recent => problems.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOrder::Votes => problems.sort_by(|a, b| b.upvotes.cmp(&a.upvotes)),
        SortOrder::Activity => problems.sort_by(|a, b| b.comments.len().cmp(&a.comments.len())),
    }
}
