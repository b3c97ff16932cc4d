//! Problem Store: the in-memory collection of community problems.
//!
//! Every mutation bumps a revision on a watch channel so view bindings (the map)
//! can resync. Authorization is the caller's job; the store only enforces the
//! data invariants.

pub mod handlers;
pub mod query;
pub mod seed;
pub mod votes;

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::identity::IdentityStore;
use crate::models::problem::{Comment, NewProblem, Problem, ProblemStatus};

#[derive(Clone)]
pub struct ProblemStore {
    problems: Arc<RwLock<Vec<Problem>>>,
    identity: IdentityStore,
    revision: Arc<watch::Sender<u64>>,
}

impl ProblemStore {
    pub fn new(identity: IdentityStore, seed: Vec<Problem>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            problems: Arc::new(RwLock::new(seed)),
            identity,
            revision: Arc::new(revision),
        }
    }

    /// Receiver that observes one revision bump per mutation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Current revision; advances once per mutation.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    pub async fn all(&self) -> Vec<Problem> {
        self.problems.read().await.clone()
    }

    /// Problems authored by the signed-in user. Empty when signed out.
    pub async fn user_problems(&self) -> Vec<Problem> {
        let Some(user) = self.identity.current_user().await else {
            return vec![];
        };
        self.problems
            .read()
            .await
            .iter()
            .filter(|p| p.author_id == user.id)
            .cloned()
            .collect()
    }

    /// Problems the signed-in helper has claimed. Empty for seekers.
    pub async fn helping_problems(&self) -> Vec<Problem> {
        let Some(user) = self.identity.current_user().await.filter(|u| u.is_helper()) else {
            return vec![];
        };
        self.problems
            .read()
            .await
            .iter()
            .filter(|p| p.helper_id.as_deref() == Some(user.id.as_str()))
            .cloned()
            .collect()
    }

    pub async fn add_problem(&self, fields: NewProblem) -> Result<Problem, AppError> {
        let required = [
            &fields.title,
            &fields.description,
            &fields.category,
            &fields.author_id,
        ];
        if required.iter().any(|f| f.trim().is_empty()) {
            return Err(AppError::Validation(
                "Please fill in all required fields".to_string(),
            ));
        }

        let problem = Problem {
            id: format!("problem_{}", Uuid::new_v4().simple()),
            title: fields.title,
            description: fields.description,
            category: fields.category,
            created_at: Utc::now(),
            author_id: fields.author_id,
            author_name: fields.author_name,
            author_avatar: fields.author_avatar,
            status: ProblemStatus::Open,
            location: fields.location,
            helper_id: None,
            helper_name: None,
            comments: vec![],
            upvotes: 0,
        };

        self.problems.write().await.push(problem.clone());
        self.bump();
        info!(
            "Problem {} created by {} in {}",
            problem.id, problem.author_id, problem.category
        );
        Ok(problem)
    }

    pub async fn get_problem_by_id(&self, id: &str) -> Option<Problem> {
        self.problems.read().await.iter().find(|p| p.id == id).cloned()
    }

    /// Sets the status. Helper fields fall back to the previous ones when not supplied
    /// and are cleared when the problem goes back to `open`.
    pub async fn update_problem_status(
        &self,
        id: &str,
        status: ProblemStatus,
        helper_id: Option<String>,
        helper_name: Option<String>,
    ) -> Option<Problem> {
        let mut problems = self.problems.write().await;
        let problem = problems.iter_mut().find(|p| p.id == id)?;

        problem.status = status;
        if status == ProblemStatus::Open {
            problem.helper_id = None;
            problem.helper_name = None;
        } else {
            if let Some(helper_id) = helper_id.filter(|s| !s.is_empty()) {
                problem.helper_id = Some(helper_id);
            }
            if let Some(helper_name) = helper_name.filter(|s| !s.is_empty()) {
                problem.helper_name = Some(helper_name);
            }
        }

        let updated = problem.clone();
        drop(problems);
        self.bump();
        info!("Problem {} moved to {}", id, status.as_str());
        Some(updated)
    }

    /// Appends a comment by the signed-in user. Returns `None` without touching
    /// anything when signed out, when the content is blank, or when the problem
    /// does not exist.
    pub async fn add_comment(&self, problem_id: &str, content: &str) -> Option<Comment> {
        if content.trim().is_empty() {
            return None;
        }
        let user = self.identity.current_user().await?;

        let mut problems = self.problems.write().await;
        let problem = problems.iter_mut().find(|p| p.id == problem_id)?;

        let comment = Comment {
            id: format!("comment_{}", Uuid::new_v4().simple()),
            problem_id: problem_id.to_string(),
            user_id: user.id,
            user_name: user.name,
            user_avatar: user.avatar,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        problem.comments.push(comment.clone());
        drop(problems);

        self.bump();
        debug!("Comment {} added to problem {}", comment.id, problem_id);
        Some(comment)
    }

    /// Adds exactly one vote. Returns the new count, or `None` for an unknown id.
    pub async fn upvote_problem(&self, id: &str) -> Option<u32> {
        let mut problems = self.problems.write().await;
        let problem = problems.iter_mut().find(|p| p.id == id)?;
        problem.upvotes = problem.upvotes.saturating_add(1);
        let upvotes = problem.upvotes;
        drop(problems);

        self.bump();
        debug!("Problem {} upvoted ({} total)", id, upvotes);
        Some(upvotes)
    }
}
