use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::identity::handlers::require_user;
use crate::models::problem::{Comment, NewProblem, Problem, ProblemStatus};
use crate::models::user::{Location, User};
use crate::problems::query::ProblemQuery;
use crate::problems::seed::CATEGORIES;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ProblemListResponse {
    pub problems: Vec<Problem>,
    pub total: usize,
}

#[derive(Deserialize)]
pub struct SubmitProblemRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub location: Option<Location>,
}

#[derive(Deserialize)]
pub struct StatusChangeRequest {
    pub status: ProblemStatus,
}

#[derive(Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Serialize)]
pub struct UpvoteResponse {
    pub problem_id: String,
    pub upvotes: u32,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub user: User,
    pub problems: Vec<Problem>,
    pub helping: Vec<Problem>,
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Problem {id} not found"))
}

/// GET /api/v1/problems
pub async fn handle_list_problems(
    State(state): State<AppState>,
    Query(query): Query<ProblemQuery>,
) -> Result<Json<ProblemListResponse>, AppError> {
    query.status_filter()?;
    let problems = query.apply(&state.problems.all().await);
    Ok(Json(ProblemListResponse {
        total: problems.len(),
        problems,
    }))
}

/// POST /api/v1/problems
pub async fn handle_submit_problem(
    State(state): State<AppState>,
    Json(req): Json<SubmitProblemRequest>,
) -> Result<(StatusCode, Json<Problem>), AppError> {
    let user = require_user(&state, "You must be logged in to submit a problem").await?;

    let problem = state
        .problems
        .add_problem(NewProblem {
            title: req.title.trim().to_string(),
            description: req.description.trim().to_string(),
            category: req.category.trim().to_string(),
            author_id: user.id,
            author_name: user.name,
            author_avatar: user.avatar,
            location: req.location,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(problem)))
}

/// GET /api/v1/problems/:id
pub async fn handle_get_problem(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Problem>, AppError> {
    state
        .problems
        .get_problem_by_id(&id)
        .await
        .map(Json)
        .ok_or_else(|| not_found(&id))
}

/// PATCH /api/v1/problems/:id/status
///
/// Helpers only. The acting helper is recorded on the problem.
pub async fn handle_change_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StatusChangeRequest>,
) -> Result<Json<Problem>, AppError> {
    let user = require_user(&state, "You must be logged in to update a problem").await?;
    if !user.is_helper() {
        return Err(AppError::Forbidden(
            "Only helpers can change a problem's status".to_string(),
        ));
    }

    state
        .problems
        .update_problem_status(&id, req.status, Some(user.id), Some(user.name))
        .await
        .map(Json)
        .ok_or_else(|| not_found(&id))
}

/// POST /api/v1/problems/:id/comments
pub async fn handle_add_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    require_user(&state, "You must be logged in to comment").await?;
    if req.content.trim().is_empty() {
        return Err(AppError::Validation("Comment cannot be empty".to_string()));
    }

    let comment = state
        .problems
        .add_comment(&id, &req.content)
        .await
        .ok_or_else(|| not_found(&id))?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// POST /api/v1/problems/:id/upvote
///
/// Signed-in users get one vote per problem; anonymous votes are not tracked.
pub async fn handle_upvote(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UpvoteResponse>, AppError> {
    if state.problems.get_problem_by_id(&id).await.is_none() {
        return Err(not_found(&id));
    }

    if let Some(user) = state.identity.current_user().await {
        if !state.votes.record(&user.id, &id).await {
            return Err(AppError::Conflict(
                "You have already upvoted this problem".to_string(),
            ));
        }
    }

    let upvotes = state
        .problems
        .upvote_problem(&id)
        .await
        .ok_or_else(|| not_found(&id))?;
    Ok(Json(UpvoteResponse {
        problem_id: id,
        upvotes,
    }))
}

/// GET /api/v1/profile
pub async fn handle_profile(State(state): State<AppState>) -> Result<Json<ProfileResponse>, AppError> {
    let user = require_user(&state, "Please log in to view your profile").await?;
    Ok(Json(ProfileResponse {
        user,
        problems: state.problems.user_problems().await,
        helping: state.problems.helping_problems().await,
    }))
}

/// GET /api/v1/categories
pub async fn handle_categories() -> Json<&'static [&'static str]> {
    Json(CATEGORIES)
}
