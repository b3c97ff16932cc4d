use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::user::{Location, User, UserRole};
use crate::state::AppState;

/// The signed-in user, or 401 with the given notice.
pub async fn require_user(state: &AppState, notice: &str) -> Result<User, AppError> {
    state
        .identity
        .current_user()
        .await
        .ok_or_else(|| AppError::Unauthorized(notice.to_string()))
}

#[derive(Deserialize)]
pub struct SignInRequest {
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: UserRole,
}

#[derive(Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub name: String,
    pub role: UserRole,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub user: Option<User>,
    pub is_loading: bool,
}

#[derive(Deserialize)]
pub struct LocationRequest {
    pub lat: f64,
    pub lng: f64,
    pub address: Option<String>,
}

#[derive(Deserialize)]
pub struct LocateRequest {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Serialize)]
pub struct LocateResponse {
    pub location: Location,
    pub user: Option<User>,
    /// Set when the address could not be resolved.
    pub notice: Option<String>,
}

/// POST /api/v1/auth/signin
pub async fn handle_sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<User>, AppError> {
    let user = state
        .identity
        .sign_in(req.email.trim(), &req.password, req.role)
        .await?;
    Ok(Json(user))
}

/// POST /api/v1/auth/signup
pub async fn handle_sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    if req.email.trim().is_empty() || req.name.trim().is_empty() {
        return Err(AppError::Validation(
            "Please fill in all required fields".to_string(),
        ));
    }
    let user = state
        .identity
        .sign_up(req.email.trim(), &req.password, req.name.trim(), req.role)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/v1/auth/signout
pub async fn handle_sign_out(State(state): State<AppState>) -> StatusCode {
    state.identity.sign_out().await;
    StatusCode::NO_CONTENT
}

/// GET /api/v1/auth/me
pub async fn handle_me(State(state): State<AppState>) -> Json<SessionResponse> {
    Json(SessionResponse {
        user: state.identity.current_user().await,
        is_loading: state.identity.is_loading(),
    })
}

/// PUT /api/v1/auth/location
pub async fn handle_update_location(
    State(state): State<AppState>,
    Json(req): Json<LocationRequest>,
) -> Result<Json<User>, AppError> {
    let location = Location {
        lat: req.lat,
        lng: req.lng,
        address: req.address.filter(|a| !a.trim().is_empty()),
    };
    state
        .identity
        .update_user_location(location)
        .await
        .map(Json)
        .ok_or_else(|| AppError::Unauthorized("You must be logged in".to_string()))
}

/// POST /api/v1/auth/location/locate
///
/// Reverse-geocodes the coordinates. When no address can be found the
/// coordinates are still kept and a notice is returned instead of an error.
pub async fn handle_locate(
    State(state): State<AppState>,
    Json(req): Json<LocateRequest>,
) -> Result<Json<LocateResponse>, AppError> {
    let (location, notice) = match state.geocoder.reverse(req.lat, req.lng).await {
        Ok(address) => (Location::new(req.lat, req.lng).with_address(address), None),
        Err(AppError::Geocoding(reason)) => {
            tracing::debug!("Reverse geocoding missed: {reason}");
            (
                Location::new(req.lat, req.lng),
                Some("Address could not be determined, but coordinates were captured".to_string()),
            )
        }
        Err(e) => return Err(e),
    };

    let user = state.identity.update_user_location(location.clone()).await;
    Ok(Json(LocateResponse {
        location,
        user,
        notice,
    }))
}
