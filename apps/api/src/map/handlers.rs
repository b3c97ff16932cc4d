use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::map::widget::{LatLng, MarkerId};
use crate::map::{MarkerClick, PlacedMarker, DEFAULT_CENTER, DEFAULT_ZOOM};
use crate::models::problem::Problem;
use crate::problems::query::parse_status_filter;
use crate::state::AppState;

#[derive(Serialize)]
pub struct MapResponse {
    pub center: LatLng,
    pub zoom: u8,
    pub markers: Vec<PlacedMarker>,
}

#[derive(Deserialize)]
pub struct MapFilter {
    pub status: Option<String>,
}

/// GET /api/v1/map
pub async fn handle_map(State(state): State<AppState>) -> Json<MapResponse> {
    state.map.catch_up(&state.problems).await;
    Json(MapResponse {
        center: DEFAULT_CENTER,
        zoom: DEFAULT_ZOOM,
        markers: state.map.markers().await,
    })
}

/// GET /api/v1/map/problems?status=
///
/// Side list on the map page. `all` (or no status) returns everything.
pub async fn handle_map_problems(
    State(state): State<AppState>,
    Query(filter): Query<MapFilter>,
) -> Result<Json<Vec<Problem>>, AppError> {
    let wanted = parse_status_filter(filter.status.as_deref())?;

    let problems = state
        .problems
        .all()
        .await
        .into_iter()
        .filter(|p| wanted.map_or(true, |status| p.status == status))
        .collect();
    Ok(Json(problems))
}

/// POST /api/v1/map/markers/:marker_id/click
pub async fn handle_marker_click(
    State(state): State<AppState>,
    Path(marker_id): Path<u64>,
) -> Result<Json<MarkerClick>, AppError> {
    state.map.catch_up(&state.problems).await;
    state
        .map
        .click(MarkerId(marker_id))
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Marker {marker_id} not found")))
}
