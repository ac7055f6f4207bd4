use axum::{extract::State, Extension, Json};
use filament_core::Snapshot;

use crate::middleware::RequestId;
use crate::refresh::{load_or_refresh, refresh_snapshot};

use super::{map_store_error, ApiError, AppState};

/// `GET /api/prices`: the stored snapshot, building one on a miss.
pub(super) async fn get_prices(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<Snapshot>, ApiError> {
    let snapshot = load_or_refresh(&state)
        .await
        .map_err(|e| map_store_error(req_id.0, &e))?;
    Ok(Json(snapshot))
}

/// `GET /api/run`: always rebuild and persist. Token checking happens in
/// middleware before this runs.
pub(super) async fn run_refresh(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<Snapshot>, ApiError> {
    tracing::info!(request_id = %req_id.0, "manual snapshot refresh");
    let snapshot = refresh_snapshot(&state)
        .await
        .map_err(|e| map_store_error(req_id.0, &e))?;
    Ok(Json(snapshot))
}
