//! Health check endpoint.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use crate::AppState;
use crate::models::HealthResponse;

/// `GET /api/v1/healthcheck`: reports version and store connectivity.
pub async fn healthcheck_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_connected = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("store ping failed: {e}");
            false
        }
    };
    Json(HealthResponse {
        status: "ok".into(),
        version: vidshare_core::version().into(),
        store_connected,
    })
}
