//! Session control endpoints.
//!
//! Provides HTTP endpoints for:
//! - Toggling recording (POST /toggle)
//! - Getting session status (GET /status)

use crate::api::error::ApiError;
use crate::session::{ControlEvent, SessionStatusHandle};
use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{error, info};

#[derive(Clone)]
pub struct SessionApiState {
    pub tx: mpsc::Sender<ControlEvent>,
    pub status: SessionStatusHandle,
}

/// Creates the session router with the toggle and status endpoints.
pub fn router(state: SessionApiState) -> Router {
    Router::new()
        .route("/toggle", post(toggle_session))
        .route("/status", get(session_status))
        .with_state(state)
}

/// Toggles the recording session on or off.
///
/// The toggle is posted to the control loop; a toggle received while a
/// session is mid-pipeline is ignored there.
async fn toggle_session(
    State(state): State<SessionApiState>,
) -> Result<Json<Value>, ApiError> {
    info!("Toggle command received via API");

    if let Err(err) = state.tx.send(ControlEvent::Toggle).await {
        error!("Failed to send toggle command: {}", err);
        return Err(ApiError::internal("control loop unavailable"));
    }

    // Small delay to allow the status to be updated
    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

    let status = state.status.get().await;
    Ok(Json(json!({
        "success": true,
        "phase": status.phase.as_str(),
        "message": format!("Session {}", status.phase.as_str()),
    })))
}

/// Gets the current session status.
async fn session_status(State(state): State<SessionApiState>) -> Json<Value> {
    let status = state.status.get().await;

    Json(json!({
        "phase": status.phase.as_str(),
        "partial": status.partial,
        "detected_app": status.detected_app,
        "duration_seconds": status.duration_seconds(),
        "last_error": status.last_error,
    }))
}
