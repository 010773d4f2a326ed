//! REST API server for huddle.
//!
//! The localhost HTTP surface is the user's toggle: bind a hotkey or a
//! status-bar click to `curl -X POST /toggle` and the control loop does
//! the rest.

pub mod error;
pub mod routes;

use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tracing::info;

use crate::session::{ControlEvent, SessionStatusHandle};

pub use routes::session::SessionApiState;

pub struct ApiServer {
    port: u16,
    state: SessionApiState,
}

impl ApiServer {
    pub fn new(
        tx: tokio::sync::mpsc::Sender<ControlEvent>,
        status: SessionStatusHandle,
        port: u16,
    ) -> Self {
        Self {
            port,
            state: SessionApiState { tx, status },
        }
    }

    pub async fn start(self) -> Result<()> {
        let app = Router::new()
            .route("/", get(service_info))
            .route("/version", get(version))
            .merge(routes::session::router(self.state))
            .layer(ServiceBuilder::new());

        let listener = tokio::net::TcpListener::bind(&format!("127.0.0.1:{}", self.port)).await?;

        info!("API server listening on http://127.0.0.1:{}", self.port);
        info!("Endpoints:");
        info!("  GET  /         - Service info");
        info!("  GET  /version  - Version info");
        info!("  POST /toggle   - Toggle recording session");
        info!("  GET  /status   - Session status");

        axum::serve(listener, app).await?;

        Ok(())
    }
}

async fn service_info() -> Json<Value> {
    Json(json!({
        "service": "huddle",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn version() -> Json<Value> {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "name": "huddle"
    }))
}
