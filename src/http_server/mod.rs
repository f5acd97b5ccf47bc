//! HTTP server module: REST surface for alert CRUD, wired to the scheduler.

mod alerts;
mod error;

use std::{net::SocketAddr, sync::Arc};

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;

pub use error::ApiError;

use crate::{persistence::traits::AlertRepository, scheduler::Scheduler};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct ApiState {
    /// The alert repository.
    pub repo: Arc<dyn AlertRepository>,
    /// The scheduler, so mutations can arm/disarm jobs.
    pub scheduler: Scheduler,
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn status(State(state): State<ApiState>) -> impl IntoResponse {
    Json(json!({ "active_jobs": state.scheduler.active_jobs() }))
}

/// Builds the application router.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/alerts", get(alerts::list_alerts).post(alerts::create_alert))
        .route(
            "/alerts/{alert_id}",
            get(alerts::get_alert).put(alerts::update_alert).delete(alerts::delete_alert),
        )
        .route("/alerts/{alert_id}/notifications", get(alerts::list_notifications))
        .with_state(state)
}

/// Runs the HTTP server on the configured listen address until the process
/// shuts down.
pub async fn run_server(listen_address: &str, state: ApiState) {
    let addr: SocketAddr = listen_address.parse().expect("Invalid server.listen_address format");

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await.expect("Failed to bind address");
    tracing::info!(%addr, "HTTP server listening.");

    axum::serve(listener, app.into_make_service()).await.expect("Server failed");
}
