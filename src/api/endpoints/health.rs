//! Health check endpoint.

use axum::Json;
use serde::Serialize;

use crate::config;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub poll_interval_secs: u64,
}

/// `GET /api/health`: liveness check; also tells clients how often to poll.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: config::APP_VERSION,
        poll_interval_secs: config::NOTIFICATION_POLL_INTERVAL_SECS,
    })
}
