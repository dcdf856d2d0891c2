//! Built-in endpoint handlers.

use axum::Json;
use serde::Serialize;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint, mounted outside the signature gate.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
