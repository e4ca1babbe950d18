use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::server::VoiceOpsServer;

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    /// Current timestamp in RFC3339 format
    #[schema(example = "2025-11-14T10:30:00Z")]
    pub timestamp: String,
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Process uptime in seconds
    #[schema(example = 3600)]
    pub uptime: u64,
}

/// Readiness response with store sizes
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadinessResponse {
    #[schema(example = "ready")]
    pub status: String,
    pub providers: usize,
    pub members: usize,
    pub claims: usize,
    pub call_records: usize,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Process is alive", body = HealthResponse)
    )
)]
pub async fn health_check(State(server): State<VoiceOpsServer>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: server.uptime_seconds(),
    })
}

#[utoipa::path(
    get,
    path = "/readiness",
    tag = "health",
    responses(
        (status = 200, description = "Stores are reachable", body = ReadinessResponse),
        (status = 500, description = "A store failed", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn readiness(State(server): State<VoiceOpsServer>) -> Result<Json<ReadinessResponse>, ApiError> {
    let counts = server.insurance.counts().await?;
    let call_records = server.calls.count().await?;
    Ok(Json(ReadinessResponse {
        status: "ready".to_string(),
        providers: counts.providers,
        members: counts.members,
        claims: counts.claims,
        call_records,
    }))
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
