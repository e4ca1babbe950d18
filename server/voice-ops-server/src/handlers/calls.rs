use axum::{
    extract::{Path, State},
    Json,
};
use call_records::CallRecord;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::server::VoiceOpsServer;

#[derive(Debug, Deserialize, ToSchema)]
pub struct FlagRequest {
    pub flagged: bool,
}

#[utoipa::path(
    get,
    path = "/api/v1/calls/{call_id}",
    tag = "calls",
    params(("call_id" = String, Path, description = "Call identifier")),
    responses(
        (status = 200, description = "Stored call record", body = CallRecord),
        (status = 404, description = "No record for this call", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn get_call(
    State(server): State<VoiceOpsServer>,
    Path(call_id): Path<String>,
) -> Result<Json<CallRecord>, ApiError> {
    server
        .calls
        .get(&call_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::call_not_found(&call_id))
}

/// Set or clear the operator review flag
#[utoipa::path(
    patch,
    path = "/api/v1/calls/{call_id}/flag",
    tag = "calls",
    params(("call_id" = String, Path, description = "Call identifier")),
    request_body = FlagRequest,
    responses(
        (status = 200, description = "Updated call record", body = CallRecord),
        (status = 404, description = "No record for this call", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn flag_call(
    State(server): State<VoiceOpsServer>,
    Path(call_id): Path<String>,
    Json(request): Json<FlagRequest>,
) -> Result<Json<CallRecord>, ApiError> {
    server
        .calls
        .set_flagged(&call_id, request.flagged)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::call_not_found(&call_id))
}
