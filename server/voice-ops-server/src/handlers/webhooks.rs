use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use call_records::{BlandWebhookPayload, PostCallWebhook};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::server::VoiceOpsServer;
use crate::signature::SIGNATURE_HEADER;

/// Acknowledgement returned to the vendor
#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    #[schema(example = "ok")]
    pub status: String,
    pub call_id: String,
    /// `inserted`, `merged`, `skipped_incomplete` or `unchanged`
    #[schema(example = "merged")]
    pub outcome: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/webhooks/bland/call-complete",
    tag = "webhooks",
    request_body(content = String, description = "Vendor A post-call payload as raw JSON", content_type = "application/json"),
    params(
        ("x-webhook-signature" = Option<String>, Header, description = "Hex HMAC-SHA256 of the raw body")
    ),
    responses(
        (status = 200, description = "Delivery reconciled", body = WebhookAck),
        (status = 401, description = "Signature missing or wrong under the reject policy", body = crate::error::ApiErrorResponse),
        (status = 422, description = "Payload is not a usable call delivery", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn bland_call_complete(
    State(server): State<VoiceOpsServer>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    server.webhooks.enforce(signature, &body)?;

    let payload = BlandWebhookPayload::from_slice(&body)?;
    let (outcome, record) = server.calls.ingest_bland(payload).await?;
    info!(call_id = %record.call_id, outcome = outcome.as_str(), "vendor A webhook handled");

    Ok(Json(WebhookAck {
        status: "ok".to_string(),
        call_id: record.call_id,
        outcome: outcome.as_str().to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/webhooks/elevenlabs/post-call",
    tag = "webhooks",
    request_body(content = String, description = "Vendor B post-call webhook as raw JSON", content_type = "application/json"),
    responses(
        (status = 200, description = "Delivery reconciled", body = WebhookAck),
        (status = 422, description = "Payload is not a usable call delivery", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn elevenlabs_post_call(
    State(server): State<VoiceOpsServer>,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let webhook = PostCallWebhook::from_slice(&body)?;
    let (outcome, record) = server.calls.ingest_elevenlabs_webhook(webhook).await?;
    info!(call_id = %record.call_id, outcome = outcome.as_str(), "vendor B webhook handled");

    Ok(Json(WebhookAck {
        status: "ok".to_string(),
        call_id: record.call_id,
        outcome: outcome.as_str().to_string(),
    }))
}
