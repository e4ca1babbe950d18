use axum::{extract::State, Json};
use call_records::SaveConversationRequest;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::server::VoiceOpsServer;

#[derive(Debug, Serialize, ToSchema)]
pub struct SaveConversationResponse {
    #[schema(example = "el_conv_01jx9")]
    pub call_id: String,
    /// `saved` or `already_exists`
    #[schema(example = "saved")]
    pub status: String,
}

/// Save a finished browser session; repeated saves return `already_exists`
#[utoipa::path(
    post,
    path = "/api/v1/elevenlabs/save-conversation",
    tag = "elevenlabs",
    request_body = SaveConversationRequest,
    responses(
        (status = 200, description = "Conversation stored or already present", body = SaveConversationResponse)
    )
)]
pub async fn save_conversation(
    State(server): State<VoiceOpsServer>,
    Json(request): Json<SaveConversationRequest>,
) -> Result<Json<SaveConversationResponse>, ApiError> {
    let (call_id, outcome) = server.calls.save_conversation(request).await?;
    Ok(Json(SaveConversationResponse {
        call_id,
        status: outcome.as_str().to_string(),
    }))
}
