use utoipa::OpenApi;

/// OpenAPI document for the HTTP surface
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::health::readiness,
        crate::handlers::voice::authenticate_npi,
        crate::handlers::voice::verify_zip,
        crate::handlers::voice::eligibility,
        crate::handlers::voice::claims,
        crate::handlers::webhooks::bland_call_complete,
        crate::handlers::webhooks::elevenlabs_post_call,
        crate::handlers::elevenlabs::save_conversation,
        crate::handlers::calls::get_call,
        crate::handlers::calls::flag_call,
    ),
    components(
        schemas(
            crate::error::ApiErrorResponse,
            crate::handlers::health::HealthResponse,
            crate::handlers::health::ReadinessResponse,
            crate::handlers::webhooks::WebhookAck,
            crate::handlers::elevenlabs::SaveConversationResponse,
            crate::handlers::calls::FlagRequest,
            insurance_service::AuthenticateNpiRequest,
            insurance_service::AuthenticateNpiResponse,
            insurance_service::VerifyZipRequest,
            insurance_service::VerifyZipResponse,
            insurance_service::EligibilityRequest,
            insurance_service::EligibilityResponse,
            insurance_service::ClaimsRequest,
            insurance_service::ClaimsResponse,
            insurance_service::MemberStatus,
            insurance_service::ClaimStatus,
            call_records::CallRecord,
            call_records::TranscriptEntry,
            call_records::Speaker,
            call_records::Intent,
            call_records::Outcome,
            call_records::CallSource,
            call_records::SaveConversationRequest,
            call_records::PostedTranscriptEntry,
        )
    ),
    tags(
        (name = "health", description = "Liveness and readiness"),
        (name = "voice", description = "Lookups called by the voice agent mid-call"),
        (name = "webhooks", description = "Post-call deliveries from voice-agent vendors"),
        (name = "elevenlabs", description = "Browser voice-agent sessions"),
        (name = "calls", description = "Reconciled call records"),
    ),
    info(
        title = "Voice Ops API",
        version = "0.1.0",
        description = "Provider-services voice line: spoken-identifier lookups, vendor webhook ingestion and call-record reconciliation."
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/health",
            "/readiness",
            "/api/v1/voice/authenticate-npi",
            "/api/v1/voice/claims",
            "/api/v1/webhooks/bland/call-complete",
            "/api/v1/elevenlabs/save-conversation",
            "/api/v1/calls/{call_id}/flag",
        ] {
            assert!(paths.iter().any(|p| p.as_str() == expected), "missing {expected}");
        }
    }
}
