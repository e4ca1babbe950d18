//! Voice-agent tool endpoints
//!
//! The agent cannot branch on HTTP status mid-call, so every answer is a 200
//! with a `valid`/`verified`/`found` flag. A store failure is logged and
//! answered as a negative result with a message the agent can read out.

use axum::{extract::State, Json};
use insurance_service::{
    AuthenticateNpiRequest, AuthenticateNpiResponse, ClaimsRequest, ClaimsResponse, EligibilityRequest,
    EligibilityResponse, InsuranceResult, VerifyZipRequest, VerifyZipResponse,
};
use logger_redacted::redact;
use tracing::{error, info};

use crate::extract::LenientJson;
use crate::server::VoiceOpsServer;

const LOOKUP_UNAVAILABLE: &str = "I'm unable to look that up right now. Please try again in a moment.";

fn answer<T>(endpoint: &str, result: InsuranceResult<T>, fallback: impl FnOnce() -> T) -> Json<T> {
    match result {
        Ok(response) => Json(response),
        Err(e) => {
            error!(endpoint, error = %e, "voice lookup failed");
            Json(fallback())
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/voice/authenticate-npi",
    tag = "voice",
    request_body = AuthenticateNpiRequest,
    responses(
        (status = 200, description = "NPI validity; never an error status", body = AuthenticateNpiResponse)
    )
)]
pub async fn authenticate_npi(
    State(server): State<VoiceOpsServer>,
    LenientJson(request): LenientJson<AuthenticateNpiRequest>,
) -> Json<AuthenticateNpiResponse> {
    info!(npi = %redact(request.npi.as_deref().unwrap_or("")), "authenticate-npi received");
    answer(
        "authenticate-npi",
        server.insurance.authenticate_npi(&request).await,
        AuthenticateNpiResponse::default,
    )
}

#[utoipa::path(
    post,
    path = "/api/v1/voice/verify-zip",
    tag = "voice",
    request_body = VerifyZipRequest,
    responses(
        (status = 200, description = "Whether the zip matches a practice location", body = VerifyZipResponse)
    )
)]
pub async fn verify_zip(
    State(server): State<VoiceOpsServer>,
    LenientJson(request): LenientJson<VerifyZipRequest>,
) -> Json<VerifyZipResponse> {
    info!(
        npi = %redact(request.npi.as_deref().unwrap_or("")),
        zip_present = request.zip_code.is_some(),
        "verify-zip received"
    );
    answer("verify-zip", server.insurance.verify_zip(&request).await, VerifyZipResponse::default)
}

#[utoipa::path(
    post,
    path = "/api/v1/voice/eligibility",
    tag = "voice",
    request_body = EligibilityRequest,
    responses(
        (status = 200, description = "Member eligibility and optional service coverage", body = EligibilityResponse)
    )
)]
pub async fn eligibility(
    State(server): State<VoiceOpsServer>,
    LenientJson(request): LenientJson<EligibilityRequest>,
) -> Json<EligibilityResponse> {
    info!(
        member_id = %redact(request.member_id.as_deref().unwrap_or("")),
        has_name = request.patient_name.is_some(),
        has_dob = request.patient_dob.is_some(),
        service = request.service_type.as_deref().unwrap_or(""),
        "eligibility received"
    );
    answer("eligibility", server.insurance.eligibility(&request).await, || EligibilityResponse {
        message: Some(LOOKUP_UNAVAILABLE.to_string()),
        ..EligibilityResponse::default()
    })
}

#[utoipa::path(
    post,
    path = "/api/v1/voice/claims",
    tag = "voice",
    request_body = ClaimsRequest,
    responses(
        (status = 200, description = "Claim status by number or by patient", body = ClaimsResponse)
    )
)]
pub async fn claims(
    State(server): State<VoiceOpsServer>,
    LenientJson(request): LenientJson<ClaimsRequest>,
) -> Json<ClaimsResponse> {
    info!(
        claim_number = request.claim_number.as_deref().unwrap_or(""),
        has_name = request.patient_name.is_some(),
        has_date_of_service = request.date_of_service.is_some(),
        "claims received"
    );
    answer("claims", server.insurance.claims(&request).await, || ClaimsResponse {
        message: Some(LOOKUP_UNAVAILABLE.to_string()),
        ..ClaimsResponse::default()
    })
}
