pub mod paths;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::{
    handlers::{calls, elevenlabs, health, voice, webhooks},
    server::VoiceOpsServer,
};

/// Liveness, readiness and the OpenAPI document
pub fn health_routes() -> Router<VoiceOpsServer> {
    Router::new()
        .route(paths::health::HEALTH, get(health::health_check))
        .route(paths::health::READINESS, get(health::readiness))
        .route(paths::health::OPENAPI_JSON, get(health::openapi_json))
}

/// Voice-agent lookups
pub fn voice_routes() -> Router<VoiceOpsServer> {
    Router::new()
        .route(paths::voice::AUTHENTICATE_NPI, post(voice::authenticate_npi))
        .route(paths::voice::VERIFY_ZIP, post(voice::verify_zip))
        .route(paths::voice::ELIGIBILITY, post(voice::eligibility))
        .route(paths::voice::CLAIMS, post(voice::claims))
}

/// Vendor webhooks and conversation saves
pub fn ingest_routes() -> Router<VoiceOpsServer> {
    Router::new()
        .route(paths::webhooks::BLAND_CALL_COMPLETE, post(webhooks::bland_call_complete))
        .route(paths::webhooks::ELEVENLABS_POST_CALL, post(webhooks::elevenlabs_post_call))
        .route(paths::elevenlabs::SAVE_CONVERSATION, post(elevenlabs::save_conversation))
}

/// Call-record read and flag
pub fn call_routes() -> Router<VoiceOpsServer> {
    Router::new()
        .route(paths::calls::CALL_BY_ID, get(calls::get_call))
        .route(paths::calls::CALL_FLAG, patch(calls::flag_call))
}

/// All routes, versioned ones nested under `prefix`
pub fn create_routes(prefix: &str) -> Router<VoiceOpsServer> {
    let versioned = Router::new()
        .merge(voice_routes())
        .merge(ingest_routes())
        .merge(call_routes());

    let versioned = if prefix.is_empty() {
        versioned
    } else {
        Router::new().nest(prefix, versioned)
    };

    health_routes().merge(versioned)
}
