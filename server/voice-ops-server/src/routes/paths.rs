//! Route path constants
//!
//! Versioned paths are relative to the configured API prefix (`/api/v1` by
//! default). utoipa `#[path(...)]` attributes need string literals, so the
//! documented paths spell out the default prefix and must match these.

/// Unversioned operational endpoints
pub mod health {
    pub const HEALTH: &str = "/health";
    pub const READINESS: &str = "/readiness";
    pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";
}

/// Voice-agent tool endpoints
pub mod voice {
    pub const AUTHENTICATE_NPI: &str = "/voice/authenticate-npi";
    pub const VERIFY_ZIP: &str = "/voice/verify-zip";
    pub const ELIGIBILITY: &str = "/voice/eligibility";
    pub const CLAIMS: &str = "/voice/claims";
}

/// Vendor post-call webhooks
pub mod webhooks {
    pub const BLAND_CALL_COMPLETE: &str = "/webhooks/bland/call-complete";
    pub const ELEVENLABS_POST_CALL: &str = "/webhooks/elevenlabs/post-call";
}

/// Browser voice-agent sessions
pub mod elevenlabs {
    pub const SAVE_CONVERSATION: &str = "/elevenlabs/save-conversation";
}

/// Stored call records
pub mod calls {
    pub const CALL_BY_ID: &str = "/calls/:call_id";
    pub const CALL_FLAG: &str = "/calls/:call_id/flag";
}
