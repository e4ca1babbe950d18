use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use utoipa::ToSchema;

/// Who said a transcript line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Speaker {
    #[serde(rename = "AI")]
    Ai,
    Provider,
}

impl Speaker {
    /// Vendor role labels for the voice agent; anything else is the caller
    pub fn from_role(role: &str) -> Self {
        match role.trim().to_lowercase().as_str() {
            "agent" | "assistant" | "ai" | "bot" => Speaker::Ai,
            _ => Speaker::Provider,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl TranscriptEntry {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
            timestamp: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Eligibility,
    Claims,
    PriorAuth,
    General,
    Other,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Eligibility => "eligibility",
            Intent::Claims => "claims",
            Intent::PriorAuth => "prior_auth",
            Intent::General => "general",
            Intent::Other => "other",
        }
    }

    /// Map a free-text intent hint by substring; blank hints carry no intent
    pub fn from_hint(hint: &str) -> Option<Self> {
        let hint = hint.trim().to_lowercase();
        if hint.is_empty() {
            None
        } else if hint.contains("elig") {
            Some(Intent::Eligibility)
        } else if hint.contains("claim") {
            Some(Intent::Claims)
        } else if hint.contains("prior") || hint.contains("auth") {
            Some(Intent::PriorAuth)
        } else {
            Some(Intent::Other)
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Resolved,
    Transferred,
    NotFound,
    AuthFailed,
    #[default]
    Unknown,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Resolved => "resolved",
            Outcome::Transferred => "transferred",
            Outcome::NotFound => "not_found",
            Outcome::AuthFailed => "auth_failed",
            Outcome::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Voice-agent vendor that produced the call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CallSource {
    Bland,
    Elevenlabs,
}

/// One logical call, merged from every delivery received for its `call_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CallRecord {
    pub call_id: String,
    pub phone_from: Option<String>,
    pub phone_to: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_seconds: u64,
    pub intent: Option<Intent>,
    pub outcome: Outcome,
    pub provider_npi: Option<String>,
    pub provider_name: Option<String>,
    pub patient_name: Option<String>,
    pub patient_dob: Option<String>,
    pub transcript: Vec<TranscriptEntry>,
    pub recording_url: Option<String>,
    pub tags: Vec<String>,
    /// Operator flag; never written by ingestion
    pub flagged: bool,
    pub transferred: bool,
    pub transfer_reason: Option<String>,
    pub source: CallSource,
    /// `None` when the call gives no signal either way
    pub auth_success: Option<bool>,
    #[schema(value_type = Object)]
    pub extracted_data: Map<String, Value>,
    /// Set once any delivery for this call was marked complete by the vendor
    pub complete: bool,
    /// Bumped by the store on every write; used for compare-and-swap updates
    #[serde(default)]
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
