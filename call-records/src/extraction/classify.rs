use lazy_static::lazy_static;
use regex::Regex;

use super::transcript::{agent_text, caller_text, full_text};
use crate::facts::ExtractedFacts;
use crate::models::{Intent, Outcome, TranscriptEntry};

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static classifier pattern must compile")
}

lazy_static! {
    static ref OUT_OF_SCOPE_REQUEST: Regex = compile(r"\b(?:submit|file|change)\b");
}

const TRANSFER_PHRASES: &[&str] = &["connect you with", "transfer", "team member", "human agent"];

const AUTH_REJECTED_PHRASES: &[&str] = &[
    "couldn't verify",
    "could not verify",
    "unable to verify",
    "not able to verify",
    "unable to authenticate",
    "couldn't find that npi",
    "could not find that npi",
    "npi is not valid",
    "invalid npi",
];

const AUTH_CONFIRMED_PHRASES: &[&str] = &[
    "you've been verified",
    "you're verified",
    "you are verified",
    "i've verified",
    "verified your",
    "successfully authenticated",
    "npi is valid",
    "npi has been verified",
];

const FRUSTRATION_PHRASES: &[&str] = &[
    "frustrat",
    "ridiculous",
    "speak to a human",
    "speak to a person",
    "real person",
    "representative",
    "waste of time",
];

pub const REASON_FRUSTRATION: &str = "Caller frustration";
pub const REASON_OUT_OF_SCOPE: &str = "Out-of-scope request";
pub const REASON_AUTH_FAILED: &str = "Authentication failed";
pub const REASON_ESCALATED: &str = "Escalated to a team member";

fn mentions_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| text.contains(phrase))
}

/// Intent, outcome and authentication result derived from one delivery
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub intent: Intent,
    pub outcome: Outcome,
    pub transferred: bool,
    pub transfer_reason: Option<String>,
    pub auth_success: Option<bool>,
}

fn intent_from_keywords(text: &str) -> Option<Intent> {
    if text.contains("prior auth") || text.contains("authorization") {
        Some(Intent::PriorAuth)
    } else if text.contains("claim") {
        Some(Intent::Claims)
    } else if text.contains("eligib") || text.contains("coverage") {
        Some(Intent::Eligibility)
    } else {
        None
    }
}

/// Tool data first, then what the caller asked for, then anything said
pub fn classify_intent(transcript: &[TranscriptEntry], facts: &ExtractedFacts) -> Intent {
    facts
        .get_str("call_intent")
        .and_then(|hint| Intent::from_hint(&hint))
        .or_else(|| intent_from_keywords(&caller_text(transcript)))
        .or_else(|| intent_from_keywords(&full_text(transcript).to_lowercase()))
        .unwrap_or(Intent::General)
}

pub fn classify_outcome(transcript: &[TranscriptEntry], facts: &ExtractedFacts, forced_transfer: bool) -> Outcome {
    if forced_transfer || mentions_any(&agent_text(transcript), TRANSFER_PHRASES) {
        return Outcome::Transferred;
    }
    match facts.get_bool_like("found") {
        Some(true) => Outcome::Resolved,
        Some(false) => Outcome::NotFound,
        None if facts.get_bool_like("valid") == Some(false) => Outcome::AuthFailed,
        None => Outcome::Resolved,
    }
}

/// `known_provider` is the provider name learned from tool data, before any
/// transcript fallback; the agent addressing the caller by it counts as a pass
pub fn infer_auth_success(
    transcript: &[TranscriptEntry],
    facts: &ExtractedFacts,
    known_provider: Option<&str>,
) -> Option<bool> {
    if let Some(valid) = facts.get_bool_like("valid") {
        return Some(valid);
    }

    let agent = agent_text(transcript);
    if mentions_any(&agent, AUTH_REJECTED_PHRASES) {
        return Some(false);
    }
    if mentions_any(&agent, AUTH_CONFIRMED_PHRASES) {
        return Some(true);
    }

    let name = known_provider?
        .trim()
        .trim_start_matches("Dr.")
        .trim_start_matches("Dr ")
        .trim()
        .to_lowercase();
    if !name.is_empty() && agent.contains(&name) {
        return Some(true);
    }
    None
}

pub fn infer_transfer_reason(transcript: &[TranscriptEntry]) -> Option<String> {
    let caller = caller_text(transcript);
    let agent = agent_text(transcript);

    let reason = if mentions_any(&caller, FRUSTRATION_PHRASES) {
        REASON_FRUSTRATION
    } else if OUT_OF_SCOPE_REQUEST.is_match(&caller) {
        REASON_OUT_OF_SCOPE
    } else if mentions_any(&agent, AUTH_REJECTED_PHRASES) {
        REASON_AUTH_FAILED
    } else if mentions_any(&agent, TRANSFER_PHRASES) {
        REASON_ESCALATED
    } else {
        return None;
    };
    Some(reason.to_string())
}

pub fn classify(
    transcript: &[TranscriptEntry],
    facts: &ExtractedFacts,
    forced_transfer: bool,
    known_provider: Option<&str>,
) -> Classification {
    let outcome = classify_outcome(transcript, facts, forced_transfer);
    let transferred = outcome == Outcome::Transferred;
    Classification {
        intent: classify_intent(transcript, facts),
        outcome,
        transferred,
        transfer_reason: if transferred {
            infer_transfer_reason(transcript)
        } else {
            None
        },
        auth_success: infer_auth_success(transcript, facts, known_provider),
    }
}
