use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{Speaker, TranscriptEntry};

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static transcript pattern must compile")
}

lazy_static! {
    static ref PROVIDER_NAME: Regex =
        compile(r"\b(?:[Dd]octor|[Dd]r\.?)\s+([A-Z][A-Za-z'\-]+(?:\s+[A-Z][A-Za-z'\-]+)?)");
    static ref PATIENT_NAME: Regex = compile(
        r"(?:(?i:patient|member)\s+(?i:named)|(?i:record\s+for))\s+([A-Z][A-Za-z'\-]+(?:\s+[A-Z][A-Za-z'\-]+)?)"
    );
}

/// Everything said, space-joined
pub fn full_text(transcript: &[TranscriptEntry]) -> String {
    joined(transcript, |_| true)
}

/// What the voice agent said, lowercased
pub fn agent_text(transcript: &[TranscriptEntry]) -> String {
    joined(transcript, |speaker| speaker == Speaker::Ai).to_lowercase()
}

/// What the calling provider said, lowercased
pub fn caller_text(transcript: &[TranscriptEntry]) -> String {
    joined(transcript, |speaker| speaker == Speaker::Provider).to_lowercase()
}

fn joined(transcript: &[TranscriptEntry], keep: impl Fn(Speaker) -> bool) -> String {
    transcript
        .iter()
        .filter(|entry| keep(entry.speaker))
        .map(|entry| entry.text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// First "Dr./Doctor <Name>" mention, as "Dr. <Name>"
pub fn provider_name_from(transcript: &[TranscriptEntry]) -> Option<String> {
    transcript.iter().find_map(|entry| {
        PROVIDER_NAME
            .captures(&entry.text)
            .and_then(|caps| caps.get(1))
            .map(|name| format!("Dr. {}", name.as_str()))
    })
}

/// First "patient named <Name>" or "record for <Name>" mention
pub fn patient_name_from(transcript: &[TranscriptEntry]) -> Option<String> {
    transcript.iter().find_map(|entry| {
        PATIENT_NAME
            .captures(&entry.text)
            .and_then(|caps| caps.get(1))
            .map(|name| name.as_str().to_string())
    })
}
