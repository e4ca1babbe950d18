use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::delivery::{non_blank, CallDelivery};
use crate::error::{CallRecordError, CallRecordResult};
use crate::facts::{bool_like, ExtractedFacts};
use crate::models::{CallSource, Speaker, TranscriptEntry};

/// Vendor bookkeeping variables that are not call facts
const SKIPPED_VARIABLES: &[&str] = &[
    "now",
    "now_utc",
    "short_from",
    "short_to",
    "from",
    "to",
    "call_id",
    "phone_number",
    "city",
    "country",
    "state",
    "zip",
    "placement_group",
    "region",
    "call_token",
    "language",
    "user_id",
    "timestamp",
    "timezone",
    "BlandStatusCode",
];

fn default_user() -> String {
    "assistant".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlandTranscriptEntry {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_user")]
    pub user: String,
}

/// Post-call webhook body. Unknown fields are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlandWebhookPayload {
    pub call_id: Option<String>,
    pub c_id: Option<String>,
    pub to: Option<String>,
    pub from_number: Option<String>,
    /// Minutes
    #[serde(default, deserialize_with = "lenient_number")]
    pub call_length: Option<f64>,
    /// Seconds, sent as a string or a number
    pub corrected_duration: Option<Value>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub completed: Option<bool>,
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub started_at: Option<String>,
    pub end_at: Option<String>,
    pub recording_url: Option<String>,
    pub transcripts: Option<Vec<BlandTranscriptEntry>>,
    pub concatenated_transcript: Option<String>,
    pub variables: Option<Map<String, Value>>,
    pub analysis: Option<Map<String, Value>>,
    pub transferred_to: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn number_like(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Number or numeric string; anything else reads as absent
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.as_ref().and_then(number_like))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.as_ref().and_then(bool_like))
}

/// RFC 3339, or a naive `YYYY-MM-DD HH:MM:SS` taken as UTC
pub(crate) fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_seconds(seconds: f64) -> Option<u64> {
    (seconds.is_finite() && seconds > 0.0).then(|| seconds.round() as u64)
}

/// Split a `speaker: text` transcript dump into entries
fn parse_concatenated(text: &str) -> Vec<TranscriptEntry> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let labelled = line.split_once(':').and_then(|(label, rest)| {
                match label.trim().to_lowercase().as_str() {
                    "agent" | "ai" | "assistant" => Some((Speaker::Ai, rest)),
                    "user" | "caller" | "provider" => Some((Speaker::Provider, rest)),
                    _ => None,
                }
            });
            match labelled {
                Some((speaker, rest)) => TranscriptEntry::new(speaker, rest.trim()),
                None => TranscriptEntry::new(Speaker::Provider, line),
            }
        })
        .collect()
}

impl BlandWebhookPayload {
    pub fn from_slice(body: &[u8]) -> CallRecordResult<Self> {
        serde_json::from_slice(body).map_err(|e| CallRecordError::InvalidPayload(e.to_string()))
    }

    pub fn effective_call_id(&self) -> Option<String> {
        non_blank(self.call_id.clone()).or_else(|| non_blank(self.c_id.clone()))
    }

    /// `corrected_duration` when readable, else `call_length` minutes
    pub fn duration_seconds(&self) -> u64 {
        self.corrected_duration
            .as_ref()
            .and_then(number_like)
            .and_then(whole_seconds)
            .or_else(|| self.call_length.and_then(|minutes| whole_seconds(minutes * 60.0)))
            .unwrap_or(0)
    }

    pub fn is_complete(&self) -> bool {
        self.completed == Some(true) && self.status.as_deref() == Some("completed")
    }

    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        let structured: Vec<TranscriptEntry> = self
            .transcripts
            .iter()
            .flatten()
            .map(|entry| TranscriptEntry {
                speaker: Speaker::from_role(&entry.user),
                text: entry.text.clone(),
                timestamp: entry.created_at.clone(),
            })
            .collect();

        if structured.is_empty() {
            self.concatenated_transcript
                .as_deref()
                .map(parse_concatenated)
                .unwrap_or_default()
        } else {
            structured
        }
    }

    /// Variables minus bookkeeping keys and nulls
    pub fn cleaned_variables(&self) -> Map<String, Value> {
        self.variables
            .iter()
            .flatten()
            .filter(|(key, value)| !SKIPPED_VARIABLES.contains(&key.as_str()) && !value.is_null())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    fn forced_transfer(&self) -> bool {
        let transferred_to = self
            .transferred_to
            .as_deref()
            .is_some_and(|target| !target.trim().is_empty());
        let flagged = self
            .variables
            .as_ref()
            .and_then(|vars| vars.get("transferred"))
            .and_then(bool_like)
            .unwrap_or(false);
        transferred_to || flagged
    }

    pub fn into_delivery(self, now: DateTime<Utc>) -> CallRecordResult<CallDelivery> {
        let call_id = self
            .effective_call_id()
            .ok_or_else(|| CallRecordError::InvalidPayload("webhook carries no call_id or c_id".to_string()))?;

        let mut facts = ExtractedFacts::from(self.cleaned_variables());
        if let Some(analysis) = &self.analysis {
            facts.fill_missing_from(analysis);
        }

        let started = self.created_at.as_deref().or(self.started_at.as_deref());
        Ok(CallDelivery {
            call_id,
            source: CallSource::Bland,
            complete: self.is_complete(),
            started_at: parse_timestamp(started).unwrap_or(now),
            ended_at: parse_timestamp(self.end_at.as_deref()),
            duration_seconds: self.duration_seconds(),
            transcript: self.transcript(),
            forced_transfer: self.forced_transfer(),
            phone_from: non_blank(self.from_number),
            phone_to: non_blank(self.to),
            recording_url: non_blank(self.recording_url),
            facts,
        })
    }
}
