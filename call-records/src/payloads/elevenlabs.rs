use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::delivery::{non_blank, CallDelivery};
use crate::error::{CallRecordError, CallRecordResult};
use crate::extraction::{extract_tool_facts, RawToolCall, RawToolResult, ToolCallPairer, ToolInvocation};
use crate::facts::ExtractedFacts;
use crate::models::{CallSource, Speaker, TranscriptEntry};

pub const CALL_ID_PREFIX: &str = "el_";
pub const BROWSER_CALLER: &str = "in-browser";
pub const AGENT_ENDPOINT: &str = "ElevenLabs Agent";
/// Longest span used when deriving call start and end times
pub const MAX_TIMED_DURATION_SECS: u64 = 86_400;

/// Canonical call id for a vendor conversation
pub fn call_id_for(conversation_id: &str) -> String {
    format!("{CALL_ID_PREFIX}{}", conversation_id.trim())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PostedTranscriptEntry {
    pub speaker: String,
    #[serde(default)]
    pub text: String,
}

/// Conversation posted by the browser client once a session ends
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SaveConversationRequest {
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub transcript: Vec<PostedTranscriptEntry>,
    #[serde(default)]
    pub duration_seconds: u64,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub tool_calls: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationMetadata {
    #[serde(default)]
    pub start_time_unix_secs: Option<i64>,
    #[serde(default)]
    pub call_duration_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationAnalysis {
    #[serde(default)]
    pub call_successful: Option<String>,
    #[serde(default)]
    pub data_collection_results: Map<String, Value>,
}

/// Raw transcript entry: speech, or a tool call/result carrier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTranscriptEntry {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<RawToolCall>,
    #[serde(default)]
    pub tool_results: Vec<RawToolResult>,
}

/// Conversation detail as returned by the vendor API and post-call webhook
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationDetail {
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub transcript: Vec<RawTranscriptEntry>,
    #[serde(default)]
    pub metadata: ConversationMetadata,
    #[serde(default)]
    pub analysis: ConversationAnalysis,
}

impl ConversationDetail {
    /// Processing has finished, successfully or not
    pub fn is_terminal(&self) -> bool {
        matches!(self.status.as_deref(), Some("done" | "failed"))
    }

    /// Spoken lines only; tool carriers without a message are dropped
    pub fn spoken_transcript(&self) -> Vec<TranscriptEntry> {
        self.transcript
            .iter()
            .filter(|entry| entry.role != "tool_call" && entry.role != "tool_result")
            .filter_map(|entry| {
                non_blank(entry.message.clone())
                    .map(|text| TranscriptEntry::new(Speaker::from_role(&entry.role), text))
            })
            .collect()
    }

    /// Tool calls paired with their results by call id
    pub fn tool_invocations(&self) -> Vec<ToolInvocation> {
        let mut pairer = ToolCallPairer::new();
        for entry in &self.transcript {
            for call in &entry.tool_calls {
                pairer.on_call(call);
            }
            for result in &entry.tool_results {
                pairer.on_result(result);
            }
        }
        pairer.finish()
    }

    /// Analysis values, only where tool data left a gap
    pub fn fill_from_analysis(&self, facts: &mut ExtractedFacts) {
        if let Some(successful) = non_blank(self.analysis.call_successful.clone()) {
            facts.set_default("call_successful", Value::String(successful));
        }
        for (key, result) in &self.analysis.data_collection_results {
            let value = match result {
                Value::Object(fields) => fields.get("value").cloned().unwrap_or(Value::Null),
                other => other.clone(),
            };
            facts.set_default(key, value);
        }
    }

    fn facts(&self) -> ExtractedFacts {
        let mut facts = ExtractedFacts::new();
        extract_tool_facts(&self.tool_invocations(), &mut facts);
        self.fill_from_analysis(&mut facts);
        facts
    }
}

/// Post-call webhook envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostCallWebhook {
    #[serde(rename = "type", default)]
    pub event_type: String,
    pub data: ConversationDetail,
}

impl PostCallWebhook {
    pub fn from_slice(body: &[u8]) -> CallRecordResult<Self> {
        serde_json::from_slice(body).map_err(|e| CallRecordError::InvalidPayload(e.to_string()))
    }

    pub fn into_delivery(self, now: DateTime<Utc>) -> CallRecordResult<CallDelivery> {
        let detail = self.data;
        let conversation_id = non_blank(detail.conversation_id.clone()).ok_or_else(|| {
            CallRecordError::InvalidPayload("post-call webhook carries no conversation_id".to_string())
        })?;

        let duration_seconds = detail.metadata.call_duration_secs.unwrap_or(0);
        let started_at = detail
            .metadata
            .start_time_unix_secs
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(|| now.checked_sub_signed(seconds(duration_seconds)).unwrap_or(now));

        Ok(CallDelivery {
            call_id: call_id_for(&conversation_id),
            source: CallSource::Elevenlabs,
            complete: detail.status.as_deref() == Some("done"),
            phone_from: Some(BROWSER_CALLER.to_string()),
            phone_to: Some(AGENT_ENDPOINT.to_string()),
            started_at,
            ended_at: started_at.checked_add_signed(seconds(duration_seconds)),
            duration_seconds,
            recording_url: None,
            transcript: detail.spoken_transcript(),
            facts: detail.facts(),
            forced_transfer: false,
        })
    }
}

/// Reported durations are stored as sent; time arithmetic caps them at a day
fn seconds(value: u64) -> Duration {
    let capped = value.min(MAX_TIMED_DURATION_SECS);
    Duration::seconds(i64::try_from(capped).unwrap_or_default())
}

impl SaveConversationRequest {
    /// Vendor-prefixed id, random when the client sent no conversation id
    pub fn derive_call_id(&self) -> String {
        match non_blank(self.conversation_id.clone()) {
            Some(id) => call_id_for(&id),
            None => {
                let random = Uuid::new_v4().simple().to_string();
                format!("{CALL_ID_PREFIX}{}", random.chars().take(12).collect::<String>())
            }
        }
    }

    pub fn posted_transcript(&self) -> Vec<TranscriptEntry> {
        self.transcript
            .iter()
            .map(|entry| TranscriptEntry::new(Speaker::from_role(&entry.speaker), entry.text.clone()))
            .collect()
    }

    /// Build the delivery for `call_id`, using fetched conversation detail
    /// when the vendor API supplied it
    pub fn into_delivery(
        self,
        call_id: String,
        fetched: Option<&ConversationDetail>,
        now: DateTime<Utc>,
    ) -> CallDelivery {
        let mut transcript = self.posted_transcript();
        let mut invocations: Vec<ToolInvocation> = self.tool_calls.iter().map(ToolInvocation::from_inline).collect();

        if let Some(detail) = fetched {
            let spoken = detail.spoken_transcript();
            if spoken.len() > transcript.len() {
                transcript = spoken;
            }
            invocations.extend(detail.tool_invocations());
        }

        let mut facts = ExtractedFacts::new();
        extract_tool_facts(&invocations, &mut facts);
        if let Some(detail) = fetched {
            detail.fill_from_analysis(&mut facts);
        }

        CallDelivery {
            call_id,
            source: CallSource::Elevenlabs,
            complete: true,
            phone_from: Some(BROWSER_CALLER.to_string()),
            phone_to: Some(AGENT_ENDPOINT.to_string()),
            started_at: now.checked_sub_signed(seconds(self.duration_seconds)).unwrap_or(now),
            ended_at: Some(now),
            duration_seconds: self.duration_seconds,
            recording_url: None,
            transcript,
            facts,
            forced_transfer: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn detail() -> ConversationDetail {
        serde_json::from_value(json!({
            "conversation_id": "conv_42",
            "status": "done",
            "transcript": [
                {"role": "agent", "message": "Provider services, what is your NPI?"},
                {"role": "user", "message": "1234567890"},
                {"role": "agent", "message": null, "tool_calls": [
                    {"request_id": "t1", "tool_name": "authenticate_npi", "params_as_json": "{\"npi\":\"1234567890\"}"}
                ]},
                {"role": "tool_result", "tool_results": [
                    {"request_id": "t1", "tool_name": "authenticate_npi", "result_value": "{\"valid\":true,\"provider_name\":\"Dr. Sarah Chen\"}"}
                ]},
                {"role": "agent", "message": "Thank you, Dr. Sarah Chen."}
            ],
            "metadata": {"start_time_unix_secs": 1763114400, "call_duration_secs": 75},
            "analysis": {
                "call_successful": "success",
                "data_collection_results": {
                    "provider_name": {"value": "Someone Else"},
                    "patient_name": {"value": "Maria Garcia", "rationale": "stated"}
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_terminal_statuses() {
        let mut d = detail();
        assert!(d.is_terminal());
        d.status = Some("processing".to_string());
        assert!(!d.is_terminal());
        d.status = Some("failed".to_string());
        assert!(d.is_terminal());
    }

    #[test]
    fn test_webhook_delivery() {
        let webhook = PostCallWebhook {
            event_type: "post_call_transcription".to_string(),
            data: detail(),
        };
        let delivery = webhook.into_delivery(Utc::now()).unwrap();

        assert_eq!(delivery.call_id, "el_conv_42");
        assert!(delivery.complete);
        assert_eq!(delivery.duration_seconds, 75);
        assert_eq!(delivery.started_at.timestamp(), 1_763_114_400);
        assert_eq!(delivery.transcript.len(), 3);
        assert_eq!(delivery.transcript[1].speaker, Speaker::Provider);
        // Tool data wins over analysis; analysis fills the gaps
        assert_eq!(delivery.facts.get_str("provider_name").as_deref(), Some("Dr. Sarah Chen"));
        assert_eq!(delivery.facts.get_str("patient_name").as_deref(), Some("Maria Garcia"));
        assert_eq!(delivery.facts.get_str("call_successful").as_deref(), Some("success"));
    }

    #[test]
    fn test_webhook_without_conversation_id() {
        let webhook = PostCallWebhook::from_slice(br#"{"type":"post_call_transcription","data":{"status":"done"}}"#).unwrap();
        assert!(matches!(
            webhook.into_delivery(Utc::now()),
            Err(CallRecordError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_call_id_derivation() {
        let named = SaveConversationRequest {
            conversation_id: Some("abc".to_string()),
            ..Default::default()
        };
        assert_eq!(named.derive_call_id(), "el_abc");

        let anonymous = SaveConversationRequest::default().derive_call_id();
        assert!(anonymous.starts_with("el_"));
        assert_eq!(anonymous.len(), 15);
    }

    #[test]
    fn test_longer_fetched_transcript_replaces_posted() {
        let request = SaveConversationRequest {
            conversation_id: Some("conv_42".to_string()),
            transcript: vec![PostedTranscriptEntry {
                speaker: "agent".to_string(),
                text: "Hello".to_string(),
            }],
            duration_seconds: 60,
            tool_calls: vec![json!({"tool_name": "check_eligibility", "result": {"found": true}})],
        };
        let now = Utc::now();
        let fetched = detail();
        let delivery = request.into_delivery("el_conv_42".to_string(), Some(&fetched), now);

        assert_eq!(delivery.transcript.len(), 3);
        assert_eq!(delivery.started_at, now - Duration::seconds(60));
        assert_eq!(delivery.facts.get_str("call_intent").as_deref(), Some("eligibility"));
        assert_eq!(delivery.facts.get_bool_like("valid"), Some(true));
    }

    #[test]
    fn test_oversized_durations_still_produce_deliveries() {
        let now = Utc::now();
        let request = SaveConversationRequest {
            conversation_id: Some("conv_long".to_string()),
            duration_seconds: 100_000_000_000_000,
            ..Default::default()
        };
        let saved = request.into_delivery("el_conv_long".to_string(), None, now);
        assert_eq!(saved.duration_seconds, 100_000_000_000_000);
        assert_eq!(saved.started_at, now - Duration::days(1));
        assert_eq!(saved.ended_at, Some(now));

        let mut dated = detail();
        dated.metadata.call_duration_secs = Some(100_000_000_000_000);
        let webhook = PostCallWebhook {
            event_type: "post_call_transcription".to_string(),
            data: dated,
        };
        let delivered = webhook.into_delivery(now).unwrap();
        assert_eq!(delivered.started_at.timestamp(), 1_763_114_400);
        assert_eq!(delivered.ended_at.map(|t| t.timestamp()), Some(1_763_114_400 + 86_400));

        let mut undated = detail();
        undated.metadata = ConversationMetadata {
            start_time_unix_secs: None,
            call_duration_secs: Some(u64::MAX),
        };
        let delivered = PostCallWebhook {
            event_type: String::new(),
            data: undated,
        }
        .into_delivery(now)
        .unwrap();
        assert_eq!(delivered.started_at, now - Duration::days(1));
        assert_eq!(delivered.ended_at, Some(now));
    }

    #[test]
    fn test_posted_only() {
        let request = SaveConversationRequest {
            transcript: vec![
                PostedTranscriptEntry { speaker: "agent".to_string(), text: "Hi".to_string() },
                PostedTranscriptEntry { speaker: "user".to_string(), text: "Claim status please".to_string() },
            ],
            ..Default::default()
        };
        let delivery = request.into_delivery("el_x".to_string(), None, Utc::now());
        assert_eq!(delivery.transcript[0].speaker, Speaker::Ai);
        assert_eq!(delivery.transcript[1].speaker, Speaker::Provider);
        assert!(delivery.facts.is_empty());
    }
}
