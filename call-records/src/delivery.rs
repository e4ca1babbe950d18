use chrono::{DateTime, Utc};

use crate::extraction::transcript::{patient_name_from, provider_name_from};
use crate::extraction::{build_tags, classify, Classification};
use crate::facts::ExtractedFacts;
use crate::models::{CallRecord, CallSource, Intent, Outcome, TranscriptEntry};

/// One vendor delivery for a call, decoded into vendor-neutral form
#[derive(Debug, Clone, PartialEq)]
pub struct CallDelivery {
    pub call_id: String,
    pub source: CallSource,
    /// Vendor marked the call finished
    pub complete: bool,
    pub phone_from: Option<String>,
    pub phone_to: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_seconds: u64,
    pub recording_url: Option<String>,
    pub transcript: Vec<TranscriptEntry>,
    pub facts: ExtractedFacts,
    /// Vendor metadata says the call was handed off
    pub forced_transfer: bool,
}

/// Everything derived from a delivery's facts and transcript
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryAnalysis {
    pub intent: Intent,
    pub outcome: Outcome,
    pub transferred: bool,
    pub transfer_reason: Option<String>,
    pub auth_success: Option<bool>,
    pub tags: Vec<String>,
    pub provider_npi: Option<String>,
    pub provider_name: Option<String>,
    pub patient_name: Option<String>,
    pub patient_dob: Option<String>,
}

impl CallDelivery {
    pub fn analyze(&self) -> DeliveryAnalysis {
        let known_provider = self.facts.get_str("provider_name");
        let Classification {
            intent,
            outcome,
            transferred,
            transfer_reason,
            auth_success,
        } = classify(
            &self.transcript,
            &self.facts,
            self.forced_transfer,
            known_provider.as_deref(),
        );

        DeliveryAnalysis {
            intent,
            outcome,
            transferred,
            transfer_reason,
            auth_success,
            tags: build_tags(self.source, intent, outcome, &self.facts),
            provider_npi: self.facts.get_str("npi"),
            provider_name: known_provider.or_else(|| provider_name_from(&self.transcript)),
            patient_name: self
                .facts
                .get_str("patient_name")
                .or_else(|| patient_name_from(&self.transcript)),
            patient_dob: self.facts.get_str("patient_dob"),
        }
    }

    /// A fresh record for a call seen for the first time
    pub fn into_record(self, analysis: DeliveryAnalysis, now: DateTime<Utc>) -> CallRecord {
        CallRecord {
            call_id: self.call_id,
            phone_from: self.phone_from,
            phone_to: self.phone_to,
            started_at: self.started_at,
            ended_at: self.ended_at,
            duration_seconds: self.duration_seconds,
            intent: Some(analysis.intent),
            outcome: analysis.outcome,
            provider_npi: analysis.provider_npi,
            provider_name: analysis.provider_name,
            patient_name: analysis.patient_name,
            patient_dob: analysis.patient_dob,
            transcript: self.transcript,
            recording_url: self.recording_url,
            tags: analysis.tags,
            flagged: false,
            transferred: analysis.transferred,
            transfer_reason: analysis.transfer_reason,
            source: self.source,
            auth_success: analysis.auth_success,
            extracted_data: self.facts.into_map(),
            complete: self.complete,
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Non-empty trimmed text, for optional vendor strings
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
