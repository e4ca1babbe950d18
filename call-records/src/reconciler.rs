use chrono::{DateTime, Utc};
use logger_redacted::redact;
use std::sync::Arc;
use tracing::{info, warn};

use crate::delivery::{CallDelivery, DeliveryAnalysis};
use crate::error::{CallRecordError, CallRecordResult};
use crate::models::CallRecord;
use crate::repository::CallRecordRepository;

/// Fact maps at or below this size are too thin to replace stored facts
pub const TRIVIAL_FACT_COUNT: usize = 5;

const MAX_WRITE_ATTEMPTS: u32 = 5;

/// What happened to a delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// First delivery for this call
    Inserted,
    Merged,
    /// Incomplete retry for a record that already has a transcript
    SkippedIncomplete,
    /// Nothing in the delivery beat the stored record
    Unchanged,
}

impl ReconcileOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            ReconcileOutcome::Inserted => "inserted",
            ReconcileOutcome::Merged => "merged",
            ReconcileOutcome::SkippedIncomplete => "skipped_incomplete",
            ReconcileOutcome::Unchanged => "unchanged",
        }
    }
}

/// Result of the idempotent conversation save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    AlreadyExists,
}

impl SaveOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            SaveOutcome::Saved => "saved",
            SaveOutcome::AlreadyExists => "already_exists",
        }
    }
}

/// Whether `delivery` should overwrite content of `existing`
fn is_better(existing: &CallRecord, delivery: &CallDelivery) -> bool {
    delivery.transcript.len() > existing.transcript.len()
        || (existing.transcript.is_empty() && delivery.complete)
        || delivery.complete
}

/// Merge a newer delivery into a stored record.
///
/// Returns `None` when the stored record must be left as it is. Known identity
/// fields are never cleared, the transcript never shrinks, and the operator
/// flag is never touched.
pub fn merge_delivery(
    existing: &CallRecord,
    delivery: &CallDelivery,
    analysis: &DeliveryAnalysis,
    now: DateTime<Utc>,
) -> Option<CallRecord> {
    if !existing.transcript.is_empty() && !delivery.complete {
        return None;
    }
    if !is_better(existing, delivery) {
        return None;
    }

    let mut merged = existing.clone();

    if !delivery.transcript.is_empty() && delivery.transcript.len() >= existing.transcript.len() {
        merged.transcript = delivery.transcript.clone();
    }
    if delivery.recording_url.is_some() {
        merged.recording_url = delivery.recording_url.clone();
    }
    if delivery.duration_seconds > 0 {
        merged.duration_seconds = delivery.duration_seconds;
    }

    merged.intent = Some(analysis.intent);
    merged.outcome = analysis.outcome;
    merged.tags = analysis.tags.clone();
    merged.transferred = analysis.transferred;
    merged.transfer_reason = analysis.transfer_reason.clone();
    merged.auth_success = analysis.auth_success;

    if delivery.facts.len() > TRIVIAL_FACT_COUNT {
        merged.extracted_data = delivery.facts.as_map().clone();
    }

    fill(&mut merged.provider_npi, &analysis.provider_npi);
    fill(&mut merged.provider_name, &analysis.provider_name);
    fill(&mut merged.patient_name, &analysis.patient_name);
    fill(&mut merged.patient_dob, &analysis.patient_dob);
    fill(&mut merged.phone_from, &delivery.phone_from);
    fill(&mut merged.phone_to, &delivery.phone_to);
    if delivery.ended_at.is_some() {
        merged.ended_at = delivery.ended_at;
    }

    merged.complete = existing.complete || delivery.complete;
    merged.updated_at = now;
    Some(merged)
}

fn fill(slot: &mut Option<String>, value: &Option<String>) {
    if value.is_some() {
        slot.clone_from(value);
    }
}

/// Applies vendor deliveries to the call-record store.
///
/// Concurrent deliveries for the same call are serialised through the
/// store's revision check; a lost race re-reads and re-merges.
pub struct Reconciler {
    records: Arc<dyn CallRecordRepository>,
}

impl Reconciler {
    pub fn new(records: Arc<dyn CallRecordRepository>) -> Self {
        Self { records }
    }

    pub async fn apply(&self, delivery: CallDelivery) -> CallRecordResult<(ReconcileOutcome, CallRecord)> {
        let analysis = delivery.analyze();

        for _ in 0..MAX_WRITE_ATTEMPTS {
            let now = Utc::now();
            let Some(existing) = self.records.find(&delivery.call_id).await? else {
                let record = delivery.clone().into_record(analysis.clone(), now);
                if self.records.insert_if_absent(record.clone()).await? {
                    info!(
                        call_id = %delivery.call_id,
                        intent = %analysis.intent,
                        outcome = %analysis.outcome,
                        transcript_entries = delivery.transcript.len(),
                        "call record created"
                    );
                    return Ok((ReconcileOutcome::Inserted, record));
                }
                continue;
            };

            if !existing.transcript.is_empty() && !delivery.complete {
                info!(
                    call_id = %delivery.call_id,
                    existing_entries = existing.transcript.len(),
                    "skipping incomplete delivery for a record with content"
                );
                return Ok((ReconcileOutcome::SkippedIncomplete, existing));
            }

            let Some(merged) = merge_delivery(&existing, &delivery, &analysis, now) else {
                return Ok((ReconcileOutcome::Unchanged, existing));
            };
            if self.records.replace_if_revision(merged.clone(), existing.revision).await? {
                info!(
                    call_id = %delivery.call_id,
                    complete = merged.complete,
                    transcript_entries = merged.transcript.len(),
                    provider = %redact(merged.provider_name.as_deref().unwrap_or("")),
                    "call record merged"
                );
                return Ok((ReconcileOutcome::Merged, merged));
            }
            warn!(call_id = %delivery.call_id, "concurrent update, retrying merge");
        }

        Err(CallRecordError::Conflict(delivery.call_id))
    }

    /// Idempotent insert keyed on the derived call id
    pub async fn save_once(&self, delivery: CallDelivery) -> CallRecordResult<SaveOutcome> {
        let analysis = delivery.analyze();
        let call_id = delivery.call_id.clone();
        let record = delivery.into_record(analysis, Utc::now());
        if self.records.insert_if_absent(record).await? {
            info!(call_id = %call_id, "conversation saved");
            Ok(SaveOutcome::Saved)
        } else {
            info!(call_id = %call_id, "conversation already saved");
            Ok(SaveOutcome::AlreadyExists)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::ExtractedFacts;
    use crate::models::{CallSource, Intent, Outcome, Speaker, TranscriptEntry};
    use crate::repository::InMemoryCallRecordRepository;
    use serde_json::json;

    fn lines(count: usize) -> Vec<TranscriptEntry> {
        (0..count)
            .map(|i| {
                let speaker = if i % 2 == 0 { Speaker::Ai } else { Speaker::Provider };
                TranscriptEntry::new(speaker, format!("line {i}"))
            })
            .collect()
    }

    fn delivery(transcript: Vec<TranscriptEntry>, complete: bool) -> CallDelivery {
        CallDelivery {
            call_id: "call-1".to_string(),
            source: CallSource::Bland,
            complete,
            phone_from: None,
            phone_to: None,
            started_at: Utc::now(),
            ended_at: None,
            duration_seconds: 0,
            recording_url: None,
            transcript,
            facts: ExtractedFacts::new(),
            forced_transfer: false,
        }
    }

    fn reconciler() -> (Reconciler, Arc<InMemoryCallRecordRepository>) {
        let repo = Arc::new(InMemoryCallRecordRepository::new());
        (Reconciler::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn test_partial_then_complete() {
        let (reconciler, repo) = reconciler();

        let (first, _) = reconciler.apply(delivery(Vec::new(), false)).await.unwrap();
        assert_eq!(first, ReconcileOutcome::Inserted);

        let mut complete = delivery(lines(4), true);
        complete.recording_url = Some("https://recordings.example/call-1.mp3".to_string());
        complete.duration_seconds = 120;
        let (second, merged) = reconciler.apply(complete).await.unwrap();
        assert_eq!(second, ReconcileOutcome::Merged);
        assert!(merged.complete);
        assert_eq!(merged.transcript.len(), 4);
        assert_eq!(merged.duration_seconds, 120);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_incomplete_retry_is_discarded() {
        let (reconciler, repo) = reconciler();
        reconciler.apply(delivery(lines(3), false)).await.unwrap();

        let (outcome, _) = reconciler.apply(delivery(lines(6), false)).await.unwrap();
        assert_eq!(outcome, ReconcileOutcome::SkippedIncomplete);
        assert_eq!(repo.find("call-1").await.unwrap().unwrap().transcript.len(), 3);
    }

    #[tokio::test]
    async fn test_known_fields_survive_thin_delivery() {
        let (reconciler, _) = reconciler();

        let mut rich = delivery(lines(4), true);
        rich.recording_url = Some("https://recordings.example/a.mp3".to_string());
        for (key, value) in [
            ("call_intent", json!("eligibility")),
            ("found", json!(true)),
            ("npi", json!("1234567890")),
            ("provider_name", json!("Dr. Sarah Chen")),
            ("patient_name", json!("John Smith")),
            ("member_id", json!("MBR-001234")),
            ("plan_name", json!("Reflect Gold PPO")),
        ] {
            rich.facts.set_default(key, value);
        }
        reconciler.apply(rich).await.unwrap();

        let mut thin = delivery(Vec::new(), true);
        thin.facts.set_default("found", json!(false));
        let (outcome, merged) = reconciler.apply(thin).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::Merged);
        assert_eq!(merged.transcript.len(), 4);
        assert_eq!(merged.recording_url.as_deref(), Some("https://recordings.example/a.mp3"));
        assert_eq!(merged.provider_name.as_deref(), Some("Dr. Sarah Chen"));
        assert_eq!(merged.patient_name.as_deref(), Some("John Smith"));
        // Two keys are too few to replace seven
        assert_eq!(merged.extracted_data.len(), 7);
        // Classification always follows the newest delivery
        assert_eq!(merged.outcome, Outcome::NotFound);
        assert_eq!(merged.intent, Some(Intent::General));
    }

    #[tokio::test]
    async fn test_operator_flag_is_kept() {
        let (reconciler, repo) = reconciler();
        reconciler.apply(delivery(Vec::new(), false)).await.unwrap();
        repo.set_flagged("call-1", true).await.unwrap();

        let (_, merged) = reconciler.apply(delivery(lines(2), true)).await.unwrap();
        assert!(merged.flagged);
    }

    #[tokio::test]
    async fn test_save_once_is_idempotent() {
        let (reconciler, repo) = reconciler();
        assert_eq!(reconciler.save_once(delivery(lines(2), true)).await.unwrap(), SaveOutcome::Saved);
        assert_eq!(
            reconciler.save_once(delivery(lines(5), true)).await.unwrap(),
            SaveOutcome::AlreadyExists
        );
        assert_eq!(repo.find("call-1").await.unwrap().unwrap().transcript.len(), 2);
    }
}
