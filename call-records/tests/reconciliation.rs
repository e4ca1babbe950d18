use call_records::{
    BlandWebhookPayload, CallIngestService, Intent, Outcome, PostCallWebhook, ReconcileOutcome, RetryPolicy,
    SaveConversationRequest, SaveOutcome,
};
use serde_json::{json, Value};

fn service() -> CallIngestService {
    CallIngestService::in_memory(None, RetryPolicy::default())
}

fn transcript(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            let (user, text) = match i {
                0 => ("assistant", "Provider services, how can I help you today?".to_string()),
                1 => ("user", "I need to check the status of a claim.".to_string()),
                _ if i % 2 == 0 => ("assistant", format!("Agent line {i}")),
                _ => ("user", format!("Caller line {i}")),
            };
            json!({"user": user, "text": text, "created_at": "2025-11-14T10:00:00Z"})
        })
        .collect()
}

fn webhook(entries: usize, complete: bool) -> BlandWebhookPayload {
    serde_json::from_value(json!({
        "call_id": "bland-call-77",
        "from_number": "+13105550100",
        "to": "+18005550123",
        "completed": complete,
        "status": if complete { "completed" } else { "in-progress" },
        "call_length": 2.5,
        "created_at": "2025-11-14T10:00:00Z",
        "end_at": "2025-11-14T10:02:30Z",
        "recording_url": "https://recordings.example/bland-call-77.mp3",
        "transcripts": transcript(entries),
        "variables": {
            "call_intent": "claim status",
            "npi": "1234567890",
            "provider_name": "Dr. Sarah Chen",
            "found": "true",
            "claim_status": "paid",
            "claim_number": "CLM-00482100",
            "now": "2025-11-14"
        }
    }))
    .unwrap()
}

#[tokio::test]
async fn same_complete_webhook_twice_keeps_one_record() {
    let service = service();

    let (first, inserted) = service.ingest_bland(webhook(10, true)).await.unwrap();
    assert_eq!(first, ReconcileOutcome::Inserted);

    let (_, again) = service.ingest_bland(webhook(10, true)).await.unwrap();
    assert_eq!(service.count().await.unwrap(), 1);
    assert_eq!(again.transcript.len(), inserted.transcript.len());
    assert_eq!(again.intent, inserted.intent);
    assert_eq!(again.outcome, inserted.outcome);
    assert_eq!(again.tags, inserted.tags);
    assert_eq!(again.extracted_data, inserted.extracted_data);
}

#[tokio::test]
async fn incomplete_retry_never_shrinks_a_complete_record() {
    let service = service();
    service.ingest_bland(webhook(10, true)).await.unwrap();

    let (outcome, _) = service.ingest_bland(webhook(2, false)).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::SkippedIncomplete);

    let stored = service.get("bland-call-77").await.unwrap().unwrap();
    assert_eq!(stored.transcript.len(), 10);
    assert_eq!(stored.intent, Some(Intent::Claims));
    assert_eq!(stored.outcome, Outcome::Resolved);
    assert!(stored.complete);
    assert_eq!(stored.duration_seconds, 150);
    assert_eq!(stored.tags, vec!["claims", "auto-resolved", "claim-paid"]);
    assert_eq!(stored.auth_success, None);
    assert_eq!(stored.provider_npi.as_deref(), Some("1234567890"));
}

#[tokio::test]
async fn partial_delivery_is_upgraded_by_completion() {
    let service = service();
    let mut partial = webhook(0, false);
    partial.recording_url = None;
    service.ingest_bland(partial).await.unwrap();

    let (outcome, record) = service.ingest_bland(webhook(6, true)).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::Merged);
    assert!(record.complete);
    assert_eq!(record.transcript.len(), 6);
    assert_eq!(
        record.recording_url.as_deref(),
        Some("https://recordings.example/bland-call-77.mp3")
    );
}

#[tokio::test]
async fn vendor_b_webhook_then_flag() {
    let service = service();
    let webhook: PostCallWebhook = serde_json::from_value(json!({
        "type": "post_call_transcription",
        "data": {
            "conversation_id": "conv_5",
            "status": "done",
            "transcript": [
                {"role": "agent", "message": "Thank you. Let me connect you with a team member."},
                {"role": "user", "message": "I need to submit an appeal."}
            ],
            "metadata": {"start_time_unix_secs": 1763114400, "call_duration_secs": 40},
            "analysis": {"call_successful": "success", "data_collection_results": {}}
        }
    }))
    .unwrap();

    let (outcome, record) = service.ingest_elevenlabs_webhook(webhook).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::Inserted);
    assert_eq!(record.call_id, "el_conv_5");
    assert!(record.transferred);
    assert_eq!(record.transfer_reason.as_deref(), Some("Out-of-scope request"));
    assert_eq!(record.tags, vec!["elevenlabs", "general", "transferred"]);

    let flagged = service.set_flagged("el_conv_5", true).await.unwrap().unwrap();
    assert!(flagged.flagged);
}

#[tokio::test]
async fn extreme_vendor_b_durations_are_still_recorded() {
    let service = service();

    let request: SaveConversationRequest = serde_json::from_value(json!({
        "conversation_id": "conv_marathon",
        "transcript": [{"speaker": "user", "text": "Checking eligibility."}],
        "duration_seconds": 100_000_000_000_000u64
    }))
    .unwrap();
    let (call_id, outcome) = service.save_conversation(request).await.unwrap();
    assert_eq!(outcome, SaveOutcome::Saved);
    let saved = service.get(&call_id).await.unwrap().unwrap();
    assert_eq!(saved.duration_seconds, 100_000_000_000_000);

    let webhook: PostCallWebhook = serde_json::from_value(json!({
        "type": "post_call_transcription",
        "data": {
            "conversation_id": "conv_overflow",
            "status": "done",
            "transcript": [{"role": "user", "message": "Claim status please."}],
            "metadata": {"start_time_unix_secs": 1700000000, "call_duration_secs": 100_000_000_000_000u64}
        }
    }))
    .unwrap();
    let (outcome, record) = service.ingest_elevenlabs_webhook(webhook).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::Inserted);
    assert_eq!(record.started_at.timestamp(), 1_700_000_000);
    assert_eq!(service.count().await.unwrap(), 2);
}

#[tokio::test]
async fn string_typed_vendor_a_scalars_are_accepted() {
    let service = service();
    let payload = BlandWebhookPayload::from_slice(
        br#"{"call_id":"bland-str","completed":"true","status":"completed","call_length":"2.5"}"#,
    )
    .unwrap();

    let (outcome, record) = service.ingest_bland(payload).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::Inserted);
    assert!(record.complete);
    assert_eq!(record.duration_seconds, 150);
}
