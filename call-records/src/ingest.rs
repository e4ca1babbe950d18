use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::conversation_api::{poll_until_terminal, ConversationSource, RetryPolicy};
use crate::delivery::non_blank;
use crate::error::CallRecordResult;
use crate::models::CallRecord;
use crate::payloads::{BlandWebhookPayload, PostCallWebhook, SaveConversationRequest};
use crate::reconciler::{ReconcileOutcome, Reconciler, SaveOutcome};
use crate::repository::{CallRecordRepository, InMemoryCallRecordRepository};

/// Call-record ingestion for both voice-agent vendors
pub struct CallIngestService {
    records: Arc<dyn CallRecordRepository>,
    reconciler: Reconciler,
    conversations: Option<Arc<dyn ConversationSource>>,
    retry: RetryPolicy,
}

impl CallIngestService {
    pub fn new(
        records: Arc<dyn CallRecordRepository>,
        conversations: Option<Arc<dyn ConversationSource>>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            reconciler: Reconciler::new(records.clone()),
            records,
            conversations,
            retry,
        }
    }

    pub fn in_memory(conversations: Option<Arc<dyn ConversationSource>>, retry: RetryPolicy) -> Self {
        Self::new(Arc::new(InMemoryCallRecordRepository::new()), conversations, retry)
    }

    /// Vendor A post-call webhook
    pub async fn ingest_bland(&self, payload: BlandWebhookPayload) -> CallRecordResult<(ReconcileOutcome, CallRecord)> {
        debug!(
            call_id = ?payload.effective_call_id(),
            status = ?payload.status,
            completed = ?payload.completed,
            transcripts = payload.transcripts.as_ref().map_or(0, Vec::len),
            variables = payload.variables.as_ref().map_or(0, |vars| vars.len()),
            "vendor A webhook received"
        );
        let delivery = payload.into_delivery(Utc::now())?;
        self.reconciler.apply(delivery).await
    }

    /// Vendor B post-call webhook
    pub async fn ingest_elevenlabs_webhook(
        &self,
        webhook: PostCallWebhook,
    ) -> CallRecordResult<(ReconcileOutcome, CallRecord)> {
        debug!(
            event_type = %webhook.event_type,
            status = ?webhook.data.status,
            "vendor B webhook received"
        );
        let delivery = webhook.into_delivery(Utc::now())?;
        self.reconciler.apply(delivery).await
    }

    /// Save a browser conversation once; repeated saves are no-ops.
    ///
    /// The vendor API is only polled for a conversation not yet stored.
    pub async fn save_conversation(&self, request: SaveConversationRequest) -> CallRecordResult<(String, SaveOutcome)> {
        let call_id = request.derive_call_id();
        if self.records.find(&call_id).await?.is_some() {
            info!(call_id = %call_id, "conversation already saved, skipping");
            return Ok((call_id, SaveOutcome::AlreadyExists));
        }

        let fetched = match (non_blank(request.conversation_id.clone()), &self.conversations) {
            (Some(conversation_id), Some(source)) => {
                poll_until_terminal(source.as_ref(), &conversation_id, &self.retry).await
            }
            _ => None,
        };
        debug!(call_id = %call_id, fetched = fetched.is_some(), "conversation detail lookup");

        let delivery = request.into_delivery(call_id.clone(), fetched.as_ref(), Utc::now());
        let outcome = self.reconciler.save_once(delivery).await?;
        Ok((call_id, outcome))
    }

    pub async fn get(&self, call_id: &str) -> CallRecordResult<Option<CallRecord>> {
        self.records.find(call_id).await
    }

    pub async fn set_flagged(&self, call_id: &str, flagged: bool) -> CallRecordResult<Option<CallRecord>> {
        let updated = self.records.set_flagged(call_id, flagged).await?;
        if updated.is_some() {
            info!(call_id = %call_id, flagged, "call flag updated");
        }
        Ok(updated)
    }

    pub async fn count(&self) -> CallRecordResult<usize> {
        self.records.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation_api::MockConversationSource;
    use crate::payloads::{ConversationDetail, PostedTranscriptEntry};
    use std::time::Duration;

    fn no_wait() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    fn request(conversation_id: &str) -> SaveConversationRequest {
        SaveConversationRequest {
            conversation_id: Some(conversation_id.to_string()),
            transcript: vec![PostedTranscriptEntry {
                speaker: "user".to_string(),
                text: "I have a question about a claim.".to_string(),
            }],
            duration_seconds: 30,
            tool_calls: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_repeat_save_skips_vendor_fetch() {
        let mut source = MockConversationSource::new();
        source.expect_fetch_conversation().times(1).returning(|_| {
            Ok(ConversationDetail {
                status: Some("done".to_string()),
                ..Default::default()
            })
        });
        let service = CallIngestService::in_memory(Some(Arc::new(source)), no_wait());

        let (call_id, first) = service.save_conversation(request("conv_9")).await.unwrap();
        assert_eq!(call_id, "el_conv_9");
        assert_eq!(first, SaveOutcome::Saved);

        let (_, second) = service.save_conversation(request("conv_9")).await.unwrap();
        assert_eq!(second, SaveOutcome::AlreadyExists);
        assert_eq!(service.count().await.unwrap(), 1);

        let stored = service.get("el_conv_9").await.unwrap().unwrap();
        assert_eq!(stored.tags, vec!["elevenlabs", "claims", "auto-resolved"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_still_saves_posted_data() {
        let mut source = MockConversationSource::new();
        source
            .expect_fetch_conversation()
            .times(2)
            .returning(|_| Err(crate::error::CallRecordError::ConversationApi("status 500".to_string())));
        let service = CallIngestService::in_memory(Some(Arc::new(source)), no_wait());

        let (_, outcome) = service.save_conversation(request("conv_10")).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Saved);
        assert_eq!(service.get("el_conv_10").await.unwrap().unwrap().transcript.len(), 1);
    }

    #[tokio::test]
    async fn test_flagging_unknown_call() {
        let service = CallIngestService::in_memory(None, RetryPolicy::default());
        assert!(service.set_flagged("nope", true).await.unwrap().is_none());
    }
}
