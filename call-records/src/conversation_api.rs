use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{CallRecordError, CallRecordResult};
use crate::payloads::ConversationDetail;

pub const DEFAULT_CONVERSATION_API_URL: &str = "https://api.elevenlabs.io";

#[derive(Debug, Clone)]
pub struct ConversationApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl Default for ConversationApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CONVERSATION_API_URL.to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Bounded polling with linearly growing delays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(8000),
        }
    }
}

impl RetryPolicy {
    /// Delay after the given 1-based attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .checked_mul(attempt.max(1))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

/// Source of vendor conversation detail
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationSource: Send + Sync {
    async fn fetch_conversation(&self, conversation_id: &str) -> CallRecordResult<ConversationDetail>;
}

/// Conversation-detail client for the voice-agent vendor API
pub struct ElevenLabsClient {
    client: Client,
    config: ConversationApiConfig,
}

impl ElevenLabsClient {
    pub fn new(config: ConversationApiConfig) -> CallRecordResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(CallRecordError::Config("conversation API key is empty".to_string()));
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn conversation_url(&self, conversation_id: &str) -> String {
        format!(
            "{}/v1/convai/conversations/{}",
            self.config.base_url.trim_end_matches('/'),
            conversation_id
        )
    }
}

#[async_trait]
impl ConversationSource for ElevenLabsClient {
    async fn fetch_conversation(&self, conversation_id: &str) -> CallRecordResult<ConversationDetail> {
        let response = self
            .client
            .get(self.conversation_url(conversation_id))
            .header("xi-api-key", &self.config.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CallRecordError::ConversationApi(format!(
                "conversation fetch returned status {}",
                response.status()
            )));
        }

        Ok(response.json::<ConversationDetail>().await?)
    }
}

/// Fetch until the conversation reaches a terminal status.
///
/// Returns the last successful response when attempts run out, and `None`
/// only if no attempt succeeded.
pub async fn poll_until_terminal(
    source: &dyn ConversationSource,
    conversation_id: &str,
    policy: &RetryPolicy,
) -> Option<ConversationDetail> {
    let mut last = None;

    for attempt in 1..=policy.max_attempts {
        match source.fetch_conversation(conversation_id).await {
            Ok(detail) if detail.is_terminal() => {
                debug!(conversation_id, attempt, "conversation detail ready");
                return Some(detail);
            }
            Ok(detail) => {
                debug!(conversation_id, attempt, status = ?detail.status, "conversation still processing");
                last = Some(detail);
            }
            Err(e) => warn!(conversation_id, attempt, error = %e, "conversation fetch failed"),
        }

        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.delay_for(attempt)).await;
        }
    }

    if last.is_some() {
        warn!(conversation_id, "conversation not terminal after retries, using last response");
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::Sequence;

    fn no_wait(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    fn with_status(status: &str) -> ConversationDetail {
        ConversationDetail {
            conversation_id: Some("conv_1".to_string()),
            status: Some(status.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_delay_grows_linearly_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(3000));
        assert_eq!(policy.delay_for(20), Duration::from_millis(8000));
    }

    #[test]
    fn test_client_requires_api_key() {
        assert!(matches!(
            ElevenLabsClient::new(ConversationApiConfig::default()),
            Err(CallRecordError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_returns_on_terminal_status() {
        let mut source = MockConversationSource::new();
        let mut seq = Sequence::new();
        source
            .expect_fetch_conversation()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(with_status("processing")));
        source
            .expect_fetch_conversation()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(with_status("done")));

        let detail = poll_until_terminal(&source, "conv_1", &no_wait(5)).await.unwrap();
        assert_eq!(detail.status.as_deref(), Some("done"));
    }

    #[tokio::test]
    async fn test_best_effort_after_retries() {
        let mut source = MockConversationSource::new();
        let mut seq = Sequence::new();
        source
            .expect_fetch_conversation()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(with_status("processing")));
        source
            .expect_fetch_conversation()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Err(CallRecordError::ConversationApi("status 503".to_string())));

        let detail = poll_until_terminal(&source, "conv_1", &no_wait(3)).await;
        assert_eq!(detail.and_then(|d| d.status).as_deref(), Some("processing"));
    }

    #[tokio::test]
    async fn test_no_success_yields_none() {
        let mut source = MockConversationSource::new();
        source
            .expect_fetch_conversation()
            .times(2)
            .returning(|_| Err(CallRecordError::ConversationApi("status 404".to_string())));
        assert!(poll_until_terminal(&source, "conv_1", &no_wait(2)).await.is_none());
    }
}
