use call_records::{CallIngestService, ConversationSource, ElevenLabsClient};
use error_common::{EngineError, Result};
use insurance_service::{CmsRegistryClient, InsuranceService, ProviderRegistry, SeedData};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::signature::WebhookVerifier;

/// Shared handler state
#[derive(Clone)]
pub struct VoiceOpsServer {
    pub config: Arc<AppConfig>,
    pub insurance: Arc<InsuranceService>,
    pub calls: Arc<CallIngestService>,
    pub webhooks: Arc<WebhookVerifier>,
    pub started_at: Instant,
}

impl VoiceOpsServer {
    /// Wire the in-memory stores and external clients described by `config`
    pub async fn new(config: AppConfig) -> Result<Self> {
        let registry: Arc<dyn ProviderRegistry> = Arc::new(
            CmsRegistryClient::new(config.registry.clone())
                .map_err(|e| EngineError::ConfigError(format!("registry client: {e}")))?,
        );

        let conversations: Option<Arc<dyn ConversationSource>> = match config.conversation_api.clone() {
            Some(api) => Some(Arc::new(
                ElevenLabsClient::new(api).map_err(|e| EngineError::ConfigError(format!("conversation client: {e}")))?,
            )),
            None => {
                warn!("ELEVENLABS_API_KEY not set, saved conversations use posted data only");
                None
            }
        };

        let insurance = InsuranceService::in_memory(Some(registry));
        let calls = CallIngestService::in_memory(conversations, config.retry);
        let server = Self::with_services(config, insurance, calls);

        if server.config.seed_demo_data {
            let data = SeedData::demo().map_err(|e| EngineError::ConfigError(format!("demo seed: {e}")))?;
            let summary = server
                .insurance
                .load_seed(data)
                .await
                .map_err(|e| EngineError::StorageError(e.to_string()))?;
            info!(
                providers = summary.providers,
                members = summary.members,
                claims = summary.claims,
                "demo data loaded"
            );
        }

        Ok(server)
    }

    /// Assemble from ready-made services; tests use this with local-only stores
    pub fn with_services(config: AppConfig, insurance: InsuranceService, calls: CallIngestService) -> Self {
        let webhooks = WebhookVerifier::new(config.webhook_secret.as_deref(), config.signature_policy);
        Self {
            config: Arc::new(config),
            insurance: Arc::new(insurance),
            calls: Arc::new(calls),
            webhooks: Arc::new(webhooks),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
