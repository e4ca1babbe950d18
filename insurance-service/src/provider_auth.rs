use logger_redacted::redact;
use serde::{Deserialize, Serialize};
use speech_normalizer::{normalize_digit_string, normalize_zip};
use std::sync::Arc;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::error::InsuranceResult;
use crate::models::Provider;
use crate::registry::ProviderRegistry;
use crate::repository::ProviderRepository;
use crate::requests::{AuthenticateNpiRequest, VerifyZipRequest};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticateNpiResponse {
    pub valid: bool,
    pub provider_name: Option<String>,
    pub practice_name: Option<String>,
    pub fax_number: Option<String>,
}

impl AuthenticateNpiResponse {
    fn invalid() -> Self {
        Self::default()
    }

    fn for_provider(provider: &Provider) -> Self {
        Self {
            valid: true,
            provider_name: Some(provider.name.clone()),
            practice_name: Some(provider.practice_name.clone()),
            fax_number: provider.fax_number.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VerifyZipResponse {
    pub verified: bool,
    pub provider_name: Option<String>,
}

/// NPI authentication with a cache-aside national registry fallback
pub struct ProviderAuthenticator {
    providers: Arc<dyn ProviderRepository>,
    registry: Option<Arc<dyn ProviderRegistry>>,
}

impl ProviderAuthenticator {
    pub fn new(
        providers: Arc<dyn ProviderRepository>,
        registry: Option<Arc<dyn ProviderRegistry>>,
    ) -> Self {
        Self { providers, registry }
    }

    /// Valid when the NPI is in the local directory or the registry knows it.
    ///
    /// A registry hit is written to the directory before answering. An
    /// invalid answer carries no detail about why.
    pub async fn authenticate_npi(
        &self,
        request: &AuthenticateNpiRequest,
    ) -> InsuranceResult<AuthenticateNpiResponse> {
        let Some(raw) = request.npi.as_deref() else {
            debug!("authenticate-npi called without an NPI");
            return Ok(AuthenticateNpiResponse::invalid());
        };
        let npi = normalize_digit_string(raw);
        if npi.is_empty() {
            return Ok(AuthenticateNpiResponse::invalid());
        }

        if let Some(provider) = self.providers.find_by_npi(&npi).await? {
            info!(npi = %redact(&npi), "provider authenticated from directory");
            return Ok(AuthenticateNpiResponse::for_provider(&provider));
        }

        match self.lookup_registry(&npi).await {
            Some(provider) => {
                self.providers.upsert(provider.clone()).await?;
                info!(npi = %redact(&npi), "provider cached from national registry");
                Ok(AuthenticateNpiResponse::for_provider(&provider))
            }
            None => {
                info!(npi = %redact(&npi), "NPI not found locally or in registry");
                Ok(AuthenticateNpiResponse::invalid())
            }
        }
    }

    /// Registry failures count as "not found"
    async fn lookup_registry(&self, npi: &str) -> Option<Provider> {
        let registry = self.registry.as_ref()?;
        match registry.lookup_npi(npi).await {
            Ok(found) => found,
            Err(e) => {
                warn!(npi = %redact(npi), error = %e, "national registry lookup failed");
                None
            }
        }
    }

    /// Secondary check that the caller knows one of the provider's practice zips
    pub async fn verify_zip(&self, request: &VerifyZipRequest) -> InsuranceResult<VerifyZipResponse> {
        let (Some(raw_npi), Some(raw_zip)) = (request.npi.as_deref(), request.zip_code.as_deref())
        else {
            debug!("verify-zip called without NPI or zip");
            return Ok(VerifyZipResponse::default());
        };

        let npi = normalize_digit_string(raw_npi);
        let Some(zip) = normalize_zip(raw_zip) else {
            return Ok(VerifyZipResponse::default());
        };
        if npi.is_empty() {
            return Ok(VerifyZipResponse::default());
        }

        let Some(provider) = self.providers.find_by_npi(&npi).await? else {
            return Ok(VerifyZipResponse::default());
        };

        if provider.practices_in(&zip) {
            Ok(VerifyZipResponse {
                verified: true,
                provider_name: Some(provider.name),
            })
        } else {
            info!(npi = %redact(&npi), known_zips = provider.zip_codes.len() + 1, "zip not among practice zips");
            Ok(VerifyZipResponse::default())
        }
    }
}
