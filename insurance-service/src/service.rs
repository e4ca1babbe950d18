use serde::Serialize;
use std::sync::Arc;

use crate::claims::{ClaimStatusService, ClaimsResponse};
use crate::eligibility::{EligibilityResponse, EligibilityVerifier};
use crate::error::InsuranceResult;
use crate::provider_auth::{AuthenticateNpiResponse, ProviderAuthenticator, VerifyZipResponse};
use crate::registry::ProviderRegistry;
use crate::repository::{
    ClaimRepository, InMemoryClaimRepository, InMemoryMemberRepository, InMemoryProviderRepository,
    MemberRepository, ProviderRepository,
};
use crate::requests::{AuthenticateNpiRequest, ClaimsRequest, EligibilityRequest, VerifyZipRequest};
use crate::resolver::MemberResolver;
use crate::seed::{SeedData, SeedSummary};

/// Row counts per store, reported by readiness checks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub providers: usize,
    pub members: usize,
    pub claims: usize,
}

/// Insurance service
///
/// Entry point for the four voice-agent lookups over a shared set of stores.
pub struct InsuranceService {
    providers: Arc<dyn ProviderRepository>,
    members: Arc<dyn MemberRepository>,
    claims: Arc<dyn ClaimRepository>,
    authenticator: ProviderAuthenticator,
    eligibility: EligibilityVerifier,
    claim_status: ClaimStatusService,
}

impl InsuranceService {
    pub fn new(
        providers: Arc<dyn ProviderRepository>,
        members: Arc<dyn MemberRepository>,
        claims: Arc<dyn ClaimRepository>,
        registry: Option<Arc<dyn ProviderRegistry>>,
    ) -> Self {
        Self {
            authenticator: ProviderAuthenticator::new(providers.clone(), registry),
            eligibility: EligibilityVerifier::new(members.clone()),
            claim_status: ClaimStatusService::new(claims.clone(), MemberResolver::new(members.clone())),
            providers,
            members,
            claims,
        }
    }

    /// Empty in-memory stores
    pub fn in_memory(registry: Option<Arc<dyn ProviderRegistry>>) -> Self {
        Self::new(
            Arc::new(InMemoryProviderRepository::new()),
            Arc::new(InMemoryMemberRepository::new()),
            Arc::new(InMemoryClaimRepository::new()),
            registry,
        )
    }

    pub async fn load_seed(&self, data: SeedData) -> InsuranceResult<SeedSummary> {
        data.load_into(self.providers.as_ref(), self.members.as_ref(), self.claims.as_ref())
            .await
    }

    pub async fn authenticate_npi(
        &self,
        request: &AuthenticateNpiRequest,
    ) -> InsuranceResult<AuthenticateNpiResponse> {
        self.authenticator.authenticate_npi(request).await
    }

    pub async fn verify_zip(&self, request: &VerifyZipRequest) -> InsuranceResult<VerifyZipResponse> {
        self.authenticator.verify_zip(request).await
    }

    pub async fn eligibility(&self, request: &EligibilityRequest) -> InsuranceResult<EligibilityResponse> {
        self.eligibility.check(request).await
    }

    pub async fn claims(&self, request: &ClaimsRequest) -> InsuranceResult<ClaimsResponse> {
        self.claim_status.lookup(request).await
    }

    pub async fn counts(&self) -> InsuranceResult<StoreCounts> {
        Ok(StoreCounts {
            providers: self.providers.count().await?,
            members: self.members.count().await?,
            claims: self.claims.count().await?,
        })
    }
}
