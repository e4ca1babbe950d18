use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::error::InsuranceResult;
use crate::models::{Claim, Member, Provider};
use crate::resolver::MemberQuery;

/// Read access to enrolled members
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Exact lookup by canonical member id
    async fn find_by_id(&self, member_id: &str) -> InsuranceResult<Option<Member>>;

    /// Members satisfying the query predicate, in store order
    async fn find_matching(&self, query: &MemberQuery) -> InsuranceResult<Vec<Member>>;

    async fn insert(&self, member: Member) -> InsuranceResult<()>;

    async fn count(&self) -> InsuranceResult<usize>;
}

/// Read access to submitted claims
#[async_trait]
pub trait ClaimRepository: Send + Sync {
    async fn find_by_number(&self, claim_number: &str) -> InsuranceResult<Option<Claim>>;

    /// First claim whose number contains `digits`
    async fn find_by_number_containing(&self, digits: &str) -> InsuranceResult<Option<Claim>>;

    /// Claims for any of the members, optionally on one date of service
    async fn find_for_members(
        &self,
        member_ids: &[String],
        date_of_service: Option<NaiveDate>,
    ) -> InsuranceResult<Vec<Claim>>;

    async fn insert(&self, claim: Claim) -> InsuranceResult<()>;

    async fn count(&self) -> InsuranceResult<usize>;
}

/// Provider directory, written to when the registry supplies a new NPI
#[async_trait]
pub trait ProviderRepository: Send + Sync {
    async fn find_by_npi(&self, npi: &str) -> InsuranceResult<Option<Provider>>;

    /// Insert or replace by NPI
    async fn upsert(&self, provider: Provider) -> InsuranceResult<()>;

    async fn count(&self) -> InsuranceResult<usize>;
}

/// In-memory member store keeping insertion order
pub struct InMemoryMemberRepository {
    members: Arc<RwLock<Vec<Member>>>,
}

impl InMemoryMemberRepository {
    pub fn new() -> Self {
        Self {
            members: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryMemberRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemberRepository for InMemoryMemberRepository {
    async fn find_by_id(&self, member_id: &str) -> InsuranceResult<Option<Member>> {
        Ok(self
            .members
            .read()
            .iter()
            .find(|member| member.member_id == member_id)
            .cloned())
    }

    async fn find_matching(&self, query: &MemberQuery) -> InsuranceResult<Vec<Member>> {
        Ok(self
            .members
            .read()
            .iter()
            .filter(|member| query.matches(member))
            .cloned()
            .collect())
    }

    async fn insert(&self, member: Member) -> InsuranceResult<()> {
        let mut members = self.members.write();
        members.retain(|existing| existing.member_id != member.member_id);
        members.push(member);
        Ok(())
    }

    async fn count(&self) -> InsuranceResult<usize> {
        Ok(self.members.read().len())
    }
}

/// In-memory claim store keeping insertion order
pub struct InMemoryClaimRepository {
    claims: Arc<RwLock<Vec<Claim>>>,
}

impl InMemoryClaimRepository {
    pub fn new() -> Self {
        Self {
            claims: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryClaimRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClaimRepository for InMemoryClaimRepository {
    async fn find_by_number(&self, claim_number: &str) -> InsuranceResult<Option<Claim>> {
        Ok(self
            .claims
            .read()
            .iter()
            .find(|claim| claim.claim_number == claim_number)
            .cloned())
    }

    async fn find_by_number_containing(&self, digits: &str) -> InsuranceResult<Option<Claim>> {
        if digits.is_empty() {
            return Ok(None);
        }
        Ok(self
            .claims
            .read()
            .iter()
            .find(|claim| claim.claim_number.contains(digits))
            .cloned())
    }

    async fn find_for_members(
        &self,
        member_ids: &[String],
        date_of_service: Option<NaiveDate>,
    ) -> InsuranceResult<Vec<Claim>> {
        Ok(self
            .claims
            .read()
            .iter()
            .filter(|claim| member_ids.contains(&claim.member_id))
            .filter(|claim| date_of_service.map_or(true, |dos| claim.date_of_service == dos))
            .cloned()
            .collect())
    }

    async fn insert(&self, claim: Claim) -> InsuranceResult<()> {
        let mut claims = self.claims.write();
        claims.retain(|existing| existing.claim_number != claim.claim_number);
        claims.push(claim);
        Ok(())
    }

    async fn count(&self) -> InsuranceResult<usize> {
        Ok(self.claims.read().len())
    }
}

/// In-memory provider directory keyed by NPI
pub struct InMemoryProviderRepository {
    providers: Arc<DashMap<String, Provider>>,
}

impl InMemoryProviderRepository {
    pub fn new() -> Self {
        Self {
            providers: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryProviderRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderRepository for InMemoryProviderRepository {
    async fn find_by_npi(&self, npi: &str) -> InsuranceResult<Option<Provider>> {
        Ok(self.providers.get(npi).map(|entry| entry.value().clone()))
    }

    async fn upsert(&self, provider: Provider) -> InsuranceResult<()> {
        self.providers.insert(provider.npi.clone(), provider);
        Ok(())
    }

    async fn count(&self) -> InsuranceResult<usize> {
        Ok(self.providers.len())
    }
}
