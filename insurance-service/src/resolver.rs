use chrono::NaiveDate;
use speech_normalizer::{digits_only, normalize_claim_number, normalize_dob, SpokenName};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::InsuranceResult;
use crate::models::{Claim, Member};
use crate::repository::{ClaimRepository, MemberRepository};

/// Search predicate for members, built from a spoken name and optional DOB.
///
/// Store implementations evaluate it however suits them; the in-memory
/// store calls [`MemberQuery::matches`] per row.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberQuery {
    pub name: SpokenName,
    pub dob: Option<NaiveDate>,
}

impl MemberQuery {
    pub fn matches(&self, member: &Member) -> bool {
        self.name.matches(&member.first_name, &member.last_name)
            && self.dob.map_or(true, |dob| member.dob == dob)
    }

    fn without_dob(&self) -> Self {
        Self {
            name: self.name.clone(),
            dob: None,
        }
    }
}

/// Outcome of resolving a spoken identity against the store
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    NotFound,
    Unique(T),
    /// Several rows matched; `first` is the first in store order
    Ambiguous { first: T, candidates: usize },
}

impl<T> Resolution<T> {
    fn from_matches(matches: Vec<T>) -> Self {
        let candidates = matches.len();
        match matches.into_iter().next() {
            None => Resolution::NotFound,
            Some(first) if candidates == 1 => Resolution::Unique(first),
            Some(first) => Resolution::Ambiguous { first, candidates },
        }
    }

    /// The row a voice lookup proceeds with
    pub fn into_selected(self) -> Option<T> {
        match self {
            Resolution::NotFound => None,
            Resolution::Unique(value) | Resolution::Ambiguous { first: value, .. } => Some(value),
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Resolution::Ambiguous { .. })
    }
}

/// Finds members despite nicknames, spoken initials and misheard birth dates
pub struct MemberResolver {
    members: Arc<dyn MemberRepository>,
}

impl MemberResolver {
    pub fn new(members: Arc<dyn MemberRepository>) -> Self {
        Self { members }
    }

    /// Every member the spoken name (and DOB, when it helps) points at.
    ///
    /// A DOB that normalizes narrows the search first; if that finds nobody
    /// the name alone is tried, because misheard dates are more common than
    /// misheard surnames.
    pub async fn find_candidates(
        &self,
        full_name: &str,
        dob: Option<&str>,
    ) -> InsuranceResult<Vec<Member>> {
        let Some(name) = SpokenName::parse(full_name) else {
            debug!("patient name has fewer than two tokens");
            return Ok(Vec::new());
        };

        let dob = dob
            .and_then(normalize_dob)
            .and_then(|iso| NaiveDate::parse_from_str(&iso, "%Y-%m-%d").ok());
        let query = MemberQuery { name, dob };

        if query.dob.is_some() {
            let with_dob = self.members.find_matching(&query).await?;
            if !with_dob.is_empty() {
                return Ok(with_dob);
            }
            debug!("no member matched name and DOB, retrying on name alone");
        }

        self.members.find_matching(&query.without_dob()).await
    }

    /// Pick one member, logging when the choice was a guess
    pub async fn resolve(&self, full_name: &str, dob: Option<&str>) -> InsuranceResult<Resolution<Member>> {
        let resolution = Resolution::from_matches(self.find_candidates(full_name, dob).await?);
        if let Resolution::Ambiguous { first, candidates } = &resolution {
            warn!(
                candidates = *candidates,
                selected_member = %first.member_id,
                "spoken patient name matched several members, using the first"
            );
        }
        Ok(resolution)
    }
}

/// A claim lookup result with the key that was actually searched
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimLookup {
    pub searched_as: String,
    pub claim: Option<Claim>,
}

/// Finds claims from a spoken claim number
pub struct ClaimResolver {
    claims: Arc<dyn ClaimRepository>,
}

impl ClaimResolver {
    pub fn new(claims: Arc<dyn ClaimRepository>) -> Self {
        Self { claims }
    }

    /// Exact match on the normalized number, then a match on its digits alone.
    ///
    /// The digit fallback recovers numbers whose prefix or zero padding was
    /// rebuilt wrongly while the payload survived transcription.
    pub async fn resolve(&self, raw: &str) -> InsuranceResult<ClaimLookup> {
        let searched_as = normalize_claim_number(raw);
        if let Some(claim) = self.claims.find_by_number(&searched_as).await? {
            return Ok(ClaimLookup {
                searched_as,
                claim: Some(claim),
            });
        }

        let digits = digits_only(&searched_as);
        let claim = self.claims.find_by_number_containing(&digits).await?;
        if claim.is_some() {
            debug!(searched_as = %searched_as, "claim found by digit payload");
        }
        Ok(ClaimLookup { searched_as, claim })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClaimStatus, MemberStatus};
    use crate::repository::{InMemoryClaimRepository, InMemoryMemberRepository};
    use std::collections::HashMap;

    fn member(id: &str, first: &str, last: &str, dob: &str) -> Member {
        Member {
            member_id: id.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            dob: NaiveDate::parse_from_str(dob, "%Y-%m-%d").unwrap(),
            plan_name: "Reflect Gold PPO".to_string(),
            status: MemberStatus::Active,
            effective_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            term_date: None,
            copay_primary: 20,
            copay_specialist: 50,
            deductible: 1500,
            deductible_met: 0,
            cob_status: "primary".to_string(),
            out_of_pocket_max: 6000,
            out_of_pocket_met: 0,
            benefits: HashMap::new(),
        }
    }

    async fn resolver_with(members: Vec<Member>) -> MemberResolver {
        let repo = InMemoryMemberRepository::new();
        for m in members {
            repo.insert(m).await.unwrap();
        }
        MemberResolver::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn test_nickname_resolves_to_member() {
        let resolver = resolver_with(vec![member("MBR-001236", "Robert", "Williams", "1990-11-22")]).await;
        let found = resolver.resolve("Bobby Williams", None).await.unwrap();
        assert!(matches!(found, Resolution::Unique(ref m) if m.member_id == "MBR-001236"));
    }

    #[tokio::test]
    async fn test_wrong_dob_falls_back_to_name() {
        let resolver = resolver_with(vec![member("MBR-001234", "John", "Smith", "1982-03-04")]).await;
        let found = resolver.find_candidates("John Smith", Some("April 5th 1983")).await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_dob_narrows_namesakes() {
        let resolver = resolver_with(vec![
            member("MBR-1", "John", "Smith", "1982-03-04"),
            member("MBR-2", "John", "Smith", "1990-01-01"),
        ])
        .await;

        let narrowed = resolver.resolve("John Smith", Some("01/01/1990")).await.unwrap();
        assert_eq!(narrowed.into_selected().map(|m| m.member_id), Some("MBR-2".to_string()));

        let ambiguous = resolver.resolve("John Smith", None).await.unwrap();
        assert!(ambiguous.is_ambiguous());
        assert_eq!(ambiguous.into_selected().map(|m| m.member_id), Some("MBR-1".to_string()));
    }

    #[tokio::test]
    async fn test_single_token_name_never_queries() {
        let resolver = resolver_with(vec![member("MBR-1", "John", "Smith", "1982-03-04")]).await;
        let found = resolver.resolve("Smith", None).await.unwrap();
        assert_eq!(found, Resolution::NotFound);
    }

    #[tokio::test]
    async fn test_claim_digit_fallback() {
        let repo = InMemoryClaimRepository::new();
        repo.insert(Claim {
            claim_number: "CLM-00482100".to_string(),
            member_id: "MBR-001235".to_string(),
            provider_npi: "2345678901".to_string(),
            date_of_service: NaiveDate::from_ymd_opt(2025, 10, 20).unwrap(),
            procedure_code: "99214".to_string(),
            procedure_desc: "Office visit, moderate complexity".to_string(),
            status: ClaimStatus::Paid,
            billed_amount: 450.0,
            allowed_amount: 380.0,
            paid_amount: 315.0,
            patient_responsibility: 65.0,
            check_number: None,
            process_date: None,
            received_date: None,
            denial_code: None,
            denial_reason: None,
            appeal_deadline: None,
        })
        .await
        .unwrap();
        let resolver = ClaimResolver::new(Arc::new(repo));

        let exact = resolver.resolve("CLN 00482100").await.unwrap();
        assert_eq!(exact.searched_as, "CLM-00482100");
        assert!(exact.claim.is_some());

        let short = resolver.resolve("482100").await.unwrap();
        assert_eq!(short.searched_as, "CLM-00482100");
        assert!(short.claim.is_some());

        // Prefix survives without its zero padding, so only the digits match
        let payload = resolver.resolve("claim 4 8 2 1 0 0").await.unwrap();
        assert_eq!(payload.searched_as, "CLM-482100");
        assert_eq!(payload.claim.map(|c| c.claim_number), Some("CLM-00482100".to_string()));

        let missing = resolver.resolve("CLM-99999999").await.unwrap();
        assert!(missing.claim.is_none());
    }
}
