use chrono::NaiveDate;
use logger_redacted::redact;
use serde::{Deserialize, Serialize};
use speech_normalizer::normalize_dob;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::error::InsuranceResult;
use crate::models::{Claim, ClaimStatus, Member};
use crate::repository::ClaimRepository;
use crate::requests::ClaimsRequest;
use crate::resolver::{ClaimResolver, MemberResolver};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ClaimsResponse {
    pub found: bool,
    pub message: Option<String>,
    pub claim_number: Option<String>,
    pub status: Option<ClaimStatus>,
    pub date_of_service: Option<NaiveDate>,
    pub procedure_code: Option<String>,
    pub procedure_desc: Option<String>,
    pub billed_amount: Option<f64>,
    pub allowed_amount: Option<f64>,
    pub paid_amount: Option<f64>,
    pub patient_responsibility: Option<f64>,
    pub check_number: Option<String>,
    pub process_date: Option<NaiveDate>,
    pub received_date: Option<NaiveDate>,
    pub denial_code: Option<String>,
    pub denial_reason: Option<String>,
    pub appeal_deadline: Option<NaiveDate>,
}

impl ClaimsResponse {
    fn not_found(message: String) -> Self {
        Self {
            found: false,
            message: Some(message),
            ..Self::default()
        }
    }
}

impl From<Claim> for ClaimsResponse {
    fn from(claim: Claim) -> Self {
        Self {
            found: true,
            message: None,
            claim_number: Some(claim.claim_number),
            status: Some(claim.status),
            date_of_service: Some(claim.date_of_service),
            procedure_code: Some(claim.procedure_code),
            procedure_desc: Some(claim.procedure_desc),
            billed_amount: Some(claim.billed_amount),
            allowed_amount: Some(claim.allowed_amount),
            paid_amount: Some(claim.paid_amount),
            patient_responsibility: Some(claim.patient_responsibility),
            check_number: claim.check_number,
            process_date: claim.process_date,
            received_date: claim.received_date,
            denial_code: claim.denial_code,
            denial_reason: claim.denial_reason,
            appeal_deadline: claim.appeal_deadline,
        }
    }
}

/// Date-of-service filter as spoken by the caller
enum ServiceDateFilter {
    Any,
    On(NaiveDate),
    /// Not a date we can read; nothing can match it
    Unreadable,
}

impl ServiceDateFilter {
    fn from_spoken(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Any;
        };
        let iso = normalize_dob(raw).unwrap_or_else(|| raw.trim().to_string());
        match NaiveDate::parse_from_str(&iso, "%Y-%m-%d") {
            Ok(date) => Self::On(date),
            Err(_) => Self::Unreadable,
        }
    }
}

/// Claim status lookups by claim number or by patient
pub struct ClaimStatusService {
    claims: Arc<dyn ClaimRepository>,
    claim_resolver: ClaimResolver,
    member_resolver: MemberResolver,
}

impl ClaimStatusService {
    pub fn new(claims: Arc<dyn ClaimRepository>, member_resolver: MemberResolver) -> Self {
        Self {
            claim_resolver: ClaimResolver::new(claims.clone()),
            claims,
            member_resolver,
        }
    }

    /// A claim number wins over patient details when both are given.
    ///
    /// By patient, the most recent claim (by date of service) across every
    /// matching member is returned.
    pub async fn lookup(&self, request: &ClaimsRequest) -> InsuranceResult<ClaimsResponse> {
        if let Some(raw) = request.claim_number.as_deref() {
            return self.lookup_by_number(raw).await;
        }
        if let Some(name) = request.patient_name.as_deref() {
            return self.lookup_by_patient(name, request).await;
        }

        info!("claims lookup without claim number or patient name");
        Ok(ClaimsResponse::not_found(
            "No claim number or patient name provided. Please provide at least one.".to_string(),
        ))
    }

    async fn lookup_by_number(&self, raw: &str) -> InsuranceResult<ClaimsResponse> {
        let lookup = self.claim_resolver.resolve(raw).await?;
        info!(searched_as = %lookup.searched_as, found = lookup.claim.is_some(), "claim number lookup");

        Ok(match lookup.claim {
            Some(claim) => claim.into(),
            None => ClaimsResponse::not_found(format!(
                "No claim found with number '{raw}' (searched as '{}'). Please verify the claim number and try again.",
                lookup.searched_as
            )),
        })
    }

    async fn lookup_by_patient(&self, name: &str, request: &ClaimsRequest) -> InsuranceResult<ClaimsResponse> {
        let dob = request.patient_dob.as_deref();
        let members = self.member_resolver.find_candidates(name, dob).await?;
        info!(patient = %redact(name), candidates = members.len(), "claims patient lookup");

        let Some(first) = members.first() else {
            let dob_clause = dob.map(|d| format!(" and DOB '{d}'")).unwrap_or_default();
            return Ok(ClaimsResponse::not_found(format!(
                "No patient found matching name '{name}'{dob_clause}. Please verify the patient information."
            )));
        };
        let matched_name = first.full_name();

        let raw_dos = request.date_of_service.as_deref();
        let mut claims = match ServiceDateFilter::from_spoken(raw_dos) {
            ServiceDateFilter::Unreadable => Vec::new(),
            ServiceDateFilter::Any => self.find_for(&members, None).await?,
            ServiceDateFilter::On(date) => self.find_for(&members, Some(date)).await?,
        };
        claims.sort_by(|a, b| b.date_of_service.cmp(&a.date_of_service));

        Ok(match claims.into_iter().next() {
            Some(latest) => latest.into(),
            None => {
                let dos_clause = raw_dos
                    .map(|d| format!(" for date of service '{d}'"))
                    .unwrap_or_default();
                ClaimsResponse::not_found(format!(
                    "Patient '{matched_name}' found, but no claims on file{dos_clause}."
                ))
            }
        })
    }

    async fn find_for(
        &self,
        members: &[Member],
        date_of_service: Option<NaiveDate>,
    ) -> InsuranceResult<Vec<Claim>> {
        let member_ids: Vec<String> = members.iter().map(|m| m.member_id.clone()).collect();
        self.claims.find_for_members(&member_ids, date_of_service).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MemberStatus;
    use crate::repository::{InMemoryClaimRepository, InMemoryMemberRepository, MemberRepository};
    use std::collections::HashMap;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn claim(number: &str, member_id: &str, dos: NaiveDate, status: ClaimStatus) -> Claim {
        Claim {
            claim_number: number.to_string(),
            member_id: member_id.to_string(),
            provider_npi: "1234567890".to_string(),
            date_of_service: dos,
            procedure_code: "99213".to_string(),
            procedure_desc: "Office visit".to_string(),
            status,
            billed_amount: 200.0,
            allowed_amount: 150.0,
            paid_amount: 120.0,
            patient_responsibility: 30.0,
            check_number: None,
            process_date: None,
            received_date: None,
            denial_code: None,
            denial_reason: None,
            appeal_deadline: None,
        }
    }

    async fn service() -> ClaimStatusService {
        let members = InMemoryMemberRepository::new();
        members
            .insert(Member {
                member_id: "MBR-001235".to_string(),
                first_name: "Maria".to_string(),
                last_name: "Garcia".to_string(),
                dob: date(1975, 7, 19),
                plan_name: "Reflect Silver HMO".to_string(),
                status: MemberStatus::Active,
                effective_date: date(2024, 1, 1),
                term_date: None,
                copay_primary: 30,
                copay_specialist: 60,
                deductible: 3000,
                deductible_met: 0,
                cob_status: "primary".to_string(),
                out_of_pocket_max: 8000,
                out_of_pocket_met: 0,
                benefits: HashMap::new(),
            })
            .await
            .unwrap();

        let claims = InMemoryClaimRepository::new();
        claims
            .insert(claim("CLM-00000001", "MBR-001235", date(2025, 9, 2), ClaimStatus::Paid))
            .await
            .unwrap();
        claims
            .insert(claim("CLM-00000002", "MBR-001235", date(2025, 11, 14), ClaimStatus::Denied))
            .await
            .unwrap();

        ClaimStatusService::new(
            Arc::new(claims),
            MemberResolver::new(Arc::new(members)),
        )
    }

    fn by_patient(name: &str, dos: Option<&str>) -> ClaimsRequest {
        ClaimsRequest {
            patient_name: Some(name.to_string()),
            date_of_service: dos.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_most_recent_claim_for_patient() {
        let response = service().await.lookup(&by_patient("Maria Garcia", None)).await.unwrap();
        assert!(response.found);
        assert_eq!(response.claim_number.as_deref(), Some("CLM-00000002"));
        assert_eq!(response.status, Some(ClaimStatus::Denied));
    }

    #[tokio::test]
    async fn test_spoken_date_of_service_filters() {
        let service = service().await;
        let response = service
            .lookup(&by_patient("Maria Garcia", Some("September 2nd 2025")))
            .await
            .unwrap();
        assert_eq!(response.claim_number.as_deref(), Some("CLM-00000001"));

        let none = service
            .lookup(&by_patient("Maria Garcia", Some("sometime last spring")))
            .await
            .unwrap();
        assert_eq!(
            none.message.as_deref(),
            Some("Patient 'Maria Garcia' found, but no claims on file for date of service 'sometime last spring'.")
        );
    }

    #[tokio::test]
    async fn test_unknown_claim_number_message() {
        let response = service()
            .await
            .lookup(&ClaimsRequest {
                claim_number: Some("klm 777".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(!response.found);
        assert_eq!(
            response.message.as_deref(),
            Some("No claim found with number 'klm 777' (searched as 'CLM-777'). Please verify the claim number and try again.")
        );
    }

    #[tokio::test]
    async fn test_patient_not_found_and_empty_request() {
        let service = service().await;
        let missing = service.lookup(&by_patient("Mario Garcia", None)).await.unwrap();
        assert_eq!(
            missing.message.as_deref(),
            Some("No patient found matching name 'Mario Garcia'. Please verify the patient information.")
        );

        let empty = service.lookup(&ClaimsRequest::default()).await.unwrap();
        assert_eq!(
            empty.message.as_deref(),
            Some("No claim number or patient name provided. Please provide at least one.")
        );
    }
}
