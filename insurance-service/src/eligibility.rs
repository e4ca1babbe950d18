use chrono::NaiveDate;
use logger_redacted::redact;
use serde::{Deserialize, Serialize};
use speech_normalizer::normalize_service_phrase;
use std::sync::Arc;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::error::InsuranceResult;
use crate::models::{Member, MemberStatus};
use crate::repository::MemberRepository;
use crate::requests::EligibilityRequest;
use crate::resolver::MemberResolver;

/// Eligibility answer read back to the caller.
///
/// `service_*` fields are only filled when the request named a service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EligibilityResponse {
    pub found: bool,
    pub message: Option<String>,
    pub status: Option<MemberStatus>,
    pub member_id: Option<String>,
    pub patient_name: Option<String>,
    pub plan_name: Option<String>,
    pub effective_date: Option<NaiveDate>,
    pub term_date: Option<NaiveDate>,
    pub copay_primary: Option<u32>,
    pub copay_specialist: Option<u32>,
    pub deductible: Option<u32>,
    pub deductible_met: Option<u32>,
    pub cob_status: Option<String>,
    pub out_of_pocket_max: Option<u32>,
    pub out_of_pocket_met: Option<u32>,
    pub service_type: Option<String>,
    /// `None` means coverage for the service is unknown
    pub service_covered: Option<bool>,
    pub service_copay: Option<u32>,
    pub service_coinsurance: Option<u32>,
    pub service_prior_auth: Option<bool>,
    pub service_visit_limit: Option<String>,
    pub service_notes: Option<String>,
}

impl EligibilityResponse {
    fn not_found(message: String) -> Self {
        Self {
            found: false,
            message: Some(message),
            ..Self::default()
        }
    }

    fn for_member(member: &Member) -> Self {
        Self {
            found: true,
            status: Some(member.status),
            member_id: Some(member.member_id.clone()),
            patient_name: Some(member.full_name()),
            plan_name: Some(member.plan_name.clone()),
            effective_date: Some(member.effective_date),
            term_date: member.term_date,
            copay_primary: Some(member.copay_primary),
            copay_specialist: Some(member.copay_specialist),
            deductible: Some(member.deductible),
            deductible_met: Some(member.deductible_met),
            cob_status: Some(member.cob_status.clone()),
            out_of_pocket_max: Some(member.out_of_pocket_max),
            out_of_pocket_met: Some(member.out_of_pocket_met),
            ..Self::default()
        }
    }

    /// Fill the `service_*` fields from the member's benefit table
    fn with_service(mut self, member: &Member, raw_service: &str) -> Self {
        let key = normalize_service_phrase(raw_service);
        debug!(service = raw_service, normalized = ?key, "service lookup");

        match key {
            Some(key) if member.benefits.is_empty() => {
                debug!(service = %key, "member plan has no benefit table");
                self.service_type = Some(raw_service.to_string());
                self.message = Some("Benefit details are not available for this member's plan.".to_string());
            }
            Some(key) => match member.benefits.get(key.as_str()) {
                Some(benefit) => {
                    self.service_type = Some(key.display_name().to_string());
                    self.service_covered = Some(benefit.covered);
                    self.service_copay = benefit.copay;
                    self.service_coinsurance = benefit.coinsurance;
                    self.service_prior_auth = Some(benefit.prior_auth_required);
                    self.service_visit_limit = benefit.visit_limit.clone();
                    self.service_notes = benefit.notes.clone();
                }
                None => {
                    self.service_type = Some(raw_service.to_string());
                    self.message = Some(format!(
                        "Service '{raw_service}' is not a recognized benefit category for this plan."
                    ));
                }
            },
            None => {
                self.service_type = Some(raw_service.to_string());
                self.message = Some(format!(
                    "Could not identify the service '{raw_service}'. Please try a more specific term."
                ));
            }
        }
        self
    }
}

/// Eligibility verification service
pub struct EligibilityVerifier {
    members: Arc<dyn MemberRepository>,
    resolver: MemberResolver,
}

impl EligibilityVerifier {
    pub fn new(members: Arc<dyn MemberRepository>) -> Self {
        Self {
            resolver: MemberResolver::new(members.clone()),
            members,
        }
    }

    /// Look a member up by id (exact) or by spoken name and DOB (fuzzy).
    ///
    /// An explicit member id is never fuzzed: a wrong id is reported as such
    /// rather than silently matched to someone else by name.
    pub async fn check(&self, request: &EligibilityRequest) -> InsuranceResult<EligibilityResponse> {
        let member = match (request.member_id.as_deref(), request.patient_name.as_deref()) {
            (None, None) => {
                info!("eligibility lookup without patient name or member id");
                return Ok(EligibilityResponse::not_found(
                    "Missing patient name and member ID. Please provide at least one.".to_string(),
                ));
            }
            (Some(member_id), _) => {
                let canonical = member_id.trim().to_uppercase();
                match self.members.find_by_id(&canonical).await? {
                    Some(member) => member,
                    None => {
                        info!(member_id = %redact(&canonical), "eligibility lookup: unknown member id");
                        return Ok(EligibilityResponse::not_found(format!(
                            "No member found with ID {member_id}."
                        )));
                    }
                }
            }
            (None, Some(name)) => {
                let dob = request.patient_dob.as_deref();
                match self.resolver.resolve(name, dob).await?.into_selected() {
                    Some(member) => member,
                    None => {
                        info!(patient = %redact(name), "eligibility lookup: no matching patient");
                        let dob_clause = dob.map(|d| format!(" and DOB '{d}'")).unwrap_or_default();
                        return Ok(EligibilityResponse::not_found(format!(
                            "No patient found matching name '{name}'{dob_clause}. Please verify spelling and try again."
                        )));
                    }
                }
            }
        };

        info!(member_id = %redact(&member.member_id), status = ?member.status, "eligibility found");
        let response = EligibilityResponse::for_member(&member);
        Ok(match request.service_type.as_deref() {
            Some(service) => response.with_service(&member, service),
            None => response,
        })
    }
}
