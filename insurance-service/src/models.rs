use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use std::collections::HashMap;

/// Member enrollment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Inactive,
    Termed,
}

/// Coverage for one benefit category on a member's plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceBenefit {
    #[serde(default = "covered_by_default")]
    pub covered: bool,
    #[serde(default)]
    pub copay: Option<u32>,
    /// Percentage the member pays after deductible
    #[serde(default)]
    pub coinsurance: Option<u32>,
    #[serde(default)]
    pub prior_auth_required: bool,
    #[serde(default)]
    pub visit_limit: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn covered_by_default() -> bool {
    true
}

/// Health plan member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Canonical uppercase id, e.g. `MBR-001234`
    pub member_id: String,
    pub first_name: String,
    pub last_name: String,
    pub dob: NaiveDate,
    pub plan_name: String,
    pub status: MemberStatus,
    pub effective_date: NaiveDate,
    #[serde(default)]
    pub term_date: Option<NaiveDate>,
    pub copay_primary: u32,
    pub copay_specialist: u32,
    pub deductible: u32,
    pub deductible_met: u32,
    pub cob_status: String,
    pub out_of_pocket_max: u32,
    pub out_of_pocket_met: u32,
    /// Keyed by canonical service key (`physical_therapy`, `mri`, ...)
    #[serde(default)]
    pub benefits: HashMap<String, ServiceBenefit>,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Claim adjudication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    Paid,
    Denied,
    Pending,
}

impl ClaimStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ClaimStatus::Paid => "paid",
            ClaimStatus::Denied => "denied",
            ClaimStatus::Pending => "pending",
        }
    }
}

/// Submitted claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Canonical `CLM-########` form
    pub claim_number: String,
    pub member_id: String,
    pub provider_npi: String,
    pub date_of_service: NaiveDate,
    pub procedure_code: String,
    pub procedure_desc: String,
    pub status: ClaimStatus,
    pub billed_amount: f64,
    pub allowed_amount: f64,
    pub paid_amount: f64,
    pub patient_responsibility: f64,
    #[serde(default)]
    pub check_number: Option<String>,
    #[serde(default)]
    pub process_date: Option<NaiveDate>,
    #[serde(default)]
    pub received_date: Option<NaiveDate>,
    #[serde(default)]
    pub denial_code: Option<String>,
    #[serde(default)]
    pub denial_reason: Option<String>,
    #[serde(default)]
    pub appeal_deadline: Option<NaiveDate>,
}

/// In-network provider, seeded locally or cached from the national registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    /// 10-digit National Provider Identifier
    pub npi: String,
    pub name: String,
    pub practice_name: String,
    /// Primary practice zip
    pub zip_code: String,
    /// Every practice zip known for this NPI, primary included when sourced from the registry
    #[serde(default)]
    pub zip_codes: Vec<String>,
    #[serde(default)]
    pub tin: Option<String>,
    #[serde(default)]
    pub fax_number: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub credential: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub registry_sourced: bool,
}

impl Provider {
    /// Whether `zip` is the primary zip or one of the recorded practice zips
    pub fn practices_in(&self, zip: &str) -> bool {
        self.zip_code == zip || self.zip_codes.iter().any(|known| known == zip)
    }
}
