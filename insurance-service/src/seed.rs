use serde::{Deserialize, Serialize};
use speech_normalizer::ServiceKey;
use std::collections::HashMap;
use tracing::info;

use crate::error::{InsuranceError, InsuranceResult};
use crate::models::{Claim, Member, Provider, ServiceBenefit};
use crate::repository::{ClaimRepository, MemberRepository, ProviderRepository};

const DEMO_SEED: &str = include_str!("../fixtures/demo_seed.json");

/// Reference data for the in-memory stores.
///
/// Benefit tables are stored per plan and copied onto each member of that
/// plan when the data is parsed.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedData {
    pub providers: Vec<Provider>,
    #[serde(default)]
    pub plan_benefits: HashMap<String, HashMap<String, ServiceBenefit>>,
    pub members: Vec<Member>,
    pub claims: Vec<Claim>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub providers: usize,
    pub members: usize,
    pub claims: usize,
}

impl SeedData {
    /// Demo providers, plans, members and claims bundled with the crate
    pub fn demo() -> InsuranceResult<Self> {
        Self::from_json(DEMO_SEED)
    }

    pub fn from_json(json: &str) -> InsuranceResult<Self> {
        let mut data: Self = serde_json::from_str(json)?;
        data.validate_benefit_keys()?;
        data.attach_plan_benefits();
        Ok(data)
    }

    fn validate_benefit_keys(&self) -> InsuranceResult<()> {
        for (plan, benefits) in &self.plan_benefits {
            for key in benefits.keys() {
                if serde_json::from_value::<ServiceKey>(serde_json::Value::String(key.clone())).is_err() {
                    return Err(InsuranceError::Seed(format!(
                        "plan '{plan}' has unknown benefit category '{key}'"
                    )));
                }
            }
        }
        Ok(())
    }

    fn attach_plan_benefits(&mut self) {
        for member in &mut self.members {
            if !member.benefits.is_empty() {
                continue;
            }
            if let Some(benefits) = self.plan_benefits.get(&member.plan_name) {
                member.benefits = benefits.clone();
            }
        }
    }

    /// Write everything into the given stores
    pub async fn load_into(
        self,
        providers: &dyn ProviderRepository,
        members: &dyn MemberRepository,
        claims: &dyn ClaimRepository,
    ) -> InsuranceResult<SeedSummary> {
        let summary = SeedSummary {
            providers: self.providers.len(),
            members: self.members.len(),
            claims: self.claims.len(),
        };

        for provider in self.providers {
            providers.upsert(provider).await?;
        }
        for member in self.members {
            members.insert(member).await?;
        }
        for claim in self.claims {
            claims.insert(claim).await?;
        }

        info!(
            providers = summary.providers,
            members = summary.members,
            claims = summary.claims,
            "seed data loaded"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_seed_parses_and_attaches_benefits() {
        let data = SeedData::demo().unwrap();
        let john = data.members.iter().find(|m| m.member_id == "MBR-001234").unwrap();
        assert_eq!(john.plan_name, "Reflect Gold PPO");
        assert_eq!(john.benefits.get("physical_therapy").and_then(|b| b.copay), Some(40));
        assert!(data.claims.iter().any(|c| c.claim_number == "CLM-00482100"));
    }

    #[test]
    fn test_unknown_benefit_category_is_rejected() {
        let json = r#"{
            "providers": [],
            "plan_benefits": {"Basic": {"acupuncture": {"covered": false}}},
            "members": [],
            "claims": []
        }"#;
        assert!(matches!(SeedData::from_json(json), Err(InsuranceError::Seed(_))));
    }
}
