use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{InsuranceError, InsuranceResult};
use crate::models::Provider;

/// CMS national provider file, queryable by NPI
pub const DEFAULT_REGISTRY_URL: &str =
    "https://data.cms.gov/provider-data/api/1/datastore/query/mj5m-pzi6/0";

/// Credentials addressed as "Dr." on the voice line
const DOCTOR_CREDENTIALS: &[&str] = &["MD", "DO", "DPM", "OD", "DDS", "DMD"];

#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub url: String,
    pub timeout: Duration,
    /// Rows requested per NPI; one NPI can have a row per practice location
    pub row_limit: u32,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REGISTRY_URL.to_string(),
            timeout: Duration::from_secs(12),
            row_limit: 20,
        }
    }
}

/// External source of providers that are not yet in the local directory
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderRegistry: Send + Sync {
    /// `Ok(None)` when the registry has no row for the NPI
    async fn lookup_npi(&self, npi: &str) -> InsuranceResult<Option<Provider>>;
}

#[derive(Debug, Deserialize)]
struct RegistryResponse {
    #[serde(default)]
    results: Vec<RegistryRow>,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct RegistryRow {
    #[serde(default)]
    provider_first_name: Option<String>,
    #[serde(default)]
    provider_last_name: Option<String>,
    #[serde(default)]
    cred: Option<String>,
    #[serde(default)]
    facility_name: Option<String>,
    #[serde(default)]
    zip_code: Option<String>,
    #[serde(default)]
    telephone_number: Option<String>,
    #[serde(default)]
    pri_spec: Option<String>,
    #[serde(default)]
    citytown: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

impl RegistryRow {
    fn completeness(&self) -> u8 {
        let mut score = 0;
        if present(&self.facility_name).is_some() {
            score += 3;
        }
        if present(&self.zip_code).is_some() {
            score += 2;
        }
        if present(&self.telephone_number).is_some() {
            score += 1;
        }
        score
    }

    fn zip5(&self) -> Option<String> {
        present(&self.zip_code).map(|zip| zip.chars().take(5).collect())
    }
}

/// Capitalize the first letter of every alphabetic run, lowercase the rest
fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut previous_is_letter = false;
    for ch in raw.trim().chars() {
        if previous_is_letter {
            out.extend(ch.to_lowercase());
        } else {
            out.extend(ch.to_uppercase());
        }
        previous_is_letter = ch.is_alphabetic();
    }
    out
}

/// Most complete row; ties go to the earliest
fn pick_best_row(rows: &[RegistryRow]) -> Option<&RegistryRow> {
    rows.iter().rev().max_by_key(|row| row.completeness())
}

fn collect_zip_codes(rows: &[RegistryRow]) -> Vec<String> {
    rows.iter()
        .filter_map(RegistryRow::zip5)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn map_to_provider(npi: &str, best: &RegistryRow, zip_codes: Vec<String>) -> Provider {
    let first = title_case(present(&best.provider_first_name).unwrap_or_default());
    let last = title_case(present(&best.provider_last_name).unwrap_or_default());
    let credential = present(&best.cred).map(str::to_uppercase);

    let is_doctor = credential
        .as_deref()
        .is_some_and(|cred| DOCTOR_CREDENTIALS.contains(&cred));
    let name = if is_doctor {
        format!("Dr. {first} {last}").trim().to_string()
    } else {
        format!("{first} {last}")
    };

    let practice_name = present(&best.facility_name)
        .map(title_case)
        .unwrap_or_else(|| format!("{name} Practice"));

    Provider {
        npi: npi.to_string(),
        name,
        practice_name,
        zip_code: best.zip5().unwrap_or_default(),
        zip_codes,
        tin: None,
        fax_number: None,
        specialty: present(&best.pri_spec).map(title_case),
        phone: present(&best.telephone_number).map(str::to_string),
        credential,
        city: present(&best.citytown).map(title_case),
        state: present(&best.state).map(str::to_uppercase),
        registry_sourced: true,
    }
}

/// Client for the CMS provider-data datastore
pub struct CmsRegistryClient {
    client: reqwest::Client,
    config: RegistryConfig,
}

impl CmsRegistryClient {
    pub fn new(config: RegistryConfig) -> InsuranceResult<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl ProviderRegistry for CmsRegistryClient {
    async fn lookup_npi(&self, npi: &str) -> InsuranceResult<Option<Provider>> {
        let limit = self.config.row_limit.to_string();
        let response = self
            .client
            .get(&self.config.url)
            .query(&[
                ("conditions[0][property]", "npi"),
                ("conditions[0][value]", npi),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(InsuranceError::Registry(format!(
                "registry answered {}",
                response.status()
            )));
        }

        let body: RegistryResponse = response.json().await?;
        let Some(best) = pick_best_row(&body.results) else {
            debug!("registry has no rows for NPI");
            return Ok(None);
        };

        info!(rows = body.results.len(), "registry returned provider rows");
        let zip_codes = collect_zip_codes(&body.results);
        Ok(Some(map_to_provider(npi, best, zip_codes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(facility: Option<&str>, zip: Option<&str>, phone: Option<&str>) -> RegistryRow {
        RegistryRow {
            provider_first_name: Some("SARAH".to_string()),
            provider_last_name: Some("o'neil".to_string()),
            cred: Some("md".to_string()),
            facility_name: facility.map(str::to_string),
            zip_code: zip.map(str::to_string),
            telephone_number: phone.map(str::to_string),
            pri_spec: Some("INTERNAL MEDICINE".to_string()),
            citytown: Some("BEVERLY HILLS".to_string()),
            state: Some("ca".to_string()),
        }
    }

    #[test]
    fn test_title_case_matches_word_boundaries() {
        assert_eq!(title_case("VALLEY MEDICAL GROUP"), "Valley Medical Group");
        assert_eq!(title_case("o'neil"), "O'Neil");
        assert_eq!(title_case("  "), "");
    }

    #[test]
    fn test_best_row_prefers_facility_then_earliest() {
        let rows = vec![
            row(None, Some("902101234"), Some("3105550100")),
            row(Some("CEDARS CLINIC"), None, None),
            row(Some("VALLEY MEDICAL"), None, None),
        ];
        let best = pick_best_row(&rows).unwrap();
        assert_eq!(best.facility_name.as_deref(), Some("CEDARS CLINIC"));
        assert!(pick_best_row(&[]).is_none());
    }

    #[test]
    fn test_zip_codes_are_five_digit_and_distinct() {
        let rows = vec![
            row(None, Some("902101234"), None),
            row(None, Some("90210"), None),
            row(None, Some("10001"), None),
            row(None, Some("  "), None),
        ];
        assert_eq!(collect_zip_codes(&rows), vec!["10001", "90210"]);
    }

    #[test]
    fn test_mapping_adds_doctor_prefix_and_practice_fallback() {
        let best = row(None, Some("902101234"), Some(" 3105550100 "));
        let provider = map_to_provider("1234567890", &best, vec!["90210".to_string()]);
        assert_eq!(provider.name, "Dr. Sarah O'Neil");
        assert_eq!(provider.practice_name, "Dr. Sarah O'Neil Practice");
        assert_eq!(provider.zip_code, "90210");
        assert_eq!(provider.phone.as_deref(), Some("3105550100"));
        assert_eq!(provider.specialty.as_deref(), Some("Internal Medicine"));
        assert_eq!(provider.city.as_deref(), Some("Beverly Hills"));
        assert_eq!(provider.state.as_deref(), Some("CA"));
        assert!(provider.registry_sourced);
    }

    #[test]
    fn test_non_doctor_credential_has_no_prefix() {
        let mut best = row(Some("SUNRISE PT"), None, None);
        best.cred = Some("PT".to_string());
        let provider = map_to_provider("1234567890", &best, Vec::new());
        assert_eq!(provider.name, "Sarah O'Neil");
        assert_eq!(provider.practice_name, "Sunrise Pt");
    }

    #[test]
    fn test_response_tolerates_null_fields() {
        let body: RegistryResponse = serde_json::from_str(
            r#"{"results": [{"provider_first_name": "ANA", "provider_last_name": null, "zip_code": "60601"}], "count": 1}"#,
        )
        .unwrap();
        assert_eq!(body.results.len(), 1);
        assert_eq!(body.results[0].zip5().as_deref(), Some("60601"));
    }
}
