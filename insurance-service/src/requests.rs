use serde::{Deserialize, Deserializer};
use serde_json::Value;
use utoipa::ToSchema;

/// Voice agents send identifiers as strings, bare numbers, or empty strings
/// depending on the tool schema. Everything becomes a trimmed `Option<String>`.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let text = match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => return Ok(None),
    };
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AuthenticateNpiRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub npi: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct VerifyZipRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub npi: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct EligibilityRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub npi: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub patient_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub patient_dob: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub member_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub service_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ClaimsRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub npi: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub claim_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub patient_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub patient_dob: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date_of_service: Option<String>,
}
