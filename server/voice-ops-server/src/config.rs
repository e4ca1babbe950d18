use call_records::{ConversationApiConfig, RetryPolicy, DEFAULT_CONVERSATION_API_URL};
use error_common::{EngineError, Result};
use insurance_service::{RegistryConfig, DEFAULT_REGISTRY_URL};
use logger_redacted::LoggerConfig;
use std::str::FromStr;
use std::time::Duration;

use crate::signature::SignaturePolicy;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnv {
    #[default]
    Development,
    Staging,
    Production,
}

impl FromStr for AppEnv {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(AppEnv::Development),
            "staging" => Ok(AppEnv::Staging),
            "production" | "prod" => Ok(AppEnv::Production),
            other => Err(EngineError::ConfigError(format!("unknown APP_ENV '{other}'"))),
        }
    }
}

/// Server configuration, read once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: AppEnv,
    pub log_level: String,
    pub log_redaction: bool,
    /// Prefix for every versioned route, always starting with `/`
    pub api_prefix: String,
    pub cors_origins: Vec<String>,
    pub webhook_secret: Option<String>,
    pub signature_policy: SignaturePolicy,
    pub registry: RegistryConfig,
    /// `None` when no vendor API key is configured
    pub conversation_api: Option<ConversationApiConfig>,
    pub retry: RetryPolicy,
    pub seed_demo_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            env: AppEnv::Development,
            log_level: "info".to_string(),
            log_redaction: true,
            api_prefix: "/api/v1".to_string(),
            cors_origins: split_list(DEFAULT_CORS_ORIGINS),
            webhook_secret: None,
            signature_policy: SignaturePolicy::LogOnly,
            registry: RegistryConfig::default(),
            conversation_api: None,
            retry: RetryPolicy::default(),
            seed_demo_data: true,
        }
    }
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self> {
        // A missing .env file is normal outside development
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset and blank keys take their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let env = get("APP_ENV").map(|v| v.parse::<AppEnv>()).transpose()?.unwrap_or(defaults.env);
        let signature_policy = get("WEBHOOK_SIGNATURE_POLICY")
            .map(|v| v.parse::<SignaturePolicy>())
            .transpose()?
            .unwrap_or(defaults.signature_policy);

        let registry = RegistryConfig {
            url: get("NPI_REGISTRY_URL").unwrap_or_else(|| DEFAULT_REGISTRY_URL.to_string()),
            timeout: Duration::from_secs(parse_number(&get, "NPI_REGISTRY_TIMEOUT_SECS", 12)?),
            ..defaults.registry
        };

        let conversation_api = get("ELEVENLABS_API_KEY").map(|api_key| ConversationApiConfig {
            base_url: get("ELEVENLABS_API_URL").unwrap_or_else(|| DEFAULT_CONVERSATION_API_URL.to_string()),
            api_key,
            ..ConversationApiConfig::default()
        });

        let retry = RetryPolicy {
            max_attempts: parse_number(&get, "CONVERSATION_FETCH_MAX_ATTEMPTS", 5)?,
            base_delay: Duration::from_millis(parse_number(&get, "CONVERSATION_FETCH_BASE_DELAY_MS", 1000)?),
            max_delay: Duration::from_millis(parse_number(&get, "CONVERSATION_FETCH_MAX_DELAY_MS", 8000)?),
        };

        Ok(Self {
            env,
            log_level: get("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_redaction: parse_flag(&get, "LOG_REDACTION", defaults.log_redaction)?,
            api_prefix: normalize_prefix(get("API_V1_PREFIX").as_deref().unwrap_or(&defaults.api_prefix)),
            cors_origins: get("CORS_ALLOWED_ORIGINS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.cors_origins),
            webhook_secret: get("BLAND_WEBHOOK_SECRET"),
            signature_policy,
            registry,
            conversation_api,
            retry,
            seed_demo_data: parse_flag(&get, "SEED_DEMO_DATA", defaults.seed_demo_data)?,
        })
    }

    /// Logger settings; `verbose` forces debug output
    pub fn logger_config(&self, verbose: bool) -> LoggerConfig {
        LoggerConfig {
            redaction_enabled: self.log_redaction,
            log_level: if verbose { "debug".to_string() } else { self.log_level.clone() },
            json_output: self.env == AppEnv::Production,
            ..LoggerConfig::default()
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize_prefix(value: &str) -> String {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn parse_number<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| EngineError::ConfigError(format!("{key} must be a number, got '{raw}'"))),
        None => Ok(default),
    }
}

fn parse_flag<G>(get: &G, key: &str, default: bool) -> Result<bool>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key).map(|v| v.to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => Err(EngineError::ConfigError(format!("{key} must be true or false, got '{v}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.env, AppEnv::Development);
        assert_eq!(config.api_prefix, "/api/v1");
        assert_eq!(config.cors_origins.len(), 2);
        assert_eq!(config.signature_policy, SignaturePolicy::LogOnly);
        assert!(config.conversation_api.is_none());
        assert_eq!(config.retry, RetryPolicy::default());
        assert!(config.seed_demo_data);
        assert!(!config.logger_config(false).json_output);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("APP_ENV", "production"),
            ("API_V1_PREFIX", "api/v2/"),
            ("WEBHOOK_SIGNATURE_POLICY", "reject"),
            ("BLAND_WEBHOOK_SECRET", "s3cret"),
            ("ELEVENLABS_API_KEY", "xi-key"),
            ("CONVERSATION_FETCH_MAX_ATTEMPTS", "3"),
            ("SEED_DEMO_DATA", "false"),
            ("NPI_REGISTRY_TIMEOUT_SECS", "4"),
        ])
        .unwrap();
        assert_eq!(config.api_prefix, "/api/v2");
        assert_eq!(config.signature_policy, SignaturePolicy::Reject);
        assert_eq!(config.webhook_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.conversation_api.as_ref().unwrap().api_key, "xi-key");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.registry.timeout, Duration::from_secs(4));
        assert!(!config.seed_demo_data);
        assert_eq!(config.logger_config(true).log_level, "debug");
    }

    #[test]
    fn test_bad_values_are_config_errors() {
        assert!(matches!(
            load(&[("CONVERSATION_FETCH_MAX_ATTEMPTS", "many")]),
            Err(EngineError::ConfigError(_))
        ));
        assert!(matches!(load(&[("APP_ENV", "moon")]), Err(EngineError::ConfigError(_))));
        assert!(matches!(load(&[("LOG_REDACTION", "maybe")]), Err(EngineError::ConfigError(_))));
    }
}
