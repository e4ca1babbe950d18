// Logger configuration
use serde::{Deserialize, Serialize};

use crate::redactor::RedactionConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    pub redaction_enabled: bool,
    /// Emit short digests instead of masks for redacted values
    pub hash_for_correlation: bool,
    /// Default directive when `RUST_LOG` is unset
    pub log_level: String,
    /// JSON lines instead of human-readable output
    pub json_output: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            redaction_enabled: true,
            hash_for_correlation: false,
            log_level: "info".to_string(),
            json_output: false,
        }
    }
}

impl LoggerConfig {
    pub fn redaction(&self) -> RedactionConfig {
        if self.redaction_enabled {
            RedactionConfig {
                hash_for_correlation: self.hash_for_correlation,
                ..RedactionConfig::default()
            }
        } else {
            RedactionConfig::disabled()
        }
    }
}
