use base64::{engine::general_purpose, Engine as _};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static redaction pattern must compile")
}

lazy_static! {
    static ref NPI_REGEX: Regex = compile(r"\b\d{10}\b");
    static ref PHONE_REGEX: Regex =
        compile(r"\b(?:\+1[-.\s]?)?\(?([0-9]{3})\)?[-.\s]?([0-9]{3})[-.\s]?([0-9]{4})\b");
    static ref DOB_REGEX: Regex =
        compile(r"\b(?:19|20)\d{2}-\d{2}-\d{2}\b|\b\d{1,2}/\d{1,2}/(?:\d{4}|\d{2})\b");
    static ref MEMBER_ID_REGEX: Regex = compile(r"(?i)\bMBR-?\d+\b");
    static ref NAME_REGEX: Regex = compile(
        r"\b((?i:doctor|dr\.?|patient|member))\s+([A-Z][A-Za-z'\-]+(?:\s+[A-Z][A-Za-z'\-]+)?)"
    );
}

static GLOBAL_REDACTOR: OnceLock<PiiRedactor> = OnceLock::new();

/// PII redaction configuration
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub enabled: bool,
    pub redact_npis: bool,
    pub redact_phones: bool,
    pub redact_dates_of_birth: bool,
    pub redact_member_ids: bool,
    pub redact_names: bool,
    /// Replace with a short SHA-256 digest instead of a mask, so the same
    /// value can be followed across log lines
    pub hash_for_correlation: bool,
    pub custom_patterns: Vec<(Regex, String)>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            redact_npis: true,
            redact_phones: true,
            redact_dates_of_birth: true,
            redact_member_ids: true,
            redact_names: true,
            hash_for_correlation: false,
            custom_patterns: Vec::new(),
        }
    }
}

impl RedactionConfig {
    /// Pass-through configuration for local debugging
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// PII redactor for log messages and field values
pub struct PiiRedactor {
    config: RedactionConfig,
}

impl PiiRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    pub fn redact(&self, text: &str) -> String {
        if !self.config.enabled {
            return text.to_string();
        }

        let mut result = text.to_string();

        // NPIs first: a bare 10-digit run would otherwise be taken for a phone number
        if self.config.redact_npis {
            result = self.redact_npis(&result);
        }

        if self.config.redact_phones {
            result = self.mask_all(&PHONE_REGEX, &result, "PHONE", "(***) ***-****");
        }

        if self.config.redact_dates_of_birth {
            result = self.mask_all(&DOB_REGEX, &result, "DOB", "****-**-**");
        }

        if self.config.redact_member_ids {
            result = self.mask_all(&MEMBER_ID_REGEX, &result, "MBR", "MBR-******");
        }

        if self.config.redact_names {
            result = self.redact_names(&result);
        }

        for (pattern, replacement) in &self.config.custom_patterns {
            result = pattern.replace_all(&result, replacement.as_str()).to_string();
        }

        result
    }

    fn mask_all(&self, pattern: &Regex, text: &str, label: &str, mask: &str) -> String {
        pattern
            .replace_all(text, |caps: &Captures| {
                let matched = caps.get(0).map_or("", |m| m.as_str());
                if self.config.hash_for_correlation {
                    format!("{label}[{}]", self.hash_value(matched))
                } else {
                    mask.to_string()
                }
            })
            .to_string()
    }

    fn redact_npis(&self, text: &str) -> String {
        NPI_REGEX
            .replace_all(text, |caps: &Captures| {
                let npi = caps.get(0).map_or("", |m| m.as_str());
                if self.config.hash_for_correlation {
                    format!("NPI[{}]", self.hash_value(npi))
                } else {
                    let tail: String = npi.chars().skip(6).collect();
                    format!("******{tail}")
                }
            })
            .to_string()
    }

    fn redact_names(&self, text: &str) -> String {
        NAME_REGEX
            .replace_all(text, |caps: &Captures| {
                let honorific = caps.get(1).map_or("", |m| m.as_str());
                let name = caps.get(2).map_or("", |m| m.as_str());
                if self.config.hash_for_correlation {
                    format!("{honorific} NAME[{}]", self.hash_value(name))
                } else {
                    format!("{honorific} [NAME]")
                }
            })
            .to_string()
    }

    fn hash_value(&self, value: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(value.as_bytes());
        let digest = hasher.finalize();
        // First 8 bytes keep the tag short
        let prefix: Vec<u8> = digest.iter().take(8).copied().collect();
        general_purpose::STANDARD.encode(prefix)
    }
}

/// Install the process-wide redactor used by [`redact`].
///
/// Returns `false` when a redactor was already installed; the first one wins.
pub fn install_redactor(config: RedactionConfig) -> bool {
    GLOBAL_REDACTOR.set(PiiRedactor::new(config)).is_ok()
}

/// Redact a value with the process-wide redactor, defaulting to full masking
pub fn redact(text: &str) -> String {
    GLOBAL_REDACTOR
        .get_or_init(|| PiiRedactor::new(RedactionConfig::default()))
        .redact(text)
}
