//! HMAC-SHA256 verification for vendor webhooks
//!
//! The vendor signs the raw request body with the shared secret and sends the
//! hex digest in [`SIGNATURE_HEADER`]. What happens on a bad or missing
//! signature is decided by [`SignaturePolicy`].

use error_common::{EngineError, Result};
use ring::hmac;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::ApiError;

pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignaturePolicy {
    /// Never check
    Disabled,
    /// Check and log mismatches, then process the delivery anyway
    #[default]
    LogOnly,
    /// Refuse deliveries without a valid signature
    Reject,
}

impl FromStr for SignaturePolicy {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "disabled" | "off" => Ok(SignaturePolicy::Disabled),
            "log_only" | "log-only" | "log" => Ok(SignaturePolicy::LogOnly),
            "reject" | "enforce" => Ok(SignaturePolicy::Reject),
            other => Err(EngineError::ConfigError(format!(
                "unknown WEBHOOK_SIGNATURE_POLICY '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureCheck {
    /// Policy disabled or no secret configured
    Skipped,
    Valid,
    Missing,
    Mismatch,
}

pub struct WebhookVerifier {
    key: Option<hmac::Key>,
    policy: SignaturePolicy,
}

impl WebhookVerifier {
    pub fn new(secret: Option<&str>, policy: SignaturePolicy) -> Self {
        let key = secret
            .filter(|s| !s.is_empty())
            .map(|s| hmac::Key::new(hmac::HMAC_SHA256, s.as_bytes()));
        Self { key, policy }
    }

    pub fn policy(&self) -> SignaturePolicy {
        self.policy
    }

    pub fn check(&self, signature: Option<&str>, body: &[u8]) -> SignatureCheck {
        let Some(key) = self.key.as_ref().filter(|_| self.policy != SignaturePolicy::Disabled) else {
            return SignatureCheck::Skipped;
        };
        let Some(signature) = signature.map(str::trim).filter(|s| !s.is_empty()) else {
            return SignatureCheck::Missing;
        };
        match hex::decode(signature) {
            Ok(tag) if hmac::verify(key, body, &tag).is_ok() => SignatureCheck::Valid,
            _ => SignatureCheck::Mismatch,
        }
    }

    /// Apply the policy to one delivery
    pub fn enforce(&self, signature: Option<&str>, body: &[u8]) -> std::result::Result<SignatureCheck, ApiError> {
        let check = self.check(signature, body);
        match (check, self.policy) {
            (SignatureCheck::Missing, SignaturePolicy::Reject) => {
                warn!("webhook rejected: signature header missing");
                Err(ApiError::signature_missing())
            }
            (SignatureCheck::Mismatch, SignaturePolicy::Reject) => {
                warn!("webhook rejected: signature mismatch");
                Err(ApiError::signature_mismatch())
            }
            (SignatureCheck::Mismatch, _) => {
                warn!("webhook signature mismatch, processing anyway");
                Ok(check)
            }
            (SignatureCheck::Missing, _) => {
                debug!("webhook arrived without a signature header");
                Ok(check)
            }
            _ => Ok(check),
        }
    }
}

/// Hex HMAC-SHA256 of `body`, as the vendor computes it
pub fn sign(secret: &str, body: &[u8]) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    hex::encode(hmac::sign(&key, body).as_ref())
}
