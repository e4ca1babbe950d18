//! Logging for the voice line with PII redaction
//!
//! Callers speak identifiers out loud, so NPIs, dates of birth, member ids,
//! phone numbers and names after "Dr."/"patient" end up in request bodies and
//! transcripts. Anything logged at `info` or above goes through [`redact`]
//! first.
//!
//! # Example
//!
//! ```rust
//! use logger_redacted::{redact, PiiRedactor, RedactionConfig};
//!
//! let redactor = PiiRedactor::new(RedactionConfig::default());
//! assert_eq!(redactor.redact("npi 1234567890"), "npi ******7890");
//!
//! // Process-wide redactor, fully masking unless `init` configured otherwise
//! let masked = redact("patient John Smith");
//! assert!(!masked.contains("John"));
//! ```

pub mod config;
pub mod error;
pub mod redactor;
pub mod subscriber;

pub use config::*;
pub use error::*;
pub use redactor::*;
pub use subscriber::*;
