//! Speech-input normalization for the provider voice line
//!
//! Spoken identifiers arrive from speech-to-text already mangled: digits as
//! words ("five five five"), letters as their sounds ("cee ell em"), dates in
//! conversational form ("March fourth, eighty two"), nicknames instead of
//! legal names. Everything in this crate is a pure function over immutable
//! tables, so callers can normalize on any thread without setup.
//!
//! Functions that cannot produce a canonical value return `None` (or the
//! cleaned input, for claim numbers) instead of failing. Callers treat that
//! as "not found".
//!
//! # Example
//!
//! ```rust
//! use speech_normalizer::{normalize_digit_string, normalize_dob, normalize_service_phrase, ServiceKey};
//!
//! assert_eq!(normalize_digit_string("one two three four five"), "12345");
//! assert_eq!(normalize_dob("March 4th, 1982").as_deref(), Some("1982-03-04"));
//! assert_eq!(normalize_service_phrase("physio"), Some(ServiceKey::PhysicalTherapy));
//! ```

pub mod claim_number;
pub mod dates;
pub mod digits;
pub mod names;
pub mod service_phrase;
pub mod vocabulary;

pub use claim_number::*;
pub use dates::*;
pub use digits::*;
pub use names::*;
pub use service_phrase::*;
