//! Common error handling for the voice operations engine
//!
//! `EngineError` covers process-level failures (configuration, logging
//! setup, binding, serving). Library crates keep their own error enums;
//! the HTTP layer maps everything onto the stable codes in [`codes`].
//!
//! # Example
//!
//! ```rust
//! use error_common::{codes, EngineError};
//!
//! let error = EngineError::ConfigError("PORT is not a number".to_string());
//! assert_eq!(error.code(), codes::internal::CONFIGURATION);
//! ```

pub mod codes;
pub mod types;

pub use types::*;
