//! Insurance lookups for the provider voice line
//!
//! Provides the synchronous lookups a voice agent performs mid-call:
//! - Provider authentication by NPI, with national-registry fallback
//! - Secondary provider verification by practice zip code
//! - Member eligibility and benefit coverage for a spoken service
//! - Claim status by claim number or by patient
//!
//! Every lookup takes raw speech-to-text input and answers with a
//! `found`/`valid`/`verified` flag plus a message the agent can read out;
//! unresolved input is never an error.

pub mod claims;
pub mod eligibility;
pub mod error;
pub mod models;
pub mod provider_auth;
pub mod registry;
pub mod repository;
pub mod requests;
pub mod resolver;
pub mod seed;
pub mod service;

pub use claims::*;
pub use eligibility::*;
pub use error::*;
pub use models::*;
pub use provider_auth::*;
pub use registry::*;
pub use repository::*;
pub use requests::*;
pub use resolver::*;
pub use seed::*;
pub use service::*;
