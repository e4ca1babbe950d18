//! Call records for the provider voice line
//!
//! Vendors deliver the same call more than once: partial webhooks while the
//! call runs, retries, duplicate fires, and late post-call analysis. This
//! crate decodes each vendor shape into a [`CallDelivery`], extracts facts
//! from tool calls and the spoken transcript, classifies the call, and
//! reconciles every delivery into one [`CallRecord`] per `call_id` without
//! ever losing content a previous delivery supplied.

pub mod conversation_api;
pub mod delivery;
pub mod error;
pub mod extraction;
pub mod facts;
pub mod ingest;
pub mod models;
pub mod payloads;
pub mod reconciler;
pub mod repository;

pub use conversation_api::*;
pub use delivery::{CallDelivery, DeliveryAnalysis};
pub use error::*;
pub use facts::*;
pub use ingest::*;
pub use models::*;
pub use payloads::*;
pub use reconciler::*;
pub use repository::*;
