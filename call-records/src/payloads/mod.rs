//! Vendor webhook and conversation payloads

pub mod bland;
pub mod elevenlabs;

pub use bland::{BlandTranscriptEntry, BlandWebhookPayload};
pub use elevenlabs::{
    call_id_for, ConversationAnalysis, ConversationDetail, ConversationMetadata, PostCallWebhook,
    PostedTranscriptEntry, RawTranscriptEntry, SaveConversationRequest,
};
