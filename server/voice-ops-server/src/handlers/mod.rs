pub mod calls;
pub mod elevenlabs;
pub mod health;
pub mod voice;
pub mod webhooks;
