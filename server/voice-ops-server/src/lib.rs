//! Voice Ops Server - HTTP API for the provider voice line
//!
//! Serves the voice-agent lookups, the vendor post-call webhooks, browser
//! conversation saves and the call-record read/flag endpoints.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod signature;

pub use config::{AppConfig, AppEnv};
pub use error::*;
pub use server::VoiceOpsServer;
pub use signature::{SignaturePolicy, WebhookVerifier};

use axum::{middleware::from_fn, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the main application router with all routes and middleware
pub fn create_app(server: VoiceOpsServer) -> Router {
    routes::create_routes(&server.config.api_prefix)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::create_cors_layer(&server.config.cors_origins))
                .layer(from_fn(middleware::request_timing_middleware)),
        )
        .with_state(server)
}
