use clap::Parser;
use error_common::{log_error, EngineError, Result};
use std::net::SocketAddr;
use tracing::info;

use voice_ops_server::{create_app, AppConfig, VoiceOpsServer};

/// Provider voice line HTTP server
#[derive(Parser, Debug)]
#[command(name = "voice-ops-server")]
#[command(about = "Voice-agent lookups, call webhooks and call records over HTTP")]
struct Args {
    /// Server bind address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(short, long, env = "PORT", default_value = "8000")]
    port: u16,

    /// Force debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = AppConfig::from_env()?;

    let _log_guard = logger_redacted::init(&config.logger_config(args.verbose))
        .map_err(|e| EngineError::LoggingError(e.to_string()))?;

    info!(
        env = ?config.env,
        api_prefix = %config.api_prefix,
        signature_policy = ?config.signature_policy,
        conversation_api = config.conversation_api.is_some(),
        seed_demo_data = config.seed_demo_data,
        "starting voice-ops-server"
    );

    let server = VoiceOpsServer::new(config).await.inspect_err(|e| log_error("startup", e))?;
    let app = create_app(server);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|e| EngineError::ConfigError(format!("invalid bind address: {e}")))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| EngineError::NetworkError(format!("failed to bind {addr}: {e}")))?;

    info!(address = %addr, "listening");
    axum::serve(listener, app)
        .await
        .map_err(|e| EngineError::ServerError(e.to_string()))?;

    Ok(())
}
