use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggerConfig;
use crate::error::{LoggerError, LoggerResult};
use crate::redactor::install_redactor;

/// Install the global subscriber and the process-wide redactor.
///
/// `RUST_LOG` overrides `config.log_level`. Output goes through a
/// non-blocking stdout writer; keep the returned guard alive for the life
/// of the process or buffered lines are lost on exit.
pub fn init(config: &LoggerConfig) -> LoggerResult<WorkerGuard> {
    install_redactor(config.redaction());

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .map_err(|e| LoggerError::Filter(e.to_string()))?,
    };

    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if config.json_output {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .with_writer(writer)
                    .json(),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(writer),
            )
            .try_init()
    };
    result.map_err(|e| LoggerError::AlreadyInitialised(e.to_string()))?;

    Ok(guard)
}
