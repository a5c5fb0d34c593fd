//! Logging initialization
//!
//! - Json: structured logs for log aggregation systems
//! - Pretty: colorful, human-readable logs for development
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! the embedding binary.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    /// Json for `production`/`prod`, Pretty for anything else
    pub fn for_environment(environment: &str) -> Self {
        match environment.to_ascii_lowercase().as_str() {
            "production" | "prod" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default `info` filter.
pub fn init_logging(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true)
                        .with_writer(std::io::stdout),
                )
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true)
                        .with_ansi(true)
                        .with_writer(std::io::stdout),
                )
                .init();
        }
    }
}
