//! Tracing subscriber setup for the report binary.
//!
//! Logs go to stderr so the report path printed on stdout stays clean.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Configuration for the logging system.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogConfig {
    /// Output logs as JSON lines.
    pub json: bool,
    /// Default to DEBUG instead of INFO.
    pub verbose: bool,
}

impl LogConfig {
    fn default_level(self) -> Level {
        if self.verbose { Level::DEBUG } else { Level::INFO }
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the default level.
pub fn init(config: LogConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_level().as_str().to_lowercase()));

    if config.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_target(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .init();
    }
}
