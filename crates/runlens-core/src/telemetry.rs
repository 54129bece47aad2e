//! Tracing initialisation for runlens binaries.
//!
//! Call [`init_tracing`] once at program start. Later calls are ignored
//! because the global subscriber can only be installed once per process.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines on stderr.
    #[default]
    Text,
    /// Newline-delimited JSON, for log aggregation.
    Json,
}

/// Filter used when `RUST_LOG` is unset: runlens crates at `level`, HTTP
/// internals held at `warn`.
pub fn default_filter(level: Level) -> String {
    format!("{},hyper=warn,reqwest=warn,rustls=warn", level.as_str().to_lowercase())
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `level`.
/// Logs go to stderr so stdout stays free for reports.
pub fn init_tracing(format: LogFormat, level: Level) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr).json())
            .try_init()
            .ok(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
            .ok(),
    };
}
