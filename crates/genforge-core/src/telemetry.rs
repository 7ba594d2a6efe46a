//! Tracing setup for GenForge hosts and tests.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Output shape of the global subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines for terminals.
    Text,
    /// Newline-delimited JSON for log aggregation.
    Json,
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise every `genforge` crate logs at
/// `default_level`. Calling this more than once is harmless — only the
/// first call takes effect.
pub fn init_tracing(format: LogFormat, default_level: Level) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,genforge_core={level},genforge_validate={level},genforge_jobs={level}",
            level = default_level.as_str().to_ascii_lowercase()
        ))
    });

    let base = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => base
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok(),
        LogFormat::Text => base
            .with(fmt::layer().with_target(false))
            .try_init()
            .ok(),
    };
}

/// Test helper: text output at debug, ignoring repeat installs across
/// test binaries.
pub fn init_for_tests() {
    init_tracing(LogFormat::Text, Level::DEBUG);
}
