//! # Bloom Telemetry
//!
//! Logging bootstrap shared by the workspace binaries.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bloom_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let _handle = init_telemetry(TelemetryConfig::from_env()).expect("Failed to init telemetry");
//!     tracing::info!("ready");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `BLOOM_SERVICE_NAME` | `scalable-bloom` | Service name in the startup log |
//! | `BLOOM_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `BLOOM_CONSOLE_OUTPUT` | `true` | Write logs to stderr |
//! | `BLOOM_JSON_LOGS` | `false` | JSON formatted logs |
//! | `NO_COLOR` | unset | Disable ANSI colours |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{build_filter, init_logging, LoggingHandle};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging for a binary.
///
/// Returns a handle describing the installed subscriber.
pub fn init_telemetry(config: TelemetryConfig) -> Result<LoggingHandle, TelemetryError> {
    let handle = init_logging(&config)?;
    tracing::info!(service = %config.service_name, "Telemetry initialized");
    Ok(handle)
}

/// Convenience macro for creating a span tagged with the filter kind.
///
/// # Example
///
/// ```rust,ignore
/// let _span = bloom_telemetry::filter_span!("calibrate", kind = "scalable", sample_size = 10_000).entered();
/// ```
#[macro_export]
macro_rules! filter_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}
