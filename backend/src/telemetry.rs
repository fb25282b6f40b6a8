//! Tracing subscriber setup.

use std::fmt;
use std::str::FromStr;

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt as subscriber_fmt};

/// Output format for log events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Human-readable multi-line output for local runs.
    Pretty,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a log format name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log format {value:?}; expected \"json\" or \"pretty\"")]
pub struct ParseLogFormatError {
    value: String,
}

impl FromStr for LogFormat {
    type Err = ParseLogFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            _ => Err(ParseLogFormatError {
                value: s.to_owned(),
            }),
        }
    }
}

/// Install the global fmt subscriber filtered by `RUST_LOG`.
///
/// A subscriber installed earlier wins; the failure is logged and otherwise
/// ignored, so tests and embedders may call this repeatedly.
pub fn init_tracing(format: LogFormat) {
    let builder = subscriber_fmt().with_env_filter(EnvFilter::from_default_env());
    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };

    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}
