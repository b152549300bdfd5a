//! Subscriber setup for applications built on roadcli.
//!
//! The framework itself only emits `tracing` events (token scanning at
//! `trace`, dropped options and delegation at `debug`); installing a
//! subscriber is left to the application.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting [`TracingFormat`].
pub const FORMAT_ENV: &str = "ROADCLI_LOG_FORMAT";

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TracingFormat {
    /// Multi-line, human-readable.
    Pretty,

    /// One line per event (default).
    #[default]
    Compact,

    /// Newline-delimited JSON.
    Json,
}

impl TracingFormat {
    /// Parse `pretty`, `compact` or `json` (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "compact" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Tracing configuration.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Log level filter.
    ///
    /// If None, uses RUST_LOG or falls back to `warn`, keeping CLI output clean.
    pub level: Option<tracing::Level>,

    pub format: TracingFormat,

    pub timestamps: bool,

    /// Include target module names in output.
    pub target: bool,

    /// Log span close events with their timings.
    pub span_timings: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: None,
            format: TracingFormat::Compact,
            timestamps: false,
            target: true,
            span_timings: false,
        }
    }
}

impl TracingConfig {
    /// Defaults, with the format taken from `ROADCLI_LOG_FORMAT` when it is set
    /// to a known name.
    pub fn from_env() -> Self {
        let format = std::env::var(FORMAT_ENV)
            .ok()
            .and_then(|name| TracingFormat::from_name(&name))
            .unwrap_or_default();
        Self {
            format,
            ..Self::default()
        }
    }

    fn filter(&self) -> EnvFilter {
        match self.level {
            Some(level) => EnvFilter::new(level.to_string()),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        }
    }

    fn layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let spans = if self.span_timings {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };
        let base = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(self.target)
            .with_span_events(spans);

        match (self.format, self.timestamps) {
            (TracingFormat::Pretty, true) => base.pretty().boxed(),
            (TracingFormat::Pretty, false) => base.pretty().without_time().boxed(),
            (TracingFormat::Compact, true) => base.compact().boxed(),
            (TracingFormat::Compact, false) => base.compact().without_time().boxed(),
            (TracingFormat::Json, true) => base.json().boxed(),
            (TracingFormat::Json, false) => base.json().without_time().boxed(),
        }
    }
}

/// Install a subscriber configured from the environment.
///
/// Logs go to stderr so they never mix with command output. Returns an error
/// if a global subscriber is already installed.
///
/// # Environment Variables
///
/// - `RUST_LOG=debug` - show dropped options and subcommand delegation
/// - `RUST_LOG=roadcli=trace` - show every scanned token
/// - `ROADCLI_LOG_FORMAT=json` - machine-readable output
pub fn init_subscriber() -> Result<(), TryInitError> {
    init_subscriber_with_config(TracingConfig::from_env())
}

/// Install a subscriber with explicit settings.
pub fn init_subscriber_with_config(config: TracingConfig) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(config.layer())
        .with(config.filter())
        .try_init()
}
