//! Logging initialisation for the caplink CLI.
//!
//! Installs a global `tracing` subscriber writing to `stderr`, so the
//! partition printed on `stdout` stays machine-readable, and bridges the `log`
//! facade into it.

use std::{env, ffi::OsString, str::FromStr, sync::OnceLock};

use thiserror::Error;
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, Layer, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Environment variable selecting the diagnostic format.
pub const LOG_FORMAT_ENV: &str = "CAPLINK_LOG_FORMAT";

const DEFAULT_FILTER: &str = "info";

static INITIALISED: OnceLock<()> = OnceLock::new();

/// Output format for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Human,
    /// One JSON object per event, including the span list.
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(LoggingError::UnsupportedFormat {
                provided: other.to_owned(),
            }),
        }
    }
}

impl LogFormat {
    /// Resolves the format from the raw value of [`LOG_FORMAT_ENV`].
    ///
    /// An absent variable selects [`LogFormat::Human`].
    ///
    /// # Errors
    /// Returns [`LoggingError`] when the value is not UTF-8 or names an
    /// unknown format.
    ///
    /// # Examples
    /// ```
    /// use caplink_cli::logging::LogFormat;
    ///
    /// assert_eq!(LogFormat::from_env_value(None)?, LogFormat::Human);
    /// assert_eq!(LogFormat::from_env_value(Some("JSON".into()))?, LogFormat::Json);
    /// # Ok::<(), caplink_cli::logging::LoggingError>(())
    /// ```
    pub fn from_env_value(raw: Option<OsString>) -> Result<Self, LoggingError> {
        let Some(raw) = raw else {
            return Ok(Self::default());
        };
        let text = raw
            .into_string()
            .map_err(|value| LoggingError::InvalidUnicode {
                name: LOG_FORMAT_ENV,
                value,
            })?;
        text.parse()
    }
}

/// Errors raised while initialising structured logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Environment variable contained invalid UTF-8 data.
    #[error("environment variable `{name}` contained invalid UTF-8: {value:?}")]
    InvalidUnicode {
        /// Name of the offending environment variable.
        name: &'static str,
        /// Raw value that failed to decode.
        value: OsString,
    },
    /// Unsupported log format requested via `CAPLINK_LOG_FORMAT`.
    #[error("unsupported log format `{provided}`; expected `human` or `json`")]
    UnsupportedFormat {
        /// Raw value supplied by the user.
        provided: String,
    },
    /// Failed to install the global tracing subscriber.
    #[error("failed to install tracing subscriber: {source}")]
    InstallFailed {
        /// Error raised by `tracing_subscriber`.
        #[source]
        source: tracing_subscriber::util::TryInitError,
    },
}

/// Installs global structured logging once per process.
///
/// `RUST_LOG` controls the filter (default `info`) and
/// `CAPLINK_LOG_FORMAT=human|json` the format. When another subscriber
/// already owns the global slot it is kept and this call succeeds.
///
/// # Errors
/// Returns [`LoggingError`] when `CAPLINK_LOG_FORMAT` is invalid.
pub fn init_logging() -> Result<(), LoggingError> {
    if INITIALISED.get().is_some() {
        return Ok(());
    }
    let format = LogFormat::from_env_value(env::var_os(LOG_FORMAT_ENV))?;
    match install_subscriber(format) {
        Ok(()) | Err(LoggingError::InstallFailed { .. }) => {}
        Err(err) => return Err(err),
    }
    INITIALISED.get_or_init(|| ());
    Ok(())
}

fn install_subscriber(format: LogFormat) -> Result<(), LoggingError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    let fmt_layer = match format {
        LogFormat::Human => fmt_layer.boxed(),
        LogFormat::Json => fmt_layer
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
    };

    // Another logger may already own the `log` slot; keep it if so.
    if LogTracer::init().is_err() {
        tracing::debug!("log facade already bridged");
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|source| LoggingError::InstallFailed { source })
}
