//! Unified error type for thermolink.
//!
//! Every fatal path out of the sample loop funnels into [`Error`]; the
//! binary maps it to a non-zero exit status.  Non-fatal per-iteration
//! failures never become an `Error`, they are reported as events.

use core::fmt;

use crate::app::ports::{AcquisitionError, DisplayError, TransportError};

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The sensor could not be opened or read.
    Sensor(AcquisitionError),
    /// The display could not be opened.
    Display(DisplayError),
    /// The transport session could not be established.
    Transport(TransportError),
    /// A configuration constant is invalid.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Display(e) => write!(f, "display: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<AcquisitionError> for Error {
    fn from(e: AcquisitionError) -> Self {
        Self::Sensor(e)
    }
}

impl From<DisplayError> for Error {
    fn from(e: DisplayError) -> Self {
        Self::Display(e)
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// A [`TelemetryConfig`](crate::config::TelemetryConfig) field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// MQTT 3.1.1 client identifiers are 1–23 characters.
    ClientId,
    /// Topic is empty or contains a wildcard.
    Topic,
    /// A timeout or interval is zero.
    ZeroDuration(&'static str),
    /// The sample interval would starve the keep-alive.
    KeepAlive,
    /// Scale factor is not a positive finite number.
    ScaleFactor,
    /// Sensor label is empty.
    SensorLabel,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientId => write!(f, "client id must be 1-23 characters"),
            Self::Topic => write!(f, "topic must be non-empty and wildcard-free"),
            Self::ZeroDuration(field) => write!(f, "{field} must be non-zero"),
            Self::KeepAlive => write!(f, "sample interval must be shorter than keep-alive"),
            Self::ScaleFactor => write!(f, "scale factor must be positive and finite"),
            Self::SensorLabel => write!(f, "sensor label must be non-empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

pub type Result<T> = core::result::Result<T, Error>;
