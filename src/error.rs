//! Unified error types for the FireWatch firmware.
//!
//! Every subsystem has a small `Copy` error enum.  The top-level [`Error`]
//! covers what can fail inside `MainLoop::start`.  Runtime failures in the
//! polling loop (sensor, weather, publish) never reach it: they are logged
//! and the affected metric is skipped for that cycle.

use core::fmt;

use crate::config::ConfigError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Station start-up failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The cloud telemetry transport failed.
    Telemetry(TelemetryError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Telemetry(e) => write!(f, "telemetry: {e}"),
        }
    }
}

impl core::error::Error for Error {}

impl core::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The sensor did not drive the expected edge in time.
    Timeout,
    /// Frame checksum did not match the data bytes.
    Checksum,
    /// Decoded value is outside the sensor's physical range.
    OutOfRange,
    /// GPIO read/write returned an error.
    Pin,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timed out waiting for sensor"),
            Self::Checksum => write!(f, "checksum mismatch"),
            Self::OutOfRange => write!(f, "reading out of range"),
            Self::Pin => write!(f, "GPIO access failed"),
        }
    }
}

impl core::error::Error for SensorError {}

// ---------------------------------------------------------------------------
// HTTP / weather errors
// ---------------------------------------------------------------------------

/// Transport-level failure of a single HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpError {
    /// Could not open the connection (DNS, TCP or TLS).
    Connect,
    /// The request or response stream failed mid-way.
    Io,
    /// The response body exceeded the read buffer.
    BodyTooLarge,
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connection failed"),
            Self::Io => write!(f, "I/O error"),
            Self::BodyTooLarge => write!(f, "response body too large"),
        }
    }
}

impl core::error::Error for HttpError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherError {
    /// The request never produced a response.
    Transport(HttpError),
    /// The server answered with something other than 200.
    Status(u16),
    /// The response body was larger than we are willing to buffer.
    BodyTooLarge,
    /// The body was not the expected JSON document.
    Parse,
}

impl fmt::Display for WeatherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Status(code) => write!(f, "HTTP status {code}"),
            Self::BodyTooLarge => write!(f, "response body too large"),
            Self::Parse => write!(f, "JSON parse error"),
        }
    }
}

impl core::error::Error for WeatherError {}

impl From<HttpError> for WeatherError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::BodyTooLarge => Self::BodyTooLarge,
            other => Self::Transport(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Telemetry errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryError {
    /// The broker session is not up.
    NotConnected,
    /// The client library rejected the operation.
    Transport,
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected"),
            Self::Transport => write!(f, "transport error"),
        }
    }
}

impl core::error::Error for TelemetryError {}

impl From<TelemetryError> for Error {
    fn from(e: TelemetryError) -> Self {
        Self::Telemetry(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
