//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MainLoop / AlarmController (domain)
//! ```
//!
//! Driven adapters (sensor, buzzer, HTTP, MQTT, clock, event sinks)
//! implement these traits.  The domain consumes them via generics, so the
//! loop never touches hardware or sockets directly.

use crate::error::{HttpError, TelemetryError};
use crate::sensors::Sample;
use crate::telemetry::feeds::{Feed, FeedUpdate};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: one temperature/humidity sample per call.
pub trait SensorPort {
    /// Read the sensor.  Failures are reported as an invalid [`Sample`],
    /// never as a panic; no retry is attempted.
    fn read(&mut self) -> Sample;
}

// ───────────────────────────────────────────────────────────────
// Alarm actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Binary audible actuator.
pub trait AlarmActuator {
    /// Start sounding at `hz`.
    fn tone_on(&mut self, hz: u32);

    /// Silence the actuator.
    fn tone_off(&mut self);

    fn is_sounding(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// HTTP port (driven adapter: domain → network)
// ───────────────────────────────────────────────────────────────

/// A complete HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Single-shot HTTP GET.  Each call opens and closes its own connection.
pub trait HttpPort {
    fn get(&mut self, url: &str) -> Result<HttpResponse, HttpError>;
}

// ───────────────────────────────────────────────────────────────
// Telemetry transport port (driven adapter: domain ↔ cloud broker)
// ───────────────────────────────────────────────────────────────

/// Raw pub/sub transport underneath [`TelemetryChannel`](crate::telemetry::TelemetryChannel).
pub trait TelemetryPort {
    /// Start (or restart) the broker session.  Non-blocking: the session
    /// may come up later, observable via [`is_connected`](Self::is_connected).
    fn open(&mut self) -> Result<(), TelemetryError>;

    fn is_connected(&self) -> bool;

    /// Enqueue a publish.  No acknowledgement is awaited.
    fn send(&mut self, feed: Feed, payload: &str) -> Result<(), TelemetryError>;

    fn subscribe(&mut self, feed: Feed) -> Result<(), TelemetryError>;

    /// Ask the service to resend the last stored value of `feed`.
    fn request_last(&mut self, feed: Feed) -> Result<(), TelemetryError>;

    /// Next queued inbound update, in arrival order.
    fn next_inbound(&mut self) -> Option<FeedUpdate>;

    /// Service keep-alives / connection health.  Called once per pump.
    fn keep_alive(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time and blocking delay.
pub trait ClockPort {
    /// Milliseconds since boot.
    fn uptime_ms(&self) -> u64;

    fn sleep_ms(&mut self, ms: u64);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
