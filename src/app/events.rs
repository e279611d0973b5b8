//! Outbound application events.
//!
//! The [`MainLoop`](super::main_loop::MainLoop) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (log to serial, count them in a
//! test).

use crate::adapters::wifi::ConnectivityError;
use crate::error::WeatherError;
use crate::sensors::Sample;
use crate::weather::WeatherReport;

/// Structured events emitted by the main loop.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The loop has started (carries the configured delay).
    Started { interval_secs: u32 },

    /// The WiFi association was found down before an iteration.
    LinkLost,

    /// The association is back after this many attempts.
    LinkRestored { attempts: u32 },

    /// Re-association was abandoned; the iteration runs offline.
    LinkFailed(ConnectivityError),

    /// The broker session came up.
    TelemetryConnected { polls: u32 },

    /// A local sensor read finished (valid or not).
    SensorSampled(Sample),

    /// A weather fetch succeeded; either value may still be absent.
    WeatherFetched(WeatherReport),

    /// A weather fetch failed and was skipped for this cycle.
    WeatherFailed(WeatherError),

    /// `pump()` delivered this many inbound feed updates.
    UpdatesDelivered(usize),

    /// One iteration body finished; the loop is about to sleep.
    IterationComplete { iteration: u64, body_ms: u64 },
}
