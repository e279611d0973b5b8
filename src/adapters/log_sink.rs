//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).

use log::{debug, error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

fn opt(v: Option<f32>) -> OptFmt {
    OptFmt(v)
}

struct OptFmt(Option<f32>);

impl core::fmt::Display for OptFmt {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{:.1}", v),
            None => write!(f, "n/a"),
        }
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { interval_secs } => {
                info!("START | polling every {} s", interval_secs);
            }
            AppEvent::LinkLost => {
                warn!("NET | WiFi association lost, reconnecting");
            }
            AppEvent::LinkRestored { attempts } => {
                info!("NET | WiFi restored after {} attempt(s)", attempts);
            }
            AppEvent::LinkFailed(e) => {
                error!("NET | WiFi reconnect abandoned: {}", e);
            }
            AppEvent::TelemetryConnected { polls } => {
                info!("NET | telemetry connected after {} poll(s)", polls);
            }
            AppEvent::SensorSampled(s) if s.valid => {
                info!(
                    "SENSOR | T={:.1}\u{00b0}C | RH={:.1}%",
                    s.temperature, s.humidity
                );
            }
            AppEvent::SensorSampled(_) => {
                warn!("SENSOR | read failed, skipping publish");
            }
            AppEvent::WeatherFetched(r) => {
                info!(
                    "WEATHER | T={}\u{00b0}C | RH={}%",
                    opt(r.temperature),
                    opt(r.humidity)
                );
            }
            AppEvent::WeatherFailed(e) => {
                warn!("WEATHER | fetch failed: {}", e);
            }
            AppEvent::UpdatesDelivered(n) => {
                info!("NET | {} inbound update(s) delivered", n);
            }
            AppEvent::IterationComplete { iteration, body_ms } => {
                debug!("LOOP | iteration {} body took {} ms", iteration, body_ms);
            }
        }
    }
}
