//! The station's polling loop.
//!
//! ```text
//!   start ─▶ connect telemetry ─▶ subscribe fire ─▶ request last fire
//!
//!   link  ─▶ tick ─▶ pump ─▶ sensor ─▶ weather ─▶ sleep(interval) ─┐
//!     ▲                                                            │
//!     └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Scheduling is fixed-delay: the whole interval is slept after the body,
//! so the period drifts by however long the body took.

use log::info;

use super::events::AppEvent;
use crate::adapters::wifi::{ConnectivityPort, LINK_RETRY_MS, connect_blocking};
use super::ports::{ClockPort, EventSink, HttpPort, SensorPort, TelemetryPort};
use crate::config::DeviceConfig;
use crate::telemetry::feeds::{Feed, FeedValue};
use crate::telemetry::{FeedHandler, TelemetryChannel};
use crate::weather::WeatherClient;

pub struct MainLoop<S, H, T, C> {
    config: DeviceConfig,
    sensor: S,
    weather: WeatherClient<H>,
    telemetry: TelemetryChannel<T>,
    clock: C,
    iteration: u64,
}

impl<S, H, T, C> MainLoop<S, H, T, C>
where
    S: SensorPort,
    H: HttpPort,
    T: TelemetryPort,
    C: ClockPort,
{
    pub fn new(config: DeviceConfig, sensor: S, http: H, transport: T, clock: C) -> Self {
        Self {
            config,
            sensor,
            weather: WeatherClient::new(http),
            telemetry: TelemetryChannel::new(transport),
            clock,
            iteration: 0,
        }
    }

    /// Bring the telemetry session up and wire `alarm` to the `fire` feed.
    ///
    /// Blocks until the broker is reachable.
    pub fn start(
        &mut self,
        alarm: impl FeedHandler + 'static,
        sink: &mut impl EventSink,
    ) -> crate::error::Result<()> {
        sink.emit(&AppEvent::Started {
            interval_secs: self.config.poll_interval_seconds,
        });

        let polls = self.telemetry.connect(&mut self.clock);
        sink.emit(&AppEvent::TelemetryConnected { polls });

        self.telemetry.subscribe_on_change(Feed::Fire, Box::new(alarm))?;
        if self.config.sync_fire_on_start {
            self.telemetry.request_current(Feed::Fire);
        }
        Ok(())
    }

    /// Re-associate `link` if it dropped since the last iteration.  Blocks
    /// until the AP answers, like the boot-time connect.
    pub fn maintain_link(&mut self, link: &mut impl ConnectivityPort, sink: &mut impl EventSink) {
        if link.is_connected() {
            return;
        }
        sink.emit(&AppEvent::LinkLost);
        match connect_blocking(link, &mut self.clock, LINK_RETRY_MS) {
            Ok(attempts) => sink.emit(&AppEvent::LinkRestored { attempts }),
            Err(e) => sink.emit(&AppEvent::LinkFailed(e)),
        }
    }

    /// One loop iteration, including the trailing sleep.
    pub fn tick(&mut self, sink: &mut impl EventSink) {
        let started = self.clock.uptime_ms();

        let delivered = self.telemetry.pump();
        if delivered > 0 {
            sink.emit(&AppEvent::UpdatesDelivered(delivered));
        }

        let sample = self.sensor.read();
        sink.emit(&AppEvent::SensorSampled(sample));
        if sample.valid {
            self.telemetry.publish(Feed::Temperature, FeedValue::Float(sample.temperature));
            self.telemetry.publish(Feed::Humidity, FeedValue::Float(sample.humidity));
        }

        match self.weather.fetch(&self.config.weather_endpoint) {
            Ok(report) => {
                sink.emit(&AppEvent::WeatherFetched(report));
                if let Some(t) = report.temperature {
                    self.telemetry.publish(Feed::ApiTemp, FeedValue::Float(t));
                }
                if let Some(h) = report.humidity {
                    self.telemetry.publish(Feed::ApiHumidity, FeedValue::Float(h));
                }
            }
            Err(e) => sink.emit(&AppEvent::WeatherFailed(e)),
        }

        self.iteration += 1;
        let body_ms = self.clock.uptime_ms().saturating_sub(started);
        sink.emit(&AppEvent::IterationComplete {
            iteration: self.iteration,
            body_ms,
        });

        self.clock.sleep_ms(self.config.poll_interval_ms());
    }

    /// Run forever, checking `link` before every iteration.
    pub fn run(mut self, link: &mut impl ConnectivityPort, sink: &mut impl EventSink) -> ! {
        info!(
            "Main loop running, {} s between iterations",
            self.config.poll_interval_seconds
        );
        loop {
            self.maintain_link(link, sink);
            self.tick(sink);
        }
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn telemetry(&self) -> &TelemetryChannel<T> {
        &self.telemetry
    }

    pub fn telemetry_mut(&mut self) -> &mut TelemetryChannel<T> {
        &mut self.telemetry
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn weather(&self) -> &WeatherClient<H> {
        &self.weather
    }
}
