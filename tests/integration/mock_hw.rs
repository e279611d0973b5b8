//! Mock adapters for integration tests.
//!
//! Each mock records what the domain asked of it so tests can assert on
//! the full history without touching GPIO, sockets or the real clock.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

use firewatch::app::events::AppEvent;
use firewatch::app::ports::{
    AlarmActuator, ClockPort, EventSink, HttpPort, HttpResponse, SensorPort, TelemetryPort,
};
use firewatch::config::DeviceConfig;
use firewatch::error::{HttpError, TelemetryError};
use firewatch::events::InboundQueue;
use firewatch::sensors::Sample;
use firewatch::telemetry::feeds::{Feed, FeedUpdate};

pub const WEATHER_OK: &[u8] = br#"{"current_weather":{"temperature":18.4},"hourly":{"relativehumidity_2m":[41,42,55]}}"#;

pub fn test_config() -> DeviceConfig {
    DeviceConfig {
        cloud_username: "ranger".into(),
        cloud_key: "aio_test_key".into(),
        network_ssid: "Lookout".into(),
        network_password: "tower-wifi".into(),
        ..DeviceConfig::default()
    }
}

// ── Clock ─────────────────────────────────────────────────────

/// Virtual clock.  Shared so other mocks can charge time to it.
#[derive(Clone, Default)]
pub struct FakeClock {
    now_ms: Rc<Cell<u64>>,
    sleeps: Rc<RefCell<Vec<u64>>>,
}

impl FakeClock {
    pub fn advance(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }

    pub fn sleeps(&self) -> Vec<u64> {
        self.sleeps.borrow().clone()
    }
}

impl ClockPort for FakeClock {
    fn uptime_ms(&self) -> u64 {
        self.now_ms.get()
    }

    fn sleep_ms(&mut self, ms: u64) {
        self.sleeps.borrow_mut().push(ms);
        self.advance(ms);
    }
}

// ── Sensor ────────────────────────────────────────────────────

/// Plays back a script of samples; repeats the last one when exhausted.
pub struct ScriptedSensor {
    script: VecDeque<Sample>,
    last: Sample,
    pub reads: u32,
}

impl ScriptedSensor {
    pub fn new(samples: &[Sample]) -> Self {
        Self {
            script: samples.iter().copied().collect(),
            last: Sample::invalid(),
            reads: 0,
        }
    }

    pub fn steady(temperature: f32, humidity: f32) -> Self {
        Self::new(&[Sample::new(temperature, humidity)])
    }
}

impl SensorPort for ScriptedSensor {
    fn read(&mut self) -> Sample {
        self.reads += 1;
        if let Some(s) = self.script.pop_front() {
            self.last = s;
        }
        self.last
    }
}

// ── HTTP ──────────────────────────────────────────────────────

/// Answers every GET with the same canned result, optionally charging
/// `latency_ms` to a shared clock.
pub struct CannedHttp {
    response: Result<HttpResponse, HttpError>,
    latency: Option<(FakeClock, u64)>,
    pub urls: Vec<String>,
}

impl CannedHttp {
    pub fn ok(body: &[u8]) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: &[u8]) -> Self {
        Self {
            response: Ok(HttpResponse {
                status,
                body: body.to_vec(),
            }),
            latency: None,
            urls: Vec::new(),
        }
    }

    pub fn failing(err: HttpError) -> Self {
        Self {
            response: Err(err),
            latency: None,
            urls: Vec::new(),
        }
    }

    pub fn with_latency(mut self, clock: &FakeClock, ms: u64) -> Self {
        self.latency = Some((clock.clone(), ms));
        self
    }
}

impl HttpPort for CannedHttp {
    fn get(&mut self, url: &str) -> Result<HttpResponse, HttpError> {
        self.urls.push(url.to_string());
        if let Some((clock, ms)) = &self.latency {
            clock.advance(*ms);
        }
        self.response.clone()
    }
}

// ── Actuator ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneCall {
    On(u32),
    Off,
}

/// Buzzer whose call log survives being boxed into the telemetry channel.
#[derive(Clone, Default)]
pub struct RecordingBuzzer {
    pub calls: Rc<RefCell<Vec<ToneCall>>>,
}

impl AlarmActuator for RecordingBuzzer {
    fn tone_on(&mut self, hz: u32) {
        self.calls.borrow_mut().push(ToneCall::On(hz));
    }

    fn tone_off(&mut self) {
        self.calls.borrow_mut().push(ToneCall::Off);
    }

    fn is_sounding(&self) -> bool {
        matches!(self.calls.borrow().last(), Some(ToneCall::On(_)))
    }
}

// ── Telemetry transport ───────────────────────────────────────

/// In-memory broker.  Inbound updates are injected through the shared
/// [`InboundQueue`], the same way the MQTT event thread delivers them.
pub struct MockTransport {
    pub inbound: Arc<InboundQueue>,
    /// `open` calls needed before the session reports connected.
    opens_needed: u32,
    pub opens: u32,
    connected: bool,
    pub fail_sends: bool,
    pub sent: Vec<(Feed, String)>,
    pub subscribed: Vec<Feed>,
    pub last_requests: Vec<Feed>,
    pub keep_alives: u32,
    retained: [Option<String>; Feed::COUNT],
}

impl MockTransport {
    pub fn new() -> Self {
        Self::reachable_after(1)
    }

    pub fn reachable_after(opens_needed: u32) -> Self {
        Self {
            inbound: Arc::new(InboundQueue::new()),
            opens_needed,
            opens: 0,
            connected: false,
            fail_sends: false,
            sent: Vec::new(),
            subscribed: Vec::new(),
            last_requests: Vec::new(),
            keep_alives: 0,
            retained: Default::default(),
        }
    }

    /// Handle for pushing remote updates after the transport is moved.
    pub fn remote(&self) -> Arc<InboundQueue> {
        self.inbound.clone()
    }

    pub fn set_retained(&mut self, feed: Feed, value: &str) {
        self.retained[feed.index()] = Some(value.to_string());
    }

    /// Last value the remote service holds for `feed`.
    pub fn remote_value(&self, feed: Feed) -> Option<&str> {
        self.retained[feed.index()].as_deref()
    }

    pub fn sent_to(&self, feed: Feed) -> Vec<&str> {
        self.sent
            .iter()
            .filter(|(f, _)| *f == feed)
            .map(|(_, p)| p.as_str())
            .collect()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryPort for MockTransport {
    fn open(&mut self) -> Result<(), TelemetryError> {
        self.opens += 1;
        if self.opens >= self.opens_needed {
            self.connected = true;
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn send(&mut self, feed: Feed, payload: &str) -> Result<(), TelemetryError> {
        if self.fail_sends {
            return Err(TelemetryError::Transport);
        }
        self.sent.push((feed, payload.to_string()));
        self.retained[feed.index()] = Some(payload.to_string());
        Ok(())
    }

    fn subscribe(&mut self, feed: Feed) -> Result<(), TelemetryError> {
        self.subscribed.push(feed);
        Ok(())
    }

    fn request_last(&mut self, feed: Feed) -> Result<(), TelemetryError> {
        self.last_requests.push(feed);
        if let Some(v) = self.retained[feed.index()].clone() {
            if let Some(update) = FeedUpdate::new(feed, &v) {
                self.inbound.push(update);
            }
        }
        Ok(())
    }

    fn next_inbound(&mut self) -> Option<FeedUpdate> {
        self.inbound.pop()
    }

    fn keep_alive(&mut self) {
        self.keep_alives += 1;
    }
}

pub fn remote_fire(queue: &InboundQueue, payload: &str) {
    assert!(queue.push(FeedUpdate::new(Feed::Fire, payload).unwrap()));
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
