//! MQTT telemetry transport (Adafruit IO).
//!
//! Implements [`TelemetryPort`] on top of the ESP-IDF MQTT client.
//!
//! ```text
//!   MqttAdapter::open ──▶ EspMqttClient (TLS, user/key auth)
//!                            │
//!         "mqtt-events" thread: conn.next()
//!           Connected / Disconnected ──▶ AtomicBool
//!           Received {topic, data}   ──▶ InboundQueue ──▶ pump()
//! ```
//!
//! The broker runs a clean session, so subscriptions are replayed from
//! `keep_alive()` whenever a new session has come up since they were made.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::mqtt::client::EspMqttClient`.
//! - **all other targets**: an in-memory broker with retained values per
//!   feed, for host-side tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use log::{debug, info, warn};

use crate::app::ports::TelemetryPort;
use crate::config::DeviceConfig;
use crate::error::TelemetryError;
use crate::events::InboundQueue;
use crate::telemetry::feeds::{Feed, FeedUpdate};

#[cfg(target_os = "espidf")]
use embedded_svc::mqtt::client::{Details, EventPayload, QoS};
#[cfg(target_os = "espidf")]
use esp_idf_svc::mqtt::client::{EspMqttClient, EspMqttConnection, MqttClientConfiguration};

#[cfg(target_os = "espidf")]
const CLIENT_ID: &str = "firewatch-station";
#[cfg(target_os = "espidf")]
const EVENT_TASK_STACK: usize = 6 * 1024;

pub struct MqttAdapter {
    username: String,
    inbound: Arc<InboundQueue>,
    connected: Arc<AtomicBool>,
    /// Count of sessions established since boot.
    sessions: Arc<AtomicU32>,
    subscribed: [bool; Feed::COUNT],
    /// Session the current subscriptions were made in.
    synced_session: u32,
    /// Session state seen by the last `keep_alive()`.
    was_connected: bool,

    #[cfg(target_os = "espidf")]
    broker_url: String,
    #[cfg(target_os = "espidf")]
    key: String,
    #[cfg(target_os = "espidf")]
    client: Option<EspMqttClient<'static>>,

    #[cfg(not(target_os = "espidf"))]
    sim: SimBroker,
}

impl MqttAdapter {
    pub fn new(config: &DeviceConfig, inbound: Arc<InboundQueue>) -> Self {
        Self {
            username: config.cloud_username.clone(),
            inbound,
            connected: Arc::new(AtomicBool::new(false)),
            sessions: Arc::new(AtomicU32::new(0)),
            subscribed: [false; Feed::COUNT],
            synced_session: 0,
            was_connected: false,

            #[cfg(target_os = "espidf")]
            broker_url: format!("mqtts://{}:{}", config.broker_host, config.broker_port),
            #[cfg(target_os = "espidf")]
            key: config.cloud_key.clone(),
            #[cfg(target_os = "espidf")]
            client: None,

            #[cfg(not(target_os = "espidf"))]
            sim: SimBroker::default(),
        }
    }

    fn replay_subscriptions(&mut self) {
        for feed in Feed::ALL {
            if self.subscribed[feed.index()] {
                if let Err(e) = self.platform_subscribe(feed) {
                    warn!("MQTT: resubscribe to '{}' failed ({})", feed.key(), e);
                }
            }
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_open(&mut self) -> Result<(), TelemetryError> {
        if self.client.is_some() {
            // The client reconnects on its own; nothing to restart.
            return Ok(());
        }

        let conf = MqttClientConfiguration {
            client_id: Some(CLIENT_ID),
            username: Some(self.username.as_str()),
            password: Some(self.key.as_str()),
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        };
        let (client, conn) = EspMqttClient::new(&self.broker_url, &conf).map_err(|e| {
            warn!("MQTT: client creation failed ({})", e);
            TelemetryError::Transport
        })?;

        let connected = self.connected.clone();
        let sessions = self.sessions.clone();
        let inbound = self.inbound.clone();
        let username = self.username.clone();
        std::thread::Builder::new()
            .name("mqtt-events".to_string())
            .stack_size(EVENT_TASK_STACK)
            .spawn(move || run_event_loop(conn, &connected, &sessions, &inbound, &username))
            .map_err(|_| TelemetryError::Transport)?;

        info!("MQTT: client started for {}", self.broker_url);
        self.client = Some(client);
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_open(&mut self) -> Result<(), TelemetryError> {
        self.sim.opens += 1;
        if self.sim.unreachable_opens > 0 {
            self.sim.unreachable_opens -= 1;
            debug!("MQTT(sim): broker unreachable");
            return Ok(());
        }
        self.sessions.fetch_add(1, Ordering::AcqRel);
        self.connected.store(true, Ordering::Release);
        info!("MQTT(sim): session up for '{}'", self.username);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_send(&mut self, topic: &str, payload: &[u8]) -> Result<(), TelemetryError> {
        let client = self.client.as_mut().ok_or(TelemetryError::NotConnected)?;
        client
            .enqueue(topic, QoS::AtMostOnce, false, payload)
            .map(|_| ())
            .map_err(|e| {
                debug!("MQTT: enqueue to {} failed ({})", topic, e);
                TelemetryError::Transport
            })
    }

    #[cfg(target_os = "espidf")]
    fn platform_subscribe(&mut self, feed: Feed) -> Result<(), TelemetryError> {
        let topic = feed.topic(&self.username);
        let client = self.client.as_mut().ok_or(TelemetryError::NotConnected)?;
        client
            .subscribe(&topic, QoS::AtLeastOnce)
            .map(|_| ())
            .map_err(|_| TelemetryError::Transport)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_subscribe(&mut self, feed: Feed) -> Result<(), TelemetryError> {
        self.sim.subscribe_calls += 1;
        debug!("MQTT(sim): subscribed {}", feed.topic(&self.username));
        Ok(())
    }
}

impl TelemetryPort for MqttAdapter {
    fn open(&mut self) -> Result<(), TelemetryError> {
        self.platform_open()
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    #[cfg(target_os = "espidf")]
    fn send(&mut self, feed: Feed, payload: &str) -> Result<(), TelemetryError> {
        if !self.is_connected() {
            return Err(TelemetryError::NotConnected);
        }
        let topic = feed.topic(&self.username);
        self.platform_send(&topic, payload.as_bytes())
    }

    #[cfg(not(target_os = "espidf"))]
    fn send(&mut self, feed: Feed, payload: &str) -> Result<(), TelemetryError> {
        if !self.is_connected() {
            return Err(TelemetryError::NotConnected);
        }
        self.sim.publish(feed, payload)
    }

    fn subscribe(&mut self, feed: Feed) -> Result<(), TelemetryError> {
        if !self.is_connected() {
            return Err(TelemetryError::NotConnected);
        }
        self.platform_subscribe(feed)?;
        self.subscribed[feed.index()] = true;
        self.synced_session = self.sessions.load(Ordering::Acquire);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn request_last(&mut self, feed: Feed) -> Result<(), TelemetryError> {
        if !self.is_connected() {
            return Err(TelemetryError::NotConnected);
        }
        let topic = feed.get_topic(&self.username);
        self.platform_send(&topic, b"")
    }

    #[cfg(not(target_os = "espidf"))]
    fn request_last(&mut self, feed: Feed) -> Result<(), TelemetryError> {
        if !self.is_connected() {
            return Err(TelemetryError::NotConnected);
        }
        if self.subscribed[feed.index()] {
            if let Some(value) = self.sim.retained[feed.index()].clone() {
                if let Some(update) = FeedUpdate::new(feed, &value) {
                    self.inbound.push(update);
                }
            }
        }
        Ok(())
    }

    fn next_inbound(&mut self) -> Option<FeedUpdate> {
        self.inbound.pop()
    }

    fn keep_alive(&mut self) {
        let now = self.is_connected();
        if !now && self.was_connected {
            warn!("MQTT: session lost, client will reconnect");
        }
        self.was_connected = now;

        let session = self.sessions.load(Ordering::Acquire);
        if now && session != self.synced_session && self.subscribed.iter().any(|s| *s) {
            info!("MQTT: new session, replaying subscriptions");
            self.replay_subscriptions();
            self.synced_session = session;
        }
    }
}

#[cfg(target_os = "espidf")]
fn run_event_loop(
    mut conn: EspMqttConnection,
    connected: &AtomicBool,
    sessions: &AtomicU32,
    inbound: &InboundQueue,
    username: &str,
) {
    loop {
        let event = match conn.next() {
            Ok(event) => event,
            Err(e) => {
                // The connection ends when the client is dropped.
                info!("MQTT: event loop stopped ({})", e);
                connected.store(false, Ordering::Release);
                return;
            }
        };
        match event.payload() {
            EventPayload::Connected(_) => {
                sessions.fetch_add(1, Ordering::AcqRel);
                connected.store(true, Ordering::Release);
                info!("MQTT: connected");
            }
            EventPayload::Disconnected => {
                connected.store(false, Ordering::Release);
                warn!("MQTT: disconnected");
            }
            EventPayload::Received {
                topic,
                data,
                details,
                ..
            } => {
                if !matches!(details, Details::Complete) {
                    warn!("MQTT: fragmented message ignored");
                    continue;
                }
                match topic.and_then(|t| FeedUpdate::from_mqtt(username, t, data)) {
                    Some(update) => {
                        if !inbound.push(update) {
                            warn!("MQTT: inbound queue full, update dropped");
                        }
                    }
                    None => debug!("MQTT: ignoring message on {:?}", topic),
                }
            }
            EventPayload::Error(e) => warn!("MQTT: client error ({})", e),
            _ => {}
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Simulation broker
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
#[derive(Default)]
struct SimBroker {
    retained: [Option<String>; Feed::COUNT],
    published: Vec<(Feed, String)>,
    opens: u32,
    unreachable_opens: u32,
    subscribe_calls: u32,
}

#[cfg(not(target_os = "espidf"))]
impl SimBroker {
    fn publish(&mut self, feed: Feed, payload: &str) -> Result<(), TelemetryError> {
        self.retained[feed.index()] = Some(payload.to_string());
        self.published.push((feed, payload.to_string()));
        Ok(())
    }
}

#[cfg(not(target_os = "espidf"))]
impl MqttAdapter {
    /// Simulation: the next `n` calls to `open` leave the session down.
    pub fn sim_unreachable_for(&mut self, n: u32) {
        self.sim.unreachable_opens = n;
    }

    /// Simulation: another client writes `payload` to `feed`.  Delivered
    /// to the inbound queue if this station is subscribed and online.
    /// Returns whether it was queued.
    pub fn sim_remote_write(&mut self, feed: Feed, payload: &str) -> bool {
        self.sim.retained[feed.index()] = Some(payload.to_string());
        if !(self.is_connected() && self.subscribed[feed.index()]) {
            return false;
        }
        match FeedUpdate::new(feed, payload) {
            Some(update) => self.inbound.push(update),
            None => false,
        }
    }

    /// Simulation: the broker drops the session.
    pub fn sim_drop_session(&mut self) {
        self.connected.store(false, Ordering::Release);
    }

    /// Simulation: every publish made by this station, in order.
    pub fn sim_published(&self) -> &[(Feed, String)] {
        &self.sim.published
    }

    pub fn sim_retained(&self, feed: Feed) -> Option<&str> {
        self.sim.retained[feed.index()].as_deref()
    }

    pub fn sim_opens(&self) -> u32 {
        self.sim.opens
    }

    pub fn sim_subscribe_calls(&self) -> u32 {
        self.sim.subscribe_calls
    }
}
