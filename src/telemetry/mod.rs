//! Telemetry channel: feed publishing and subscription dispatch on top of
//! a [`TelemetryPort`] transport.
//!
//! Publishing is fire-and-forget: transport failures are logged and
//! dropped.  Subscription handlers are invoked synchronously from
//! [`TelemetryChannel::pump`], never concurrently with the loop body.

pub mod feeds;

use log::{debug, info, warn};

use crate::app::ports::{ClockPort, TelemetryPort};
use crate::error::TelemetryError;
use feeds::{Feed, FeedUpdate, FeedValue};

/// Delay between connection-state polls while waiting for the broker.
pub const CONNECT_POLL_MS: u64 = 500;

/// Callback registered for a subscribed feed.
///
/// Implementations run inside `pump()` and must not block or sleep.
pub trait FeedHandler {
    fn on_update(&mut self, update: &FeedUpdate, out: &mut Publisher<'_>);
}

/// Write-only view of the channel handed to a [`FeedHandler`].
pub struct Publisher<'a> {
    port: &'a mut dyn TelemetryPort,
}

impl<'a> Publisher<'a> {
    pub fn new(port: &'a mut dyn TelemetryPort) -> Self {
        Self { port }
    }

    /// Fire-and-forget publish.
    pub fn publish(&mut self, feed: Feed, value: FeedValue) {
        publish_best_effort(&mut *self.port, feed, value);
    }
}

fn publish_best_effort(port: &mut dyn TelemetryPort, feed: Feed, value: FeedValue) {
    let Some(payload) = value.render() else {
        warn!("Telemetry: {:?} not representable, not published to '{}'", value, feed.key());
        return;
    };
    match port.send(feed, &payload) {
        Ok(()) => debug!("Telemetry: {} <- {}", feed.key(), payload),
        Err(e) => warn!("Telemetry: publish to '{}' dropped ({})", feed.key(), e),
    }
}

pub struct TelemetryChannel<T> {
    port: T,
    handlers: [Option<Box<dyn FeedHandler>>; Feed::COUNT],
}

impl<T: TelemetryPort> TelemetryChannel<T> {
    pub fn new(port: T) -> Self {
        Self {
            port,
            handlers: core::array::from_fn(|_| None),
        }
    }

    /// Block until the broker session is up.
    ///
    /// There is no timeout: an unreachable broker hangs the station here.
    /// Returns the number of polls it took.
    pub fn connect(&mut self, clock: &mut impl ClockPort) -> u32 {
        let mut polls = 0u32;
        loop {
            if !self.port.is_connected() {
                if let Err(e) = self.port.open() {
                    debug!("Telemetry: open failed ({}), retrying", e);
                }
            }
            polls = polls.wrapping_add(1);
            if self.port.is_connected() {
                info!("Telemetry: connected after {} poll(s)", polls);
                return polls;
            }
            clock.sleep_ms(CONNECT_POLL_MS);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.port.is_connected()
    }

    /// Fire-and-forget publish.
    pub fn publish(&mut self, feed: Feed, value: FeedValue) {
        publish_best_effort(&mut self.port, feed, value);
    }

    /// Subscribe to `feed` and route its updates to `handler`.  A second
    /// registration for the same feed replaces the first.
    pub fn subscribe_on_change(
        &mut self,
        feed: Feed,
        handler: Box<dyn FeedHandler>,
    ) -> Result<(), TelemetryError> {
        if self.handlers[feed.index()].is_none() {
            self.port.subscribe(feed)?;
            info!("Telemetry: subscribed to '{}'", feed.key());
        } else {
            info!("Telemetry: replacing handler for '{}'", feed.key());
        }
        self.handlers[feed.index()] = Some(handler);
        Ok(())
    }

    /// Ask the service to redeliver the last stored value of `feed`.
    pub fn request_current(&mut self, feed: Feed) {
        if let Err(e) = self.port.request_last(feed) {
            warn!("Telemetry: could not request last '{}' value ({})", feed.key(), e);
        }
    }

    /// Deliver queued inbound updates to their handlers, then service the
    /// connection.  Returns the number of updates delivered.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        while let Some(update) = self.port.next_inbound() {
            match self.handlers[update.feed.index()].as_mut() {
                Some(handler) => {
                    let mut out = Publisher {
                        port: &mut self.port,
                    };
                    handler.on_update(&update, &mut out);
                    delivered += 1;
                }
                None => debug!("Telemetry: no handler for '{}', update dropped", update.feed.key()),
            }
        }
        self.port.keep_alive();
        delivered
    }

    pub fn port(&self) -> &T {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut T {
        &mut self.port
    }
}
