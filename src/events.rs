//! Inbound feed event queue.
//!
//! Feed updates are produced on the MQTT client's event thread and
//! consumed by the main loop inside `TelemetryChannel::pump()`, which is
//! the only place subscription handlers run.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ MQTT event   │────▶│ InboundQueue │────▶│  pump()      │
//! │ thread       │     │  (bounded)   │     │  main loop   │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::telemetry::feeds::FeedUpdate;

/// Maximum number of pending inbound updates.
pub const INBOUND_DEPTH: usize = 8;

/// Bounded multi-producer queue of [`FeedUpdate`]s.
///
/// Shared by reference (usually behind an `Arc`) between the transport's
/// callback and the main loop.
pub struct InboundQueue {
    channel: Channel<CriticalSectionRawMutex, FeedUpdate, INBOUND_DEPTH>,
}

impl Default for InboundQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InboundQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Enqueue an update.  Safe to call from the transport thread.
    /// Returns `false` if the queue is full (update dropped).
    pub fn push(&self, update: FeedUpdate) -> bool {
        self.channel.try_send(update).is_ok()
    }

    /// Pop the oldest pending update.
    pub fn pop(&self) -> Option<FeedUpdate> {
        self.channel.try_receive().ok()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}
