//! Alarm controller.
//!
//! ```text
//!            fire = 1                  fire = 0
//!   ArmedOff ─────────▶ ArmedOn   ArmedOn ─────────▶ ArmedOff
//!    tone_off()          tone_on(hz)
//!    alarm <- 0          alarm <- 1
//! ```
//!
//! Every delivered `fire` update drives the actuator and re-publishes the
//! `alarm` feed, including repeats of the current state.

use log::{info, warn};

use crate::app::ports::AlarmActuator;
use crate::telemetry::feeds::{Feed, FeedUpdate, FeedValue};
use crate::telemetry::{FeedHandler, Publisher};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmState {
    ArmedOff,
    ArmedOn,
}

pub struct AlarmController<A> {
    actuator: A,
    tone_hz: u32,
    fire_detected: bool,
}

impl<A: AlarmActuator> AlarmController<A> {
    /// Starts in [`AlarmState::ArmedOff`].  The actuator is not touched
    /// until the first update arrives.
    pub fn new(actuator: A, tone_hz: u32) -> Self {
        Self {
            actuator,
            tone_hz,
            fire_detected: false,
        }
    }

    pub fn state(&self) -> AlarmState {
        if self.fire_detected {
            AlarmState::ArmedOn
        } else {
            AlarmState::ArmedOff
        }
    }

    pub fn fire_detected(&self) -> bool {
        self.fire_detected
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    fn apply(&mut self, fire: bool, out: &mut Publisher<'_>) {
        self.fire_detected = fire;
        if fire {
            self.actuator.tone_on(self.tone_hz);
        } else {
            self.actuator.tone_off();
        }
        out.publish(Feed::Alarm, FeedValue::Int(i32::from(self.fire_detected)));
    }
}

impl<A: AlarmActuator> FeedHandler for AlarmController<A> {
    fn on_update(&mut self, update: &FeedUpdate, out: &mut Publisher<'_>) {
        let Some(fire) = update.as_flag() else {
            warn!("ALARM | ignoring unparsable '{}' payload {:?}", update.feed.key(), update.payload.as_str());
            return;
        };
        self.apply(fire, out);
        info!("ALARM | {:?} (fire={})", self.state(), u8::from(fire));
    }
}
