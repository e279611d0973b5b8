//! Piezo buzzer driver.
//!
//! A passive piezo needs a square wave, so the tone is an LEDC PWM channel
//! at 50 % duty; silence is 0 % duty.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the LEDC channel via hw_init.
//! On host/test: tracks state in-memory only.

use log::debug;

use crate::app::ports::AlarmActuator;
use crate::drivers::hw_init;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuzzerState {
    Silent,
    Sounding { hz: u32 },
}

pub struct BuzzerDriver {
    state: BuzzerState,
}

impl Default for BuzzerDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl BuzzerDriver {
    pub fn new() -> Self {
        Self {
            state: BuzzerState::Silent,
        }
    }

    pub fn state(&self) -> BuzzerState {
        self.state
    }
}

impl AlarmActuator for BuzzerDriver {
    fn tone_on(&mut self, hz: u32) {
        if hz == 0 {
            self.tone_off();
            return;
        }
        hw_init::ledc_tone(hz);
        self.state = BuzzerState::Sounding { hz };
        debug!("Buzzer: sounding at {} Hz", hz);
    }

    fn tone_off(&mut self) {
        hw_init::ledc_silence();
        self.state = BuzzerState::Silent;
        debug!("Buzzer: silent");
    }

    fn is_sounding(&self) -> bool {
        matches!(self.state, BuzzerState::Sounding { .. })
    }
}
