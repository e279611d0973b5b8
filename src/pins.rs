//! GPIO / peripheral pin assignments for the FireWatch station board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// DHT22 data line (open-drain, external 10 kΩ pull-up).
pub const DHT_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

/// Passive piezo buzzer, driven by LEDC PWM.
pub const BUZZER_GPIO: i32 = 25;

/// LEDC channel / timer reserved for the buzzer tone.
pub const BUZZER_LEDC_CHANNEL: u32 = 0;
pub const BUZZER_LEDC_TIMER: u32 = 0;
