//! One-shot hardware peripheral initialization.
//!
//! Configures the LEDC timer/channel pair that drives the buzzer using raw
//! ESP-IDF sys calls. Called once from `main()` before the loop starts.
//! The DHT22 line is owned by its `PinDriver` and needs no setup here.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    LedcTimerFailed(i32),
    LedcChannelFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::LedcTimerFailed(rc) => write!(f, "LEDC timer config failed (rc={})", rc),
            Self::LedcChannelFailed(rc) => write!(f, "LEDC channel config failed (rc={})", rc),
        }
    }
}

impl core::error::Error for HwInitError {}

#[cfg(target_os = "espidf")]
use log::{info, warn};

#[cfg(target_os = "espidf")]
use crate::pins;

/// Duty for a square wave at the configured 8-bit resolution.
pub const TONE_DUTY_50: u32 = 128;

#[cfg(target_os = "espidf")]
pub fn init_peripherals(tone_hz: u32) -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the loop; single-threaded.
    unsafe { init_ledc(tone_hz)? };
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals(_tone_hz: u32) -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── LEDC PWM ─────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_ledc(tone_hz: u32) -> Result<(), HwInitError> {
    let timer = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: pins::BUZZER_LEDC_TIMER,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_8_BIT,
        freq_hz: tone_hz,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    let ret = unsafe { ledc_timer_config(&timer) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::LedcTimerFailed(ret));
    }

    // Starts silent.
    let ret = unsafe {
        ledc_channel_config(&ledc_channel_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel: pins::BUZZER_LEDC_CHANNEL,
            timer_sel: pins::BUZZER_LEDC_TIMER,
            gpio_num: pins::BUZZER_GPIO,
            duty: 0,
            hpoint: 0,
            ..Default::default()
        })
    };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::LedcChannelFailed(ret));
    }

    info!("hw_init: LEDC configured (buzzer=CH{} GPIO{} {} Hz)",
        pins::BUZZER_LEDC_CHANNEL, pins::BUZZER_GPIO, tone_hz);
    Ok(())
}

/// Retune the buzzer timer to `hz` and drive a 50 % square wave.
#[cfg(target_os = "espidf")]
pub fn ledc_tone(hz: u32) {
    // SAFETY: LEDC timer/channel were configured in init_ledc(); only the
    // main task writes these registers.
    unsafe {
        let ret = ledc_set_freq(ledc_mode_t_LEDC_LOW_SPEED_MODE, pins::BUZZER_LEDC_TIMER, hz);
        if ret != ESP_OK as i32 {
            warn!("hw_init: ledc_set_freq({} Hz) failed (rc={})", hz, ret);
        }
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, pins::BUZZER_LEDC_CHANNEL, TONE_DUTY_50);
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, pins::BUZZER_LEDC_CHANNEL);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_tone(_hz: u32) {}

/// Zero duty: line held low, no sound.
#[cfg(target_os = "espidf")]
pub fn ledc_silence() {
    // SAFETY: see ledc_tone().
    unsafe {
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, pins::BUZZER_LEDC_CHANNEL, 0);
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, pins::BUZZER_LEDC_CHANNEL);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_silence() {}
