//! Sensor subsystem: the DHT22 driver and the [`Sample`] it produces.

pub mod dht;

/// One temperature/humidity reading.
///
/// `valid` is true only when both fields are finite.  Invalid samples
/// carry NaN and must not be published.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Degrees Celsius.
    pub temperature: f32,
    /// Relative humidity, percent.
    pub humidity: f32,
    pub valid: bool,
}

impl Sample {
    pub fn new(temperature: f32, humidity: f32) -> Self {
        if temperature.is_finite() && humidity.is_finite() {
            Self {
                temperature,
                humidity,
                valid: true,
            }
        } else {
            Self::invalid()
        }
    }

    pub const fn invalid() -> Self {
        Self {
            temperature: f32::NAN,
            humidity: f32::NAN,
            valid: false,
        }
    }
}
