//! DHT22 / AM2302 single-wire temperature and humidity sensor.
//!
//! Bit-banged over one open-drain GPIO with an external pull-up:
//!
//! ```text
//!  host   ‾‾‾\______ ≥1 ms ______/‾‾‾‾                (start)
//!  sensor              ‾‾\__80 µs__/‾‾80 µs‾‾\         (response)
//!  bit    \__50 µs__/‾‾ 26 µs = 0 | 70 µs = 1 ‾‾\      × 40
//! ```
//!
//! The frame is 16 bits humidity ×10, 16 bits temperature ×10 (MSB is the
//! sign), then an 8-bit checksum.  Each bit is classified by comparing the
//! width of its high pulse against the preceding 50 µs low pulse, which
//! keeps the decoder independent of the polling loop's absolute speed.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::error::SensorError;

const START_LOW_US: u32 = 1_100;
const RESPONSE_TIMEOUT_US: u32 = 200;
const EDGE_TIMEOUT_US: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DhtReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Decode and validate a raw 5-byte frame.
pub fn decode_frame(frame: [u8; 5]) -> Result<DhtReading, SensorError> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorError::Checksum);
    }

    let humidity = u16::from_be_bytes([frame[0], frame[1]]) as f32 / 10.0;
    let magnitude = u16::from_be_bytes([frame[2] & 0x7F, frame[3]]) as f32 / 10.0;
    let temperature = if frame[2] & 0x80 != 0 { -magnitude } else { magnitude };

    // AM2302 datasheet range: 0–100 %RH, −40–80 °C.
    if !(0.0..=100.0).contains(&humidity) || !(-40.0..=80.0).contains(&temperature) {
        return Err(SensorError::OutOfRange);
    }

    Ok(DhtReading {
        temperature_c: temperature,
        humidity_pct: humidity,
    })
}

pub struct Dht22<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> Dht22<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    /// Take ownership of the data line and leave it released (idle high).
    pub fn new(mut pin: P, delay: D) -> Self {
        if pin.set_high().is_err() {
            warn!("DHT22: could not release data line, first read may fail");
        }
        Self { pin, delay }
    }

    /// Perform one full transaction.  Takes roughly 5 ms.
    pub fn read(&mut self) -> Result<DhtReading, SensorError> {
        // Start signal, then release the line to the sensor.
        self.pin.set_low().map_err(|_| SensorError::Pin)?;
        self.delay.delay_us(START_LOW_US);
        self.pin.set_high().map_err(|_| SensorError::Pin)?;

        // Response: sensor pulls low for 80 µs, then high for 80 µs.
        self.wait_while(true, RESPONSE_TIMEOUT_US)?;
        self.wait_while(false, EDGE_TIMEOUT_US)?;
        self.wait_while(true, EDGE_TIMEOUT_US)?;

        let mut frame = [0u8; 5];
        for bit in 0..40 {
            let low_us = self.wait_while(false, EDGE_TIMEOUT_US)?;
            let high_us = self.wait_while(true, EDGE_TIMEOUT_US)?;
            if high_us > low_us {
                frame[bit / 8] |= 0x80 >> (bit % 8);
            }
        }

        decode_frame(frame)
    }

    /// Busy-wait while the line sits at `high`.  Returns the time spent
    /// in microseconds.
    fn wait_while(&mut self, high: bool, timeout_us: u32) -> Result<u32, SensorError> {
        let mut elapsed = 0u32;
        loop {
            let level = self.pin.is_high().map_err(|_| SensorError::Pin)?;
            if level != high {
                return Ok(elapsed);
            }
            if elapsed >= timeout_us {
                return Err(SensorError::Timeout);
            }
            self.delay.delay_us(1);
            elapsed += 1;
        }
    }
}
