//! Hardware adapter: bridges the DHT22 driver to [`SensorPort`].
//!
//! Driver errors are reported here and collapse into an invalid
//! [`Sample`]; the loop never sees a `SensorError`.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::app::ports::SensorPort;
use crate::sensors::dht::Dht22;
use crate::sensors::Sample;

pub struct DhtSensorAdapter<P, D> {
    dht: Dht22<P, D>,
    failures: u32,
}

impl<P, D> DhtSensorAdapter<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pub fn new(dht: Dht22<P, D>) -> Self {
        Self { dht, failures: 0 }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<P, D> SensorPort for DhtSensorAdapter<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn read(&mut self) -> Sample {
        match self.dht.read() {
            Ok(r) => Sample::new(r.temperature_c, r.humidity_pct),
            Err(e) => {
                self.failures = self.failures.wrapping_add(1);
                warn!("DHT22: read failed ({}), {} failure(s) so far", e, self.failures);
                Sample::invalid()
            }
        }
    }
}
