//! Weather API client.
//!
//! One GET per call against an Open-Meteo style forecast endpoint:
//!
//! ```json
//! { "current_weather": { "temperature": 18.4 },
//!   "hourly": { "relativehumidity_2m": [41, 42, 55] } }
//! ```
//!
//! The API has no instantaneous humidity field, so the most recent hourly
//! bucket (the last array element) stands in for "current" humidity.
//! A missing or malformed humidity series only drops the humidity.

use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::app::ports::HttpPort;
use crate::error::WeatherError;

/// Largest response body we will buffer.
pub const MAX_BODY_BYTES: usize = 16 * 1024;

/// Values extracted from one forecast document.  Temperature and humidity
/// are independently optional.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeatherReport {
    pub temperature: Option<f32>,
    pub humidity: Option<f32>,
}

#[derive(Deserialize)]
struct ForecastDoc {
    current_weather: Option<CurrentWeather>,
    #[serde(default)]
    hourly: Value,
}

#[derive(Deserialize)]
struct CurrentWeather {
    temperature: Option<f32>,
}

/// Extract a [`WeatherReport`] from a response body.
pub fn parse_report(body: &[u8]) -> Result<WeatherReport, WeatherError> {
    let doc: ForecastDoc = serde_json::from_slice(body).map_err(|_| WeatherError::Parse)?;

    let temperature = doc.current_weather.and_then(|c| c.temperature);
    let humidity = doc
        .hourly
        .get("relativehumidity_2m")
        .and_then(Value::as_array)
        .and_then(|buckets| buckets.last())
        .and_then(Value::as_f64)
        .map(|h| h as f32);

    Ok(WeatherReport {
        temperature,
        humidity,
    })
}

pub struct WeatherClient<H> {
    http: H,
}

impl<H: HttpPort> WeatherClient<H> {
    pub fn new(http: H) -> Self {
        Self { http }
    }

    /// Fetch and parse the forecast at `url`.  Failures are logged here and
    /// returned; the caller skips the weather feeds for this cycle.
    pub fn fetch(&mut self, url: &str) -> Result<WeatherReport, WeatherError> {
        let response = self.http.get(url).map_err(|e| {
            warn!("Weather: request failed ({})", e);
            WeatherError::from(e)
        })?;

        if response.status != 200 {
            warn!("Weather: HTTP status {}", response.status);
            return Err(WeatherError::Status(response.status));
        }

        let report = parse_report(&response.body).inspect_err(|_| {
            warn!("Weather: JSON parse error ({} byte body)", response.body.len());
        })?;
        debug!("Weather: {:?}", report);
        Ok(report)
    }

    pub fn http(&self) -> &H {
        &self.http
    }
}
