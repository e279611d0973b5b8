//! Station configuration.
//!
//! Everything the firmware needs to reach the network, the cloud feeds and
//! the weather API.  Values are captured from `FIREWATCH_*` environment
//! variables at build time and injected into the main loop at start; no
//! other module reads credentials directly.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Default Open-Meteo forecast query (San Francisco).
pub const DEFAULT_WEATHER_ENDPOINT: &str = "https://api.open-meteo.com/v1/forecast?\
latitude=37.77&longitude=-122.42&current_weather=true&hourly=relativehumidity_2m&forecast_days=1";

/// Adafruit IO MQTT broker.
pub const DEFAULT_BROKER_HOST: &str = "io.adafruit.com";

/// Core station configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    // --- Cloud telemetry ---
    /// Feed owner; also the MQTT username and topic prefix.
    pub cloud_username: String,
    /// Cloud access key (MQTT password).
    pub cloud_key: String,
    pub broker_host: String,
    /// 8883 = MQTT over TLS.
    pub broker_port: u16,

    // --- Network ---
    pub network_ssid: String,
    pub network_password: String,

    // --- Weather ---
    pub weather_endpoint: String,

    // --- Timing ---
    /// Delay between loop iterations (seconds)
    pub poll_interval_seconds: u32,

    // --- Alarm ---
    /// Buzzer tone frequency when armed (Hz)
    pub alarm_tone_hz: u32,
    /// Ask the broker for the last `fire` value right after subscribing.
    pub sync_fire_on_start: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            cloud_username: String::new(),
            cloud_key: String::new(),
            broker_host: DEFAULT_BROKER_HOST.into(),
            broker_port: 8883,

            network_ssid: String::new(),
            network_password: String::new(),

            weather_endpoint: DEFAULT_WEATHER_ENDPOINT.into(),

            poll_interval_seconds: 10,

            alarm_tone_hz: 1000,
            sync_fire_on_start: true,
        }
    }
}

/// Reasons a [`DeviceConfig`] is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A required field is empty.  Carries the field name.
    Missing(&'static str),
    /// A field failed range validation.
    Invalid(&'static str),
    /// The JSON document could not be deserialised.
    Malformed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(field) => write!(f, "missing required field `{}`", field),
            Self::Invalid(why) => write!(f, "invalid value: {}", why),
            Self::Malformed => write!(f, "malformed config document"),
        }
    }
}

impl DeviceConfig {
    /// Build the configuration from variables captured at compile time.
    ///
    /// Unset variables fall back to [`DeviceConfig::default`].  An
    /// unparsable `FIREWATCH_POLL_INTERVAL_SECS` is reported as invalid
    /// rather than silently replaced.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        let mut cfg = Self::default();

        if let Some(v) = option_env!("FIREWATCH_CLOUD_USERNAME") {
            cfg.cloud_username = v.into();
        }
        if let Some(v) = option_env!("FIREWATCH_CLOUD_KEY") {
            cfg.cloud_key = v.into();
        }
        if let Some(v) = option_env!("FIREWATCH_WIFI_SSID") {
            cfg.network_ssid = v.into();
        }
        if let Some(v) = option_env!("FIREWATCH_WIFI_PASSWORD") {
            cfg.network_password = v.into();
        }
        if let Some(v) = option_env!("FIREWATCH_WEATHER_URL") {
            cfg.weather_endpoint = v.into();
        }
        if let Some(v) = option_env!("FIREWATCH_BROKER_HOST") {
            cfg.broker_host = v.into();
        }
        if let Some(v) = option_env!("FIREWATCH_POLL_INTERVAL_SECS") {
            cfg.poll_interval_seconds = v
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("poll interval is not an integer"))?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse and validate a JSON document.  Absent fields take defaults.
    pub fn from_json(doc: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(doc).map_err(|_| ConfigError::Malformed)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cloud_username.is_empty() {
            return Err(ConfigError::Missing("cloud_username"));
        }
        if self.cloud_key.is_empty() {
            return Err(ConfigError::Missing("cloud_key"));
        }
        if self.network_ssid.is_empty() {
            return Err(ConfigError::Missing("network_ssid"));
        }
        if self.broker_host.is_empty() {
            return Err(ConfigError::Missing("broker_host"));
        }
        if !(self.weather_endpoint.starts_with("http://")
            || self.weather_endpoint.starts_with("https://"))
        {
            return Err(ConfigError::Invalid("weather endpoint must be an http(s) URL"));
        }
        if self.poll_interval_seconds == 0 {
            return Err(ConfigError::Invalid("poll interval must be at least 1 s"));
        }
        if !(20..=20_000).contains(&self.alarm_tone_hz) {
            return Err(ConfigError::Invalid("alarm tone must be 20-20000 Hz"));
        }
        Ok(())
    }

    /// Loop delay in milliseconds.
    pub fn poll_interval_ms(&self) -> u64 {
        u64::from(self.poll_interval_seconds) * 1000
    }
}
