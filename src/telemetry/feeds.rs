//! Cloud feed identities, values and inbound updates.
//!
//! Feeds map onto Adafruit IO MQTT topics of the form
//! `{username}/feeds/{key}` (the short `{username}/f/{key}` form is
//! accepted on the inbound side too).

use core::fmt::Write as _;

/// Fixed-capacity payload buffer shared by inbound and outbound messages.
pub type Payload = heapless::String<48>;

/// The six named feeds this station talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Feed {
    Temperature = 0,
    Humidity = 1,
    Fire = 2,
    Alarm = 3,
    ApiTemp = 4,
    ApiHumidity = 5,
}

impl Feed {
    pub const COUNT: usize = 6;

    pub const ALL: [Feed; Self::COUNT] = [
        Feed::Temperature,
        Feed::Humidity,
        Feed::Fire,
        Feed::Alarm,
        Feed::ApiTemp,
        Feed::ApiHumidity,
    ];

    /// Feed key as it appears in the topic.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Fire => "fire",
            Self::Alarm => "alarm",
            Self::ApiTemp => "api_temp",
            Self::ApiHumidity => "api_humidity",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Full publish/subscribe topic for `username`.
    pub fn topic(self, username: &str) -> String {
        format!("{}/feeds/{}", username, self.key())
    }

    /// Adafruit IO "resend last value" topic.
    pub fn get_topic(self, username: &str) -> String {
        format!("{}/feeds/{}/get", username, self.key())
    }

    /// Resolve an inbound topic back to a feed.  Topics owned by other
    /// users, unknown keys and sub-topics such as `/get` return `None`.
    pub fn from_topic(username: &str, topic: &str) -> Option<Self> {
        let rest = topic.strip_prefix(username)?.strip_prefix('/')?;
        let key = rest
            .strip_prefix("feeds/")
            .or_else(|| rest.strip_prefix("f/"))?;
        Self::from_key(key)
    }
}

/// A scalar value published to a feed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedValue {
    /// Rendered with two decimals.
    Float(f32),
    Int(i32),
}

impl FeedValue {
    /// Wire representation.  Non-finite floats are not representable and
    /// yield `None`.
    pub fn render(self) -> Option<Payload> {
        let mut out = Payload::new();
        match self {
            Self::Float(v) if !v.is_finite() => return None,
            Self::Float(v) => write!(out, "{:.2}", v).ok()?,
            Self::Int(v) => write!(out, "{}", v).ok()?,
        }
        Some(out)
    }
}

/// One inbound message delivered by the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedUpdate {
    pub feed: Feed,
    pub payload: Payload,
}

impl FeedUpdate {
    pub fn new(feed: Feed, payload: &str) -> Option<Self> {
        let mut p = Payload::new();
        p.push_str(payload.trim()).ok()?;
        Some(Self { feed, payload: p })
    }

    /// Build an update from a raw MQTT publish.  Returns `None` for foreign
    /// topics, non-UTF-8 data, or payloads that do not fit [`Payload`].
    pub fn from_mqtt(username: &str, topic: &str, data: &[u8]) -> Option<Self> {
        let feed = Feed::from_topic(username, topic)?;
        let text = core::str::from_utf8(data).ok()?;
        Self::new(feed, text)
    }

    /// Interpret the payload as a boolean flag.
    ///
    /// Accepts `1`/`0`, `true`/`false`, `on`/`off` (any case) and any
    /// other number, which is true when non-zero.
    pub fn as_flag(&self) -> Option<bool> {
        let p = self.payload.as_str();
        if p.eq_ignore_ascii_case("true") || p.eq_ignore_ascii_case("on") {
            return Some(true);
        }
        if p.eq_ignore_ascii_case("false") || p.eq_ignore_ascii_case("off") {
            return Some(false);
        }
        p.parse::<f32>().ok().filter(|v| v.is_finite()).map(|v| v != 0.0)
    }
}
