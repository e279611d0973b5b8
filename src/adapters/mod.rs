//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements        | Connects to                 |
//! |------------|-------------------|-----------------------------|
//! | `hardware` | SensorPort        | DHT22 on an open-drain GPIO |
//! | `http`     | HttpPort          | ESP-IDF HTTP client (TLS)   |
//! | `log_sink` | EventSink         | Serial log output           |
//! | `mqtt`     | TelemetryPort     | Adafruit IO MQTT broker     |
//! | `time`     | ClockPort         | ESP32 system timer          |
//! | `wifi`     | ConnectivityPort  | ESP-IDF WiFi STA            |

pub mod hardware;
pub mod http;
pub mod log_sink;
pub mod mqtt;
pub mod time;
pub mod wifi;
