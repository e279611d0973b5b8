//! FireWatch Firmware: Main Entry Point
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  DhtSensorAdapter   HttpAdapter   MqttAdapter   Esp32Time    │
//! │  (SensorPort)       (HttpPort)    (Telemetry)   (ClockPort)  │
//! │  BuzzerDriver       LogEventSink  WifiAdapter                │
//! │  (AlarmActuator)    (EventSink)   (Connectivity)             │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ───────────────────    │
//! │                                                              │
//! │  ┌──────────────────────────────────────────────────────┐    │
//! │  │  MainLoop · TelemetryChannel · AlarmController       │    │
//! │  └──────────────────────────────────────────────────────┘    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;

use anyhow::{Context, Result};
use esp_idf_hal::{delay::Ets, gpio::PinDriver, prelude::Peripherals};
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    nvs::EspDefaultNvsPartition,
    wifi::{BlockingWifi, EspWifi},
};
use log::info;

use firewatch::adapters::hardware::DhtSensorAdapter;
use firewatch::adapters::http::HttpAdapter;
use firewatch::adapters::log_sink::LogEventSink;
use firewatch::adapters::mqtt::MqttAdapter;
use firewatch::adapters::time::Esp32TimeAdapter;
use firewatch::adapters::wifi::{ConnectivityPort, LINK_RETRY_MS, WifiAdapter, connect_blocking};
use firewatch::alarm::AlarmController;
use firewatch::app::main_loop::MainLoop;
use firewatch::config::DeviceConfig;
use firewatch::drivers::buzzer::BuzzerDriver;
use firewatch::drivers::hw_init;
use firewatch::events::InboundQueue;
use firewatch::sensors::dht::Dht22;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  FireWatch v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Build-time configuration ───────────────────────────
    let config = DeviceConfig::from_build_env().context("station configuration rejected")?;
    info!(
        "Config: user='{}' broker={}:{} every {} s",
        config.cloud_username, config.broker_host, config.broker_port, config.poll_interval_seconds
    );

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals(config.alarm_tone_hz).context("peripheral init failed")?;

    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // ── 4. WiFi ───────────────────────────────────────────────
    let esp_wifi = EspWifi::new(peripherals.modem, sys_loop.clone(), Some(nvs))?;
    let mut wifi = WifiAdapter::new(BlockingWifi::wrap(esp_wifi, sys_loop)?);
    wifi.set_credentials(&config.network_ssid, &config.network_password)
        .context("WiFi credentials rejected")?;

    let mut clock = Esp32TimeAdapter::new();
    let attempts = connect_blocking(&mut wifi, &mut clock, LINK_RETRY_MS)?;
    info!("WiFi up after {} attempt(s)", attempts);

    // ── 5. Adapters ───────────────────────────────────────────
    // GPIO4 = pins::DHT_GPIO
    let dht_line = PinDriver::input_output_od(peripherals.pins.gpio4)?;
    let sensor = DhtSensorAdapter::new(Dht22::new(dht_line, Ets));

    let alarm = AlarmController::new(BuzzerDriver::new(), config.alarm_tone_hz);
    let transport = MqttAdapter::new(&config, Arc::new(InboundQueue::new()));
    let http = HttpAdapter::new();
    let mut log_sink = LogEventSink::new();

    // ── 6. Main loop ──────────────────────────────────────────
    let mut station = MainLoop::new(config, sensor, http, transport, clock);
    station.start(alarm, &mut log_sink)?;

    info!("System ready. Entering main loop.");
    station.run(&mut wifi, &mut log_sink)
}
