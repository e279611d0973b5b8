//! Integration tests for the MainLoop → ports pipeline.
//!
//! One station is assembled from mocks; each test drives `start()` and a
//! few `tick()`s and asserts on what reached the telemetry transport.

use super::mock_hw::{
    CannedHttp, FakeClock, MockTransport, RecordingBuzzer, RecordingSink, ScriptedSensor,
    WEATHER_OK, remote_fire, test_config,
};

use firewatch::adapters::wifi::{ConnectivityError, ConnectivityPort, LINK_RETRY_MS, WifiAdapter};
use firewatch::alarm::AlarmController;
use firewatch::app::events::AppEvent;
use firewatch::app::main_loop::MainLoop;
use firewatch::app::ports::ClockPort;
use firewatch::error::{HttpError, WeatherError};
use firewatch::sensors::Sample;
use firewatch::telemetry::feeds::Feed;

type Station = MainLoop<ScriptedSensor, CannedHttp, MockTransport, FakeClock>;

fn station(sensor: ScriptedSensor, http: CannedHttp) -> (Station, RecordingSink) {
    let mut sink = RecordingSink::new();
    let mut station = MainLoop::new(
        test_config(),
        sensor,
        http,
        MockTransport::new(),
        FakeClock::default(),
    );
    station
        .start(AlarmController::new(RecordingBuzzer::default(), 1000), &mut sink)
        .unwrap();
    (station, sink)
}

// ── Start-up ─────────────────────────────────────────────────

#[test]
fn start_subscribes_fire_and_requests_its_last_value() {
    let (station, sink) = station(ScriptedSensor::steady(20.0, 50.0), CannedHttp::ok(WEATHER_OK));
    let port = station.telemetry().port();
    assert_eq!(port.subscribed, vec![Feed::Fire]);
    assert_eq!(port.last_requests, vec![Feed::Fire]);
    assert_eq!(
        sink.events[..2],
        [
            AppEvent::Started { interval_secs: 10 },
            AppEvent::TelemetryConnected { polls: 1 },
        ]
    );
}

#[test]
fn connect_polls_every_500ms_until_broker_answers() {
    let clock = FakeClock::default();
    let mut sink = RecordingSink::new();
    let mut station = MainLoop::new(
        test_config(),
        ScriptedSensor::steady(20.0, 50.0),
        CannedHttp::ok(WEATHER_OK),
        MockTransport::reachable_after(4),
        clock.clone(),
    );
    station
        .start(AlarmController::new(RecordingBuzzer::default(), 1000), &mut sink)
        .unwrap();

    assert_eq!(clock.sleeps(), vec![500, 500, 500]);
    assert_eq!(station.telemetry().port().opens, 4);
    assert!(sink.events.contains(&AppEvent::TelemetryConnected { polls: 4 }));
}

#[test]
fn boot_sync_can_be_disabled() {
    let mut config = test_config();
    config.sync_fire_on_start = false;
    let mut sink = RecordingSink::new();
    let mut station = MainLoop::new(
        config,
        ScriptedSensor::steady(20.0, 50.0),
        CannedHttp::ok(WEATHER_OK),
        MockTransport::new(),
        FakeClock::default(),
    );
    station
        .start(AlarmController::new(RecordingBuzzer::default(), 1000), &mut sink)
        .unwrap();
    assert!(station.telemetry().port().last_requests.is_empty());
}

// ── Sensor path ──────────────────────────────────────────────

#[test]
fn valid_sample_publishes_both_local_feeds() {
    let (mut station, mut sink) =
        station(ScriptedSensor::steady(21.456, 48.0), CannedHttp::ok(WEATHER_OK));
    station.tick(&mut sink);

    let port = station.telemetry().port();
    assert_eq!(port.sent_to(Feed::Temperature), ["21.46"]);
    assert_eq!(port.sent_to(Feed::Humidity), ["48.00"]);
}

#[test]
fn invalid_sample_publishes_nothing_local() {
    let (mut station, mut sink) = station(
        ScriptedSensor::new(&[Sample::new(f32::NAN, 40.0)]),
        CannedHttp::ok(WEATHER_OK),
    );
    station.tick(&mut sink);

    let port = station.telemetry().port();
    assert!(port.sent_to(Feed::Temperature).is_empty());
    assert!(port.sent_to(Feed::Humidity).is_empty());
    // Weather still goes out.
    assert_eq!(port.sent_to(Feed::ApiTemp), ["18.40"]);
    assert!(sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::SensorSampled(s) if !s.valid)));
}

#[test]
fn sensor_recovers_on_next_cycle() {
    let (mut station, mut sink) = station(
        ScriptedSensor::new(&[Sample::invalid(), Sample::new(19.0, 61.0)]),
        CannedHttp::ok(WEATHER_OK),
    );
    station.tick(&mut sink);
    station.tick(&mut sink);
    assert_eq!(station.telemetry().port().sent_to(Feed::Temperature), ["19.00"]);
    assert_eq!(station.sensor().reads, 2);
}

// ── Weather path ─────────────────────────────────────────────

#[test]
fn weather_publishes_temperature_and_last_humidity_bucket() {
    let (mut station, mut sink) =
        station(ScriptedSensor::steady(20.0, 50.0), CannedHttp::ok(WEATHER_OK));
    station.tick(&mut sink);

    let port = station.telemetry().port();
    assert_eq!(port.sent_to(Feed::ApiTemp), ["18.40"]);
    assert_eq!(port.sent_to(Feed::ApiHumidity), ["55.00"]);
    assert_eq!(station.weather().http().urls, [test_config().weather_endpoint]);
}

#[test]
fn empty_humidity_array_still_publishes_temperature() {
    let body = br#"{"current_weather":{"temperature":7.5},"hourly":{"relativehumidity_2m":[]}}"#;
    let (mut station, mut sink) = station(ScriptedSensor::steady(20.0, 50.0), CannedHttp::ok(body));
    station.tick(&mut sink);

    let port = station.telemetry().port();
    assert_eq!(port.sent_to(Feed::ApiTemp), ["7.50"]);
    assert!(port.sent_to(Feed::ApiHumidity).is_empty());
}

#[test]
fn non_200_publishes_no_weather_and_reports_status() {
    let (mut station, mut sink) = station(
        ScriptedSensor::steady(20.0, 50.0),
        CannedHttp::status(503, b"upstream busy"),
    );
    station.tick(&mut sink);

    let port = station.telemetry().port();
    assert!(port.sent_to(Feed::ApiTemp).is_empty());
    assert!(port.sent_to(Feed::ApiHumidity).is_empty());
    assert!(sink.events.contains(&AppEvent::WeatherFailed(WeatherError::Status(503))));
    assert!(WeatherError::Status(503).to_string().contains("503"));
}

#[test]
fn unparsable_body_publishes_no_weather() {
    let (mut station, mut sink) = station(
        ScriptedSensor::steady(20.0, 50.0),
        CannedHttp::ok(b"<html>gateway</html>"),
    );
    station.tick(&mut sink);
    assert!(station.telemetry().port().sent_to(Feed::ApiTemp).is_empty());
    assert!(sink.events.contains(&AppEvent::WeatherFailed(WeatherError::Parse)));
}

#[test]
fn transport_failure_skips_weather_but_not_sensor() {
    let (mut station, mut sink) = station(
        ScriptedSensor::steady(20.0, 50.0),
        CannedHttp::failing(HttpError::Connect),
    );
    station.tick(&mut sink);

    let port = station.telemetry().port();
    assert_eq!(port.sent_to(Feed::Temperature), ["20.00"]);
    assert!(sink.events.contains(&AppEvent::WeatherFailed(WeatherError::Transport(
        HttpError::Connect
    ))));
}

// ── Publish semantics ────────────────────────────────────────

#[test]
fn failed_publishes_do_not_stop_the_loop() {
    let (mut station, mut sink) =
        station(ScriptedSensor::steady(20.0, 50.0), CannedHttp::ok(WEATHER_OK));
    station.telemetry_mut().port_mut().fail_sends = true;
    station.tick(&mut sink);
    station.tick(&mut sink);
    assert_eq!(station.iteration(), 2);
    assert!(station.telemetry().port().sent.is_empty());
}

#[test]
fn last_published_value_is_remote_value() {
    let (mut station, mut sink) = station(
        ScriptedSensor::new(&[Sample::new(20.0, 50.0), Sample::new(23.25, 44.0)]),
        CannedHttp::ok(WEATHER_OK),
    );
    station.tick(&mut sink);
    station.tick(&mut sink);
    let port = station.telemetry().port();
    assert_eq!(port.remote_value(Feed::Temperature), Some("23.25"));
    assert_eq!(port.remote_value(Feed::Humidity), Some("44.00"));
}

#[test]
fn per_iteration_publish_order() {
    let (mut station, mut sink) =
        station(ScriptedSensor::steady(20.0, 50.0), CannedHttp::ok(WEATHER_OK));
    station.tick(&mut sink);
    let feeds: Vec<Feed> = station.telemetry().port().sent.iter().map(|(f, _)| *f).collect();
    assert_eq!(
        feeds,
        [Feed::Temperature, Feed::Humidity, Feed::ApiTemp, Feed::ApiHumidity]
    );
}

// ── Cadence ──────────────────────────────────────────────────

#[test]
fn sleep_is_full_interval_after_body() {
    let clock = FakeClock::default();
    let mut sink = RecordingSink::new();
    let mut station = MainLoop::new(
        test_config(),
        ScriptedSensor::steady(20.0, 50.0),
        CannedHttp::ok(WEATHER_OK).with_latency(&clock, 1_500),
        MockTransport::new(),
        clock.clone(),
    );
    station
        .start(AlarmController::new(RecordingBuzzer::default(), 1000), &mut sink)
        .unwrap();

    let first_start = clock.uptime_ms();
    station.tick(&mut sink);
    let second_start = clock.uptime_ms();
    station.tick(&mut sink);

    // Fixed delay: 10 s sleep plus the 1.5 s spent fetching weather.
    assert_eq!(second_start - first_start, 11_500);
    assert_eq!(clock.sleeps(), vec![10_000, 10_000]);
    assert!(sink.events.contains(&AppEvent::IterationComplete {
        iteration: 2,
        body_ms: 1_500
    }));
}

#[test]
fn configured_interval_is_honoured() {
    let mut config = test_config();
    config.poll_interval_seconds = 30;
    let clock = FakeClock::default();
    let mut sink = RecordingSink::new();
    let mut station = MainLoop::new(
        config,
        ScriptedSensor::steady(20.0, 50.0),
        CannedHttp::ok(WEATHER_OK),
        MockTransport::new(),
        clock.clone(),
    );
    station
        .start(AlarmController::new(RecordingBuzzer::default(), 1000), &mut sink)
        .unwrap();
    station.tick(&mut sink);
    assert_eq!(clock.sleeps(), vec![30_000]);
}

// ── WiFi link ────────────────────────────────────────────────

fn associated_wifi() -> WifiAdapter {
    let mut wifi = WifiAdapter::new();
    wifi.set_credentials("Lookout", "tower-wifi").unwrap();
    wifi.connect().unwrap();
    wifi
}

#[test]
fn healthy_link_is_left_alone() {
    let clock = FakeClock::default();
    let mut sink = RecordingSink::new();
    let mut station = MainLoop::new(
        test_config(),
        ScriptedSensor::steady(20.0, 50.0),
        CannedHttp::ok(WEATHER_OK),
        MockTransport::new(),
        clock.clone(),
    );
    let mut wifi = associated_wifi();

    station.maintain_link(&mut wifi, &mut sink);
    assert!(sink.events.is_empty());
    assert!(clock.sleeps().is_empty());
}

#[test]
fn dropped_link_is_reassociated_before_the_next_iteration() {
    let clock = FakeClock::default();
    let mut sink = RecordingSink::new();
    let mut station = MainLoop::new(
        test_config(),
        ScriptedSensor::steady(20.0, 50.0),
        CannedHttp::ok(WEATHER_OK),
        MockTransport::new(),
        clock.clone(),
    );
    station
        .start(AlarmController::new(RecordingBuzzer::default(), 1000), &mut sink)
        .unwrap();
    let mut wifi = associated_wifi();
    wifi.sim_drop_link();
    wifi.sim_fail_next(2);

    station.maintain_link(&mut wifi, &mut sink);
    station.tick(&mut sink);

    assert!(wifi.is_connected());
    assert_eq!(clock.sleeps(), vec![LINK_RETRY_MS, LINK_RETRY_MS, 10_000]);
    let lost = sink.events.iter().position(|e| *e == AppEvent::LinkLost).unwrap();
    let restored = sink
        .events
        .iter()
        .position(|e| *e == AppEvent::LinkRestored { attempts: 3 })
        .unwrap();
    let sampled = sink
        .events
        .iter()
        .position(|e| matches!(e, AppEvent::SensorSampled(_)))
        .unwrap();
    assert!(lost < restored && restored < sampled);
    assert_eq!(station.telemetry().port().sent_to(Feed::Temperature), ["20.00"]);
}

#[test]
fn unusable_credentials_abandon_reassociation() {
    let mut sink = RecordingSink::new();
    let mut station = MainLoop::new(
        test_config(),
        ScriptedSensor::steady(20.0, 50.0),
        CannedHttp::ok(WEATHER_OK),
        MockTransport::new(),
        FakeClock::default(),
    );
    let mut wifi = WifiAdapter::new();

    station.maintain_link(&mut wifi, &mut sink);
    assert_eq!(
        sink.events,
        [
            AppEvent::LinkLost,
            AppEvent::LinkFailed(ConnectivityError::NoCredentials)
        ]
    );
}

// ── Pump ─────────────────────────────────────────────────────

#[test]
fn pump_runs_before_sensor_each_tick() {
    let (mut station, mut sink) =
        station(ScriptedSensor::steady(20.0, 50.0), CannedHttp::ok(WEATHER_OK));
    let remote = station.telemetry().port().remote();
    remote_fire(&remote, "1");
    station.tick(&mut sink);

    let port = station.telemetry().port();
    assert_eq!(port.sent[0], (Feed::Alarm, "1".to_string()));
    assert_eq!(port.keep_alives, 1);
    let delivered = sink.events.iter().position(|e| *e == AppEvent::UpdatesDelivered(1));
    let sampled = sink
        .events
        .iter()
        .position(|e| matches!(e, AppEvent::SensorSampled(_)));
    assert!(delivered.unwrap() < sampled.unwrap());
}
