fn main() {
    // Credentials and endpoints are captured with `option_env!` in
    // src/config.rs; rebuild whenever one of them changes.
    for var in [
        "FIREWATCH_CLOUD_USERNAME",
        "FIREWATCH_CLOUD_KEY",
        "FIREWATCH_WIFI_SSID",
        "FIREWATCH_WIFI_PASSWORD",
        "FIREWATCH_WEATHER_URL",
        "FIREWATCH_POLL_INTERVAL_SECS",
        "FIREWATCH_BROKER_HOST",
    ] {
        println!("cargo:rerun-if-env-changed={var}");
    }

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
