fn main() {
    // Baked-in node configuration (see `config::NodeConfig::default`).
    for var in [
        "SENSORLINK_WIFI_SSID",
        "SENSORLINK_WIFI_PASSWORD",
        "SENSORLINK_SERVER_HOST",
        "SENSORLINK_SERVER_PORT",
    ] {
        println!("cargo:rerun-if-env-changed={var}");
    }

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
