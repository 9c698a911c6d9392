//! SensorLink Firmware — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  BoardAdapter        TcpNetwork      WifiAdapter  LogEventSink │
//! │  (Indicator+Time)    (Network+Link)  (Connectivity) (EventSink)│
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  Supervisor ─▶ Session ◀─ TelemetryGenerator           │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::gpio::PinDriver;
use esp_idf_svc::hal::prelude::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use sensorlink::adapters::board::BoardAdapter;
use sensorlink::adapters::gpio_indicator::GpioIndicator;
use sensorlink::adapters::log_sink::LogEventSink;
use sensorlink::adapters::tcp_link::TcpNetwork;
use sensorlink::adapters::time::Esp32TimeAdapter;
use sensorlink::adapters::wifi::WifiAdapter;
use sensorlink::app::ports::{ConnectivityPort, IndicatorPort, TimePort};
use sensorlink::app::supervisor::Supervisor;
use sensorlink::config::NodeConfig;
use sensorlink::sensors::simulated::TelemetryGenerator;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  SensorLink v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = NodeConfig::default();
    config.validate()?;

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    // Erases and re-initialises the partition when it is full or was
    // written by a newer NVS version.
    let nvs = EspDefaultNvsPartition::take()?;

    let led = PinDriver::output(peripherals.pins.gpio19)?;
    let mut board = BoardAdapter::new(GpioIndicator::new(led), Esp32TimeAdapter::new());
    board.set_indicator(false);

    // ── 4. WiFi bring-up (retried, never fatal) ───────────────
    let mut wifi = WifiAdapter::new(peripherals.modem, sysloop, nvs, config.wifi_max_retries)?;
    wifi.set_credentials(&config.wifi_ssid, &config.wifi_password)?;
    while let Err(e) = wifi.wait_for_connectivity() {
        warn!(
            "WiFi: {}, retrying in {} ms",
            e, config.connectivity_retry_delay_ms
        );
        board.delay_ms(config.connectivity_retry_delay_ms);
    }

    // ── 5. Link supervisor ────────────────────────────────────
    let mut supervisor = Supervisor::new(TcpNetwork::new(), TelemetryGenerator::from_entropy(), &config);
    let mut sink = LogEventSink::new();
    info!("Entering link loop");
    supervisor.run(&mut board, &mut sink)
}
