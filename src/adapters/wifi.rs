//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`], the boundary between the link core
//! and network-interface bring-up.  The supervisor is only started once
//! [`ConnectivityPort::wait_for_connectivity`] has returned `Ok`.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `BlockingWifi<EspWifi>` from `esp_idf_svc`,
//!   WPA2-Personal (or open when the password is empty).
//! - **all other targets**: simulation with scripted association failures
//!   for host-side tests.
//!
//! ## Retry policy
//!
//! One initial association plus up to `max_retries` re-attempts; when all
//! fail the adapter reports [`ConnectivityError::ConnectivityLost`] and
//! drops back to `Failed`.  The caller decides when to try again.

use log::{error, info, warn};

use crate::app::ports::ConnectivityPort;
use crate::error::ConnectivityError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::modem::Modem,
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi},
};

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connecting { attempt: u32 },
    Connected,
    Failed,
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 {
        return Err(ConnectivityError::InvalidSsid);
    }
    if !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    max_retries: u32,
    #[cfg(target_os = "espidf")]
    wifi: BlockingWifi<EspWifi<'static>>,
    /// Simulation: association attempts that will fail before one succeeds.
    #[cfg(not(target_os = "espidf"))]
    sim_failures_left: u32,
    #[cfg(not(target_os = "espidf"))]
    sim_attempts: u32,
}

impl WifiAdapter {
    /// Create the station driver.  Credentials are set separately.
    #[cfg(target_os = "espidf")]
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
        max_retries: u32,
    ) -> Result<Self, ConnectivityError> {
        let driver = EspWifi::new(modem, sysloop.clone(), Some(nvs)).map_err(|e| {
            error!("WiFi(espidf): driver init failed: {}", e);
            ConnectivityError::DriverInit
        })?;
        let wifi = BlockingWifi::wrap(driver, sysloop).map_err(|e| {
            error!("WiFi(espidf): blocking wrapper failed: {}", e);
            ConnectivityError::DriverInit
        })?;
        Ok(Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            max_retries,
            wifi,
        })
    }

    /// Create a simulated station that always associates on first try.
    #[cfg(not(target_os = "espidf"))]
    pub fn new(max_retries: u32) -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            max_retries,
            sim_failures_left: 0,
            sim_attempts: 0,
        }
    }

    /// Simulation: make the next `n` association attempts fail.
    #[cfg(not(target_os = "espidf"))]
    pub fn simulate_failures(&mut self, n: u32) {
        self.sim_failures_left = n;
    }

    /// Simulation: total association attempts made so far.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_attempts(&self) -> u32 {
        self.sim_attempts
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        self.password.clear();
        self.password.push_str(password).map_err(|_| ConnectivityError::InvalidPassword)?;
        info!("WiFi: credentials updated (SSID='{}')", self.ssid);
        Ok(())
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_configure(&mut self) -> Result<(), ConnectivityError> {
        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let config = Configuration::Client(ClientConfiguration {
            ssid: self
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });
        self.wifi.set_configuration(&config).map_err(|e| {
            error!("WiFi(espidf): set_configuration failed: {}", e);
            ConnectivityError::DriverInit
        })?;
        if !self.wifi.is_started().unwrap_or(false) {
            self.wifi.start().map_err(|e| {
                error!("WiFi(espidf): start failed: {}", e);
                ConnectivityError::DriverInit
            })?;
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_configure(&mut self) -> Result<(), ConnectivityError> {
        Ok(())
    }

    /// One association attempt; `true` once the interface has an address.
    #[cfg(target_os = "espidf")]
    fn platform_associate(&mut self) -> bool {
        if let Err(e) = self.wifi.connect() {
            warn!("WiFi(espidf): association failed: {}", e);
            return false;
        }
        if let Err(e) = self.wifi.wait_netif_up() {
            warn!("WiFi(espidf): no IP address: {}", e);
            if let Err(e) = self.wifi.disconnect() {
                warn!("WiFi(espidf): disconnect after failed attempt: {}", e);
            }
            return false;
        }
        if let Ok(ip) = self.wifi.wifi().sta_netif().get_ip_info() {
            info!("WiFi(espidf): got ip {}", ip.ip);
        }
        true
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_associate(&mut self) -> bool {
        self.sim_attempts = self.sim_attempts.wrapping_add(1);
        if self.sim_failures_left > 0 {
            self.sim_failures_left -= 1;
            warn!("WiFi(sim): simulated association failure (attempt {})", self.sim_attempts);
            return false;
        }
        info!("WiFi(sim): connected to '{}'", self.ssid);
        true
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.state == WifiState::Connected
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn wait_for_connectivity(&mut self) -> Result<(), ConnectivityError> {
        if self.ssid.is_empty() {
            return Err(ConnectivityError::NoCredentials);
        }
        if self.state == WifiState::Connected && self.platform_is_connected() {
            return Ok(());
        }

        info!("WiFi: connecting to '{}'", self.ssid);
        self.platform_configure()?;

        let attempts = self.max_retries.saturating_add(1);
        for attempt in 1..=attempts {
            self.state = WifiState::Connecting { attempt };
            if self.platform_associate() {
                self.state = WifiState::Connected;
                info!("WiFi: connected to '{}' (attempt {})", self.ssid, attempt);
                return Ok(());
            }
            if attempt < attempts {
                info!("WiFi: retry {}/{}", attempt, self.max_retries);
            }
        }

        self.state = WifiState::Failed;
        error!("WiFi: failed to connect to '{}'", self.ssid);
        Err(ConnectivityError::ConnectivityLost { attempts })
    }

    fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
