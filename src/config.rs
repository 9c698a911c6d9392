//! Node configuration parameters
//!
//! All tunable parameters for the SensorLink node.  Defaults are baked in
//! at build time (see `build.rs` for the `SENSORLINK_*` environment
//! variables) and can be replaced wholesale by a JSON override document.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Collector address used when the build does not override it.
pub const DEFAULT_SERVER_HOST: &str = "192.168.0.208";
/// Collector port used when the build does not override it.
pub const DEFAULT_SERVER_PORT: u16 = 1234;

/// Upper bound for the receive timeout.  Anything longer starves the
/// telemetry cadence and the heartbeat.
pub const MAX_RECV_TIMEOUT_MS: u32 = 1000;

/// Core node configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    // --- WiFi ---
    /// Access point SSID (1-32 printable ASCII bytes)
    pub wifi_ssid: String<32>,
    /// WPA2 passphrase (empty for open networks)
    pub wifi_password: String<64>,
    /// Association attempts before bring-up reports `ConnectivityLost`
    pub wifi_max_retries: u32,
    /// Pause before retrying a failed bring-up (milliseconds)
    pub connectivity_retry_delay_ms: u32,

    // --- Collector endpoint ---
    /// IPv4 address or hostname of the collector
    pub server_host: String<64>,
    /// TCP port of the collector
    pub server_port: u16,

    // --- Session timing ---
    /// Upper bound on a single receive call (milliseconds)
    pub recv_timeout_ms: u32,
    /// Fixed pause at the end of every session iteration (milliseconds)
    pub poll_delay_ms: u32,
    /// Minimum spacing between heartbeat toggles while streaming (milliseconds)
    pub heartbeat_interval_ms: u32,

    // --- Reconnect backoff ---
    /// Retry delay after a socket could not be allocated (milliseconds)
    pub socket_retry_delay_ms: u32,
    /// Retry delay after a failed connect (milliseconds)
    pub connect_retry_delay_ms: u32,
    /// Cooldown after any session end (milliseconds)
    pub reconnect_cooldown_ms: u32,
}

/// Address of the collector the supervisor connects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String<64>,
    pub port: u16,
    /// Receive timeout applied to every socket created for this endpoint.
    pub recv_timeout_ms: u32,
}

/// Timing knobs consumed by [`Session`](crate::app::session::Session).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    pub poll_delay_ms: u32,
    pub heartbeat_interval_ms: u32,
}

/// Backoff delays applied by the [`Supervisor`](crate::app::supervisor::Supervisor).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub socket_retry_ms: u32,
    pub connect_retry_ms: u32,
    pub cooldown_ms: u32,
}

fn bounded<const N: usize>(value: &str) -> String<N> {
    let mut out = String::new();
    for c in value.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

impl Default for NodeConfig {
    fn default() -> Self {
        let server_port = option_env!("SENSORLINK_SERVER_PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_SERVER_PORT);

        Self {
            // WiFi
            wifi_ssid: bounded(option_env!("SENSORLINK_WIFI_SSID").unwrap_or("")),
            wifi_password: bounded(option_env!("SENSORLINK_WIFI_PASSWORD").unwrap_or("")),
            wifi_max_retries: 10,
            connectivity_retry_delay_ms: 5000,

            // Collector
            server_host: bounded(
                option_env!("SENSORLINK_SERVER_HOST").unwrap_or(DEFAULT_SERVER_HOST),
            ),
            server_port,

            // Session
            recv_timeout_ms: 100,
            poll_delay_ms: 10,
            heartbeat_interval_ms: 200,

            // Backoff
            socket_retry_delay_ms: 1000,
            connect_retry_delay_ms: 3000,
            reconnect_cooldown_ms: 3000,
        }
    }
}

impl NodeConfig {
    /// Parse a JSON override document and validate it.
    pub fn from_json(doc: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(doc).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }

    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server_host.is_empty() {
            return Err(ConfigError::ValidationFailed("server_host must not be empty"));
        }
        if self.server_port == 0 {
            return Err(ConfigError::ValidationFailed("server_port must be non-zero"));
        }
        if self.recv_timeout_ms == 0 || self.recv_timeout_ms > MAX_RECV_TIMEOUT_MS {
            return Err(ConfigError::ValidationFailed("recv_timeout_ms must be 1-1000"));
        }
        if self.heartbeat_interval_ms <= self.poll_delay_ms {
            return Err(ConfigError::ValidationFailed(
                "heartbeat_interval_ms must exceed poll_delay_ms",
            ));
        }
        if self.socket_retry_delay_ms == 0
            || self.connect_retry_delay_ms == 0
            || self.reconnect_cooldown_ms == 0
        {
            return Err(ConfigError::ValidationFailed("backoff delays must be non-zero"));
        }
        if self.wifi_max_retries == 0 {
            return Err(ConfigError::ValidationFailed("wifi_max_retries must be non-zero"));
        }
        Ok(())
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint {
            host: self.server_host.clone(),
            port: self.server_port,
            recv_timeout_ms: self.recv_timeout_ms,
        }
    }

    pub fn session_timing(&self) -> SessionTiming {
        SessionTiming {
            poll_delay_ms: self.poll_delay_ms,
            heartbeat_interval_ms: self.heartbeat_interval_ms,
        }
    }

    pub fn backoff(&self) -> Backoff {
        Backoff {
            socket_retry_ms: self.socket_retry_delay_ms,
            connect_retry_ms: self.connect_retry_delay_ms,
            cooldown_ms: self.reconnect_cooldown_ms,
        }
    }
}
