//! Error types for the SensorLink firmware.
//!
//! One enum per subsystem.  All variants are `Copy` so they can be carried
//! inside [`AppEvent`](crate::app::events::AppEvent)s and session outcomes
//! without allocation.  The binary converts them into `anyhow::Error` at
//! the bring-up boundary.
//!
//! Socket-level errors ([`LinkError`]) never escape the reconnection
//! supervisor; they are classified there into a backoff delay and logged.

use core::fmt;

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

/// Errors raised by the TCP link and its connector.
///
/// The `i32` payloads carry the raw errno (lwIP) or OS error code (host);
/// `0` when none was available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// A socket could not be allocated (local resource exhaustion).
    Resource(i32),
    /// The endpoint was unreachable, refused the connection, or its
    /// address could not be resolved.
    Connect(i32),
    /// The peer performed an orderly shutdown.
    PeerClosed,
    /// Unexpected receive/send failure on an established link.
    Io(i32),
}

impl LinkError {
    /// Whether this error represents a normal end of conversation rather
    /// than a fault.
    pub const fn is_clean(self) -> bool {
        matches!(self, Self::PeerClosed)
    }
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resource(code) => write!(f, "socket allocation failed (errno {code})"),
            Self::Connect(code) => write!(f, "connect failed (errno {code})"),
            Self::PeerClosed => write!(f, "connection closed by peer"),
            Self::Io(code) => write!(f, "socket I/O error (errno {code})"),
        }
    }
}

impl core::error::Error for LinkError {}

// ---------------------------------------------------------------------------
// Connectivity errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    /// No SSID has been configured.
    NoCredentials,
    /// SSID must be 1-32 printable ASCII bytes.
    InvalidSsid,
    /// Password must be empty (open network) or 8-64 bytes.
    InvalidPassword,
    /// The WiFi driver could not be created or configured.
    DriverInit,
    /// Association never succeeded within the retry budget.
    ConnectivityLost { attempts: u32 },
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::DriverInit => write!(f, "WiFi driver initialisation failed"),
            Self::ConnectivityLost { attempts } => {
                write!(f, "could not join access point after {attempts} attempts")
            }
        }
    }
}

impl core::error::Error for ConnectivityError {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The override document could not be parsed.
    Malformed,
    /// A field failed range validation; the message names the field.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed config document"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl core::error::Error for ConfigError {}
