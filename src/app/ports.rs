//! Port traits — the hexagonal boundary between the link logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Session / Supervisor (domain)
//! ```
//!
//! Driven adapters (TCP socket, status LED, clock, event sink) implement
//! these traits.  The [`Session`](super::session::Session) and
//! [`Supervisor`](super::supervisor::Supervisor) consume them via generics,
//! so the domain core never touches lwIP, GPIO or FreeRTOS directly and can
//! be driven against mocks on the host.

use crate::config::Endpoint;
use crate::error::{ConnectivityError, LinkError};
use crate::sensors::TelemetrySample;

// ───────────────────────────────────────────────────────────────
// Link ports (driven adapter: domain ↔ TCP)
// ───────────────────────────────────────────────────────────────

/// Outcome of one bounded receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recv {
    /// `n` bytes were written into the caller's buffer.
    Data(usize),
    /// Zero-length read: the peer shut the connection down.
    Closed,
    /// The receive timeout elapsed (or the call would block) with no data.
    TimedOut,
}

/// One established, exclusively owned TCP connection.
///
/// Dropping the link closes the socket.
pub trait LinkPort {
    /// Receive into `buf`, waiting no longer than the link's receive timeout.
    fn recv(&mut self, buf: &mut [u8]) -> Result<Recv, LinkError>;

    /// Send all of `data`.
    fn send(&mut self, data: &[u8]) -> Result<(), LinkError>;
}

/// Factory for [`LinkPort`]s.
///
/// Implementations distinguish socket allocation failures
/// ([`LinkError::Resource`]) from reachability failures
/// ([`LinkError::Connect`]); the supervisor backs off differently for each.
pub trait NetworkPort {
    type Link: LinkPort;

    /// Allocate a socket, connect it to `endpoint`, and apply the endpoint's
    /// receive timeout.  On failure no socket is left open.
    fn connect(&mut self, endpoint: &Endpoint) -> Result<Self::Link, LinkError>;
}

// ───────────────────────────────────────────────────────────────
// Board ports (driven adapter: domain → LED, clock)
// ───────────────────────────────────────────────────────────────

/// Status indicator (single LED).  Write-only, idempotent, infallible.
pub trait IndicatorPort {
    fn set_indicator(&mut self, active: bool);
}

/// Monotonic time and blocking delays.
pub trait TimePort {
    /// Milliseconds since boot (monotonic).
    fn now_ms(&self) -> u64;

    /// Block the calling task for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Telemetry source (driven adapter: sensors → domain)
// ───────────────────────────────────────────────────────────────

/// Produces one telemetry sample per streaming tick.
pub trait TelemetrySource {
    fn next_sample(&mut self) -> TelemetrySample;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Connectivity port (driving collaborator: WiFi bring-up)
// ───────────────────────────────────────────────────────────────

/// One-shot network bring-up.  Must complete before the supervisor runs.
pub trait ConnectivityPort {
    /// Block until the station has an IP address, or the retry budget is
    /// exhausted.
    fn wait_for_connectivity(&mut self) -> Result<(), ConnectivityError>;

    fn is_connected(&self) -> bool;
}
