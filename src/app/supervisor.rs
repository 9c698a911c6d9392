//! Reconnection supervisor — the outer, never-ending connect loop.
//!
//! The supervisor is the only recovery point for link failures.  Its
//! policy is unconditional retry with fixed, cause-dependent backoff:
//!
//! | Outcome                         | Wait before next attempt |
//! |---------------------------------|--------------------------|
//! | socket allocation failed        | `socket_retry_ms` (1 s)  |
//! | connect failed                  | `connect_retry_ms` (3 s) |
//! | session ended (any reason)      | `cooldown_ms` (3 s)      |
//!
//! At most one [`Session`] exists at a time; it is created inside
//! [`Supervisor::run_once`] and consumed before that call returns.

use log::info;

use super::events::AppEvent;
use super::ports::{EventSink, IndicatorPort, NetworkPort, TelemetrySource, TimePort};
use super::session::{Session, SessionEnd};
use crate::config::{Backoff, Endpoint, NodeConfig, SessionTiming};
use crate::error::LinkError;

/// Supervisor's view of the collector link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    Disconnected,
    Connected,
}

/// Result of one supervisor iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    /// No socket could be allocated; waited `socket_retry_ms`.
    SocketUnavailable(LinkError),
    /// The endpoint could not be reached; waited `connect_retry_ms`.
    ConnectFailed(LinkError),
    /// A session ran to completion; waited `cooldown_ms`.
    SessionEnded(SessionEnd),
}

pub struct Supervisor<N, T> {
    network: N,
    telemetry: T,
    endpoint: Endpoint,
    timing: SessionTiming,
    backoff: Backoff,
    state: ConnectivityState,
    /// Failed connect attempts since the last successful connect.
    consecutive_failures: u32,
    sessions: u32,
}

impl<N: NetworkPort, T: TelemetrySource> Supervisor<N, T> {
    pub fn new(network: N, telemetry: T, config: &NodeConfig) -> Self {
        Self {
            network,
            telemetry,
            endpoint: config.endpoint(),
            timing: config.session_timing(),
            backoff: config.backoff(),
            state: ConnectivityState::Disconnected,
            consecutive_failures: 0,
            sessions: 0,
        }
    }

    pub fn state(&self) -> ConnectivityState {
        self.state
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Sessions opened since construction.
    pub fn sessions(&self) -> u32 {
        self.sessions
    }

    /// Connect, stream, reconnect — forever.
    pub fn run(&mut self, hw: &mut (impl IndicatorPort + TimePort), sink: &mut impl EventSink) -> ! {
        info!(
            "Supervisor: collector at {}:{}",
            self.endpoint.host, self.endpoint.port
        );
        loop {
            self.run_once(hw, sink);
        }
    }

    /// One attempt: connect, run a session if connected, then back off.
    pub fn run_once(
        &mut self,
        hw: &mut (impl IndicatorPort + TimePort),
        sink: &mut impl EventSink,
    ) -> Attempt {
        let link = match self.network.connect(&self.endpoint) {
            Ok(link) => link,
            Err(e) => return self.connect_failed(e, hw, sink),
        };

        self.consecutive_failures = 0;
        self.sessions = self.sessions.wrapping_add(1);
        self.set_state(ConnectivityState::Connected, sink);

        let end = Session::open(link, self.timing, hw).run(hw, &mut self.telemetry, sink);

        self.set_state(ConnectivityState::Disconnected, sink);
        self.back_off(self.backoff.cooldown_ms, hw, sink);
        Attempt::SessionEnded(end)
    }

    // ── Internal ──────────────────────────────────────────────

    fn connect_failed(
        &mut self,
        error: LinkError,
        hw: &mut impl TimePort,
        sink: &mut impl EventSink,
    ) -> Attempt {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        if let LinkError::Resource(_) = error {
            sink.emit(&AppEvent::SocketUnavailable(error));
            self.back_off(self.backoff.socket_retry_ms, hw, sink);
            Attempt::SocketUnavailable(error)
        } else {
            sink.emit(&AppEvent::ConnectFailed(error));
            self.back_off(self.backoff.connect_retry_ms, hw, sink);
            Attempt::ConnectFailed(error)
        }
    }

    fn back_off(&self, delay_ms: u32, hw: &mut impl TimePort, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::RetryScheduled { delay_ms });
        hw.delay_ms(delay_ms);
    }

    fn set_state(&mut self, to: ConnectivityState, sink: &mut impl EventSink) {
        if self.state != to {
            self.state = to;
            sink.emit(&AppEvent::ConnectivityChanged(to));
        }
    }
}
