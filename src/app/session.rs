//! Connection session — one live TCP conversation with the collector.
//!
//! [`Session`] owns the socket for its whole lifetime and multiplexes two
//! duties over it with cooperative polling: listening for `start`/`stop`
//! and, while streaming, pushing one telemetry sample per iteration.  No
//! call waits longer than the link's receive timeout, so the heartbeat and
//! the send cadence never stall behind a quiet collector.
//!
//! ```text
//!            ┌──────── start ────────┐
//!            │                       ▼
//!   open ─▶ Idle                 Streaming ──┐ send sample
//!            ▲                       │       │ heartbeat (≥ interval)
//!            └── stop (LED off) ─────┘ ◀─────┘ poll for stop
//!
//!   closed / recv error / send error ─▶ close: drop socket, LED off
//! ```
//!
//! The session never reconnects; it reports a [`SessionEnd`] and the
//! [`Supervisor`](super::supervisor::Supervisor) decides what happens next.

use core::fmt;

use log::debug;

use super::commands::{Command, RX_BUFFER_LEN};
use super::events::AppEvent;
use super::ports::{EventSink, IndicatorPort, LinkPort, Recv, TelemetrySource, TimePort};
use crate::config::SessionTiming;
use crate::error::LinkError;

/// Whether the session is pushing telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Waiting for `start`.
    Idle,
    /// Sending telemetry, watching for `stop`.
    Streaming,
}

/// Why a session terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The collector closed the connection (orderly shutdown).
    PeerClosed,
    /// A receive failed with something other than a timeout.
    RecvFailed(LinkError),
    /// A telemetry payload could not be written.
    SendFailed(LinkError),
    /// A sample did not fit the payload buffer.
    EncodeFailed,
}

impl SessionEnd {
    /// `true` for an orderly close, `false` for a faulted session.
    pub const fn is_clean(self) -> bool {
        matches!(self, Self::PeerClosed)
    }
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PeerClosed => write!(f, "collector closed connection"),
            Self::RecvFailed(e) => write!(f, "receive failed: {e}"),
            Self::SendFailed(e) => write!(f, "send failed: {e}"),
            Self::EncodeFailed => write!(f, "sample exceeds payload buffer"),
        }
    }
}

/// One connection's worth of state.  Created on connect, consumed on close.
pub struct Session<L> {
    link: L,
    timing: SessionTiming,
    mode: Mode,
    indicator_on: bool,
    last_heartbeat_ms: u64,
    samples_sent: u32,
    rx_buf: [u8; RX_BUFFER_LEN],
}

impl<L: LinkPort> Session<L> {
    /// Take ownership of a freshly connected link.
    ///
    /// Entry action: Idle, indicator on (connection-established signal).
    pub fn open(link: L, timing: SessionTiming, hw: &mut (impl IndicatorPort + TimePort)) -> Self {
        hw.set_indicator(true);
        Self {
            link,
            timing,
            mode: Mode::Idle,
            indicator_on: true,
            last_heartbeat_ms: hw.now_ms(),
            samples_sent: 0,
            rx_buf: [0; RX_BUFFER_LEN],
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Last value written to the indicator.
    pub fn indicator_on(&self) -> bool {
        self.indicator_on
    }

    pub fn samples_sent(&self) -> u32 {
        self.samples_sent
    }

    // ── Main loop ─────────────────────────────────────────────

    /// Drive the session until the link closes or faults, then close it.
    pub fn run(
        mut self,
        hw: &mut (impl IndicatorPort + TimePort),
        telemetry: &mut impl TelemetrySource,
        sink: &mut impl EventSink,
    ) -> SessionEnd {
        loop {
            if let Err(end) = self.step(hw, telemetry, sink) {
                return self.close(end, hw, sink);
            }
        }
    }

    /// One loop iteration.  `Err` carries the terminal condition; the
    /// caller must then [`close`](Self::close) the session.
    pub fn step(
        &mut self,
        hw: &mut (impl IndicatorPort + TimePort),
        telemetry: &mut impl TelemetrySource,
        sink: &mut impl EventSink,
    ) -> Result<(), SessionEnd> {
        if self.mode == Mode::Streaming {
            self.send_sample(telemetry, sink)?;
            self.heartbeat(hw);
        }
        self.poll_command(hw, sink)?;
        hw.delay_ms(self.timing.poll_delay_ms);
        Ok(())
    }

    /// Apply a decoded command.  `Start` while streaming and `Stop` while
    /// idle are no-ops; unknown commands are ignored.
    pub fn handle_command(
        &mut self,
        cmd: &Command,
        hw: &mut (impl IndicatorPort + TimePort),
        sink: &mut impl EventSink,
    ) {
        match (cmd, self.mode) {
            (Command::Start, Mode::Idle) => {
                self.last_heartbeat_ms = hw.now_ms();
                self.set_mode(Mode::Streaming, sink);
            }
            (Command::Stop, Mode::Streaming) => {
                self.set_mode(Mode::Idle, sink);
                self.drive_indicator(hw, false);
            }
            _ => {}
        }
    }

    /// Tear the session down: close the socket, force the indicator off.
    pub fn close(
        self,
        end: SessionEnd,
        hw: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) -> SessionEnd {
        let Self {
            link, samples_sent, ..
        } = self;
        drop(link);
        hw.set_indicator(false);
        sink.emit(&AppEvent::SessionEnded { end, samples_sent });
        end
    }

    // ── Internal ──────────────────────────────────────────────

    fn send_sample(
        &mut self,
        telemetry: &mut impl TelemetrySource,
        sink: &mut impl EventSink,
    ) -> Result<(), SessionEnd> {
        let payload = telemetry
            .next_sample()
            .to_payload()
            .map_err(|_| SessionEnd::EncodeFailed)?;
        self.link
            .send(payload.as_bytes())
            .map_err(SessionEnd::SendFailed)?;
        self.samples_sent = self.samples_sent.wrapping_add(1);
        sink.emit(&AppEvent::SampleSent(payload));
        Ok(())
    }

    /// Blink without blocking: compare elapsed time against the stored
    /// timestamp once per iteration.
    fn heartbeat(&mut self, hw: &mut (impl IndicatorPort + TimePort)) {
        let now = hw.now_ms();
        if now.saturating_sub(self.last_heartbeat_ms) >= u64::from(self.timing.heartbeat_interval_ms) {
            self.drive_indicator(hw, !self.indicator_on);
            self.last_heartbeat_ms = now;
        }
    }

    fn poll_command(
        &mut self,
        hw: &mut (impl IndicatorPort + TimePort),
        sink: &mut impl EventSink,
    ) -> Result<(), SessionEnd> {
        match self.link.recv(&mut self.rx_buf) {
            Ok(Recv::Data(n)) => {
                let cmd = Command::decode(&self.rx_buf[..n.min(RX_BUFFER_LEN)]);
                sink.emit(&AppEvent::CommandReceived(cmd.clone()));
                self.handle_command(&cmd, hw, sink);
                Ok(())
            }
            Ok(Recv::TimedOut) => Ok(()),
            Ok(Recv::Closed) => Err(SessionEnd::PeerClosed),
            Err(e) if e.is_clean() => Err(SessionEnd::PeerClosed),
            Err(e) => Err(SessionEnd::RecvFailed(e)),
        }
    }

    fn set_mode(&mut self, to: Mode, sink: &mut impl EventSink) {
        let from = self.mode;
        self.mode = to;
        debug!("Session: {:?} -> {:?}", from, to);
        sink.emit(&AppEvent::ModeChanged { from, to });
    }

    fn drive_indicator(&mut self, hw: &mut impl IndicatorPort, on: bool) {
        hw.set_indicator(on);
        self.indicator_on = on;
    }
}
