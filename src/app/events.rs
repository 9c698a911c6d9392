//! Outbound application events.
//!
//! The [`Session`](super::session::Session) and
//! [`Supervisor`](super::supervisor::Supervisor) emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other side
//! decide what to do with them; in firmware they become log records.

use super::commands::Command;
use super::session::{Mode, SessionEnd};
use super::supervisor::ConnectivityState;
use crate::error::LinkError;
use crate::sensors::Payload;

/// Structured events emitted by the link core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The supervisor's view of the collector link changed.
    ConnectivityChanged(ConnectivityState),

    /// A socket could not be allocated.
    SocketUnavailable(LinkError),

    /// The collector could not be reached.
    ConnectFailed(LinkError),

    /// A chunk arrived from the collector (decoded, possibly unknown).
    CommandReceived(Command),

    /// The session switched between Idle and Streaming.
    ModeChanged { from: Mode, to: Mode },

    /// A telemetry payload was written to the socket.
    SampleSent(Payload),

    /// A session terminated; the socket is closed and the indicator off.
    SessionEnded { end: SessionEnd, samples_sent: u32 },

    /// The supervisor is about to sleep before its next attempt.
    RetryScheduled { delay_ms: u32 },
}
