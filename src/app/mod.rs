//! Application core — link state machines, zero direct I/O.
//!
//! This module contains the rules for talking to the collector: the
//! per-connection [`session::Session`] (Idle/Streaming, heartbeat) and the
//! [`supervisor::Supervisor`] that reconnects forever.  All interaction
//! with sockets, GPIO and the clock happens through **port traits**
//! defined in [`ports`], keeping this layer fully testable without real
//! peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod session;
pub mod supervisor;
