//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing link events to the ESP-IDF logger
//! (UART / USB-CDC in production).  Every sent payload is logged at
//! `debug` so a serial console at `info` stays readable while streaming.

use log::{debug, error, info, warn};

use crate::app::commands::Command;
use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::app::supervisor::ConnectivityState;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::ConnectivityChanged(ConnectivityState::Connected) => {
                info!("LINK  | connected to collector");
            }
            AppEvent::ConnectivityChanged(ConnectivityState::Disconnected) => {
                info!("LINK  | disconnected");
            }
            AppEvent::SocketUnavailable(e) => {
                error!("LINK  | unable to create socket: {}", e);
            }
            AppEvent::ConnectFailed(e) => {
                warn!("LINK  | {}", e);
            }
            AppEvent::CommandReceived(Command::Unknown(bytes)) => {
                info!(
                    "CMD   | ignored {:?}",
                    core::str::from_utf8(bytes).unwrap_or("<non-utf8>")
                );
            }
            AppEvent::CommandReceived(cmd) => {
                info!("CMD   | {:?}", cmd);
            }
            AppEvent::ModeChanged { from, to } => {
                info!("MODE  | {:?} -> {:?}", from, to);
            }
            AppEvent::SampleSent(payload) => {
                debug!("TELEM | {}", payload);
            }
            AppEvent::SessionEnded { end, samples_sent } if end.is_clean() => {
                info!("LINK  | {} ({} samples sent)", end, samples_sent);
            }
            AppEvent::SessionEnded { end, samples_sent } => {
                warn!("LINK  | {} ({} samples sent)", end, samples_sent);
            }
            AppEvent::RetryScheduled { delay_ms } => {
                info!("LINK  | next attempt in {} ms", delay_ms);
            }
        }
    }
}
