//! TCP client link adapter.
//!
//! Implements [`NetworkPort`] (connect to the collector) and [`LinkPort`]
//! (bounded receive, blocking send) for a single outbound TCP connection.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: raw lwIP sockets.  Socket allocation and
//!   connect are separate calls, so an exhausted socket table surfaces as
//!   [`LinkError::Resource`] and an unreachable collector as
//!   [`LinkError::Connect`].  The receive timeout is `SO_RCVTIMEO`.
//! - **all other targets**: `std::net::TcpStream` with `set_read_timeout`,
//!   for host-side tests against a loopback listener.
//!
//! ## Receive contract
//!
//! | socket result            | [`Recv`]          |
//! |--------------------------|-------------------|
//! | `n > 0` bytes            | `Data(n)`         |
//! | `0` bytes                | `Closed`          |
//! | timeout / would-block    | `TimedOut`        |
//! | anything else            | `Err(Io(errno))`  |

use crate::app::ports::{LinkPort, NetworkPort, Recv};
use crate::config::Endpoint;
use crate::error::LinkError;

#[cfg(not(target_os = "espidf"))]
use log::{debug, info};

#[cfg(not(target_os = "espidf"))]
use std::io::{ErrorKind, Read, Write};

// ───────────────────────────────────────────────────────────────
// ESP-IDF platform helpers (raw lwIP)
// ───────────────────────────────────────────────────────────────
#[cfg(target_os = "espidf")]
mod esp_impl;

// ───────────────────────────────────────────────────────────────
// TcpNetwork
// ───────────────────────────────────────────────────────────────

/// Connector producing one [`TcpLink`] per successful connect.
#[derive(Debug, Default)]
pub struct TcpNetwork;

impl TcpNetwork {
    pub fn new() -> Self {
        Self
    }

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self, endpoint: &Endpoint) -> Result<TcpLink, LinkError> {
        let socket = esp_impl::esp_connect(endpoint)?;
        Ok(TcpLink { socket })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self, endpoint: &Endpoint) -> Result<TcpLink, LinkError> {
        use std::net::{TcpStream, ToSocketAddrs};
        use std::time::Duration;

        let addrs = (endpoint.host.as_str(), endpoint.port)
            .to_socket_addrs()
            .map_err(|e| LinkError::Connect(os_code(&e)))?;

        let mut last = LinkError::Connect(0);
        for addr in addrs {
            match TcpStream::connect(addr) {
                Ok(stream) => {
                    stream
                        .set_read_timeout(Some(Duration::from_millis(u64::from(
                            endpoint.recv_timeout_ms,
                        ))))
                        .map_err(|e| LinkError::Resource(os_code(&e)))?;
                    info!("TCP(sim): connected to {}", addr);
                    return Ok(TcpLink { stream });
                }
                Err(e) => {
                    debug!("TCP(sim): connect to {} failed: {}", addr, e);
                    last = LinkError::Connect(os_code(&e));
                }
            }
        }
        Err(last)
    }
}

impl NetworkPort for TcpNetwork {
    type Link = TcpLink;

    fn connect(&mut self, endpoint: &Endpoint) -> Result<TcpLink, LinkError> {
        self.platform_connect(endpoint)
    }
}

// ───────────────────────────────────────────────────────────────
// TcpLink
// ───────────────────────────────────────────────────────────────

/// One connected TCP socket.  Dropping it closes the socket.
pub struct TcpLink {
    #[cfg(target_os = "espidf")]
    socket: esp_impl::EspSocket,
    #[cfg(not(target_os = "espidf"))]
    stream: std::net::TcpStream,
}

/// Push all of `data` through `write_once`, which returns the number of
/// bytes the socket accepted.  A write that accepts nothing from a
/// non-empty slice is an I/O error, not a retry.
fn send_all(
    data: &[u8],
    mut write_once: impl FnMut(&[u8]) -> Result<usize, LinkError>,
) -> Result<(), LinkError> {
    let mut off = 0;
    while off < data.len() {
        match write_once(&data[off..])? {
            0 => return Err(LinkError::Io(0)),
            n => off += n,
        }
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn os_code(e: &std::io::Error) -> i32 {
    e.raw_os_error().unwrap_or(0)
}

impl LinkPort for TcpLink {
    #[cfg(target_os = "espidf")]
    fn recv(&mut self, buf: &mut [u8]) -> Result<Recv, LinkError> {
        esp_impl::esp_recv(&self.socket, buf)
    }

    #[cfg(not(target_os = "espidf"))]
    fn recv(&mut self, buf: &mut [u8]) -> Result<Recv, LinkError> {
        match self.stream.read(buf) {
            Ok(0) => Ok(Recv::Closed),
            Ok(n) => Ok(Recv::Data(n)),
            Err(ref e)
                if matches!(
                    e.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) =>
            {
                Ok(Recv::TimedOut)
            }
            Err(e) => Err(LinkError::Io(os_code(&e))),
        }
    }

    #[cfg(target_os = "espidf")]
    fn send(&mut self, data: &[u8]) -> Result<(), LinkError> {
        esp_impl::esp_send(&self.socket, data)
    }

    #[cfg(not(target_os = "espidf"))]
    fn send(&mut self, data: &[u8]) -> Result<(), LinkError> {
        send_all(data, |rest| loop {
            match self.stream.write(rest) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(LinkError::Io(os_code(&e))),
            }
        })
    }
}

// ───────────────────────────────────────────────────────────────
// Tests (host / simulation path only)
// ───────────────────────────────────────────────────────────────
