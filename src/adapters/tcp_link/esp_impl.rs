//! ESP-IDF platform helpers for `TcpLink`.
//!
//! Compiled only for `target_os = "espidf"`; contains the raw lwIP socket
//! calls.  All items are `pub(super)` to keep them private to the adapter.

use core::ffi::{c_int, c_void};
use core::mem::size_of;
use core::net::Ipv4Addr;

use log::{info, warn};

use esp_idf_svc::sys::{
    AF_INET, EAGAIN, IPPROTO_TCP, SO_RCVTIMEO, SOCK_STREAM, SOL_SOCKET, in_addr, lwip_close,
    lwip_connect, lwip_recv, lwip_send, lwip_setsockopt, lwip_socket, sockaddr,
    sockaddr_in, socklen_t, timeval,
};

use super::send_all;
use crate::app::ports::Recv;
use crate::config::Endpoint;
use crate::error::LinkError;

fn errno() -> i32 {
    // SAFETY: __errno() returns the pointer to the current task errno,
    // which is valid to read in any task context.
    unsafe { *esp_idf_svc::sys::__errno() }
}

// ── Socket handle ─────────────────────────────────────────────────────────────

/// Owned lwIP socket descriptor, closed exactly once on drop.
pub(super) struct EspSocket {
    fd: c_int,
}

impl Drop for EspSocket {
    fn drop(&mut self) {
        // SAFETY: `fd` came from a successful `lwip_socket` and is closed
        // only here.
        unsafe {
            lwip_close(self.fd);
        }
        info!("TCP(espidf): socket {} closed", self.fd);
    }
}

// ── Connect ───────────────────────────────────────────────────────────────────

/// Allocate a socket, connect it to `endpoint`, and apply `SO_RCVTIMEO`.
///
/// Only dotted-quad IPv4 hosts are accepted; the collector address is
/// fixed configuration.
pub(super) fn esp_connect(endpoint: &Endpoint) -> Result<EspSocket, LinkError> {
    let ip: Ipv4Addr = endpoint.host.parse().map_err(|_| {
        warn!("TCP(espidf): '{}' is not an IPv4 address", endpoint.host);
        LinkError::Connect(0)
    })?;

    // SAFETY: plain FFI call with constant arguments.
    let fd = unsafe { lwip_socket(AF_INET as c_int, SOCK_STREAM as c_int, IPPROTO_TCP as c_int) };
    if fd < 0 {
        return Err(LinkError::Resource(errno()));
    }
    // From here on, early returns close the descriptor.
    let socket = EspSocket { fd };

    // SAFETY: sockaddr_in is a plain C struct; all-zero is a valid value.
    let mut addr: sockaddr_in = unsafe { core::mem::zeroed() };
    addr.sin_len = size_of::<sockaddr_in>() as u8;
    addr.sin_family = AF_INET as _;
    addr.sin_port = endpoint.port.to_be();
    addr.sin_addr = in_addr {
        s_addr: u32::from_ne_bytes(ip.octets()),
    };

    // SAFETY: `addr` outlives the call and the length matches its type.
    let rc = unsafe {
        lwip_connect(
            fd,
            (&raw const addr).cast::<sockaddr>(),
            size_of::<sockaddr_in>() as socklen_t,
        )
    };
    if rc != 0 {
        return Err(LinkError::Connect(errno()));
    }

    let ms = endpoint.recv_timeout_ms;
    let tv = timeval {
        tv_sec: (ms / 1000) as _,
        tv_usec: ((ms % 1000) * 1000) as _,
    };
    // SAFETY: `tv` outlives the call and the length matches its type.
    let rc = unsafe {
        lwip_setsockopt(
            fd,
            SOL_SOCKET as c_int,
            SO_RCVTIMEO as c_int,
            (&raw const tv).cast::<c_void>(),
            size_of::<timeval>() as socklen_t,
        )
    };
    if rc != 0 {
        return Err(LinkError::Resource(errno()));
    }

    info!(
        "TCP(espidf): socket {} connected to {}:{}",
        fd, endpoint.host, endpoint.port
    );
    Ok(socket)
}

// ── Receive / send ────────────────────────────────────────────────────────────

pub(super) fn esp_recv(socket: &EspSocket, buf: &mut [u8]) -> Result<Recv, LinkError> {
    // SAFETY: `buf` is valid for writes of `buf.len()` bytes.
    let n = unsafe { lwip_recv(socket.fd, buf.as_mut_ptr().cast::<c_void>(), buf.len(), 0) };
    match n {
        n if n > 0 => Ok(Recv::Data(n as usize)),
        0 => Ok(Recv::Closed),
        _ => {
            // EWOULDBLOCK == EAGAIN in newlib.
            let err = errno();
            if err == EAGAIN as i32 {
                Ok(Recv::TimedOut)
            } else {
                Err(LinkError::Io(err))
            }
        }
    }
}

pub(super) fn esp_send(socket: &EspSocket, data: &[u8]) -> Result<(), LinkError> {
    send_all(data, |rest| {
        // SAFETY: `rest` is valid for reads of `rest.len()` bytes.
        let n = unsafe { lwip_send(socket.fd, rest.as_ptr().cast::<c_void>(), rest.len(), 0) };
        if n < 0 {
            Err(LinkError::Io(errno()))
        } else {
            Ok(n as usize)
        }
    })
}
