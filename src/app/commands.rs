//! Inbound commands from the collector.
//!
//! The collector controls streaming with two bare ASCII words.  A received
//! chunk is compared byte-for-byte: no trimming, no case folding, no
//! reassembly across receives.  Anything else is [`Command::Unknown`] and
//! the session ignores it.

/// Receive buffer size.  Longer chunks are truncated and cannot match.
pub const RX_BUFFER_LEN: usize = 128;

/// Raw bytes of an unrecognised chunk.
pub type UnknownBytes = heapless::Vec<u8, RX_BUFFER_LEN>;

/// Commands the collector can send to the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Begin streaming telemetry.
    Start,
    /// Stop streaming telemetry.
    Stop,
    /// Anything else (kept for logging).
    Unknown(UnknownBytes),
}

impl Command {
    pub const START: &'static [u8] = b"start";
    pub const STOP: &'static [u8] = b"stop";

    /// Decode one received chunk.
    pub fn decode(chunk: &[u8]) -> Self {
        match chunk {
            Self::START => Self::Start,
            Self::STOP => Self::Stop,
            other => {
                let keep = other.len().min(RX_BUFFER_LEN);
                let mut bytes = UnknownBytes::new();
                // Cannot fail: `keep` is bounded by the capacity.
                let _ = bytes.extend_from_slice(&other[..keep]);
                Self::Unknown(bytes)
            }
        }
    }
}
