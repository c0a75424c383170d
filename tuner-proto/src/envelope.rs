//! Outbound snapshot envelope.
//!
//! Every snapshot leaves the device wrapped in a fixed frame:
//!
//! ```text
//! 0D 0A | payload (N bytes) | 00 FF FF
//! ```
//!
//! The header and tail never change; only the payload is rewritten between
//! publications, so one [`Envelope`] is allocated up front and reused.

use core::fmt;

/// Frame start marker.
pub const HEADER: [u8; 2] = [0x0D, 0x0A];

/// Frame end marker.
pub const TAIL: [u8; 3] = [0x00, 0xFF, 0xFF];

/// Bytes added around the payload.
pub const ENVELOPE_OVERHEAD: usize = HEADER.len() + TAIL.len();

/// Wire length of an envelope carrying `payload_len` bytes.
#[inline]
#[must_use]
pub const fn envelope_len(payload_len: usize) -> usize {
    payload_len + ENVELOPE_OVERHEAD
}

/// Error type for encoding into caller-provided buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Output buffer is too small for the encoded bytes.
    BufferTooSmall,
    /// More data than the format can carry.
    DataTooLong,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferTooSmall => write!(f, "buffer too small"),
            Self::DataTooLong => write!(f, "data too long"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EncodeError {}

/// A snapshot wrapped in the fixed header and tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<const N: usize> {
    header: [u8; 2],
    payload: [u8; N],
    tail: [u8; 3],
}

impl<const N: usize> Envelope<N> {
    /// Wire length of this envelope.
    pub const LEN: usize = envelope_len(N);

    /// Create an envelope with a zeroed payload.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            header: HEADER,
            payload: [0; N],
            tail: TAIL,
        }
    }

    /// Replace the payload with a copy of `snapshot`.
    #[inline]
    pub fn set_payload(&mut self, snapshot: &[u8; N]) {
        self.payload.copy_from_slice(snapshot);
    }

    /// Current payload.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &[u8; N] {
        &self.payload
    }

    /// Header, payload and tail, in wire order.
    ///
    /// Channels that accept gathered writes can publish these without
    /// first flattening the envelope into one buffer.
    #[inline]
    #[must_use]
    pub fn parts(&self) -> [&[u8]; 3] {
        [&self.header, &self.payload, &self.tail]
    }

    /// Write the envelope contiguously into `buf`.
    ///
    /// Returns the number of bytes written, always [`Self::LEN`].
    pub fn write_to(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        if buf.len() < Self::LEN {
            return Err(EncodeError::BufferTooSmall);
        }
        let mut pos = 0;
        for part in self.parts() {
            buf[pos..pos + part.len()].copy_from_slice(part);
            pos += part.len();
        }
        Ok(pos)
    }
}

impl<const N: usize> Default for Envelope<N> {
    fn default() -> Self {
        Self::new()
    }
}
