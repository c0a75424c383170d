//! Consumer-side envelope decoder.
//!
//! Reassembles snapshots from the raw up-channel byte stream, the way a
//! tuning tool on the host reads it. The stream may start mid-frame and may
//! contain frames cut short when the device overwrote unread data.

use crate::envelope::{HEADER, TAIL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderState {
    /// Looking for the header; `saw_start` is set after a `0D`.
    Hunting { saw_start: bool },
    Payload(usize),
    Tail(usize),
}

/// Byte-at-a-time envelope decoder for payloads of `N` bytes.
///
/// A frame whose tail does not match is discarded and counted. Payload bytes
/// are not rescanned for a header, so a frame starting inside a discarded
/// payload is lost as well.
pub struct FrameDecoder<const N: usize> {
    payload: [u8; N],
    state: DecoderState,
    dropped: u32,
}

impl<const N: usize> FrameDecoder<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            payload: [0; N],
            state: DecoderState::Hunting { saw_start: false },
            dropped: 0,
        }
    }

    /// Reset to the hunting state. The drop counter is kept.
    pub fn reset(&mut self) {
        self.state = DecoderState::Hunting { saw_start: false };
    }

    /// Frames discarded because of a bad tail.
    #[inline]
    #[must_use]
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Feed a byte to the decoder.
    ///
    /// Returns the payload once a complete frame has been received.
    pub fn push_byte(&mut self, byte: u8) -> Option<&[u8; N]> {
        match self.state {
            DecoderState::Hunting { saw_start } => {
                self.state = if saw_start && byte == HEADER[1] {
                    if N == 0 {
                        DecoderState::Tail(0)
                    } else {
                        DecoderState::Payload(0)
                    }
                } else {
                    DecoderState::Hunting {
                        saw_start: byte == HEADER[0],
                    }
                };
                None
            }
            DecoderState::Payload(pos) => {
                self.payload[pos] = byte;
                self.state = if pos + 1 == N {
                    DecoderState::Tail(0)
                } else {
                    DecoderState::Payload(pos + 1)
                };
                None
            }
            DecoderState::Tail(pos) => {
                if byte != TAIL[pos] {
                    self.dropped = self.dropped.saturating_add(1);
                    self.state = DecoderState::Hunting {
                        saw_start: byte == HEADER[0],
                    };
                    return None;
                }
                if pos + 1 == TAIL.len() {
                    self.state = DecoderState::Hunting { saw_start: false };
                    Some(&self.payload)
                } else {
                    self.state = DecoderState::Tail(pos + 1);
                    None
                }
            }
        }
    }

    /// Feed a chunk of bytes, returning the newest complete payload in it.
    pub fn feed(&mut self, bytes: &[u8]) -> Option<[u8; N]> {
        let mut latest = None;
        for &byte in bytes {
            if let Some(payload) = self.push_byte(byte) {
                latest = Some(*payload);
            }
        }
        latest
    }
}

impl<const N: usize> Default for FrameDecoder<N> {
    fn default() -> Self {
        Self::new()
    }
}
