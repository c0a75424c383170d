//! Wire formats for the touch tuner transport.
//!
//! A touch-sensing device streams its tuning snapshot to a desktop tuning
//! tool over a debug-probe channel, and the tool sends small fixed-size
//! commands back. This crate holds both directions' byte layouts:
//!
//! - **Outbound**: [`Envelope`] wraps an `N`-byte snapshot in a fixed
//!   header and tail; [`FrameDecoder`] recovers snapshots from the stream.
//! - **Inbound**: [`CommandPacket`] is one 16-byte command,
//!   [`CommandBuilder`] encodes them and [`CommandValidator`] decides whether
//!   16 bytes form a valid frame ([`PacketValidator`] checks markers and
//!   CRC-16).
//!
//! # Envelope Format
//!
//! ```text
//! 0D 0A <payload: N bytes> 00 FF FF
//! ```
//!
//! # Example
//!
//! ```
//! use tuner_proto::{
//!     Command, CommandBuilder, CommandValidator, Envelope, FrameDecoder, PacketValidator,
//! };
//!
//! // Device side: wrap a snapshot
//! let mut envelope = Envelope::<4>::new();
//! envelope.set_payload(&[1, 2, 3, 4]);
//! let mut wire = [0u8; Envelope::<4>::LEN];
//! let len = envelope.write_to(&mut wire).unwrap();
//! assert_eq!(&wire[..len], &[0x0D, 0x0A, 1, 2, 3, 4, 0x00, 0xFF, 0xFF]);
//!
//! // Host side: unwrap it again
//! let mut decoder = FrameDecoder::<4>::new();
//! assert_eq!(decoder.feed(&wire), Some([1, 2, 3, 4]));
//!
//! // Host side: send a command
//! let packet = CommandBuilder::write(2, &[0xAA, 0xBB]).unwrap().counter(7).build();
//! assert!(PacketValidator.is_valid(packet.as_bytes()));
//! assert_eq!(packet.command(), Ok(Command::Write { offset: 2, data: &[0xAA, 0xBB] }));
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (`std::error::Error` impls)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod command;
pub mod crc;
pub mod decoder;
pub mod envelope;
pub mod validate;

pub use command::{
    Command, CommandBuilder, CommandCode, CommandError, CommandPacket, COMMAND_PACKET_SIZE,
    MAX_WRITE_LEN,
};
pub use crc::{calculate_crc16, Crc16Digest};
pub use decoder::FrameDecoder;
pub use envelope::{envelope_len, EncodeError, Envelope, ENVELOPE_OVERHEAD, HEADER, TAIL};
pub use validate::{CommandValidator, PacketValidator};
