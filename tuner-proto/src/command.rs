//! Inbound tuner command packets.
//!
//! Commands travel host to device in fixed 16-byte packets:
//!
//! ```text
//! offset  size  field
//!      0     2  header 0D 0A
//!      2     1  command code
//!      3     1  sequence counter
//!      4     1  data size (0..=4)
//!      5     2  snapshot offset, little-endian
//!      7     4  data
//!     11     2  CRC-16 of bytes 2..11, little-endian
//!     13     3  tail 00 FF FF
//! ```

use core::fmt;

use crate::crc::{calculate_crc16, Crc16Digest};
use crate::envelope::{EncodeError, HEADER, TAIL};

/// Size of one command packet on the wire.
pub const COMMAND_PACKET_SIZE: usize = 16;

/// Largest payload a `Write` command can carry.
pub const MAX_WRITE_LEN: usize = 4;

const CODE: usize = 2;
const COUNTER: usize = 3;
const SIZE: usize = 4;
const OFFSET: usize = 5;
const DATA: usize = 7;
const CRC: usize = 11;
const TAIL_START: usize = 13;

/// Command codes understood by the tuner session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CommandCode {
    /// Stop scanning; keep publishing the last snapshot.
    Suspend = 0x01,
    /// Resume scanning after [`CommandCode::Suspend`].
    Resume = 0x02,
    /// Reinitialise the sensing engine.
    Restart = 0x03,
    /// No-op, used by the host to probe the link.
    Ping = 0x05,
    /// Write up to four bytes into the snapshot.
    Write = 0x06,
}

impl TryFrom<u8> for CommandCode {
    type Error = CommandError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Self::Suspend),
            0x02 => Ok(Self::Resume),
            0x03 => Ok(Self::Restart),
            0x05 => Ok(Self::Ping),
            0x06 => Ok(Self::Write),
            other => Err(CommandError::UnknownCode(other)),
        }
    }
}

/// A decoded command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command<'a> {
    Suspend,
    Resume,
    Restart,
    Ping,
    Write { offset: u16, data: &'a [u8] },
}

/// Error type for decoding an intact packet into a [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// The code byte names no known command.
    UnknownCode(u8),
    /// The size byte exceeds [`MAX_WRITE_LEN`].
    InvalidSize(u8),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCode(code) => write!(f, "unknown command code 0x{code:02X}"),
            Self::InvalidSize(size) => write!(f, "invalid data size {size}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CommandError {}

/// One 16-byte command packet.
///
/// The packet is plain storage: any byte pattern can be held, and
/// [`CommandPacket::is_intact`] tells whether it is a well-formed packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandPacket {
    bytes: [u8; COMMAND_PACKET_SIZE],
}

impl CommandPacket {
    /// An all-zero packet, used as the resynchronizer's initial buffer.
    pub const EMPTY: Self = Self {
        bytes: [0; COMMAND_PACKET_SIZE],
    };

    #[inline]
    #[must_use]
    pub const fn from_bytes(bytes: [u8; COMMAND_PACKET_SIZE]) -> Self {
        Self { bytes }
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; COMMAND_PACKET_SIZE] {
        &self.bytes
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8; COMMAND_PACKET_SIZE] {
        &mut self.bytes
    }

    #[inline]
    #[must_use]
    pub fn code(&self) -> u8 {
        self.bytes[CODE]
    }

    #[inline]
    #[must_use]
    pub fn counter(&self) -> u8 {
        self.bytes[COUNTER]
    }

    /// CRC carried in the packet.
    #[inline]
    #[must_use]
    pub fn crc(&self) -> u16 {
        u16::from_le_bytes([self.bytes[CRC], self.bytes[CRC + 1]])
    }

    /// CRC computed over the checksummed bytes.
    #[inline]
    #[must_use]
    pub fn computed_crc(&self) -> u16 {
        calculate_crc16(&self.bytes[CODE..CRC])
    }

    /// Header, tail and CRC all match.
    #[must_use]
    pub fn is_intact(&self) -> bool {
        self.bytes[..CODE] == HEADER
            && self.bytes[TAIL_START..] == TAIL
            && self.crc() == self.computed_crc()
    }

    /// Decode the command fields.
    ///
    /// Does not check integrity; run a validator first.
    pub fn command(&self) -> Result<Command<'_>, CommandError> {
        let code = CommandCode::try_from(self.code())?;
        Ok(match code {
            CommandCode::Suspend => Command::Suspend,
            CommandCode::Resume => Command::Resume,
            CommandCode::Restart => Command::Restart,
            CommandCode::Ping => Command::Ping,
            CommandCode::Write => {
                let size = self.bytes[SIZE];
                if usize::from(size) > MAX_WRITE_LEN {
                    return Err(CommandError::InvalidSize(size));
                }
                Command::Write {
                    offset: u16::from_le_bytes([self.bytes[OFFSET], self.bytes[OFFSET + 1]]),
                    data: &self.bytes[DATA..DATA + usize::from(size)],
                }
            }
        })
    }
}

/// Fluent builder for well-formed command packets.
///
/// # Example
///
/// ```
/// use tuner_proto::{Command, CommandBuilder, CommandCode};
///
/// let ping = CommandBuilder::new(CommandCode::Ping).counter(1).build();
/// assert!(ping.is_intact());
///
/// let write = CommandBuilder::write(4, &[0x10, 0x27]).unwrap().build();
/// assert_eq!(
///     write.command(),
///     Ok(Command::Write { offset: 4, data: &[0x10, 0x27] })
/// );
/// ```
#[derive(Debug, Clone, Copy)]
#[must_use]
pub struct CommandBuilder {
    code: CommandCode,
    counter: u8,
    offset: u16,
    data: [u8; MAX_WRITE_LEN],
    size: u8,
}

impl CommandBuilder {
    /// Start a packet carrying `code` and no data.
    pub const fn new(code: CommandCode) -> Self {
        Self {
            code,
            counter: 0,
            offset: 0,
            data: [0; MAX_WRITE_LEN],
            size: 0,
        }
    }

    /// Start a `Write` packet.
    pub fn write(offset: u16, data: &[u8]) -> Result<Self, EncodeError> {
        if data.len() > MAX_WRITE_LEN {
            return Err(EncodeError::DataTooLong);
        }
        let mut builder = Self::new(CommandCode::Write);
        builder.offset = offset;
        builder.data[..data.len()].copy_from_slice(data);
        // Fits: checked against MAX_WRITE_LEN above
        builder.size = data.len() as u8;
        Ok(builder)
    }

    pub const fn counter(mut self, counter: u8) -> Self {
        self.counter = counter;
        self
    }

    pub fn build(&self) -> CommandPacket {
        let mut bytes = [0u8; COMMAND_PACKET_SIZE];
        bytes[..CODE].copy_from_slice(&HEADER);
        bytes[CODE] = self.code as u8;
        bytes[COUNTER] = self.counter;
        bytes[SIZE] = self.size;
        bytes[OFFSET..DATA].copy_from_slice(&self.offset.to_le_bytes());
        bytes[DATA..CRC].copy_from_slice(&self.data);

        let mut digest = Crc16Digest::new();
        digest.update(&bytes[CODE..CRC]);
        bytes[CRC..TAIL_START].copy_from_slice(&digest.finalize().to_le_bytes());
        bytes[TAIL_START..].copy_from_slice(&TAIL);

        CommandPacket::from_bytes(bytes)
    }
}
