//! Command frame validity predicates.

use crate::command::{CommandPacket, COMMAND_PACKET_SIZE};

/// Decides whether 16 accumulated bytes form a complete command frame.
///
/// The resynchronizer treats this as a black box: a `false` answer makes it
/// drop the oldest byte and try again on the next one. Implemented for any
/// `Fn(&[u8; 16]) -> bool`, so engines with their own packet format can pass
/// a closure.
pub trait CommandValidator {
    fn is_valid(&self, frame: &[u8; COMMAND_PACKET_SIZE]) -> bool;
}

impl<F> CommandValidator for F
where
    F: Fn(&[u8; COMMAND_PACKET_SIZE]) -> bool,
{
    #[inline]
    fn is_valid(&self, frame: &[u8; COMMAND_PACKET_SIZE]) -> bool {
        self(frame)
    }
}

/// Validator for the packet layout in [`crate::command`]: markers and CRC-16.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketValidator;

impl CommandValidator for PacketValidator {
    #[inline]
    fn is_valid(&self, frame: &[u8; COMMAND_PACKET_SIZE]) -> bool {
        CommandPacket::from_bytes(*frame).is_intact()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandBuilder, CommandCode};

    #[test]
    fn test_accepts_built_packets() {
        let packet = CommandBuilder::write(3, &[1, 2, 3, 4]).unwrap().counter(200).build();
        assert!(PacketValidator.is_valid(packet.as_bytes()));
    }

    #[test]
    fn test_rejects_any_single_corrupted_byte() {
        let packet = CommandBuilder::new(CommandCode::Restart).counter(17).build();
        for index in 0..COMMAND_PACKET_SIZE {
            let mut frame = *packet.as_bytes();
            frame[index] ^= 0x40;
            assert!(!PacketValidator.is_valid(&frame), "byte {index} not covered");
        }
    }

    #[test]
    fn test_rejects_shifted_packet() {
        let packet = CommandBuilder::new(CommandCode::Ping).build();
        let mut frame = [0u8; COMMAND_PACKET_SIZE];
        frame[1..].copy_from_slice(&packet.as_bytes()[..15]);
        assert!(!PacketValidator.is_valid(&frame));
    }

    #[test]
    fn test_closure_validator() {
        let first_byte_is_seven = |frame: &[u8; COMMAND_PACKET_SIZE]| frame[0] == 7;
        let mut frame = [0u8; COMMAND_PACKET_SIZE];
        assert!(!first_byte_is_seven.is_valid(&frame));
        frame[0] = 7;
        assert!(first_byte_is_seven.is_valid(&frame));
    }
}
