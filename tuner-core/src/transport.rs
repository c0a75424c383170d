//! TunerTransport: snapshot framing out, command resynchronization in.

use tuner_proto::{CommandPacket, CommandValidator, Envelope, COMMAND_PACKET_SIZE};

use crate::channel::{DownChannel, UpChannel};
use crate::hooks::{TunerHooks, TunerRequest};

/// Transport shim between a sensing engine and a probe channel.
///
/// Outbound, every snapshot is wrapped in a reused [`Envelope`] and
/// published over whatever the up channel holds. Inbound, bytes are
/// accumulated into a 16-byte command buffer; when the buffer is full and
/// the validator rejects it, the oldest byte is dropped and accumulation
/// continues, so the transport realigns onto the host's packets by itself
/// after line noise or a partial write.
///
/// One instance per channel. It owns the envelope and the command buffer;
/// snapshots are only borrowed.
pub struct TunerTransport<U, D, V, const N: usize> {
    up: U,
    down: D,
    validator: V,
    envelope: Envelope<N>,
    command: CommandPacket,
    data_index: usize,
    resyncs: u32,
}

impl<U, D, V, const N: usize> TunerTransport<U, D, V, N>
where
    U: UpChannel,
    D: DownChannel,
    V: CommandValidator,
{
    pub fn new(up: U, down: D, validator: V) -> Self {
        Self {
            up,
            down,
            validator,
            envelope: Envelope::new(),
            command: CommandPacket::EMPTY,
            data_index: 0,
            resyncs: 0,
        }
    }

    /// Wrap `snapshot` and publish it, replacing anything unread.
    pub fn publish(&mut self, snapshot: &[u8; N]) {
        self.envelope.set_payload(snapshot);
        self.up.publish(&self.envelope.parts());
    }

    /// Read available bytes until a valid command frame completes.
    ///
    /// Returns `None` once the down channel is empty; bytes read so far stay
    /// buffered for the next call.
    pub fn poll_command(&mut self) -> Option<&CommandPacket> {
        while let Some(byte) = self.down.read_byte() {
            self.command.as_bytes_mut()[self.data_index] = byte;
            self.data_index += 1;

            if self.data_index < COMMAND_PACKET_SIZE {
                continue;
            }

            if self.validator.is_valid(self.command.as_bytes()) {
                self.data_index = 0;
                trace!("tuner command accepted, code {}", self.command.code());
                return Some(&self.command);
            }

            // Drop the oldest byte and wait for one more
            self.data_index -= 1;
            self.command.as_bytes_mut().copy_within(1.., 0);
            self.resyncs = self.resyncs.wrapping_add(1);
        }
        None
    }

    /// Number of bytes currently buffered toward the next frame.
    #[inline]
    #[must_use]
    pub fn data_index(&self) -> usize {
        self.data_index
    }

    /// The bytes buffered toward the next frame.
    #[inline]
    #[must_use]
    pub fn pending_bytes(&self) -> &[u8] {
        &self.command.as_bytes()[..self.data_index]
    }

    /// Bytes discarded while realigning onto frame boundaries.
    #[inline]
    #[must_use]
    pub fn resyncs(&self) -> u32 {
        self.resyncs
    }

    /// Get a reference to the up channel.
    pub fn up(&self) -> &U {
        &self.up
    }

    /// Get a reference to the down channel.
    pub fn down(&self) -> &D {
        &self.down
    }

    /// Get a mutable reference to the down channel.
    pub fn down_mut(&mut self) -> &mut D {
        &mut self.down
    }

    /// Decompose the transport into its channels and validator.
    pub fn into_parts(self) -> (U, D, V) {
        (self.up, self.down, self.validator)
    }
}

impl<U, D, V, const N: usize> TunerHooks<N> for TunerTransport<U, D, V, N>
where
    U: UpChannel,
    D: DownChannel,
    V: CommandValidator,
{
    #[inline]
    fn send(&mut self, snapshot: &[u8; N]) {
        self.publish(snapshot);
    }

    fn receive<'a>(&'a mut self, snapshot: &'a mut [u8; N]) -> Option<TunerRequest<'a, N>> {
        self.poll_command()
            .map(|packet| TunerRequest { packet, snapshot })
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::buffer::{DownBuffer, UpBuffer};
    use crate::channel::ChannelMode;
    use core::cell::{Cell, RefCell};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use std::collections::VecDeque;
    use std::vec::Vec;
    use tuner_proto::{CommandBuilder, CommandCode, PacketValidator};

    type Up = UpBuffer<NoopRawMutex, 32>;
    type Down = DownBuffer<NoopRawMutex, 64>;

    // Down channel that counts how many bytes the transport pulled
    struct CountingDown {
        bytes: VecDeque<u8>,
        reads: usize,
    }

    impl CountingDown {
        fn new(bytes: &[u8]) -> Self {
            Self {
                bytes: bytes.iter().copied().collect(),
                reads: 0,
            }
        }
    }

    impl DownChannel for CountingDown {
        fn read_byte(&mut self) -> Option<u8> {
            let byte = self.bytes.pop_front()?;
            self.reads += 1;
            Some(byte)
        }
    }

    fn buffers() -> (Up, Down) {
        (
            UpBuffer::new(ChannelMode::NoBlockSkip),
            DownBuffer::new(ChannelMode::BlockIfFull),
        )
    }

    fn drain(up: &Up) -> Vec<u8> {
        let mut out = [0u8; 32];
        let n = up.drain(&mut out);
        out[..n].to_vec()
    }

    #[test]
    fn test_publish_wraps_snapshot() {
        let (up, down) = buffers();
        let mut transport = TunerTransport::new(&up, &down, PacketValidator);

        transport.publish(&[0xDE, 0xAD, 0xBE, 0xEF]);

        assert_eq!(
            drain(&up),
            [0x0D, 0x0A, 0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_second_publish_overwrites_first() {
        let (up, down) = buffers();
        let mut transport = TunerTransport::new(&up, &down, PacketValidator);

        transport.publish(&[1, 1, 1]);
        transport.publish(&[2, 2, 2]);

        assert_eq!(up.cursors(), (0, 8));
        assert_eq!(drain(&up), [0x0D, 0x0A, 2, 2, 2, 0x00, 0xFF, 0xFF]);
    }

    #[test]
    fn test_aligned_command() {
        let (up, down) = buffers();
        let mut transport = TunerTransport::<_, _, _, 4>::new(&up, &down, PacketValidator);
        let packet = CommandBuilder::new(CommandCode::Suspend).counter(3).build();
        down.write(packet.as_bytes());

        assert_eq!(transport.poll_command(), Some(&packet));
        assert_eq!(transport.data_index(), 0);
        assert_eq!(transport.resyncs(), 0);
    }

    #[test]
    fn test_resync_after_garbage() {
        let packet = CommandBuilder::write(1, &[5, 6]).unwrap().counter(42).build();
        for k in 1..COMMAND_PACKET_SIZE {
            let mut stream: Vec<u8> = (0..k as u8).map(|i| 0xA0 ^ i).collect();
            stream.extend_from_slice(packet.as_bytes());
            // Trailing bytes must stay unread
            stream.extend_from_slice(&[0x0D, 0x0A, 0x06]);

            let (up, _) = buffers();
            let mut down = CountingDown::new(&stream);
            let mut transport =
                TunerTransport::<_, _, _, 4>::new(&up, &mut down, PacketValidator);

            assert_eq!(transport.poll_command(), Some(&packet), "k = {k}");
            assert_eq!(transport.data_index(), 0);
            assert_eq!(transport.resyncs() as usize, k);
            drop(transport);
            assert_eq!(down.reads, k + COMMAND_PACKET_SIZE);
            assert_eq!(down.bytes.len(), 3);
        }
    }

    #[test]
    fn test_empty_poll_keeps_partial_frame() {
        let (up, down) = buffers();
        let mut transport = TunerTransport::<_, _, _, 4>::new(&up, &down, PacketValidator);

        assert_eq!(transport.poll_command(), None);
        assert_eq!(transport.data_index(), 0);

        down.write(&[0x0D, 0x0A, 0x05, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(transport.poll_command(), None);
        assert_eq!(transport.data_index(), 7);

        assert_eq!(transport.poll_command(), None);
        assert_eq!(transport.data_index(), 7);
        assert_eq!(transport.pending_bytes(), &[0x0D, 0x0A, 0x05, 0, 0, 0, 0]);
    }

    #[test]
    fn test_command_split_across_polls() {
        let (up, down) = buffers();
        let mut transport = TunerTransport::<_, _, _, 4>::new(&up, &down, PacketValidator);
        let packet = CommandBuilder::new(CommandCode::Ping).build();

        down.write(&packet.as_bytes()[..10]);
        assert_eq!(transport.poll_command(), None);
        down.write(&packet.as_bytes()[10..]);
        assert_eq!(transport.poll_command(), Some(&packet));
    }

    #[test]
    fn test_rejected_frame_shifts_by_one() {
        let seen: RefCell<Vec<[u8; COMMAND_PACKET_SIZE]>> = RefCell::new(Vec::new());
        let validator = |frame: &[u8; COMMAND_PACKET_SIZE]| {
            seen.borrow_mut().push(*frame);
            false
        };
        let (up, down) = buffers();
        let mut transport = TunerTransport::<_, _, _, 4>::new(&up, &down, validator);

        let first: Vec<u8> = (0..16).collect();
        down.write(&first);
        assert_eq!(transport.poll_command(), None);
        assert_eq!(transport.data_index(), 15);
        assert_eq!(transport.pending_bytes(), &first[1..]);

        down.write(&[0x99]);
        assert_eq!(transport.poll_command(), None);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(&seen[0][..], &first[..]);
        assert_eq!(&seen[1][..15], &first[1..]);
        assert_eq!(seen[1][15], 0x99);
    }

    #[test]
    fn test_buffer_clean_after_accept() {
        let calls = Cell::new(0u32);
        let validator = |frame: &[u8; COMMAND_PACKET_SIZE]| {
            calls.set(calls.get() + 1);
            PacketValidator.is_valid(frame)
        };
        let (up, down) = buffers();
        let mut transport = TunerTransport::<_, _, _, 4>::new(&up, &down, validator);

        let first = CommandBuilder::new(CommandCode::Suspend).counter(1).build();
        let second = CommandBuilder::new(CommandCode::Resume).counter(2).build();
        down.write(first.as_bytes());
        down.write(second.as_bytes());

        assert_eq!(transport.poll_command(), Some(&first));
        assert_eq!(calls.get(), 1);
        // Second frame is judged on its own 16 bytes, once
        assert_eq!(transport.poll_command(), Some(&second));
        assert_eq!(calls.get(), 2);
        assert_eq!(transport.resyncs(), 0);
    }

    #[test]
    fn test_receive_hands_back_snapshot() {
        let (up, down) = buffers();
        let mut transport = TunerTransport::new(&up, &down, PacketValidator);
        let mut snapshot = [0u8; 4];
        let packet = CommandBuilder::new(CommandCode::Ping).counter(9).build();
        down.write(packet.as_bytes());

        let request = transport.receive(&mut snapshot).unwrap();
        assert_eq!(request.packet.counter(), 9);
        request.snapshot[0] = 0x55;

        assert!(transport.receive(&mut snapshot).is_none());
        assert_eq!(snapshot[0], 0x55);
    }
}
