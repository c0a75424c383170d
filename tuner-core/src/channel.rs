//! Probe channel traits.
//!
//! The transport only needs two capabilities from the debug-probe channel:
//! replace the device-to-host contents with one frame, and pull single bytes
//! from the host-to-device side without blocking.

/// What a channel does with a write that does not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelMode {
    /// Drop the whole write.
    NoBlockSkip,
    /// Write as much as fits, drop the rest.
    NoBlockTrim,
    /// Wait for room. Buffers in this crate never wait and trim instead.
    BlockIfFull,
}

/// Device-to-host half of a probe channel.
pub trait UpChannel {
    /// Discard any unread data and make `parts`, concatenated, the channel's
    /// whole contents in one step.
    ///
    /// A reader draining concurrently sees either the old contents or the
    /// complete new frame, never a mix. Frames that do not fit are handled
    /// according to the channel's [`ChannelMode`]; this never fails.
    fn publish(&mut self, parts: &[&[u8]]);
}

/// Host-to-device half of a probe channel.
pub trait DownChannel {
    /// Take the next unread byte, or `None` when the channel is empty.
    fn read_byte(&mut self) -> Option<u8>;
}

impl<T: UpChannel + ?Sized> UpChannel for &mut T {
    #[inline]
    fn publish(&mut self, parts: &[&[u8]]) {
        T::publish(self, parts)
    }
}

impl<T: DownChannel + ?Sized> DownChannel for &mut T {
    #[inline]
    fn read_byte(&mut self) -> Option<u8> {
        T::read_byte(self)
    }
}
