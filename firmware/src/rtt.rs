//! RTT glue for the tuner channel.

use embassy_sync::blocking_mutex::raw::RawMutex;
use tuner_core::{ChannelMode, DownChannel, UpBuffer};

/// Host-to-device tuner channel, read one byte at a time.
pub struct RttDown {
    channel: rtt_target::DownChannel,
}

impl RttDown {
    pub fn new(channel: rtt_target::DownChannel) -> Self {
        Self { channel }
    }
}

impl DownChannel for RttDown {
    fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        (self.channel.read(&mut byte) == 1).then_some(byte[0])
    }
}

#[must_use]
pub fn rtt_mode(mode: ChannelMode) -> rtt_target::ChannelMode {
    match mode {
        ChannelMode::NoBlockSkip => rtt_target::ChannelMode::NoBlockSkip,
        ChannelMode::NoBlockTrim => rtt_target::ChannelMode::NoBlockTrim,
        ChannelMode::BlockIfFull => rtt_target::ChannelMode::BlockIfFull,
    }
}

/// Move the pending frame from `up` into the RTT up channel.
///
/// In skip mode the probe takes the whole frame or nothing; a frame it
/// could not take stays pending until the next pump or the next publish.
pub fn pump<M: RawMutex, const CAP: usize>(
    up: &UpBuffer<M, CAP>,
    channel: &mut rtt_target::UpChannel,
) -> usize {
    up.drain_with(|frame| {
        if frame.is_empty() {
            0
        } else {
            channel.write(frame)
        }
    })
}
