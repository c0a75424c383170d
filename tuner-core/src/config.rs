//! Tuner link configuration.

use crate::channel::ChannelMode;

/// Runtime settings for the tuner link.
///
/// Buffer sizes are const generics on [`crate::UpBuffer`] and
/// [`crate::DownBuffer`], and the probe channel itself is allocated by the
/// platform; this only carries what is chosen at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TunerConfig {
    /// Policy for outbound frames, both in the [`crate::UpBuffer`] and on
    /// the probe channel it is pumped into.
    pub up_mode: ChannelMode,
    /// How often the up buffer is pushed to the probe, in milliseconds.
    pub pump_interval_ms: u64,
}

/// Default tuner link: newest frame wins, pumped every 10 ms.
pub const DEFAULT_TUNER_CONFIG: TunerConfig = TunerConfig {
    up_mode: ChannelMode::NoBlockSkip,
    pump_interval_ms: 10,
};

impl Default for TunerConfig {
    fn default() -> Self {
        DEFAULT_TUNER_CONFIG
    }
}
