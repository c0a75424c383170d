//! Pad acquisition configuration.

use tuner_core::EngineError;

/// Longest discharge the acquisition task will block for.
pub const MAX_DISCHARGE_US: u16 = 1_000;

/// Upper bound on `max_count`, keeping one scan of all pads short.
pub const MAX_COUNT_LIMIT: u16 = 10_000;

/// Configuration for the charge-time measurement.
///
/// Both values live in the snapshot's writable region, so the tuning tool
/// can change them with `Write` commands while the board runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SenseConfig {
    /// Time the pad is held low before each measurement, in microseconds.
    pub discharge_us: u16,
    /// Loop iterations after which a pad counts as saturated.
    pub max_count: u16,
}

impl SenseConfig {
    const fn default() -> Self {
        Self {
            discharge_us: 10,
            max_count: 2_000,
        }
    }

    /// Reject values the acquisition loop cannot honour.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_count == 0
            || self.max_count > MAX_COUNT_LIMIT
            || self.discharge_us > MAX_DISCHARGE_US
        {
            return Err(EngineError::InvalidConfig);
        }
        Ok(())
    }
}

pub const DEFAULT_SENSE_CONFIG: SenseConfig = SenseConfig::default();
