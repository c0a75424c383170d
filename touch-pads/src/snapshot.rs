//! Tuning snapshot layout.
//!
//! All multi-byte fields are little-endian.
//!
//! | offset | size | field | host access |
//! |--------|------|-------|-------------|
//! | 0 | 2 | discharge time, µs | read/write |
//! | 2 | 2 | max count | read/write |
//! | 4 | 2 | scan counter | read |
//! | 6 | 1 | status flags | read |
//! | 7 | 1 | pad count | read |
//! | 8 | 2 × [`PAD_COUNT`] | raw counts | read |

use tuner_core::EngineError;

use crate::config::{SenseConfig, DEFAULT_SENSE_CONFIG};

/// Touch pads on the board: three buttons and a four-segment slider.
pub const PAD_COUNT: usize = 7;

pub const SNAPSHOT_LEN: usize = RAW_COUNTS + 2 * PAD_COUNT;

const DISCHARGE_US: usize = 0;
const MAX_COUNT: usize = 2;
const SCAN_COUNTER: usize = 4;
const STATUS: usize = 6;
const PADS: usize = 7;
const RAW_COUNTS: usize = 8;

/// At least one pad hit `max_count` in the last scan.
pub const STATUS_SATURATED: u8 = 1 << 0;
/// The host wrote a configuration that was rejected and replaced by defaults.
pub const STATUS_CONFIG_REJECTED: u8 = 1 << 1;

pub type Snapshot = [u8; SNAPSHOT_LEN];

/// A snapshot holding the default configuration and no results.
#[must_use]
pub fn initial() -> Snapshot {
    let mut snapshot = [0u8; SNAPSHOT_LEN];
    store_config(&mut snapshot, &DEFAULT_SENSE_CONFIG);
    snapshot[PADS] = PAD_COUNT as u8;
    snapshot
}

#[must_use]
pub fn sense_config(snapshot: &Snapshot) -> SenseConfig {
    SenseConfig {
        discharge_us: read_u16(snapshot, DISCHARGE_US),
        max_count: read_u16(snapshot, MAX_COUNT),
    }
}

pub fn store_config(snapshot: &mut Snapshot, config: &SenseConfig) {
    write_u16(snapshot, DISCHARGE_US, config.discharge_us);
    write_u16(snapshot, MAX_COUNT, config.max_count);
}

pub fn set_status(snapshot: &mut Snapshot, flag: u8, set: bool) {
    if set {
        snapshot[STATUS] |= flag;
    } else {
        snapshot[STATUS] &= !flag;
    }
}

/// Result of reading the host-writable settings before a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigCheck {
    Accepted(SenseConfig),
    /// `requested` failed validation; the snapshot holds the defaults again.
    Rejected {
        requested: SenseConfig,
        error: EngineError,
    },
}

impl ConfigCheck {
    /// Settings the next scan should use.
    #[must_use]
    pub fn config(&self) -> SenseConfig {
        match self {
            Self::Accepted(config) => *config,
            Self::Rejected { .. } => DEFAULT_SENSE_CONFIG,
        }
    }
}

/// Validate the settings in the config region.
///
/// Rejected settings are overwritten with [`DEFAULT_SENSE_CONFIG`] and
/// [`STATUS_CONFIG_REJECTED`] is raised until the host writes valid ones.
pub fn check_config(snapshot: &mut Snapshot) -> ConfigCheck {
    let requested = sense_config(snapshot);
    match requested.validate() {
        Ok(()) => {
            set_status(snapshot, STATUS_CONFIG_REJECTED, false);
            ConfigCheck::Accepted(requested)
        }
        Err(error) => {
            store_config(snapshot, &DEFAULT_SENSE_CONFIG);
            set_status(snapshot, STATUS_CONFIG_REJECTED, true);
            ConfigCheck::Rejected { requested, error }
        }
    }
}

/// Record one finished scan.
pub fn store_scan(snapshot: &mut Snapshot, scans: u16, counts: &[u16; PAD_COUNT], max_count: u16) {
    write_u16(snapshot, SCAN_COUNTER, scans);
    for (pad, &count) in counts.iter().enumerate() {
        write_u16(snapshot, RAW_COUNTS + 2 * pad, count);
    }
    let saturated = counts.iter().any(|&count| count >= max_count);
    set_status(snapshot, STATUS_SATURATED, saturated);
}

fn read_u16(snapshot: &Snapshot, offset: usize) -> u16 {
    u16::from_le_bytes([snapshot[offset], snapshot[offset + 1]])
}

fn write_u16(snapshot: &mut Snapshot, offset: usize, value: u16) {
    snapshot[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}
