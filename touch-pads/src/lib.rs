//! Board-level data for the touch tuner: pad acquisition settings and the
//! byte layout of the tuning snapshot.
//!
//! Kept apart from the firmware so the layout and the handling of
//! host-written settings can be tested on the host.
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Derive `defmt::Format` for embedded logging

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod config;
pub mod snapshot;

pub use config::{SenseConfig, DEFAULT_SENSE_CONFIG, MAX_COUNT_LIMIT, MAX_DISCHARGE_US};
pub use snapshot::{
    check_config, ConfigCheck, Snapshot, PAD_COUNT, SNAPSHOT_LEN, STATUS_CONFIG_REJECTED,
    STATUS_SATURATED,
};
