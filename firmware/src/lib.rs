//! Touch-pad tuning firmware for RP2040.
//!
//! Measures a set of charge-time touch pads and streams the raw counts to a
//! desktop tuning tool over RTT, accepting tuning commands back on the same
//! channel.
//!
//! # Hardware Configuration
//!
//! | Function | GPIO | Description |
//! |----------|------|-------------|
//! | Button 0-2 | 2-4 | Touch buttons, 1 MΩ pull-up each |
//! | Slider 0-3 | 5-8 | Slider segments, 1 MΩ pull-up each |
//!
//! # RTT Channels
//!
//! | Direction | Index | Name | Use |
//! |-----------|-------|------|-----|
//! | up | 0 | `defmt` | Log frames |
//! | up | 1 | `tuner` | Snapshot envelopes |
//! | down | 1 | `tuner` | 16-byte command packets |
//!
//! # Architecture
//!
//! - **Acquire Task** (interrupt executor, `SWI_IRQ_1`): measures the pads on
//!   request and signals completion
//! - **Scan Task**: runs the [`ScanLoop`](tuner_core::ScanLoop), waiting on the
//!   completion signal between cycles
//! - **Pump Task**: copies the newest snapshot frame into the RTT up channel
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)

#![no_std]

pub mod engine;
pub mod rtt;
pub mod sense;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use tuner_core::proto::{envelope_len, PacketValidator};
use tuner_core::{ScanLoop, TunerTransport, UpBuffer};

pub use touch_pads::{SenseConfig, DEFAULT_SENSE_CONFIG, PAD_COUNT, SNAPSHOT_LEN};
pub use engine::{PadEngine, ScanShared};
pub use rtt::{pump, rtt_mode, RttDown};
pub use sense::Pads;

/// One snapshot envelope.
pub const FRAME_LEN: usize = envelope_len(SNAPSHOT_LEN);

/// Up buffer holding the newest frame, drained by the pump task.
pub type TunerUp = UpBuffer<CriticalSectionRawMutex, FRAME_LEN>;

pub type TunerLink = TunerTransport<&'static TunerUp, RttDown, PacketValidator, SNAPSHOT_LEN>;

pub type TunerLoop = ScanLoop<PadEngine, TunerLink, SNAPSHOT_LEN>;
