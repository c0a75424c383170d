//! Platform-agnostic tuner transport for touch-sensing firmware.
//!
//! A sensing engine owns a fixed-size snapshot of its tuning data. This
//! crate carries that snapshot to a desktop tuning tool over a debug-probe
//! channel and brings the tool's commands back, without any
//! platform-specific dependencies. It can be used both in embedded `no_std`
//! environments and on host for testing.
//!
//! # Overview
//!
//! - [`channel`]: Probe channel traits ([`UpChannel`], [`DownChannel`])
//! - [`buffer`]: Lock-protected RTT-style buffers ([`UpBuffer`], [`DownBuffer`])
//! - [`transport`]: The shim itself ([`TunerTransport`])
//! - [`hooks`]: What engines call into ([`TunerHooks`])
//! - [`engine`]: Sensing engine trait ([`SensingEngine`])
//! - [`session`]: Command handling for the tuner step ([`TunerSession`])
//! - [`scan_loop`]: Foreground control loop ([`ScanLoop`])
//! - [`config`]: Link settings ([`TunerConfig`])
//!
//! # Example
//!
//! ```rust
//! use embassy_sync::blocking_mutex::raw::NoopRawMutex;
//! use tuner_core::proto::{CommandBuilder, CommandCode, PacketValidator};
//! use tuner_core::{ChannelMode, DownBuffer, TunerTransport, UpBuffer};
//!
//! let up: UpBuffer<NoopRawMutex, 16> = UpBuffer::new(ChannelMode::NoBlockSkip);
//! let down: DownBuffer<NoopRawMutex, 32> = DownBuffer::new(ChannelMode::BlockIfFull);
//! let mut transport = TunerTransport::new(&up, &down, PacketValidator);
//!
//! // Outbound: one framed snapshot replaces whatever was unread
//! transport.publish(&[1, 2, 3, 4]);
//! let mut frame = [0u8; 16];
//! let len = up.drain(&mut frame);
//! assert_eq!(&frame[..len], &[0x0D, 0x0A, 1, 2, 3, 4, 0x00, 0xFF, 0xFF]);
//!
//! // Inbound: a stray byte, then a command; the transport realigns
//! down.write(&[0x42]);
//! down.write(CommandBuilder::new(CommandCode::Ping).build().as_bytes());
//! let packet = transport.poll_command().unwrap();
//! assert_eq!(packet.code(), CommandCode::Ping as u8);
//! assert_eq!(transport.data_index(), 0);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Log through defmt and derive `defmt::Format` (for embedded logging)
//! - **`log`**: Log through the `log` facade
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations,
//! making it suitable for embedded systems with limited resources.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod buffer;
pub mod channel;
pub mod config;
pub mod engine;
pub mod hooks;
pub mod scan_loop;
pub mod session;
pub mod transport;

pub use tuner_proto as proto;

// Re-export main types at crate root
pub use buffer::{DownBuffer, UpBuffer};
pub use channel::{ChannelMode, DownChannel, UpChannel};
pub use config::{TunerConfig, DEFAULT_TUNER_CONFIG};
pub use engine::{EngineError, SensingEngine};
pub use hooks::{TunerHooks, TunerRequest};
pub use scan_loop::{CycleOutcome, ScanLoop};
pub use session::{TunerSession, TunerStatus};
pub use transport::TunerTransport;
