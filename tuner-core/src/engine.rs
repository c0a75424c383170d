//! Sensing engine trait and error types.

use core::fmt;

use crate::hooks::TunerHooks;
use crate::session::TunerStatus;

/// Error type for engine operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineError {
    /// A scan was requested while one is still in flight.
    Busy,
    /// The sensing hardware did not respond.
    Hardware,
    /// Configuration values in the snapshot are out of range.
    InvalidConfig,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "scan in progress"),
            Self::Hardware => write!(f, "sensing hardware fault"),
            Self::InvalidConfig => write!(f, "invalid sensing configuration"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EngineError {}

/// A touch-sensing engine that owns an `N`-byte tuning snapshot.
///
/// Scans complete asynchronously: [`SensingEngine::scan_all`] only starts
/// one, and [`SensingEngine::is_busy`] reports when results are ready to
/// be processed.
pub trait SensingEngine<const N: usize> {
    /// Start scanning every widget.
    fn scan_all(&mut self) -> Result<(), EngineError>;

    /// A scan is still in flight.
    fn is_busy(&self) -> bool;

    /// Turn the finished scan's raw results into the snapshot.
    fn process_all(&mut self);

    /// Publish the snapshot and apply tuning commands through `hooks`.
    fn run_tuner<H: TunerHooks<N>>(&mut self, hooks: &mut H) -> TunerStatus;

    /// Reinitialise the engine and its snapshot.
    fn restart(&mut self) -> Result<(), EngineError>;

    /// The current snapshot.
    fn snapshot(&self) -> &[u8; N];
}
