//! Raw-count sensing engine.
//!
//! Scans run on the high-priority executor: [`PadEngine::scan_all`] hands a
//! request to [`ScanShared`], the acquisition task measures the pads and
//! calls [`ScanShared::complete`], which clears the busy flag and wakes the
//! foreground loop.

use core::cell::Cell;

use defmt::{info, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicBool, Ordering};
use tuner_core::{EngineError, SensingEngine, TunerHooks, TunerSession, TunerStatus};

use touch_pads::snapshot::{self, ConfigCheck, Snapshot};
use touch_pads::{SenseConfig, DEFAULT_SENSE_CONFIG, PAD_COUNT, SNAPSHOT_LEN};

/// State shared between the foreground loop and the acquisition task.
pub struct ScanShared {
    busy: AtomicBool,
    request: Signal<CriticalSectionRawMutex, SenseConfig>,
    done: Signal<CriticalSectionRawMutex, ()>,
    counts: Mutex<CriticalSectionRawMutex, Cell<[u16; PAD_COUNT]>>,
}

impl ScanShared {
    pub const fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
            request: Signal::new(),
            done: Signal::new(),
            counts: Mutex::new(Cell::new([0; PAD_COUNT])),
        }
    }

    /// Wait for the next scan request.
    pub async fn next_request(&self) -> SenseConfig {
        self.request.wait().await
    }

    /// Publish a finished scan's counts and mark the engine idle.
    pub fn complete(&self, counts: [u16; PAD_COUNT]) {
        self.counts.lock(|cell| cell.set(counts));
        self.busy.store(false, Ordering::Release);
        self.done.signal(());
    }

    /// Signalled after every [`ScanShared::complete`].
    pub fn done(&self) -> &Signal<CriticalSectionRawMutex, ()> {
        &self.done
    }
}

impl Default for ScanShared {
    fn default() -> Self {
        Self::new()
    }
}

/// Engine publishing raw pad counts; no baseline or touch detection.
pub struct PadEngine {
    shared: &'static ScanShared,
    snapshot: Snapshot,
    session: TunerSession,
    scans: u16,
    config: SenseConfig,
}

impl PadEngine {
    pub fn new(shared: &'static ScanShared) -> Self {
        Self {
            shared,
            snapshot: snapshot::initial(),
            session: TunerSession::new(),
            scans: 0,
            config: DEFAULT_SENSE_CONFIG,
        }
    }

    /// Configuration for the next scan, as last written by the host.
    fn next_config(&mut self) -> SenseConfig {
        let check = snapshot::check_config(&mut self.snapshot);
        match check {
            ConfigCheck::Accepted(requested) if requested != self.config => {
                info!("sense config changed: {}", requested);
            }
            ConfigCheck::Accepted(_) => {}
            ConfigCheck::Rejected { requested, error } => {
                warn!("rejecting {} ({}), restoring defaults", requested, error);
            }
        }
        check.config()
    }
}

impl SensingEngine<SNAPSHOT_LEN> for PadEngine {
    fn scan_all(&mut self) -> Result<(), EngineError> {
        if self.is_busy() {
            return Err(EngineError::Busy);
        }
        self.config = self.next_config();
        self.shared.busy.store(true, Ordering::Release);
        self.shared.request.signal(self.config);
        Ok(())
    }

    fn is_busy(&self) -> bool {
        self.shared.busy.load(Ordering::Acquire)
    }

    fn process_all(&mut self) {
        let counts = self.shared.counts.lock(Cell::get);
        self.scans = self.scans.wrapping_add(1);
        snapshot::store_scan(&mut self.snapshot, self.scans, &counts, self.config.max_count);
    }

    fn run_tuner<H: TunerHooks<SNAPSHOT_LEN>>(&mut self, hooks: &mut H) -> TunerStatus {
        self.session.run(hooks, &mut self.snapshot)
    }

    fn restart(&mut self) -> Result<(), EngineError> {
        if self.is_busy() {
            return Err(EngineError::Busy);
        }
        info!("restarting pad engine after {} scans", self.scans);
        self.snapshot = snapshot::initial();
        self.session.reset();
        self.scans = 0;
        self.config = DEFAULT_SENSE_CONFIG;
        Ok(())
    }

    fn snapshot(&self) -> &[u8; SNAPSHOT_LEN] {
        &self.snapshot
    }
}
