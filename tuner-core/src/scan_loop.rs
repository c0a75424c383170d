//! ScanLoop: drives a sensing engine and its tuner hooks.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;

use crate::engine::{EngineError, SensingEngine};
use crate::hooks::TunerHooks;
use crate::session::TunerStatus;

/// What one loop iteration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleOutcome {
    /// The engine was still scanning; nothing else happened.
    Busy,
    /// Results processed, tuner serviced, next scan started.
    Scanned,
    /// Tuner serviced; scanning is paused by the host.
    Suspended,
    /// The engine was restarted and a fresh scan started.
    Restarted,
}

/// The foreground control loop.
///
/// Each cycle runs in a fixed order: wait for the engine to finish its
/// scan, process the results, run the tuner step (publish the snapshot,
/// apply host commands), then start the next scan. While the host has
/// scanning suspended, only the tuner step runs.
pub struct ScanLoop<E, H, const N: usize> {
    engine: E,
    hooks: H,
    suspended: bool,
    scans: u32,
}

impl<E, H, const N: usize> ScanLoop<E, H, N>
where
    E: SensingEngine<N>,
    H: TunerHooks<N>,
{
    pub fn new(engine: E, hooks: H) -> Self {
        Self {
            engine,
            hooks,
            suspended: false,
            scans: 0,
        }
    }

    /// Start the first scan. Call once before polling.
    pub fn start(&mut self) -> Result<(), EngineError> {
        self.engine.scan_all()?;
        self.scans = self.scans.wrapping_add(1);
        Ok(())
    }

    /// Run one cycle without waiting.
    pub fn poll_once(&mut self) -> Result<CycleOutcome, EngineError> {
        if self.engine.is_busy() {
            return Ok(CycleOutcome::Busy);
        }

        if !self.suspended {
            self.engine.process_all();
        }

        match self.engine.run_tuner(&mut self.hooks) {
            TunerStatus::Running => {
                self.suspended = false;
                self.start()?;
                Ok(CycleOutcome::Scanned)
            }
            TunerStatus::Suspended => {
                self.suspended = true;
                Ok(CycleOutcome::Suspended)
            }
            TunerStatus::Restart => {
                self.suspended = false;
                self.engine.restart()?;
                self.start()?;
                Ok(CycleOutcome::Restarted)
            }
        }
    }

    /// Busy-poll forever.
    pub fn run(&mut self) -> ! {
        loop {
            if let Err(e) = self.poll_once() {
                warn!("scan cycle failed: {:?}", e);
            }
        }
    }

    /// Run one cycle, sleeping on `scan_done` while a scan is in flight.
    ///
    /// `scan_done` is signalled by whatever completes scans, after the
    /// engine has stopped reporting busy.
    pub async fn cycle_signalled<M: RawMutex>(
        &mut self,
        scan_done: &Signal<M, ()>,
    ) -> Result<CycleOutcome, EngineError> {
        if self.suspended {
            embassy_futures::yield_now().await;
        } else if self.engine.is_busy() {
            scan_done.wait().await;
        }
        self.poll_once()
    }

    /// Event-driven variant of [`ScanLoop::run`].
    pub async fn run_signalled<M: RawMutex>(&mut self, scan_done: &Signal<M, ()>) -> ! {
        loop {
            if let Err(e) = self.cycle_signalled(scan_done).await {
                warn!("scan cycle failed: {:?}", e);
            }
        }
    }

    /// Scans started since creation.
    #[inline]
    #[must_use]
    pub fn scans(&self) -> u32 {
        self.scans
    }

    #[inline]
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Get a reference to the engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Get a mutable reference to the engine.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Get a reference to the hooks.
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Decompose the loop into its engine and hooks.
    pub fn into_parts(self) -> (E, H) {
        (self.engine, self.hooks)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::buffer::{DownBuffer, UpBuffer};
    use crate::channel::ChannelMode;
    use crate::session::TunerSession;
    use crate::transport::TunerTransport;
    use core::cell::Cell;
    use core::future::Future;
    use core::pin::Pin;
    use core::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use std::vec;
    use std::vec::Vec;
    use tuner_proto::{CommandBuilder, CommandCode, PacketValidator};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Event {
        Scan,
        Process,
        Tuner,
        Restart,
    }

    // Engine whose scans stay busy for `latency` checks
    struct MockEngine {
        events: Vec<Event>,
        busy_checks: Cell<u32>,
        latency: u32,
        fail_scan: bool,
        snapshot: [u8; 4],
        session: TunerSession,
    }

    impl MockEngine {
        fn new() -> Self {
            Self {
                events: Vec::new(),
                busy_checks: Cell::new(0),
                latency: 1,
                fail_scan: false,
                snapshot: [0; 4],
                session: TunerSession::new(),
            }
        }
    }

    impl SensingEngine<4> for MockEngine {
        fn scan_all(&mut self) -> Result<(), EngineError> {
            if self.fail_scan {
                return Err(EngineError::Hardware);
            }
            self.events.push(Event::Scan);
            self.busy_checks.set(self.latency);
            Ok(())
        }

        fn is_busy(&self) -> bool {
            let remaining = self.busy_checks.get();
            if remaining == 0 {
                return false;
            }
            self.busy_checks.set(remaining - 1);
            true
        }

        fn process_all(&mut self) {
            self.events.push(Event::Process);
            self.snapshot[0] = self.snapshot[0].wrapping_add(1);
        }

        fn run_tuner<H: TunerHooks<4>>(&mut self, hooks: &mut H) -> TunerStatus {
            self.events.push(Event::Tuner);
            self.session.run(hooks, &mut self.snapshot)
        }

        fn restart(&mut self) -> Result<(), EngineError> {
            self.events.push(Event::Restart);
            self.snapshot = [0; 4];
            self.session.reset();
            Ok(())
        }

        fn snapshot(&self) -> &[u8; 4] {
            &self.snapshot
        }
    }

    type Up = UpBuffer<NoopRawMutex, 16>;
    type Down = DownBuffer<NoopRawMutex, 64>;
    type Transport<'a> = TunerTransport<&'a Up, &'a Down, PacketValidator, 4>;

    fn buffers() -> (Up, Down) {
        (
            UpBuffer::new(ChannelMode::NoBlockSkip),
            DownBuffer::new(ChannelMode::BlockIfFull),
        )
    }

    fn scan_loop<'a>(up: &'a Up, down: &'a Down) -> ScanLoop<MockEngine, Transport<'a>, 4> {
        ScanLoop::new(MockEngine::new(), TunerTransport::new(up, down, PacketValidator))
    }

    fn send(down: &Down, code: CommandCode) {
        down.write(CommandBuilder::new(code).build().as_bytes());
    }

    // Helper to run a future to completion (simple blocking executor)
    fn block_on<F: Future>(mut f: F) -> F::Output {
        fn noop_raw_waker() -> RawWaker {
            fn noop(_: *const ()) {}
            fn clone(_: *const ()) -> RawWaker {
                noop_raw_waker()
            }
            static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, noop, noop, noop);
            RawWaker::new(core::ptr::null(), &VTABLE)
        }

        let waker = unsafe { Waker::from_raw(noop_raw_waker()) };
        let mut cx = Context::from_waker(&waker);

        // SAFETY: We don't move f after pinning
        let mut f = unsafe { Pin::new_unchecked(&mut f) };

        // A yield is fine; anything longer means nothing will wake us
        for _ in 0..16 {
            if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
                return result;
            }
        }
        panic!("future stayed pending");
    }

    #[test]
    fn test_cycle_order() {
        let (up, down) = buffers();
        let mut scan = scan_loop(&up, &down);

        scan.start().unwrap();
        assert_eq!(scan.poll_once(), Ok(CycleOutcome::Busy));
        assert_eq!(scan.poll_once(), Ok(CycleOutcome::Scanned));

        assert_eq!(
            scan.engine().events,
            vec![Event::Scan, Event::Process, Event::Tuner, Event::Scan]
        );
        assert_eq!(scan.scans(), 2);
    }

    #[test]
    fn test_busy_cycle_does_nothing() {
        let (up, down) = buffers();
        let mut scan = scan_loop(&up, &down);
        scan.engine_mut().latency = 3;

        scan.start().unwrap();
        for _ in 0..3 {
            assert_eq!(scan.poll_once(), Ok(CycleOutcome::Busy));
        }
        assert_eq!(scan.engine().events, vec![Event::Scan]);
        assert_eq!(up.pending(), 0);
    }

    #[test]
    fn test_publishes_processed_snapshot() {
        let (up, down) = buffers();
        let mut scan = scan_loop(&up, &down);
        scan.engine_mut().latency = 0;

        scan.start().unwrap();
        scan.poll_once().unwrap();
        scan.poll_once().unwrap();

        let mut out = [0u8; 16];
        let n = up.drain(&mut out);
        assert_eq!(&out[..n], &[0x0D, 0x0A, 2, 0, 0, 0, 0x00, 0xFF, 0xFF]);
    }

    #[test]
    fn test_suspend_pauses_scanning() {
        let (up, down) = buffers();
        let mut scan = scan_loop(&up, &down);
        scan.engine_mut().latency = 0;
        scan.start().unwrap();

        send(&down, CommandCode::Suspend);
        assert_eq!(scan.poll_once(), Ok(CycleOutcome::Suspended));
        assert_eq!(scan.poll_once(), Ok(CycleOutcome::Suspended));
        assert!(scan.is_suspended());

        send(&down, CommandCode::Resume);
        assert_eq!(scan.poll_once(), Ok(CycleOutcome::Scanned));
        assert!(!scan.is_suspended());

        assert_eq!(
            scan.engine().events,
            vec![
                Event::Scan,
                Event::Process,
                Event::Tuner,
                Event::Tuner,
                Event::Tuner,
                Event::Scan,
            ]
        );
    }

    #[test]
    fn test_restart_rescans() {
        let (up, down) = buffers();
        let mut scan = scan_loop(&up, &down);
        scan.engine_mut().latency = 0;
        scan.start().unwrap();
        scan.engine_mut().snapshot = [7; 4];

        send(&down, CommandCode::Restart);
        assert_eq!(scan.poll_once(), Ok(CycleOutcome::Restarted));
        assert_eq!(scan.engine().snapshot(), &[0; 4]);
        assert_eq!(
            &scan.engine().events[1..],
            &[Event::Process, Event::Tuner, Event::Restart, Event::Scan]
        );
    }

    #[test]
    fn test_scan_failure_is_reported() {
        let (up, down) = buffers();
        let mut scan = scan_loop(&up, &down);
        scan.engine_mut().latency = 0;
        scan.start().unwrap();

        scan.engine_mut().fail_scan = true;
        assert_eq!(scan.poll_once(), Err(EngineError::Hardware));

        // Next cycle retries once the fault clears
        scan.engine_mut().fail_scan = false;
        assert_eq!(scan.poll_once(), Ok(CycleOutcome::Scanned));
    }

    #[test]
    fn test_cycle_signalled_waits_for_completion() {
        let (up, down) = buffers();
        let scan_done = Signal::<NoopRawMutex, ()>::new();
        let mut scan = scan_loop(&up, &down);
        scan.start().unwrap();

        // Completion already signalled by the scan side
        scan_done.signal(());
        let outcome = block_on(scan.cycle_signalled(&scan_done));

        assert_eq!(outcome, Ok(CycleOutcome::Scanned));
        assert!(!scan_done.signaled());
    }

    #[test]
    fn test_cycle_signalled_while_suspended() {
        let (up, down) = buffers();
        let scan_done = Signal::<NoopRawMutex, ()>::new();
        let mut scan = scan_loop(&up, &down);
        scan.engine_mut().latency = 0;
        scan.start().unwrap();

        send(&down, CommandCode::Suspend);
        assert_eq!(block_on(scan.cycle_signalled(&scan_done)), Ok(CycleOutcome::Suspended));
        // No scan in flight, so this must not wait on the signal
        assert_eq!(block_on(scan.cycle_signalled(&scan_done)), Ok(CycleOutcome::Suspended));
    }
}
