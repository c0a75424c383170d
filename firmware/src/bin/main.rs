#![no_std]
#![no_main]

use defmt::{info, unwrap};
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::gpio::Flex;
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_time::{Duration, Ticker};
use rtt_target::{rtt_init, ChannelMode};
use static_cell::StaticCell;
use touch_tuner::{
    pump, rtt_mode, PadEngine, Pads, RttDown, ScanShared, TunerLink, TunerLoop, TunerUp,
    FRAME_LEN, PAD_COUNT,
};
use tuner_core::proto::PacketValidator;
use tuner_core::{ScanLoop, DEFAULT_TUNER_CONFIG};

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

/// RTT up buffer for the tuner channel. RTT keeps one byte of every ring
/// free, so a whole frame needs one byte more than its length.
const TUNER_UP_SIZE: usize = FRAME_LEN + 1;

/// RTT index and name of the tuner channel in both directions. `rtt_init!`
/// only takes literals, so its tuner entries must match these.
const TUNER_CHANNEL: usize = 1;
const TUNER_NAME: &str = "tuner";

/// Runs the acquisition task above the thread-mode executor.
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

/// Scan request/completion state shared with the acquisition task.
static SCAN_SHARED: ScanShared = ScanShared::new();

/// Newest outbound frame, written by the scan task and drained by the pump.
static TUNER_UP: StaticCell<TunerUp> = StaticCell::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let channels = rtt_init! {
        up: {
            0: {
                size: 1024,
                mode: ChannelMode::NoBlockSkip,
                name: "defmt"
            }
            1: {
                size: TUNER_UP_SIZE,
                name: "tuner"
            }
        }
        down: {
            0: {
                size: 16,
                name: "Terminal"
            }
            1: {
                size: 32,
                name: "tuner"
            }
        }
    };
    rtt_target::set_defmt_channel(channels.up.0);

    info!("touch tuner starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    let config = DEFAULT_TUNER_CONFIG;
    let mut tuner_up_channel = channels.up.1;
    tuner_up_channel.set_mode(rtt_mode(config.up_mode));

    // --- Pads ---
    let pads: Pads<'static, PAD_COUNT> = Pads::new([
        Flex::new(p.PIN_2),
        Flex::new(p.PIN_3),
        Flex::new(p.PIN_4),
        Flex::new(p.PIN_5),
        Flex::new(p.PIN_6),
        Flex::new(p.PIN_7),
        Flex::new(p.PIN_8),
    ]);

    // --- Acquisition on SWI_IRQ_1 ---
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let high_spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    high_spawner.spawn(acquire_task(pads, &SCAN_SHARED).unwrap());

    // --- Tuner link ---
    let tuner_up: &'static TunerUp = TUNER_UP.init(TunerUp::new(config.up_mode));
    let link: TunerLink =
        TunerLink::new(tuner_up, RttDown::new(channels.down.1), PacketValidator);
    let scan: TunerLoop = ScanLoop::new(PadEngine::new(&SCAN_SHARED), link);

    spawner.spawn(pump_task(tuner_up, tuner_up_channel, config.pump_interval_ms).unwrap());
    spawner.spawn(scan_task(scan).unwrap());

    info!(
        "touch tuner initialized, {} pads on RTT channel {} \"{}\"",
        PAD_COUNT, TUNER_CHANNEL, TUNER_NAME
    );
}

/// Acquire task - measures the pads whenever a scan is requested.
#[embassy_executor::task]
async fn acquire_task(mut pads: Pads<'static, PAD_COUNT>, shared: &'static ScanShared) {
    loop {
        let config = shared.next_request().await;
        let counts = pads.measure(&config);
        shared.complete(counts);
    }
}

/// Scan task - the foreground loop: process, run tuner, rescan.
#[embassy_executor::task]
async fn scan_task(mut scan: TunerLoop) {
    // Without a first scan nothing ever completes; treat it like failed bring-up
    unwrap!(scan.start());
    info!("first scan started");

    scan.run_signalled(SCAN_SHARED.done()).await
}

/// Pump task - pushes the newest snapshot frame to the probe.
#[embassy_executor::task]
async fn pump_task(
    up: &'static TunerUp,
    mut channel: rtt_target::UpChannel,
    interval_ms: u64,
) {
    let mut ticker = Ticker::every(Duration::from_millis(interval_ms));
    loop {
        pump(up, &mut channel);
        ticker.next().await;
    }
}
