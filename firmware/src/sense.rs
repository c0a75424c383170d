//! Charge-time pad acquisition.
//!
//! Each pad is a copper area on a GPIO with a high-value pull-up resistor
//! to 3V3. Holding the pin low discharges the pad; releasing it lets the
//! pad charge through the resistor, and a finger on the pad adds
//! capacitance so the pin takes longer to read high. The raw count is the
//! number of polls until it does.

use embassy_rp::gpio::{Flex, Pull};
use embassy_time::{block_for, Duration};

use touch_pads::SenseConfig;

/// A set of pads measured together.
pub struct Pads<'d, const P: usize> {
    pins: [Flex<'d>; P],
}

impl<'d, const P: usize> Pads<'d, P> {
    /// Take the pad pins and leave them discharged.
    pub fn new(mut pins: [Flex<'d>; P]) -> Self {
        for pin in pins.iter_mut() {
            pin.set_pull(Pull::None);
            pin.set_low();
            pin.set_as_output();
        }
        Self { pins }
    }

    /// Measure every pad once, in order.
    ///
    /// Blocks for roughly `P × (discharge_us + max_count polls)`.
    pub fn measure(&mut self, config: &SenseConfig) -> [u16; P] {
        let mut counts = [0u16; P];
        for (pin, count) in self.pins.iter_mut().zip(counts.iter_mut()) {
            *count = charge_time(pin, config);
        }
        counts
    }
}

/// Polls until `pin` reads high, saturating at `config.max_count`.
fn charge_time(pin: &mut Flex<'_>, config: &SenseConfig) -> u16 {
    block_for(Duration::from_micros(config.discharge_us.into()));

    pin.set_as_input();
    let mut count = 0;
    while count < config.max_count && pin.is_low() {
        count += 1;
    }

    // Output latch is still low: this starts the next discharge
    pin.set_as_output();
    count
}
