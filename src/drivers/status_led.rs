//! Front-panel status LED driver.
//!
//! A single LED mirrors the relay state.  The S31-class board wires the
//! LED active-low, so the GPIO level is inverted here and nowhere else.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the GPIO via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::pins;

pub struct StatusLed {
    lit: bool,
}

impl StatusLed {
    pub fn new() -> Self {
        let led = Self { lit: false };
        led.write_hw(false);
        led
    }

    pub fn set(&mut self, lit: bool) {
        if self.lit != lit {
            self.write_hw(lit);
            self.lit = lit;
        }
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    fn write_hw(&self, lit: bool) {
        // Active-low.
        hw_init::gpio_write(pins::LED_GPIO, !lit);
    }
}

impl Default for StatusLed {
    fn default() -> Self {
        Self::new()
    }
}
