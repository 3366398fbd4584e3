//! Relay output driver.
//!
//! Drives the relay coil transistor through a single GPIO.  The driver is
//! a dumb actuator: the overcurrent policy lives in the application core,
//! which is the only caller.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes the real GPIO via hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::pins;

pub struct RelayDriver {
    energised: bool,
}

impl RelayDriver {
    /// The coil starts released — the load is dead until the core
    /// commands otherwise.
    pub fn new() -> Self {
        let driver = Self { energised: false };
        driver.write_hw(false);
        driver
    }

    pub fn set(&mut self, on: bool) {
        if self.energised != on {
            self.write_hw(on);
            self.energised = on;
        }
    }

    pub fn is_energised(&self) -> bool {
        self.energised
    }

    fn write_hw(&self, on: bool) {
        hw_init::gpio_write(pins::RELAY_GPIO, on);
    }
}

impl Default for RelayDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_released() {
        let relay = RelayDriver::new();
        assert!(!relay.is_energised());
    }

    #[test]
    fn set_tracks_state() {
        let mut relay = RelayDriver::new();
        relay.set(true);
        assert!(relay.is_energised());
        relay.set(true); // idempotent
        assert!(relay.is_energised());
        relay.set(false);
        assert!(!relay.is_energised());
    }
}
