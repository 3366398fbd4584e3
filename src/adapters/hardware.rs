//! Hardware adapter — binds the port traits to the real drivers.
//!
//! Owns every peripheral driver and implements [`MeterPort`] and
//! [`ActuatorPort`] over them, so the application core stays free of
//! GPIO/UART details.

use crate::app::ports::{ActuatorPort, MeterPort};
use crate::drivers::relay::RelayDriver;
use crate::drivers::status_led::StatusLed;
use crate::sensors::TelemetrySample;
use crate::sensors::power_meter::PowerMeter;

pub struct HardwareAdapter {
    relay: RelayDriver,
    led: StatusLed,
    meter: PowerMeter,
}

impl HardwareAdapter {
    pub fn new(relay: RelayDriver, led: StatusLed, meter: PowerMeter) -> Self {
        Self { relay, led, meter }
    }

    /// Relay coil state as last commanded (diagnostic query).
    pub fn relay_energised(&self) -> bool {
        self.relay.is_energised()
    }
}

impl ActuatorPort for HardwareAdapter {
    fn set_relay(&mut self, on: bool) {
        self.relay.set(on);
    }

    fn set_led(&mut self, on: bool) {
        self.led.set(on);
    }
}

impl MeterPort for HardwareAdapter {
    fn sample(&mut self) -> TelemetrySample {
        self.meter.sample()
    }
}
