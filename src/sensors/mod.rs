//! Sensor subsystem — the power-metering front-end.
//!
//! The plug has a single sensor: a CSE7766-class metering chip streaming
//! framed telemetry over UART.  [`power_meter::PowerMeter`] owns the chip
//! and produces a [`TelemetrySample`] each tick.

pub mod cse7766;
pub mod power_meter;

use serde::{Deserialize, Serialize};

/// One reading set from the metering chip.
///
/// Replaced wholesale on each successfully decoded frame; the previous
/// sample is retained when the chip has nothing new (no staleness marker
/// is kept — consumers always see the last known values).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub voltage_v: f32,
    pub current_a: f32,
    pub active_power_w: f32,
    pub apparent_power_va: f32,
    pub reactive_power_var: f32,
    pub power_factor: f32,
    /// Cumulative energy in watt-seconds.  Monotonic, non-decreasing;
    /// only ever advanced by the metering chip.
    pub energy_ws: f64,
}

impl Default for TelemetrySample {
    fn default() -> Self {
        Self {
            voltage_v: 0.0,
            current_a: 0.0,
            active_power_w: 0.0,
            apparent_power_va: 0.0,
            reactive_power_var: 0.0,
            power_factor: 0.0,
            energy_ws: 0.0,
        }
    }
}
