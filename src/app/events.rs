//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them — today that is the serial log.

use crate::relay::RelayState;
use serde::Serialize;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    /// The relay changed state, and what caused it.
    RelayChanged {
        from: RelayState,
        to: RelayState,
        cause: RelayChangeCause,
    },

    /// The interlock tripped on overcurrent (carries the offending amps).
    OvercurrentTripped(f32),

    /// Current dropped back under the limit.
    OvercurrentCleared,

    /// The electricity price was overwritten.
    PriceChanged(f32),

    /// The application service has started (carries initial relay state).
    Started(RelayState),
}

/// What drove a relay transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayChangeCause {
    /// An external command (HTTP or button).
    Command,
    /// The overcurrent interlock forced the relay off.
    Interlock,
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryData {
    pub relay: RelayState,
    pub voltage_v: f32,
    pub current_a: f32,
    pub active_power_w: f32,
    pub apparent_power_va: f32,
    pub reactive_power_var: f32,
    pub power_factor: f32,
    pub energy_kwh: f64,
    pub price_per_kwh: f32,
    pub cost_to_date: f64,
}
