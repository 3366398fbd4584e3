//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (the metering chip, the relay/LED outputs, event sinks)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use crate::sensors::TelemetrySample;

// ───────────────────────────────────────────────────────────────
// Meter port (driven adapter: metering chip → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per tick to obtain the
/// latest known telemetry.
///
/// Implementations own the retained-sample discipline: when no fresh
/// frame has decoded since the previous call, they must return the
/// previous sample unchanged rather than an error or a zeroed reading.
pub trait MeterPort {
    fn sample(&mut self) -> TelemetrySample;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command outputs.
///
/// Actuation raises no errors; a hardware write that fails is outside
/// this design's responsibility.
pub trait ActuatorPort {
    /// Energise (true) or release (false) the relay coil.
    fn set_relay(&mut self, on: bool);

    /// Drive the front-panel LED mirroring relay state.
    fn set_led(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log, a
/// future MQTT publisher, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
