//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the relay state, the retained telemetry sample,
//! the overcurrent interlock, and the cost model.  It exposes a clean,
//! hardware-agnostic API.  All I/O flows through port traits injected at
//! call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!   MeterPort ──▶ ┌────────────────────────────┐ ──▶ EventSink
//!                 │         AppService          │
//! ActuatorPort ◀──│  Relay · Interlock · Cost   │
//!                 └────────────────────────────┘
//! ```
//!
//! ## Tick contract
//!
//! [`tick`](AppService::tick) runs **after** any commands applied in the
//! same loop iteration: it refreshes the sample, evaluates the interlock,
//! and re-applies the outputs.  That ordering makes the interlock the
//! final authority each tick — an On command issued while current is over
//! the limit never survives the tick that observed it.

use log::info;

use crate::config::SystemConfig;
use crate::cost::CostModel;
use crate::relay::RelayState;
use crate::safety::OvercurrentInterlock;
use crate::sensors::TelemetrySample;

use super::commands::AppCommand;
use super::events::{AppEvent, RelayChangeCause, TelemetryData};
use super::ports::{ActuatorPort, EventSink, MeterPort};

/// Everything the HTTP facade needs to render one response.
#[derive(Debug, Clone, Copy)]
pub struct StatusSnapshot {
    pub relay: RelayState,
    pub sample: TelemetrySample,
    pub price_per_kwh: f32,
    pub energy_kwh: f64,
    pub cost_to_date: f64,
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    relay: RelayState,
    sample: TelemetrySample,
    interlock: OvercurrentInterlock,
    cost: CostModel,
    tick_count: u64,
}

impl AppService {
    /// Construct the service from configuration.  The relay boots Off.
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            relay: RelayState::Off,
            sample: TelemetrySample::default(),
            interlock: OvercurrentInterlock::new(config),
            cost: CostModel::new(config.default_price_per_kwh),
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive the outputs to the boot state and announce startup.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        self.apply_outputs(hw);
        sink.emit(&AppEvent::Started(self.relay));
        info!("AppService started, relay {:?}", self.relay);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle: refresh telemetry → interlock → outputs.
    ///
    /// The `hw` parameter satisfies **both** [`MeterPort`] and
    /// [`ActuatorPort`] — this avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn tick(&mut self, hw: &mut (impl MeterPort + ActuatorPort), sink: &mut impl EventSink) {
        self.tick_count += 1;

        // 1. Refresh the retained sample via MeterPort.
        self.sample = hw.sample();

        // 2. Interlock evaluation — level-triggered, every tick.
        let was_tripped = self.interlock.is_tripped();
        let over = self.interlock.evaluate(&self.sample);
        if over {
            if !was_tripped {
                sink.emit(&AppEvent::OvercurrentTripped(self.sample.current_a));
            }
            self.force_off(hw, sink);
        } else if was_tripped {
            sink.emit(&AppEvent::OvercurrentCleared);
        }

        // 3. Re-assert the outputs.
        self.apply_outputs(hw);
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (from HTTP or the button latch).
    ///
    /// Commands apply immediately; the next [`tick`](Self::tick) may still
    /// overwrite the result if current is over the limit.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::Toggle => self.set_relay(self.relay.toggled(), hw, sink),
            AppCommand::TurnOn => self.set_relay(RelayState::On, hw, sink),
            AppCommand::TurnOff => self.set_relay(RelayState::Off, hw, sink),
            AppCommand::SetPrice(price) => {
                self.cost.set_price(price);
                sink.emit(&AppEvent::PriceChanged(price));
                info!("price set to {:.4}/kWh", price);
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current relay state.
    pub fn relay_state(&self) -> RelayState {
        self.relay
    }

    /// Latest known telemetry sample.
    pub fn sample(&self) -> TelemetrySample {
        self.sample
    }

    /// Current electricity price.
    pub fn price_per_kwh(&self) -> f32 {
        self.cost.price_per_kwh()
    }

    /// Whether the interlock held the relay off at the last evaluation.
    pub fn interlock_tripped(&self) -> bool {
        self.interlock.is_tripped()
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Point-in-time view for rendering; derived values are recomputed
    /// here, never cached.
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            relay: self.relay,
            sample: self.sample,
            price_per_kwh: self.cost.price_per_kwh(),
            energy_kwh: self.cost.energy_kwh(self.sample.energy_ws),
            cost_to_date: self.cost.cost_to_date(self.sample.energy_ws),
        }
    }

    /// Build a telemetry snapshot for the periodic log line.
    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            relay: self.relay,
            voltage_v: self.sample.voltage_v,
            current_a: self.sample.current_a,
            active_power_w: self.sample.active_power_w,
            apparent_power_va: self.sample.apparent_power_va,
            reactive_power_var: self.sample.reactive_power_var,
            power_factor: self.sample.power_factor,
            energy_kwh: self.cost.energy_kwh(self.sample.energy_ws),
            price_per_kwh: self.cost.price_per_kwh(),
            cost_to_date: self.cost.cost_to_date(self.sample.energy_ws),
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn set_relay(
        &mut self,
        target: RelayState,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        let prev = self.relay;
        self.relay = target;
        self.apply_outputs(hw);
        if prev != target {
            sink.emit(&AppEvent::RelayChanged {
                from: prev,
                to: target,
                cause: RelayChangeCause::Command,
            });
        }
    }

    fn force_off(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        let prev = self.relay;
        self.relay = RelayState::Off;
        self.apply_outputs(hw);
        if prev.is_on() {
            sink.emit(&AppEvent::RelayChanged {
                from: prev,
                to: RelayState::Off,
                cause: RelayChangeCause::Interlock,
            });
        }
    }

    fn apply_outputs(&self, hw: &mut impl ActuatorPort) {
        hw.set_relay(self.relay.is_on());
        hw.set_led(self.relay.is_on());
    }
}
