//! Integration tests: AppService → interlock → actuators.

use smartplug::app::commands::AppCommand;
use smartplug::app::events::{AppEvent, RelayChangeCause};
use smartplug::app::ports::{ActuatorPort, EventSink, MeterPort};
use smartplug::app::service::AppService;
use smartplug::config::SystemConfig;
use smartplug::relay::RelayState;
use smartplug::sensors::TelemetrySample;

// ── Mock implementations ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
enum ActCall {
    SetRelay(bool),
    SetLed(bool),
}

struct MockHw {
    calls: Vec<ActCall>,
    next_sample: TelemetrySample,
}

impl MockHw {
    fn new() -> Self {
        Self {
            calls: Vec::new(),
            next_sample: TelemetrySample::default(),
        }
    }

    fn set_current(&mut self, current_a: f32) {
        self.next_sample.current_a = current_a;
    }

    fn relay_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActCall::SetRelay(on) => Some(*on),
                ActCall::SetLed(_) => None,
            })
            .unwrap_or(false)
    }

    fn led_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActCall::SetLed(on) => Some(*on),
                ActCall::SetRelay(_) => None,
            })
            .unwrap_or(false)
    }
}

impl ActuatorPort for MockHw {
    fn set_relay(&mut self, on: bool) {
        self.calls.push(ActCall::SetRelay(on));
    }
    fn set_led(&mut self, on: bool) {
        self.calls.push(ActCall::SetLed(on));
    }
}

impl MeterPort for MockHw {
    fn sample(&mut self) -> TelemetrySample {
        self.next_sample
    }
}

struct LogSink {
    events: Vec<AppEvent>,
}

impl LogSink {
    fn new() -> Self {
        Self { events: Vec::new() }
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, e: &AppEvent) {
        self.events.push(e.clone());
    }
}

fn make_app() -> (AppService, MockHw, LogSink) {
    let mut app = AppService::new(&SystemConfig::default());
    let mut hw = MockHw::new();
    let mut sink = LogSink::new();
    app.start(&mut hw, &mut sink);
    (app, hw, sink)
}

// ── Boot state ────────────────────────────────────────────────

#[test]
fn boots_off_and_drives_outputs_low() {
    let (app, hw, _sink) = make_app();
    assert_eq!(app.relay_state(), RelayState::Off);
    assert!(!hw.relay_on());
    assert!(!hw.led_on());
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn toggle_flips_state_and_outputs() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(AppCommand::Toggle, &mut hw, &mut sink);
    assert_eq!(app.relay_state(), RelayState::On);
    assert!(hw.relay_on());
    assert!(hw.led_on());

    app.handle_command(AppCommand::Toggle, &mut hw, &mut sink);
    assert_eq!(app.relay_state(), RelayState::Off);
    assert!(!hw.relay_on());
}

#[test]
fn turn_on_twice_is_idempotent() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(AppCommand::TurnOn, &mut hw, &mut sink);
    let after_first = app.relay_state();
    app.handle_command(AppCommand::TurnOn, &mut hw, &mut sink);
    assert_eq!(app.relay_state(), after_first);
    assert_eq!(app.relay_state(), RelayState::On);
    assert!(hw.relay_on());

    app.handle_command(AppCommand::TurnOff, &mut hw, &mut sink);
    app.handle_command(AppCommand::TurnOff, &mut hw, &mut sink);
    assert_eq!(app.relay_state(), RelayState::Off);
}

#[test]
fn duplicate_command_emits_no_change_event() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(AppCommand::TurnOn, &mut hw, &mut sink);
    let events_after_first = sink.events.len();
    app.handle_command(AppCommand::TurnOn, &mut hw, &mut sink);
    assert_eq!(
        sink.events.len(),
        events_after_first,
        "no RelayChanged event for a no-op command"
    );
}

// ── Interlock ─────────────────────────────────────────────────

#[test]
fn overcurrent_tick_forces_off() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(AppCommand::TurnOn, &mut hw, &mut sink);

    hw.set_current(20.0);
    app.tick(&mut hw, &mut sink);

    assert_eq!(app.relay_state(), RelayState::Off);
    assert!(!hw.relay_on(), "relay output must be driven low");
    assert!(app.interlock_tripped());
}

#[test]
fn command_during_overcurrent_is_overwritten_next_tick() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.set_current(20.0);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.relay_state(), RelayState::Off);

    // The command applies immediately (level-triggered, not latched) …
    app.handle_command(AppCommand::TurnOn, &mut hw, &mut sink);
    assert_eq!(app.relay_state(), RelayState::On);

    // … and the very next tick overwrites it.
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.relay_state(), RelayState::Off);
}

#[test]
fn interlock_rearms_without_lockout() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.set_current(20.0);
    app.tick(&mut hw, &mut sink);
    assert!(app.interlock_tripped());

    // Current back under the limit: commands take normal effect again,
    // with no cooldown or explicit reset step.
    hw.set_current(0.5);
    app.tick(&mut hw, &mut sink);
    assert!(!app.interlock_tripped());

    app.handle_command(AppCommand::TurnOn, &mut hw, &mut sink);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.relay_state(), RelayState::On);
    assert!(hw.relay_on());
}

#[test]
fn interlock_emits_trip_and_clear_events() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(AppCommand::TurnOn, &mut hw, &mut sink);

    hw.set_current(17.5);
    app.tick(&mut hw, &mut sink);
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::OvercurrentTripped(amps) if (*amps - 17.5).abs() < 1e-6
    )));
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::RelayChanged {
            cause: RelayChangeCause::Interlock,
            to: RelayState::Off,
            ..
        }
    )));

    hw.set_current(1.0);
    app.tick(&mut hw, &mut sink);
    assert!(
        sink.events
            .iter()
            .any(|e| matches!(e, AppEvent::OvercurrentCleared))
    );
}

#[test]
fn normal_tick_leaves_commanded_state_alone() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(AppCommand::TurnOn, &mut hw, &mut sink);
    hw.set_current(2.0);
    for _ in 0..10 {
        app.tick(&mut hw, &mut sink);
    }
    assert_eq!(app.relay_state(), RelayState::On);
}

// ── Button semantics (latch → toggle per tick) ────────────────

#[test]
fn button_edge_toggles_once_per_tick() {
    use smartplug::drivers::button::{ButtonDriver, button_isr_handler};

    let (mut app, mut hw, mut sink) = make_app();
    let mut button = ButtonDriver::new(smartplug::pins::BUTTON_GPIO);
    let _ = button.take_pending(); // clear leftover latch state

    app.handle_command(AppCommand::TurnOn, &mut hw, &mut sink);

    // Several edges between ticks coalesce into one toggle: On → Off.
    button_isr_handler();
    button_isr_handler();
    if button.take_pending() {
        app.handle_command(AppCommand::Toggle, &mut hw, &mut sink);
    }
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.relay_state(), RelayState::Off);

    // A second edge restores On.
    button_isr_handler();
    if button.take_pending() {
        app.handle_command(AppCommand::Toggle, &mut hw, &mut sink);
    }
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.relay_state(), RelayState::On);
}

// ── Cost derivation ───────────────────────────────────────────

#[test]
fn cost_tracks_price_and_energy() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(AppCommand::SetPrice(0.20), &mut hw, &mut sink);

    // Two kWh on the accumulator.
    hw.next_sample.energy_ws = 7_200_000.0;
    app.tick(&mut hw, &mut sink);

    let snap = app.snapshot();
    assert!((snap.energy_kwh - 2.0).abs() < 1e-9);
    assert!((snap.cost_to_date - 0.40).abs() < 1e-6);
    assert!(
        sink.events
            .iter()
            .any(|e| matches!(e, AppEvent::PriceChanged(p) if (*p - 0.20).abs() < 1e-6))
    );
}

#[test]
fn telemetry_snapshot_reflects_latest_sample() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.next_sample = TelemetrySample {
        voltage_v: 230.0,
        current_a: 0.25,
        active_power_w: 57.5,
        apparent_power_va: 58.7,
        reactive_power_var: 11.8,
        power_factor: 0.98,
        energy_ws: 3_600_000.0,
    };
    app.tick(&mut hw, &mut sink);

    let t = app.build_telemetry();
    assert_eq!(t.relay, RelayState::Off);
    assert!((t.voltage_v - 230.0).abs() < 1e-6);
    assert!((t.energy_kwh - 1.0).abs() < 1e-9);
    assert!((t.cost_to_date - 0.25).abs() < 1e-6, "default price applies");
}
