//! Smart Plug Firmware — Main Entry Point
//!
//! Hexagonal architecture around one cooperative control loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  HardwareAdapter      LogEventSink      WifiAdapter          │
//! │  (Meter+Actuator)     (EventSink)       (ConnectivityPort)   │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ──────────────────      │
//! │                                                              │
//! │  ┌──────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                 │    │
//! │  │  Relay · Overcurrent interlock · Cost                │    │
//! │  └──────────────────────────────────────────────────────┘    │
//! │                                                              │
//! │  HttpServer (≤1 request/tick) · UpdateChannel · Watchdog     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Per tick, in order: drain the button latch (≤1 toggle), service ≤1
//! HTTP request, refresh telemetry + enforce the interlock, poll the
//! update channel, feed the watchdog.
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use smartplug::adapters::hardware::HardwareAdapter;
use smartplug::adapters::log_sink::LogEventSink;
use smartplug::adapters::time::Esp32TimeAdapter;
use smartplug::adapters::wifi::{ConnectivityPort, WifiAdapter};
use smartplug::app::commands::AppCommand;
use smartplug::app::events::AppEvent;
use smartplug::app::ports::EventSink;
use smartplug::app::service::AppService;
use smartplug::config::{self, SystemConfig};
use smartplug::drivers::button::ButtonDriver;
use smartplug::drivers::relay::RelayDriver;
use smartplug::drivers::status_led::StatusLed;
use smartplug::drivers::{hw_init, hw_timer, watchdog::Watchdog};
use smartplug::events::{self, Event};
use smartplug::http::server::HttpServer;
use smartplug::ota::{self, UpdateChannel};
use smartplug::sensors::power_meter::PowerMeter;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    #[cfg(target_os = "espidf")]
    {
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;
    }

    info!("smartplug v{} starting", env!("CARGO_PKG_VERSION"));

    // ── 1b. OTA rollback check ────────────────────────────────
    ota::check_rollback();

    // ── 1c. Initialise hardware peripherals ───────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        // In production this triggers the watchdog reset after timeout.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    if let Err(e) = hw_init::init_isr_service() {
        log::error!("ISR service init failed: {} — continuing without button", e);
    }
    let watchdog = Watchdog::new();

    // ── 2. Configuration (compiled defaults, nothing persisted) ──
    let config = SystemConfig::default();
    let time = Esp32TimeAdapter::new();

    // ── 3. Network bootstrap — one bounded wait ───────────────
    let wifi = match WifiAdapter::new(config::WIFI_SSID, config::WIFI_PASSWORD, config::WIFI_HOSTNAME)
    {
        Ok(mut wifi) => {
            if wifi.connect(config.wifi_connect_timeout_secs, &time).is_err() {
                warn!("running locally-operable only; HTTP surface unreachable");
            }
            Some(wifi)
        }
        Err(e) => {
            warn!("WiFi credentials rejected ({}); running locally-operable only", e);
            None
        }
    };

    // ── 4. Construct adapters ─────────────────────────────────
    let mut hw = HardwareAdapter::new(RelayDriver::new(), StatusLed::new(), PowerMeter::new());
    let mut log_sink = LogEventSink::new();
    let mut button = ButtonDriver::new(smartplug::pins::BUTTON_GPIO);

    // ── 5. Construct app service ──────────────────────────────
    let mut app = AppService::new(&config);
    app.start(&mut hw, &mut log_sink);

    // ── 6. HTTP facade ────────────────────────────────────────
    // Bound even in degraded mode: the listener is harmless without a
    // network and comes alive the moment an address exists.
    let mut http = match HttpServer::bind(config.http_port) {
        Ok(server) => Some(server),
        Err(e) => {
            warn!("HTTP: {} — control surface disabled", e);
            None
        }
    };

    // ── 7. Update channel ─────────────────────────────────────
    let mut update = UpdateChannel::new();

    if let Some(ref wifi) = wifi {
        info!(
            "System ready (wifi {:?}, hostname '{}'). Entering control loop.",
            wifi.state(),
            wifi.hostname()
        );
    } else {
        info!("System ready (no wifi). Entering control loop.");
    }

    // ── 8. Control loop ───────────────────────────────────────
    hw_timer::start_timers(config.control_loop_interval_ms, config.telemetry_interval_secs);

    #[cfg(not(target_os = "espidf"))]
    let mut telemetry_counter: u64 = 0;

    loop {
        // Simulate timer interrupts via sleep on non-espidf targets.
        // On real hardware the esp_timer callbacks feed the queue and the
        // loop blocks in the delay below between ticks.
        #[cfg(not(target_os = "espidf"))]
        {
            std::thread::sleep(std::time::Duration::from_millis(u64::from(
                config.control_loop_interval_ms,
            )));
            events::push_event(Event::ControlTick);
            telemetry_counter += 1;
            if telemetry_counter >= config.ticks_per_telemetry() {
                events::push_event(Event::TelemetryTick);
                telemetry_counter = 0;
            }
        }
        #[cfg(target_os = "espidf")]
        unsafe {
            // One FreeRTOS tick; the event queue fills from timer context.
            esp_idf_svc::sys::vTaskDelay(1);
        }

        events::drain_events(|event| match event {
            Event::ControlTick => {
                // 1. Button latch — at most one toggle per tick.
                if button.take_pending() {
                    info!("button: toggle");
                    app.handle_command(AppCommand::Toggle, &mut hw, &mut log_sink);
                }

                // 2. At most one inbound HTTP request.
                if let Some(ref mut server) = http {
                    server.poll(&mut app, &mut hw, &mut log_sink);
                }

                // 3. Telemetry refresh + interlock + output re-assert.
                app.tick(&mut hw, &mut log_sink);

                // 4. Firmware-update channel (non-blocking).
                update.poll_for_update();

                // 5. Liveness.
                watchdog.feed();
            }

            Event::TelemetryTick => {
                log_sink.emit(&AppEvent::Telemetry(app.build_telemetry()));
            }
        });
    }
}
