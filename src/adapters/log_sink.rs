//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! A future MQTT publisher would implement the same trait.

use log::{debug, info, warn};

use crate::app::events::{AppEvent, RelayChangeCause};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | relay={:?} | {:.1}V {:.3}A | P={:.1}W S={:.1}VA Q={:.1}var pf={:.2} | \
                     E={:.4}kWh @ {:.4}/kWh = {:.4}",
                    t.relay,
                    t.voltage_v,
                    t.current_a,
                    t.active_power_w,
                    t.apparent_power_va,
                    t.reactive_power_var,
                    t.power_factor,
                    t.energy_kwh,
                    t.price_per_kwh,
                    t.cost_to_date,
                );
                // Machine-readable form for log scrapers.
                if let Ok(json) = serde_json::to_string(t) {
                    debug!("TELEM/json {}", json);
                }
            }
            AppEvent::RelayChanged { from, to, cause } => match cause {
                RelayChangeCause::Command => info!("RELAY | {:?} -> {:?} (command)", from, to),
                RelayChangeCause::Interlock => {
                    warn!("RELAY | {:?} -> {:?} (interlock)", from, to);
                }
            },
            AppEvent::OvercurrentTripped(amps) => {
                warn!("FAULT | overcurrent tripped at {:.2} A", amps);
            }
            AppEvent::OvercurrentCleared => {
                info!("FAULT | overcurrent cleared");
            }
            AppEvent::PriceChanged(price) => {
                info!("PRICE | set to {:.4}/kWh", price);
            }
            AppEvent::Started(state) => {
                info!("START | relay={:?}", state);
            }
        }
    }
}
