//! Status page — template body and its substitution set.
//!
//! Dark panel styling: one big toggle button with the telemetry table
//! and price form underneath.  Every dynamic value flows through the
//! closed substitution map in
//! [`build_substitutions`]; the template renderer guarantees nothing
//! leaks unreplaced.

use crate::app::service::StatusSnapshot;
use crate::http::template::{self, TemplateError};

pub const STATUS_PAGE_TEMPLATE: &str = "\
<!DOCTYPE html>\
<html>\
<head>\
<title>Smart Plug</title>\
<meta name=\"mobile-web-app-capable\" content=\"yes\" />\
<meta name=\"viewport\" content=\"width=device-width\" />\
<style>\
body {background-color: #000; color: #a40; font-family: Helvetica;}\
input.colorButton { width: 100%; height: 2.5em; padding: 0; font-size: 2em; background-color: #222; border-color: #222; color: #a40; font-family: Helvetica;}\
input.costField { width: 6em; background-color: #222; border-color: #222; color: #a40;}\
table { width: 100%; color: #a40; font-size: 1.2em; }\
td.v { text-align: right; }\
</style>\
</head>\
<body>\
<form action=\"/toggle\" method=\"get\"><input type=\"submit\" value=\"Turn %toggle_label%\" class=\"colorButton\"></form>\
<table>\
<tr><td>Relay</td><td class=\"v\">%state_label%</td></tr>\
<tr><td>Voltage</td><td class=\"v\">%voltage% V</td></tr>\
<tr><td>Current</td><td class=\"v\">%current% A</td></tr>\
<tr><td>Active power</td><td class=\"v\">%active_power% W</td></tr>\
<tr><td>Apparent power</td><td class=\"v\">%apparent_power% VA</td></tr>\
<tr><td>Reactive power</td><td class=\"v\">%reactive_power% var</td></tr>\
<tr><td>Power factor</td><td class=\"v\">%power_factor%</td></tr>\
<tr><td>Energy</td><td class=\"v\">%energy_kwh% kWh</td></tr>\
<tr><td>Price</td><td class=\"v\">%price% /kWh</td></tr>\
<tr><td>Cost to date</td><td class=\"v\">%cost%</td></tr>\
</table>\
<form action=\"/setCost\" method=\"get\">\
<input type=\"text\" name=\"cost\" value=\"%price%\" class=\"costField\">\
<input type=\"submit\" value=\"Set price\">\
</form>\
</body>\
</html>";

/// Build the complete substitution set for one render.
///
/// Fixed-precision formatting keeps the output length stable between
/// renders regardless of the values.
pub fn build_substitutions(snap: &StatusSnapshot) -> Vec<(&'static str, String)> {
    vec![
        // The button offers the opposite of the current state.
        ("toggle_label", snap.relay.toggled().label().to_owned()),
        ("state_label", snap.relay.label().to_owned()),
        ("voltage", format!("{:.1}", snap.sample.voltage_v)),
        ("current", format!("{:.3}", snap.sample.current_a)),
        ("active_power", format!("{:.1}", snap.sample.active_power_w)),
        (
            "apparent_power",
            format!("{:.1}", snap.sample.apparent_power_va),
        ),
        (
            "reactive_power",
            format!("{:.1}", snap.sample.reactive_power_var),
        ),
        ("power_factor", format!("{:.2}", snap.sample.power_factor)),
        ("energy_kwh", format!("{:.4}", snap.energy_kwh)),
        ("price", format!("{:.4}", snap.price_per_kwh)),
        ("cost", format!("{:.4}", snap.cost_to_date)),
    ]
}

/// Render the status page for the given snapshot.
pub fn render_status_page(snap: &StatusSnapshot) -> Result<String, TemplateError> {
    template::render(STATUS_PAGE_TEMPLATE, &build_substitutions(snap))
}
