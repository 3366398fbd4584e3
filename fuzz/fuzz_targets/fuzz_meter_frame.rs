//! Fuzz target: `cse7766::decode`
//!
//! Feeds arbitrary bytes to the meter frame decoder and asserts it never
//! panics and never yields non-finite or negative readings.
//!
//! cargo fuzz run fuzz_meter_frame

#![no_main]

use libfuzzer_sys::fuzz_target;
use smartplug::sensors::cse7766::decode;

fuzz_target!(|data: &[u8]| {
    if let Some(r) = decode(data) {
        assert!(r.voltage_v.is_finite() && r.voltage_v >= 0.0);
        assert!(r.current_a.is_finite() && r.current_a >= 0.0);
        assert!(r.active_power_w.is_finite() && r.active_power_w >= 0.0);
    }
});
