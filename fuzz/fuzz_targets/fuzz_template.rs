//! Fuzz target: `template::render`
//!
//! Renders arbitrary template text against a fixed substitution map and
//! asserts the renderer either fails with a typed error or produces
//! output with no surviving well-formed placeholder.
//!
//! cargo fuzz run fuzz_template

#![no_main]

use libfuzzer_sys::fuzz_target;
use smartplug::http::template::render;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    let subs = [
        ("state", String::from("1")),
        ("voltage", String::from("230.0")),
    ];

    if let Ok(out) = render(text, &subs) {
        // A successful render must have consumed both keys and replaced
        // every occurrence.
        assert!(!out.contains("%state%"));
        assert!(!out.contains("%voltage%"));
    }
});
