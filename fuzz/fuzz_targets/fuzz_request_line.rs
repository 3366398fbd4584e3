//! Fuzz target: `router::parse_request_line`
//!
//! Drives arbitrary byte sequences through the request-line parser and
//! asserts it never panics and that every parsed request keeps the
//! path/target relationship intact.
//!
//! cargo fuzz run fuzz_request_line

#![no_main]

use libfuzzer_sys::fuzz_target;
use smartplug::http::router::parse_request_line;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = core::str::from_utf8(data) else {
        return;
    };

    if let Some(req) = parse_request_line(line) {
        // Parsed targets always start at the path root.
        assert!(req.target.starts_with('/'), "target must be rooted");
        assert!(req.path.starts_with('/'), "path must be rooted");
        // The path is the target up to the query separator.
        assert!(req.target.starts_with(&req.path));
    }
});
