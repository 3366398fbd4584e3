//! Integration tests: HTTP routing, status keys, and the socket front-end.

use smartplug::app::ports::{ActuatorPort, EventSink, MeterPort};
use smartplug::app::service::AppService;
use smartplug::config::SystemConfig;
use smartplug::http::router::{self, Request, Response};
use smartplug::http::server::HttpServer;
use smartplug::relay::RelayState;
use smartplug::sensors::TelemetrySample;

// ── Minimal mocks ─────────────────────────────────────────────

struct MockHw {
    next_sample: TelemetrySample,
}

impl MockHw {
    fn new() -> Self {
        Self {
            next_sample: TelemetrySample::default(),
        }
    }
}

impl ActuatorPort for MockHw {
    fn set_relay(&mut self, _on: bool) {}
    fn set_led(&mut self, _on: bool) {}
}

impl MeterPort for MockHw {
    fn sample(&mut self) -> TelemetrySample {
        self.next_sample
    }
}

struct NullSink;
impl EventSink for NullSink {
    fn emit(&mut self, _e: &smartplug::app::events::AppEvent) {}
}

fn make_app() -> (AppService, MockHw, NullSink) {
    let mut app = AppService::new(&SystemConfig::default());
    let mut hw = MockHw::new();
    let mut sink = NullSink;
    app.start(&mut hw, &mut sink);
    (app, hw, sink)
}

fn get(target: &str) -> Request {
    router::parse_request_line(&format!("GET {} HTTP/1.1", target)).expect("request parses")
}

fn dispatch(target: &str, app: &mut AppService, hw: &mut MockHw, sink: &mut NullSink) -> Response {
    router::dispatch(&get(target), app, hw, sink)
}

// ── Routing table ─────────────────────────────────────────────

#[test]
fn index_renders_status_page() {
    let (mut app, mut hw, mut sink) = make_app();
    let resp = dispatch("/", &mut app, &mut hw, &mut sink);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.content_type, "text/html");
    assert!(resp.body.contains("Smart Plug"));
    assert!(!resp.body.contains("%state_label%"), "no raw placeholder");
}

#[test]
fn toggle_commands_and_redirects() {
    let (mut app, mut hw, mut sink) = make_app();
    let resp = dispatch("/toggle", &mut app, &mut hw, &mut sink);
    assert_eq!(resp.status, 303);
    assert_eq!(resp.location, Some("/"));
    assert_eq!(app.relay_state(), RelayState::On);

    let resp = dispatch("/toggle", &mut app, &mut hw, &mut sink);
    assert_eq!(resp.status, 303);
    assert_eq!(app.relay_state(), RelayState::Off);
}

#[test]
fn on_and_off_routes() {
    let (mut app, mut hw, mut sink) = make_app();
    assert_eq!(dispatch("/on", &mut app, &mut hw, &mut sink).status, 303);
    assert_eq!(app.relay_state(), RelayState::On);
    assert_eq!(dispatch("/off", &mut app, &mut hw, &mut sink).status, 303);
    assert_eq!(app.relay_state(), RelayState::Off);
}

#[test]
fn set_cost_updates_price() {
    let (mut app, mut hw, mut sink) = make_app();
    let resp = dispatch("/setCost?cost=0.20", &mut app, &mut hw, &mut sink);
    assert_eq!(resp.status, 303);
    assert!((app.price_per_kwh() - 0.20).abs() < 1e-6);
}

#[test]
fn set_cost_accepts_zero_and_negative() {
    let (mut app, mut hw, mut sink) = make_app();
    assert_eq!(
        dispatch("/setCost?cost=0", &mut app, &mut hw, &mut sink).status,
        303
    );
    assert_eq!(app.price_per_kwh(), 0.0);
    assert_eq!(
        dispatch("/setCost?cost=-0.5", &mut app, &mut hw, &mut sink).status,
        303
    );
    assert!((app.price_per_kwh() + 0.5).abs() < 1e-6);
}

#[test]
fn set_cost_rejects_garbage_and_non_finite() {
    let (mut app, mut hw, mut sink) = make_app();
    let before = app.price_per_kwh();
    for bad in ["/setCost", "/setCost?cost=", "/setCost?cost=abc", "/setCost?cost=NaN", "/setCost?cost=inf"] {
        let resp = dispatch(bad, &mut app, &mut hw, &mut sink);
        assert_eq!(resp.status, 404, "{} must be rejected", bad);
    }
    assert_eq!(app.price_per_kwh(), before, "price unchanged by bad input");
}

// ── Status endpoint ───────────────────────────────────────────

#[test]
fn status_state_is_byte_exact() {
    let (mut app, mut hw, mut sink) = make_app();
    let resp = dispatch("/status?of=state", &mut app, &mut hw, &mut sink);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.content_type, "text/plain");
    assert_eq!(resp.body, "0");

    dispatch("/on", &mut app, &mut hw, &mut sink);
    let resp = dispatch("/status?of=state", &mut app, &mut hw, &mut sink);
    assert_eq!(resp.body, "1");
}

#[test]
fn status_reports_telemetry_fields() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.next_sample = TelemetrySample {
        voltage_v: 230.0,
        current_a: 0.25,
        active_power_w: 57.5,
        apparent_power_va: 58.7,
        reactive_power_var: 11.8,
        power_factor: 0.98,
        energy_ws: 7_200_000.0,
    };
    app.tick(&mut hw, &mut sink);

    let cases = [
        ("voltage", "230.0"),
        ("current", "0.250"),
        ("activePower", "57.5"),
        ("apparentPower", "58.7"),
        ("reactivePower", "11.8"),
        ("powerFactor", "0.98"),
        ("energy", "7200000"),
        ("energyKwh", "2.0000"),
        ("cost", "0.5000"), // 2 kWh at the 0.25 default
    ];
    for (key, expected) in cases {
        let resp = dispatch(&format!("/status?of={}", key), &mut app, &mut hw, &mut sink);
        assert_eq!(resp.status, 200, "of={}", key);
        assert_eq!(resp.body, expected, "of={}", key);
    }
}

#[test]
fn status_cost_follows_price_change() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.next_sample.energy_ws = 7_200_000.0; // 2 kWh
    app.tick(&mut hw, &mut sink);
    dispatch("/setCost?cost=0.20", &mut app, &mut hw, &mut sink);

    let resp = dispatch("/status?of=cost", &mut app, &mut hw, &mut sink);
    let cost: f64 = resp.body.parse().unwrap();
    assert!((cost - 0.40).abs() < 1e-4);
}

#[test]
fn unknown_status_key_is_not_found() {
    let (mut app, mut hw, mut sink) = make_app();
    let resp = dispatch("/status?of=unknownKey", &mut app, &mut hw, &mut sink);
    assert_eq!(resp.status, 404);
    assert!(resp.body.contains("File Not Found"));
    assert!(resp.body.contains(" of: unknownKey"));
}

// ── Unmatched routes ──────────────────────────────────────────

#[test]
fn unmatched_route_dumps_diagnostics() {
    let (mut app, mut hw, mut sink) = make_app();
    let resp = dispatch("/nope?a=1", &mut app, &mut hw, &mut sink);
    assert_eq!(resp.status, 404);
    assert!(resp.body.contains("URI: /nope?a=1"));
    assert!(resp.body.contains("Method: GET"));
    assert!(resp.body.contains("Arguments: 1"));
}

#[test]
fn non_get_method_is_not_found() {
    let (mut app, mut hw, mut sink) = make_app();
    let req = router::parse_request_line("POST /toggle HTTP/1.1").unwrap();
    let resp = router::dispatch(&req, &mut app, &mut hw, &mut sink);
    assert_eq!(resp.status, 404);
    assert_eq!(
        app.relay_state(),
        RelayState::Off,
        "non-GET must not command"
    );
}

// ── Socket round-trip ─────────────────────────────────────────

#[test]
fn socket_round_trip_serves_one_request_per_poll() {
    use std::io::{Read, Write};
    use std::net::TcpStream;

    let (mut app, mut hw, mut sink) = make_app();
    // Port 0: the OS picks a free port; required for host test runs.
    let mut server = HttpServer::bind(0).expect("bind");
    let port = server.port();

    // No client yet: poll is a cheap no-op.
    assert!(!server.poll(&mut app, &mut hw, &mut sink));

    let mut client = TcpStream::connect(("127.0.0.1", port)).expect("connect");
    client
        .write_all(b"GET /status?of=state HTTP/1.1\r\nHost: plug\r\n\r\n")
        .expect("write");

    assert!(server.poll(&mut app, &mut hw, &mut sink), "request served");
    assert_eq!(server.requests_served(), 1);

    let mut response = String::new();
    client.read_to_string(&mut response).expect("read");
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.ends_with("\r\n\r\n0"), "body is exactly '0'");
}

#[test]
fn socket_toggle_round_trip_redirects() {
    use std::io::{Read, Write};
    use std::net::TcpStream;

    let (mut app, mut hw, mut sink) = make_app();
    let mut server = HttpServer::bind(0).expect("bind");
    let port = server.port();

    let mut client = TcpStream::connect(("127.0.0.1", port)).expect("connect");
    client
        .write_all(b"GET /toggle HTTP/1.1\r\n\r\n")
        .expect("write");
    assert!(server.poll(&mut app, &mut hw, &mut sink));
    assert_eq!(app.relay_state(), RelayState::On);

    let mut response = String::new();
    client.read_to_string(&mut response).expect("read");
    assert!(response.starts_with("HTTP/1.1 303 See Other\r\n"));
    assert!(response.contains("\r\nLocation: /\r\n"));
}
