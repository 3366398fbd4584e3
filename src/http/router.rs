//! Pure request parsing and route dispatch.
//!
//! Everything in this module is plain data-in/data-out: the TCP side
//! lives in [`super::server`], so the whole routing table is testable
//! without a socket.
//!
//! Routing table (GET only):
//!
//! | Route           | Side effect        | Response                    |
//! |-----------------|--------------------|-----------------------------|
//! | `/`             | none               | 200 rendered status page    |
//! | `/toggle`       | `Toggle`           | 303 → `/`                   |
//! | `/on`           | `TurnOn`           | 303 → `/`                   |
//! | `/off`          | `TurnOff`          | 303 → `/`                   |
//! | `/setCost?cost=`| `SetPrice`         | 303 → `/`                   |
//! | `/status?of=`   | none               | 200 plain text, one value   |
//! | anything else   | none               | 404 diagnostic dump         |

use log::error;

use crate::app::commands::AppCommand;
use crate::app::ports::{ActuatorPort, EventSink};
use crate::app::service::{AppService, StatusSnapshot};
use crate::http::page;

// ───────────────────────────────────────────────────────────────
// Request
// ───────────────────────────────────────────────────────────────

/// A parsed request line plus its query arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    /// Path without the query string.
    pub path: String,
    /// Full target as received, for the diagnostic dump.
    pub target: String,
    pub args: Vec<(String, String)>,
}

impl Request {
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Minimal percent-decoding for query values (`+` becomes space).
fn url_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                let hex = &s[i + 1..i + 3];
                if let Ok(v) = u8::from_str_radix(hex, 16) {
                    out.push(v);
                    i += 3;
                } else {
                    out.push(b'%');
                    i += 1;
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Parse an HTTP/1.x request line (`GET /status?of=state HTTP/1.1`).
/// Returns `None` for lines that are not even that.
pub fn parse_request_line(line: &str) -> Option<Request> {
    let mut parts = line.trim_end().splitn(3, ' ');
    let method = parts.next()?.to_owned();
    let target = parts.next()?.to_owned();
    // The HTTP-version token may be absent in sloppy clients; accept that.

    if method.is_empty() || !target.starts_with('/') {
        return None;
    }

    let (path, query) = match target.split_once('?') {
        Some((p, q)) => (p.to_owned(), q),
        None => (target.clone(), ""),
    };

    let args = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (url_decode(k), url_decode(v)),
            None => (url_decode(pair), String::new()),
        })
        .collect();

    Some(Request {
        method,
        path,
        target,
        args,
    })
}

// ───────────────────────────────────────────────────────────────
// Response
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub reason: &'static str,
    pub content_type: &'static str,
    pub location: Option<&'static str>,
    pub body: String,
}

impl Response {
    pub fn ok_html(body: String) -> Self {
        Self {
            status: 200,
            reason: "OK",
            content_type: "text/html",
            location: None,
            body,
        }
    }

    pub fn ok_text(body: String) -> Self {
        Self {
            status: 200,
            reason: "OK",
            content_type: "text/plain",
            location: None,
            body,
        }
    }

    /// Command-then-redirect: the browser lands back on `/` and a refresh
    /// re-queries instead of re-commanding.
    pub fn redirect_home() -> Self {
        Self {
            status: 303,
            reason: "See Other",
            content_type: "text/plain",
            location: Some("/"),
            body: String::new(),
        }
    }

    /// Diagnostic 404 listing method, URI, and every query argument.
    pub fn not_found(req: &Request) -> Self {
        let mut body = String::from("File Not Found\n\n");
        body.push_str("URI: ");
        body.push_str(&req.target);
        body.push_str("\nMethod: ");
        body.push_str(&req.method);
        body.push_str("\nArguments: ");
        body.push_str(&req.args.len().to_string());
        body.push('\n');
        for (name, value) in &req.args {
            body.push_str(" ");
            body.push_str(name);
            body.push_str(": ");
            body.push_str(value);
            body.push('\n');
        }
        Self {
            status: 404,
            reason: "Not Found",
            content_type: "text/plain",
            location: None,
            body,
        }
    }

    /// Serialize onto the wire.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n",
            self.status,
            self.reason,
            self.content_type,
            self.body.len()
        );
        if let Some(location) = self.location {
            head.push_str("Location: ");
            head.push_str(location);
            head.push_str("\r\n");
        }
        head.push_str("\r\n");
        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(self.body.as_bytes());
        bytes
    }
}

// ───────────────────────────────────────────────────────────────
// Status keys
// ───────────────────────────────────────────────────────────────

/// The closed set of values `/status?of=` can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKey {
    State,
    Voltage,
    Current,
    ActivePower,
    ApparentPower,
    ReactivePower,
    PowerFactor,
    /// Raw accumulator, watt-seconds.
    Energy,
    EnergyKwh,
    Cost,
}

impl StatusKey {
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "state" => Some(Self::State),
            "voltage" => Some(Self::Voltage),
            "current" => Some(Self::Current),
            "activePower" => Some(Self::ActivePower),
            "apparentPower" => Some(Self::ApparentPower),
            "reactivePower" => Some(Self::ReactivePower),
            "powerFactor" => Some(Self::PowerFactor),
            "energy" => Some(Self::Energy),
            "energyKwh" => Some(Self::EnergyKwh),
            "cost" => Some(Self::Cost),
            _ => None,
        }
    }

    /// Render the selected value.  Formatting matches the status page so
    /// the two surfaces never disagree.
    pub fn format(self, snap: &StatusSnapshot) -> String {
        match self {
            Self::State => snap.relay.as_digit().to_owned(),
            Self::Voltage => format!("{:.1}", snap.sample.voltage_v),
            Self::Current => format!("{:.3}", snap.sample.current_a),
            Self::ActivePower => format!("{:.1}", snap.sample.active_power_w),
            Self::ApparentPower => format!("{:.1}", snap.sample.apparent_power_va),
            Self::ReactivePower => format!("{:.1}", snap.sample.reactive_power_var),
            Self::PowerFactor => format!("{:.2}", snap.sample.power_factor),
            Self::Energy => format!("{:.0}", snap.sample.energy_ws),
            Self::EnergyKwh => format!("{:.4}", snap.energy_kwh),
            Self::Cost => format!("{:.4}", snap.cost_to_date),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Dispatch
// ───────────────────────────────────────────────────────────────

/// Route one parsed request against the application core.
pub fn dispatch(
    req: &Request,
    app: &mut AppService,
    hw: &mut impl ActuatorPort,
    sink: &mut impl EventSink,
) -> Response {
    if req.method != "GET" {
        return Response::not_found(req);
    }

    match req.path.as_str() {
        "/" => match page::render_status_page(&app.snapshot()) {
            Ok(html) => Response::ok_html(html),
            Err(e) => {
                // Must never leak raw placeholders; degrade loudly.
                error!("status page render failed: {}", e);
                Response::not_found(req)
            }
        },

        "/toggle" => {
            app.handle_command(AppCommand::Toggle, hw, sink);
            Response::redirect_home()
        }

        "/on" => {
            app.handle_command(AppCommand::TurnOn, hw, sink);
            Response::redirect_home()
        }

        "/off" => {
            app.handle_command(AppCommand::TurnOff, hw, sink);
            Response::redirect_home()
        }

        "/setCost" => match req.arg("cost").and_then(|v| v.parse::<f32>().ok()) {
            // Zero and negative are accepted; non-finite never reaches
            // the model.
            Some(price) if price.is_finite() => {
                app.handle_command(AppCommand::SetPrice(price), hw, sink);
                Response::redirect_home()
            }
            _ => Response::not_found(req),
        },

        "/status" => match req.arg("of").and_then(StatusKey::parse) {
            Some(key) => Response::ok_text(key.format(&app.snapshot())),
            None => Response::not_found(req),
        },

        _ => Response::not_found(req),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_request_line_with_query() {
        let req = parse_request_line("GET /status?of=state HTTP/1.1\r").unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/status");
        assert_eq!(req.target, "/status?of=state");
        assert_eq!(req.arg("of"), Some("state"));
    }

    #[test]
    fn parses_bare_path() {
        let req = parse_request_line("GET / HTTP/1.1").unwrap();
        assert_eq!(req.path, "/");
        assert!(req.args.is_empty());
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_request_line(""), None);
        assert_eq!(parse_request_line("GET"), None);
        assert_eq!(parse_request_line("GET notapath HTTP/1.1"), None);
    }

    #[test]
    fn decodes_percent_escapes() {
        let req = parse_request_line("GET /setCost?cost=0%2E25 HTTP/1.1").unwrap();
        assert_eq!(req.arg("cost"), Some("0.25"));
        let req = parse_request_line("GET /x?a=one+two HTTP/1.1").unwrap();
        assert_eq!(req.arg("a"), Some("one two"));
    }

    #[test]
    fn not_found_dump_lists_method_uri_and_args() {
        let req = parse_request_line("GET /nope?a=1&b=2 HTTP/1.1").unwrap();
        let resp = Response::not_found(&req);
        assert_eq!(resp.status, 404);
        assert!(resp.body.contains("URI: /nope?a=1&b=2"));
        assert!(resp.body.contains("Method: GET"));
        assert!(resp.body.contains("Arguments: 2"));
        assert!(resp.body.contains(" a: 1"));
        assert!(resp.body.contains(" b: 2"));
    }

    #[test]
    fn redirect_carries_location_header() {
        let bytes = Response::redirect_home().to_bytes();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("HTTP/1.1 303 See Other\r\n"));
        assert!(text.contains("\r\nLocation: /\r\n"));
    }
}
