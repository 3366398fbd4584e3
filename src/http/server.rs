//! Non-blocking TCP front-end for the control/status facade.
//!
//! The listener is polled from the control loop: at most one pending
//! connection is accepted per tick and handled to completion (read →
//! dispatch → write → close).  `std::net` works identically on ESP-IDF
//! (lwIP-backed) and on host targets, so this module has no cfg gates.
//!
//! Any socket error mid-request drops that request with a `warn!`; the
//! loop keeps cycling.

use std::io::{ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::time::Duration;

use log::{info, warn};

use crate::app::ports::{ActuatorPort, EventSink};
use crate::app::service::AppService;
use crate::error::CommsError;
use crate::http::router::{self, Request, Response};

/// Longest request head we will buffer; GET-only traffic fits easily.
const MAX_REQUEST_BYTES: usize = 1024;

/// Per-connection socket timeout.  Bounds how long one tick can stall on
/// a slow client.
const SOCKET_TIMEOUT_MS: u64 = 200;

pub struct HttpServer {
    listener: TcpListener,
    requests_served: u64,
}

impl HttpServer {
    /// Bind the listener.  `0.0.0.0` so the plug answers on whatever
    /// address the access point assigned.
    pub fn bind(port: u16) -> Result<Self, CommsError> {
        let listener =
            TcpListener::bind(("0.0.0.0", port)).map_err(|_| CommsError::BindFailed)?;
        listener
            .set_nonblocking(true)
            .map_err(|_| CommsError::BindFailed)?;
        info!("HTTP: listening on port {}", port);
        Ok(Self {
            listener,
            requests_served: 0,
        })
    }

    /// Local port actually bound (useful when constructed with port 0).
    pub fn port(&self) -> u16 {
        self.listener.local_addr().map(|a| a.port()).unwrap_or(0)
    }

    /// Requests handled since boot.
    pub fn requests_served(&self) -> u64 {
        self.requests_served
    }

    /// Accept and serve at most one inbound request.  Returns `true` when
    /// a request was handled this tick.
    pub fn poll(
        &mut self,
        app: &mut AppService,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> bool {
        let stream = match self.listener.accept() {
            Ok((stream, _peer)) => stream,
            Err(e) if e.kind() == ErrorKind::WouldBlock => return false,
            Err(e) => {
                warn!("HTTP: accept failed: {}", e);
                return false;
            }
        };

        match Self::handle_connection(stream, app, hw, sink) {
            Ok(()) => {
                self.requests_served += 1;
                true
            }
            Err(e) => {
                warn!("HTTP: request dropped: {}", e);
                false
            }
        }
    }

    fn handle_connection(
        mut stream: TcpStream,
        app: &mut AppService,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<(), CommsError> {
        // Some platforms hand accepted sockets the listener's
        // non-blocking flag; the per-connection path wants blocking I/O
        // bounded by timeouts.
        stream
            .set_nonblocking(false)
            .map_err(|_| CommsError::SocketFailed)?;
        stream
            .set_read_timeout(Some(Duration::from_millis(SOCKET_TIMEOUT_MS)))
            .map_err(|_| CommsError::SocketFailed)?;
        stream
            .set_write_timeout(Some(Duration::from_millis(SOCKET_TIMEOUT_MS)))
            .map_err(|_| CommsError::SocketFailed)?;

        let head = Self::read_head(&mut stream)?;
        let response = match head
            .lines()
            .next()
            .and_then(router::parse_request_line)
        {
            Some(req) => router::dispatch(&req, app, hw, sink),
            None => {
                // Unparseable request line: answer with the diagnostic
                // dump so even a bad client learns what we saw.
                let req = Request {
                    method: String::from("?"),
                    path: String::new(),
                    target: head.lines().next().unwrap_or("").to_owned(),
                    args: Vec::new(),
                };
                Response::not_found(&req)
            }
        };

        stream
            .write_all(&response.to_bytes())
            .and_then(|()| stream.flush())
            .map_err(|_| CommsError::SocketFailed)?;
        Ok(())
    }

    /// Read until the end of the request head (blank line) or the buffer
    /// cap.  GET requests carry no body, so this is the whole request.
    fn read_head(stream: &mut TcpStream) -> Result<String, CommsError> {
        let mut buf = Vec::with_capacity(256);
        let mut chunk = [0u8; 256];
        loop {
            match stream.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => {
                    buf.extend_from_slice(&chunk[..n]);
                    if buf.windows(4).any(|w| w == b"\r\n\r\n") || buf.len() >= MAX_REQUEST_BYTES {
                        break;
                    }
                }
                Err(e)
                    if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut =>
                {
                    break
                }
                Err(_) => return Err(CommsError::SocketFailed),
            }
        }
        if buf.is_empty() {
            return Err(CommsError::SocketFailed);
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
