//! System configuration parameters
//!
//! All tunable parameters for the plug runtime.  There is no runtime
//! configuration channel and no persistence: every field resets to the
//! compiled default at boot.

use serde::{Deserialize, Serialize};

/// WiFi station credentials, compiled in.  Replace before flashing.
pub const WIFI_SSID: &str = "Your-WiFi-SSID";
/// WPA2 passphrase; empty string selects an open network.
pub const WIFI_PASSWORD: &str = "Your-WiFi-Pass";
/// DHCP hostname the plug registers under.
pub const WIFI_HOSTNAME: &str = "smartplug";

/// Watt-seconds per kilowatt-hour, for energy unit conversion.
pub const WS_PER_KWH: f64 = 3_600_000.0;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Safety ---
    /// Current (A) above which the interlock forces the relay off.
    pub overcurrent_limit_a: f32,

    // --- Cost ---
    /// Default electricity price per kWh at boot.
    pub default_price_per_kwh: f32,

    // --- HTTP ---
    /// TCP port for the control/status server.
    pub http_port: u16,

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
    /// Telemetry log interval (seconds)
    pub telemetry_interval_secs: u32,
    /// Bounded wait for WiFi association at boot (seconds)
    pub wifi_connect_timeout_secs: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Safety
            overcurrent_limit_a: 15.0,

            // Cost
            default_price_per_kwh: 0.25,

            // HTTP
            http_port: 80,

            // Timing
            control_loop_interval_ms: 100, // 10 Hz
            telemetry_interval_secs: 60,   // 1/min
            wifi_connect_timeout_secs: 10,
        }
    }
}

impl SystemConfig {
    /// Control ticks per telemetry log interval.
    pub fn ticks_per_telemetry(&self) -> u64 {
        u64::from(self.telemetry_interval_secs) * 1000 / u64::from(self.control_loop_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = SystemConfig::default();
        assert!(c.overcurrent_limit_a > 0.0);
        assert!(c.default_price_per_kwh.is_finite());
        assert!(c.http_port > 0);
        assert!(c.control_loop_interval_ms > 0);
        assert!(c.wifi_connect_timeout_secs > 0);
    }

    #[test]
    fn serde_roundtrip() {
        let c = SystemConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: SystemConfig = serde_json::from_str(&json).unwrap();
        assert!((c.overcurrent_limit_a - c2.overcurrent_limit_a).abs() < 0.001);
        assert_eq!(c.http_port, c2.http_port);
        assert_eq!(c.control_loop_interval_ms, c2.control_loop_interval_ms);
    }

    #[test]
    fn timing_ratios_make_sense() {
        let c = SystemConfig::default();
        assert!(
            c.control_loop_interval_ms < c.telemetry_interval_secs * 1000,
            "control loop must be faster than telemetry logging"
        );
        assert!(c.ticks_per_telemetry() > 0);
    }
}
