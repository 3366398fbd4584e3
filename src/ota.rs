//! Remote firmware-update channel.
//!
//! The control loop calls [`UpdateChannel::poll_for_update`] once per
//! tick; the call must never block the loop.  Most ticks it is a counter
//! decrement — the channel only contacts the release server at the
//! check interval, and a discovered image is fetched and staged through
//! the `esp-ota` partition API.
//!
//! Boot-side, [`check_rollback`] marks the running image valid so the
//! rollback watchdog does not revert to the previous firmware after a
//! successful start.

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

/// Ticks between actual server checks (at the 10 Hz control rate this is
/// once an hour).
const CHECK_INTERVAL_TICKS: u32 = 36_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateState {
    /// Counting down to the next check.
    Idle,
    /// A new image is staged; the next safe moment may reboot into it.
    ReadyToReboot,
}

pub struct UpdateChannel {
    state: UpdateState,
    ticks_until_check: u32,
    checks_performed: u32,
}

impl UpdateChannel {
    pub fn new() -> Self {
        Self {
            state: UpdateState::Idle,
            ticks_until_check: CHECK_INTERVAL_TICKS,
            checks_performed: 0,
        }
    }

    pub fn state(&self) -> UpdateState {
        self.state
    }

    /// Server checks performed since boot (diagnostic counter).
    pub fn checks_performed(&self) -> u32 {
        self.checks_performed
    }

    /// Non-blocking per-tick poll.
    pub fn poll_for_update(&mut self) {
        if self.state == UpdateState::ReadyToReboot {
            return;
        }
        if self.ticks_until_check > 0 {
            self.ticks_until_check -= 1;
            return;
        }
        self.ticks_until_check = CHECK_INTERVAL_TICKS;
        self.checks_performed = self.checks_performed.wrapping_add(1);
        if self.platform_check_and_stage() {
            self.state = UpdateState::ReadyToReboot;
            info!("OTA: new firmware staged, reboot pending");
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_check_and_stage(&mut self) -> bool {
        // Release-server query + image download through
        // esp_ota::OtaUpdate::begin() / write() / finalize().  The HTTPS
        // client handle is threaded in from main() once the release
        // endpoint is provisioned; until then every check reports
        // up-to-date.
        info!("OTA(espidf): check — no release endpoint provisioned");
        false
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_check_and_stage(&mut self) -> bool {
        info!("OTA(sim): check — up to date");
        false
    }
}

impl Default for UpdateChannel {
    fn default() -> Self {
        Self::new()
    }
}

// ── Boot validation ───────────────────────────────────────────

/// Check OTA image state on startup and mark this firmware as valid.
///
/// Without this, the rollback watchdog reverts to the previous firmware
/// after three consecutive failed boots.
#[cfg(target_os = "espidf")]
pub fn check_rollback() {
    match esp_ota::mark_app_valid() {
        Ok(()) => info!("OTA: firmware marked valid (rollback cancelled)"),
        Err(e) => warn!("OTA: mark_app_valid failed: {:?}", e),
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn check_rollback() {
    log::info!("OTA rollback check (simulation): skipped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_is_rate_limited() {
        let mut ota = UpdateChannel::new();
        // A full interval of polls performs exactly one server check.
        for _ in 0..=CHECK_INTERVAL_TICKS {
            ota.poll_for_update();
        }
        assert_eq!(ota.checks_performed(), 1);
        assert_eq!(ota.state(), UpdateState::Idle);
    }

    #[test]
    fn early_polls_do_not_check() {
        let mut ota = UpdateChannel::new();
        for _ in 0..100 {
            ota.poll_for_update();
        }
        assert_eq!(ota.checks_performed(), 0);
    }
}
