//! Overcurrent interlock.
//!
//! The interlock runs **every tick after the telemetry refresh and after
//! any commands applied that tick**, and forces the relay off whenever the
//! latest current sample exceeds the configured limit.
//!
//! ## Trip lifecycle
//!
//! 1. A sample arrives with `current_a` above the limit.
//! 2. The interlock reports overcurrent; the service forces the relay Off.
//! 3. Every subsequent tick re-evaluates against the newest sample.  While
//!    the condition holds, any On command is overwritten on the very next
//!    tick.
//! 4. The moment current drops back under the limit, commands take normal
//!    effect again.
//!
//! The check is **level-triggered**: there is no hysteresis, cooldown, or
//! latched lockout state.  The only memory kept is the previous verdict,
//! used to log trip/clear transitions exactly once.

use crate::config::SystemConfig;
use crate::sensors::TelemetrySample;
use log::{error, info};

/// Overcurrent interlock.
pub struct OvercurrentInterlock {
    limit_a: f32,
    /// Previous verdict, for transition logging only.
    tripped: bool,
}

impl OvercurrentInterlock {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            limit_a: config.overcurrent_limit_a,
            tripped: false,
        }
    }

    /// Evaluate the latest sample.  Returns `true` when the relay must be
    /// forced off this tick.
    pub fn evaluate(&mut self, sample: &TelemetrySample) -> bool {
        let over = sample.current_a > self.limit_a;

        if over && !self.tripped {
            error!(
                "INTERLOCK TRIP: current {:.2} A exceeds limit {:.1} A",
                sample.current_a, self.limit_a
            );
        } else if !over && self.tripped {
            info!(
                "INTERLOCK CLEAR: current {:.2} A back under limit {:.1} A",
                sample.current_a, self.limit_a
            );
        }

        self.tripped = over;
        over
    }

    /// Whether the most recent evaluation was over the limit.
    pub fn is_tripped(&self) -> bool {
        self.tripped
    }

    /// Configured current limit in amperes.
    pub fn limit_a(&self) -> f32 {
        self.limit_a
    }
}
