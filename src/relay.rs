//! Relay device state.
//!
//! The plug has exactly one switching element with two observable states.
//! The authoritative copy lives in the application service; the GPIO
//! driver in [`crate::drivers::relay`] merely mirrors it onto the coil.

use serde::Serialize;

/// The relay's powered state.  A single process-lifetime instance,
/// mutated by commands and by the overcurrent interlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RelayState {
    On,
    Off,
}

impl RelayState {
    /// The opposite state.
    pub fn toggled(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off => Self::On,
        }
    }

    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    /// Wire form used by the raw status endpoint: `"1"` on, `"0"` off.
    pub fn as_digit(self) -> &'static str {
        match self {
            Self::On => "1",
            Self::Off => "0",
        }
    }

    /// Human label used on the status page.
    pub fn label(self) -> &'static str {
        match self {
            Self::On => "On",
            Self::Off => "Off",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_is_involutive() {
        assert_eq!(RelayState::On.toggled(), RelayState::Off);
        assert_eq!(RelayState::Off.toggled().toggled(), RelayState::Off);
    }

    #[test]
    fn wire_digits_are_exact() {
        assert_eq!(RelayState::On.as_digit(), "1");
        assert_eq!(RelayState::Off.as_digit(), "0");
    }
}
