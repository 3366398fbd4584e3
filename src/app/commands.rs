//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (HTTP handlers,
//! the button latch) that the [`AppService`](super::service::AppService)
//! interprets and acts upon.

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppCommand {
    /// Flip the relay.
    Toggle,

    /// Set the relay On.
    TurnOn,

    /// Set the relay Off.
    TurnOff,

    /// Overwrite the electricity price per kWh.  Callers must reject
    /// non-finite values before constructing this command.
    SetPrice(f32),
}
