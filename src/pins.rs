//! GPIO / peripheral pin assignments for the plug main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.
//!
//! Pin assignments match the ESP32-C3 carrier board schematic.

// ---------------------------------------------------------------------------
// Relay (load switching)
// ---------------------------------------------------------------------------

/// Digital output driving the relay coil transistor (active HIGH).
pub const RELAY_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Status LED
// ---------------------------------------------------------------------------

/// Front-panel status LED (active LOW, mirrors relay state).
pub const LED_GPIO: i32 = 3;

// ---------------------------------------------------------------------------
// User button (active-low with external pull-up)
// ---------------------------------------------------------------------------

/// Momentary push-button for manual relay toggle.  Falling-edge interrupt.
pub const BUTTON_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// Power metering chip (CSE7766-class, UART1)
// ---------------------------------------------------------------------------

/// UART RX from the metering chip (the chip only transmits).
pub const METER_UART_RX_GPIO: i32 = 20;
/// UART peripheral number used for the metering chip.
pub const METER_UART_NUM: u32 = 1;
/// Metering chip fixed baud rate.
pub const METER_UART_BAUD: u32 = 4800;
