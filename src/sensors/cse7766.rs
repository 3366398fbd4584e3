//! CSE7766 frame decoder.
//!
//! The chip pushes fixed 24-byte frames carrying its calibration
//! coefficients alongside the measurement cycle counts, so a frame is
//! self-contained: no register reads, no handshake.
//!
//! Frame layout (big-endian 24-bit register pairs):
//!
//! | Bytes | Field |
//! |-------|------------------------------|
//! | 0     | header (state bits)          |
//! | 1     | check byte, always `0x5A`    |
//! | 2-4   | voltage coefficient          |
//! | 5-7   | voltage cycle                |
//! | 8-10  | current coefficient          |
//! | 11-13 | current cycle                |
//! | 14-16 | power coefficient            |
//! | 17-19 | power cycle                  |
//! | 20    | adjustment (validity bits)   |
//! | 21-22 | CF pulse counter             |
//! | 23    | checksum (sum of bytes 2-22) |

/// Fixed frame length on the wire.
pub const FRAME_LEN: usize = 24;

/// A header with the high nibble `0xF` reports a chip abnormality
/// (storage error, coefficient error); `0xAA` means uncalibrated.
const HEADER_ERROR_NIBBLE: u8 = 0xF0;
const HEADER_UNCALIBRATED: u8 = 0xAA;
const CHECK_BYTE: u8 = 0x5A;

const ADJ_VOLTAGE_OK: u8 = 0x40;
const ADJ_CURRENT_OK: u8 = 0x20;
const ADJ_POWER_OK: u8 = 0x10;

/// Instantaneous readings extracted from one valid frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub voltage_v: f32,
    pub current_a: f32,
    pub active_power_w: f32,
    /// Raw CF pulse counter (16-bit, wrapping); each pulse is a fixed
    /// energy quantum accumulated by the caller.
    pub cf_pulses: u16,
}

fn u24(b: &[u8]) -> u32 {
    (u32::from(b[0]) << 16) | (u32::from(b[1]) << 8) | u32::from(b[2])
}

/// Decode one frame.  Returns `None` for short buffers, bad check bytes,
/// checksum mismatches, or chip-reported error states.
pub fn decode(frame: &[u8]) -> Option<Reading> {
    if frame.len() < FRAME_LEN {
        return None;
    }

    let header = frame[0];
    if frame[1] != CHECK_BYTE
        || header == HEADER_UNCALIBRATED
        || (header & HEADER_ERROR_NIBBLE) == HEADER_ERROR_NIBBLE
    {
        return None;
    }

    let sum: u8 = frame[2..23]
        .iter()
        .fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[23] {
        return None;
    }

    let voltage_coef = u24(&frame[2..5]);
    let voltage_cycle = u24(&frame[5..8]);
    let current_coef = u24(&frame[8..11]);
    let current_cycle = u24(&frame[11..14]);
    let power_coef = u24(&frame[14..17]);
    let power_cycle = u24(&frame[17..20]);
    let adj = frame[20];
    let cf_pulses = u16::from(frame[21]) << 8 | u16::from(frame[22]);

    // A zero cycle count means the measurement has not settled; treat the
    // corresponding channel as zero rather than dividing by it.
    let voltage_v = if adj & ADJ_VOLTAGE_OK != 0 && voltage_cycle != 0 {
        voltage_coef as f32 / voltage_cycle as f32
    } else {
        0.0
    };
    let current_a = if adj & ADJ_CURRENT_OK != 0 && current_cycle != 0 {
        current_coef as f32 / current_cycle as f32
    } else {
        0.0
    };
    let active_power_w = if adj & ADJ_POWER_OK != 0 && power_cycle != 0 {
        power_coef as f32 / power_cycle as f32
    } else {
        0.0
    };

    Some(Reading {
        voltage_v,
        current_a,
        active_power_w,
        cf_pulses,
    })
}
