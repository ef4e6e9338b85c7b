//! Wire encoding for the gauge firmware.
//!
//! Every command is a fixed 9-byte frame: `[register id][value][0 x 7]`.
//! The firmware reads exactly nine bytes per command and ignores everything
//! after the second byte, so there is no length field and no checksum.

use crate::types::Register;

/// Bytes per command frame on the wire.
pub const FRAME_WIDTH: usize = 9;

pub type Frame = [u8; FRAME_WIDTH];

/// Converts a metric to its one-byte wire value.
///
/// Truncates toward zero. Out-of-range input saturates: negatives and NaN
/// become 0, anything at or above 255 becomes 255.
#[inline]
pub fn encode_byte(value: f64) -> u8 {
    // float -> int `as` casts truncate and saturate, NaN maps to 0
    value as u8
}

/// Builds a zero-padded frame of `width` bytes.
///
/// # Panics
/// If `width < 2`; a frame always carries the register id and the value.
pub fn frame(register_id: u8, value: f64, width: usize) -> Vec<u8> {
    assert!(width >= 2, "frame width must be at least 2, got {width}");
    let mut out = vec![0u8; width];
    out[0] = register_id;
    out[1] = encode_byte(value);
    out
}

/// Fixed-width frame for one register.
#[inline]
pub fn command_frame(register: Register, value: f64) -> Frame {
    let mut out = [0u8; FRAME_WIDTH];
    out[0] = register.id();
    out[1] = encode_byte(value);
    out
}
