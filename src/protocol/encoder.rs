//! # Angle Frame Encoder
//!
//! Encodes an angle pair into a 7-byte frame.
//!
//! Encoding is total. Angles above 4095 are not rejected or masked: the full
//! 16-bit value is written and the checksum is computed from exactly those
//! transmitted bytes, so encoder and checksum always agree.

use super::checksum::checksum;
use super::frame::*;

/// Encode an angle pair into a complete frame
///
/// # Arguments
///
/// * `angle1` - Channel 1 raw angle (0-4095, passed through unmasked)
/// * `angle2` - Channel 2 raw angle (0-4095, passed through unmasked)
///
/// # Returns
///
/// * `Frame` - 7 bytes: start + angle1 (hi, lo) + angle2 (hi, lo) + checksum + end
///
/// # Examples
///
/// ```
/// use angle_link::protocol::encoder::encode;
///
/// let frame = encode(0, 4095);
/// assert_eq!(frame.as_bytes(), &[0xAA, 0x00, 0x00, 0x0F, 0xFF, 0xF0, 0x55]);
/// ```
pub fn encode(angle1: u16, angle2: u16) -> Frame {
    let [a1_hi, a1_lo] = split_angle(angle1);
    let [a2_hi, a2_lo] = split_angle(angle2);

    Frame::from_raw([
        FRAME_START_BYTE,
        a1_hi,
        a1_lo,
        a2_hi,
        a2_lo,
        checksum(angle1, angle2),
        FRAME_END_BYTE,
    ])
}

/// Encode a [`Reading`] into a complete frame
pub fn encode_reading(reading: &Reading) -> Frame {
    encode(reading.angle1, reading.angle2)
}
