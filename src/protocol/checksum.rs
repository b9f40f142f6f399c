//! # XOR Checksum
//!
//! Single-byte XOR over the four angle bytes, in wire order:
//! angle1 high, angle1 low, angle2 high, angle2 low.
//!
//! This detects every single-bit error in the angle fields but not
//! substitutions that cancel out under XOR. It is the compatibility contract
//! of the wire format and must not be strengthened.

use super::frame::split_angle;

/// Calculate the frame checksum for an angle pair
///
/// # Arguments
///
/// * `angle1` - Channel 1 raw angle (full 16-bit value, unmasked)
/// * `angle2` - Channel 2 raw angle (full 16-bit value, unmasked)
///
/// # Returns
///
/// * `u8` - XOR of the four angle bytes
///
/// # Examples
///
/// ```
/// use angle_link::protocol::checksum::checksum;
///
/// assert_eq!(checksum(0, 4095), 0xF0);
/// assert_eq!(checksum(2048, 2048), 0x00);
/// ```
pub fn checksum(angle1: u16, angle2: u16) -> u8 {
    let [a1_hi, a1_lo] = split_angle(angle1);
    let [a2_hi, a2_lo] = split_angle(angle2);
    checksum_bytes(&[a1_hi, a1_lo, a2_hi, a2_lo])
}

/// XOR all bytes in a slice
///
/// Used by the decoder to recompute the checksum straight from the
/// received payload bytes (frame bytes 1..=4).
pub fn checksum_bytes(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &byte| acc ^ byte)
}
