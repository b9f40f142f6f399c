//! # Frame Layout and Types
//!
//! Core protocol definitions for the angle frame.

/// Frame start marker (always 0xAA)
pub const FRAME_START_BYTE: u8 = 0xAA;

/// Frame end marker (always 0x55)
pub const FRAME_END_BYTE: u8 = 0x55;

/// Total frame size: start(1) + angle1(2) + angle2(2) + checksum(1) + end(1)
pub const FRAME_SIZE: usize = 7;

/// Offset of the checksum byte within a frame
pub const CHECKSUM_OFFSET: usize = 5;

/// Offset of the end marker within a frame
pub const END_OFFSET: usize = 6;

/// Largest meaningful angle value (12-bit: 0-4095)
pub const ANGLE_MAX: u16 = 4095;

/// Number of raw counts in one full revolution
pub const COUNTS_PER_REVOLUTION: u16 = 4096;

/// Convert a raw 12-bit angle to degrees (0.0 to just under 360.0)
pub fn raw_to_degrees(raw: u16) -> f32 {
    raw as f32 * 360.0 / COUNTS_PER_REVOLUTION as f32
}

/// Split a 16-bit value into `[high, low]` bytes
#[inline]
pub fn split_angle(value: u16) -> [u8; 2] {
    [(value >> 8) as u8, (value & 0xFF) as u8]
}

/// Join `[high, low]` bytes back into a 16-bit value
#[inline]
pub fn join_angle(high: u8, low: u8) -> u16 {
    ((high as u16) << 8) | low as u16
}

/// A pair of angle readings, one per channel.
///
/// Values are carried as raw 16-bit fields. Only the low 12 bits carry
/// meaning, but nothing masks them: whatever is sampled is what is sent.
/// An unavailable channel has already been collapsed to 0 at this level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reading {
    /// Channel 1 angle (0-4095)
    pub angle1: u16,

    /// Channel 2 angle (0-4095)
    pub angle2: u16,
}

impl Reading {
    /// Create a new reading from two raw angles
    pub fn new(angle1: u16, angle2: u16) -> Self {
        Self { angle1, angle2 }
    }

    /// Channel 1 angle in degrees
    pub fn angle1_degrees(&self) -> f32 {
        raw_to_degrees(self.angle1)
    }

    /// Channel 2 angle in degrees
    pub fn angle2_degrees(&self) -> f32 {
        raw_to_degrees(self.angle2)
    }

    /// Whether both angles fit in the 12-bit domain
    pub fn is_in_range(&self) -> bool {
        self.angle1 <= ANGLE_MAX && self.angle2 <= ANGLE_MAX
    }
}

/// Serialized angle frame (immutable, always 7 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame([u8; FRAME_SIZE]);

impl Frame {
    /// Frame size in bytes
    pub const SIZE: usize = FRAME_SIZE;

    /// Wrap already-encoded bytes. Only the encoder and decoder construct frames.
    pub(crate) fn from_raw(bytes: [u8; FRAME_SIZE]) -> Self {
        Self(bytes)
    }

    /// Borrow the wire bytes
    pub fn as_bytes(&self) -> &[u8; FRAME_SIZE] {
        &self.0
    }

    /// Checksum byte carried by this frame
    pub fn checksum(&self) -> u8 {
        self.0[CHECKSUM_OFFSET]
    }

    /// Reading carried by this frame
    pub fn reading(&self) -> Reading {
        Reading {
            angle1: join_angle(self.0[1], self.0[2]),
            angle2: join_angle(self.0[3], self.0[4]),
        }
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_constants() {
        assert_eq!(FRAME_START_BYTE, 0xAA);
        assert_eq!(FRAME_END_BYTE, 0x55);
        assert_eq!(FRAME_SIZE, 7);
        assert_eq!(Frame::SIZE, FRAME_SIZE);
        assert_eq!(ANGLE_MAX, 4095);
    }

    #[test]
    fn test_split_and_join_angle() {
        assert_eq!(split_angle(0x0FFF), [0x0F, 0xFF]);
        assert_eq!(split_angle(2048), [0x08, 0x00]);
        assert_eq!(split_angle(0xABCD), [0xAB, 0xCD]);
        assert_eq!(join_angle(0x0F, 0xFF), 0x0FFF);
        assert_eq!(join_angle(0xAB, 0xCD), 0xABCD);
    }

    #[test]
    fn test_raw_to_degrees() {
        assert_eq!(raw_to_degrees(0), 0.0);
        assert!((raw_to_degrees(1024) - 90.0).abs() < 0.001);
        assert!((raw_to_degrees(2048) - 180.0).abs() < 0.001);
        assert!((raw_to_degrees(4095) - 359.912).abs() < 0.001);
    }

    #[test]
    fn test_reading_degrees() {
        let reading = Reading::new(1024, 3072);
        assert!((reading.angle1_degrees() - 90.0).abs() < 0.001);
        assert!((reading.angle2_degrees() - 270.0).abs() < 0.001);
    }

    #[test]
    fn test_reading_range() {
        assert!(Reading::new(0, 4095).is_in_range());
        assert!(!Reading::new(4096, 0).is_in_range());
        assert!(!Reading::new(0, u16::MAX).is_in_range());
    }

    #[test]
    fn test_frame_accessors() {
        let frame = Frame::from_raw([0xAA, 0x08, 0x00, 0x0F, 0xFF, 0xF8, 0x55]);
        assert_eq!(frame.reading(), Reading::new(2048, 4095));
        assert_eq!(frame.checksum(), 0xF8);
        assert_eq!(frame.as_ref().len(), 7);
    }
}
