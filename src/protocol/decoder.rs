//! # Angle Frame Decoder
//!
//! Receiver-side framing for a continuous byte stream.
//!
//! [`FrameDecoder`] is a small state machine that can be fed any chunking of
//! the stream (single bytes or bursts) and keeps its partial window between
//! calls:
//!
//! - **SeekStart**: drop bytes until a start marker (0xAA) is seen
//! - **Collecting**: accumulate until the window holds 7 bytes
//! - **Validate**: check the end marker and recompute the checksum
//!
//! A window that fails validation is not discarded wholesale. Only its start
//! byte is dropped and the remaining six bytes are scanned again, so a real
//! frame whose start marker landed inside a corrupted window is still found.
//! Rejections are counted in [`DecoderStats`], never reported as errors.

use tracing::{debug, trace};

use super::checksum::checksum_bytes;
use super::frame::*;
use crate::error::{AngleLinkError, Result};

/// Decoder state between calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// Scanning for a start marker
    SeekStart,
    /// Start marker seen, accumulating the rest of the window
    Collecting,
}

/// Counters for observing link quality
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Frames that passed validation
    pub frames_decoded: u64,

    /// Complete windows that failed validation
    pub frames_rejected: u64,

    /// Bytes dropped while seeking a start marker
    pub bytes_discarded: u64,
}

/// Why a complete window was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    EndMarker(u8),
    Checksum { expected: u8, actual: u8 },
}

/// Validate a complete 7-byte window whose first byte is already known to be
/// the start marker.
fn validate_window(window: &[u8; FRAME_SIZE]) -> std::result::Result<Reading, Rejection> {
    if window[END_OFFSET] != FRAME_END_BYTE {
        return Err(Rejection::EndMarker(window[END_OFFSET]));
    }

    let expected = checksum_bytes(&window[1..CHECKSUM_OFFSET]);
    let actual = window[CHECKSUM_OFFSET];
    if expected != actual {
        return Err(Rejection::Checksum { expected, actual });
    }

    Ok(Frame::from_raw(*window).reading())
}

/// Incremental stream decoder for angle frames
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    window: [u8; FRAME_SIZE],
    len: usize,
    stats: DecoderStats,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    /// Create a decoder in the SeekStart state
    pub fn new() -> Self {
        Self {
            window: [0u8; FRAME_SIZE],
            len: 0,
            stats: DecoderStats::default(),
        }
    }

    /// Current state
    pub fn state(&self) -> DecoderState {
        if self.len == 0 {
            DecoderState::SeekStart
        } else {
            DecoderState::Collecting
        }
    }

    /// Number of bytes held in the partial window
    pub fn buffered(&self) -> usize {
        self.len
    }

    /// Counters accumulated since creation
    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Drop any partial window and return to SeekStart. Stats are kept.
    pub fn reset(&mut self) {
        self.len = 0;
    }

    /// Feed one byte
    ///
    /// # Returns
    ///
    /// * `Option<Reading>` - The reading if this byte completed a valid frame
    pub fn push(&mut self, byte: u8) -> Option<Reading> {
        if self.len == 0 {
            if byte == FRAME_START_BYTE {
                self.window[0] = byte;
                self.len = 1;
            } else {
                self.stats.bytes_discarded += 1;
            }
            return None;
        }

        self.window[self.len] = byte;
        self.len += 1;

        if self.len < FRAME_SIZE {
            return None;
        }

        self.validate()
    }

    /// Feed a chunk of bytes and collect every reading it completes
    ///
    /// # Examples
    ///
    /// ```
    /// use angle_link::protocol::decoder::FrameDecoder;
    /// use angle_link::protocol::frame::Reading;
    ///
    /// let mut decoder = FrameDecoder::new();
    /// assert!(decoder.decode(&[0xAA, 0x00, 0x00]).is_empty());
    /// let readings = decoder.decode(&[0x0F, 0xFF, 0xF0, 0x55]);
    /// assert_eq!(readings, vec![Reading::new(0, 4095)]);
    /// ```
    pub fn decode(&mut self, data: &[u8]) -> Vec<Reading> {
        data.iter().filter_map(|&byte| self.push(byte)).collect()
    }

    fn validate(&mut self) -> Option<Reading> {
        let window = self.window;
        self.len = 0;

        match validate_window(&window) {
            Ok(reading) => {
                self.stats.frames_decoded += 1;
                trace!(
                    "Decoded frame: angle1={} angle2={}",
                    reading.angle1, reading.angle2
                );
                Some(reading)
            }
            Err(rejection) => {
                self.stats.frames_rejected += 1;
                // The failed start marker itself is dropped
                self.stats.bytes_discarded += 1;
                debug!("Rejected frame {:02X?}: {:?}", window, rejection);

                // Six bytes can never complete a window, so nothing is emitted here
                for &byte in &window[1..] {
                    let emitted = self.push(byte);
                    debug_assert!(emitted.is_none());
                }
                None
            }
        }
    }
}

/// Decode a single complete frame
///
/// # Arguments
///
/// * `frame` - Exactly one frame (7 bytes: start, angles, checksum, end)
///
/// # Returns
///
/// * `Result<Reading>` - Decoded reading, or error if invalid
///
/// # Errors
///
/// Returns error if:
/// - Frame is not 7 bytes long
/// - Start or end marker is incorrect
/// - Checksum check fails
pub fn decode_frame(frame: &[u8]) -> Result<Reading> {
    let window: [u8; FRAME_SIZE] = frame.try_into().map_err(|_| {
        AngleLinkError::Protocol(format!(
            "Invalid frame length: expected {} bytes, got {}",
            FRAME_SIZE,
            frame.len()
        ))
    })?;

    if window[0] != FRAME_START_BYTE {
        return Err(AngleLinkError::Protocol(format!(
            "Invalid start byte: 0x{:02X}",
            window[0]
        )));
    }

    validate_window(&window).map_err(|rejection| match rejection {
        Rejection::EndMarker(byte) => {
            AngleLinkError::Protocol(format!("Invalid end byte: 0x{:02X}", byte))
        }
        Rejection::Checksum { expected, actual } => AngleLinkError::Protocol(format!(
            "Checksum mismatch: expected 0x{:02X}, got 0x{:02X}",
            expected, actual
        )),
    })
}
