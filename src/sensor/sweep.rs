//! # Sweep Source
//!
//! Bench [`AngleSource`] that needs no sensor hardware.
//!
//! Channel 1 ramps up and channel 2 ramps down by a fixed step per read,
//! both wrapping within 0-4095. Useful for exercising a receiver end to end.

use super::{AngleSource, Channel};
use crate::protocol::frame::COUNTS_PER_REVOLUTION;

/// Default step per read, in raw counts
pub const DEFAULT_SWEEP_STEP: u16 = 16;

/// Synthetic ramping angle source
#[derive(Debug, Clone)]
pub struct SweepSource {
    step: u16,
    positions: [u16; 2],
    connected: [bool; 2],
}

impl Default for SweepSource {
    fn default() -> Self {
        Self::new(DEFAULT_SWEEP_STEP)
    }
}

impl SweepSource {
    /// Both channels present, starting at 0
    pub fn new(step: u16) -> Self {
        Self {
            step: step % COUNTS_PER_REVOLUTION,
            positions: [0, 0],
            connected: [true, true],
        }
    }

    /// Simulate missing sensors
    #[must_use]
    pub fn with_connected(mut self, channel1: bool, channel2: bool) -> Self {
        self.connected = [channel1, channel2];
        self
    }

    fn index(channel: Channel) -> usize {
        match channel {
            Channel::One => 0,
            Channel::Two => 1,
        }
    }
}

impl AngleSource for SweepSource {
    fn is_connected(&mut self, channel: Channel) -> bool {
        self.connected[Self::index(channel)]
    }

    fn magnet_detected(&mut self, channel: Channel) -> bool {
        self.connected[Self::index(channel)]
    }

    fn read(&mut self, channel: Channel) -> Option<u16> {
        let i = Self::index(channel);
        if !self.connected[i] {
            return None;
        }

        let current = self.positions[i];
        self.positions[i] = match channel {
            Channel::One => (current + self.step) % COUNTS_PER_REVOLUTION,
            Channel::Two => (current + COUNTS_PER_REVOLUTION - self.step) % COUNTS_PER_REVOLUTION,
        };
        Some(current)
    }
}
