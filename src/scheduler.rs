//! # Sample Scheduler
//!
//! Cooperative fixed-interval scheduling driven by a monotonic clock.
//!
//! The interval is `1000 / rate_hz` milliseconds using integer division.
//! Rates that do not divide 1000 evenly are truncated (e.g. 60 Hz runs at a
//! 16 ms interval, about 62.5 Hz); the remainder is not accumulated.
//!
//! Each [`SampleScheduler::poll`] fires at most once. When it fires, the last
//! sample time becomes the time of that poll, not the ideal tick boundary, so
//! late polls are never made up by bursting.

use std::time::Instant;

use crate::error::{AngleLinkError, Result};

/// Highest supported sample rate (1 ms interval)
pub const MAX_SAMPLE_RATE_HZ: u32 = 1000;

/// Source of monotonic milliseconds
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// [`Clock`] backed by [`std::time::Instant`], counting from creation
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Sampling interval for a rate, truncated to whole milliseconds
///
/// # Errors
///
/// Returns error if `rate_hz` is 0 or above [`MAX_SAMPLE_RATE_HZ`]
///
/// # Examples
///
/// ```
/// use angle_link::scheduler::interval_ms_for_rate;
///
/// assert_eq!(interval_ms_for_rate(50).unwrap(), 20);
/// assert_eq!(interval_ms_for_rate(60).unwrap(), 16);
/// ```
pub fn interval_ms_for_rate(rate_hz: u32) -> Result<u64> {
    if rate_hz == 0 || rate_hz > MAX_SAMPLE_RATE_HZ {
        return Err(AngleLinkError::Scheduler(format!(
            "sample rate {} Hz out of range (1-{})",
            rate_hz, MAX_SAMPLE_RATE_HZ
        )));
    }
    Ok((1000 / rate_hz) as u64)
}

/// Fire-at-most-once-per-poll interval scheduler
#[derive(Debug, Clone)]
pub struct SampleScheduler {
    interval_ms: u64,
    last_sample_ms: u64,
}

impl SampleScheduler {
    /// Create a scheduler for `rate_hz` samples per second
    pub fn new(rate_hz: u32) -> Result<Self> {
        Ok(Self::with_interval(interval_ms_for_rate(rate_hz)?))
    }

    /// Create a scheduler with an explicit interval
    pub fn with_interval(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_sample_ms: 0,
        }
    }

    /// Mark `now_ms` as the reference point; the first sample fires one
    /// interval later
    pub fn start(&mut self, now_ms: u64) {
        self.last_sample_ms = now_ms;
    }

    /// Returns true if a sample is due, advancing the last sample time to `now_ms`
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_sample_ms) < self.interval_ms {
            return false;
        }
        self.last_sample_ms = now_ms;
        true
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn last_sample_ms(&self) -> u64 {
        self.last_sample_ms
    }
}
