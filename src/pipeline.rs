//! # Transmit Pipeline
//!
//! Ties the scheduler, sampler and encoder together: each poll that the
//! scheduler accepts produces exactly one frame. Writing the frame is left to
//! the caller so the transport stays async and best-effort.

use tracing::trace;

use crate::protocol::encoder::encode_reading;
use crate::protocol::frame::{Frame, Reading};
use crate::scheduler::SampleScheduler;
use crate::sensor::{AngleSource, Connectivity, Sample, Sampler};
use crate::status::StatusSink;

/// Sample-encode cycle driven by a [`SampleScheduler`]
#[derive(Debug)]
pub struct Transmitter<S> {
    sampler: Sampler<S>,
    scheduler: SampleScheduler,
    latest: Option<Sample>,
    frames_encoded: u64,
}

impl<S: AngleSource> Transmitter<S> {
    pub fn new(sampler: Sampler<S>, scheduler: SampleScheduler) -> Self {
        Self {
            sampler,
            scheduler,
            latest: None,
            frames_encoded: 0,
        }
    }

    /// Set the scheduler reference time
    pub fn start(&mut self, now_ms: u64) {
        self.scheduler.start(now_ms);
    }

    /// Run one cycle if a sample is due at `now_ms`
    ///
    /// # Returns
    ///
    /// * `Option<Frame>` - The frame to transmit, or `None` if no sample was due
    pub fn poll(&mut self, now_ms: u64) -> Option<Frame> {
        if !self.scheduler.poll(now_ms) {
            return None;
        }

        let sample = self.sampler.sample();
        let reading = sample.to_reading();
        let frame = encode_reading(&reading);

        self.latest = Some(sample);
        self.frames_encoded += 1;
        trace!(
            "Sampled angle1={} ({:.2}°) angle2={} ({:.2}°), checksum=0x{:02X}",
            reading.angle1,
            reading.angle1_degrees(),
            reading.angle2,
            reading.angle2_degrees(),
            frame.checksum()
        );

        Some(frame)
    }

    /// Latest sample with unavailable channels kept explicit
    pub fn latest_sample(&self) -> Option<Sample> {
        self.latest
    }

    /// Latest reading as it was put on the wire, for telemetry mirrors
    pub fn latest_reading(&self) -> Option<Reading> {
        self.latest.map(|sample| sample.to_reading())
    }

    pub fn frames_encoded(&self) -> u64 {
        self.frames_encoded
    }

    pub fn connectivity(&self) -> Connectivity {
        self.sampler.connectivity()
    }

    pub fn interval_ms(&self) -> u64 {
        self.scheduler.interval_ms()
    }

    /// Push the connectivity-derived status to an indicator
    pub fn report_status(&self, sink: &dyn StatusSink) {
        sink.report(self.connectivity().into());
    }
}
