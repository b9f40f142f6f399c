//! # Receive Pipeline
//!
//! Reads raw chunks from the serial link, decodes them into readings and
//! optionally mirrors every reading to the telemetry log.
//!
//! A failed read is followed by a pause of one read timeout before the next
//! attempt. After [`MAX_CONSECUTIVE_READ_ERRORS`] failures in a row the link
//! is treated as lost and the receiver stops with an error.

use std::future::Future;

use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AngleLinkError, Result};
use crate::protocol::decoder::{DecoderStats, FrameDecoder};
use crate::protocol::frame::Reading;
use crate::serial::LinkSerial;
use crate::telemetry::TelemetryLogger;

/// Failed reads in a row after which the link is considered lost
pub const MAX_CONSECUTIVE_READ_ERRORS: u32 = 10;

/// Result of a single [`Receiver::poll`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// Nothing arrived within the read timeout
    Idle,
    /// The read failed and the receiver has already backed off
    ReadFailed,
    /// A chunk arrived; these are the readings it completed (possibly none)
    Received(Vec<Reading>),
    /// The port reported end of stream
    Closed,
}

/// Receive side of the link
#[derive(Debug)]
pub struct Receiver {
    serial: LinkSerial,
    decoder: FrameDecoder,
    telemetry: Option<TelemetryLogger>,
    read_timeout: Duration,
    stats_interval: u64,
    consecutive_errors: u32,
}

impl Receiver {
    pub fn new(serial: LinkSerial, read_timeout: Duration, stats_interval: u64) -> Self {
        Self {
            serial,
            decoder: FrameDecoder::new(),
            telemetry: None,
            read_timeout,
            stats_interval: stats_interval.max(1),
            consecutive_errors: 0,
        }
    }

    /// Build a receiver from the `[serial]`, `[link]` and `[telemetry]` sections
    ///
    /// # Errors
    ///
    /// Returns error if telemetry is enabled and its directory cannot be created
    pub fn from_config(config: &Config, serial: LinkSerial) -> Result<Self> {
        let receiver = Self::new(
            serial,
            Duration::from_millis(config.serial.read_timeout_ms),
            config.link.stats_interval_frames,
        );

        if config.telemetry.enabled {
            Ok(receiver.with_telemetry(TelemetryLogger::new(&config.telemetry)?))
        } else {
            Ok(receiver)
        }
    }

    /// Mirror decoded readings to `logger`
    #[must_use]
    pub fn with_telemetry(mut self, logger: TelemetryLogger) -> Self {
        self.telemetry = Some(logger);
        self
    }

    /// Decoder counters accumulated so far
    pub fn stats(&self) -> DecoderStats {
        self.decoder.stats()
    }

    pub fn telemetry(&self) -> Option<&TelemetryLogger> {
        self.telemetry.as_ref()
    }

    /// Read one chunk and decode it
    ///
    /// # Errors
    ///
    /// Returns error once [`MAX_CONSECUTIVE_READ_ERRORS`] reads in a row have failed
    pub async fn poll(&mut self) -> Result<ReceiveOutcome> {
        let chunk = match timeout(self.read_timeout, self.serial.read_chunk()).await {
            Err(_) => return Ok(ReceiveOutcome::Idle),
            Ok(Err(e)) => return self.read_failed(e).await,
            Ok(Ok(chunk)) => chunk,
        };
        self.consecutive_errors = 0;

        if chunk.is_empty() {
            info!("Serial link closed");
            return Ok(ReceiveOutcome::Closed);
        }

        let readings = self.decoder.decode(&chunk);
        for reading in &readings {
            self.handle_reading(reading);
        }
        Ok(ReceiveOutcome::Received(readings))
    }

    /// Poll until the link closes, fails for good, or `shutdown` completes
    pub async fn run_until<F: Future>(&mut self, shutdown: F) -> Result<()> {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                outcome = self.poll() => {
                    if outcome? == ReceiveOutcome::Closed {
                        break;
                    }
                }

                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
            }
        }

        let stats = self.stats();
        info!(
            "Total frames decoded: {} ({} rejected, {} bytes discarded)",
            stats.frames_decoded, stats.frames_rejected, stats.bytes_discarded
        );
        Ok(())
    }

    async fn read_failed(&mut self, error: AngleLinkError) -> Result<ReceiveOutcome> {
        self.consecutive_errors += 1;
        if self.consecutive_errors >= MAX_CONSECUTIVE_READ_ERRORS {
            return Err(AngleLinkError::Serial(format!(
                "Link lost after {} consecutive read failures: {}",
                self.consecutive_errors, error
            )));
        }

        warn!(
            "Serial read failed ({} in a row): {}",
            self.consecutive_errors, error
        );
        sleep(self.read_timeout).await;
        Ok(ReceiveOutcome::ReadFailed)
    }

    fn handle_reading(&mut self, reading: &Reading) {
        debug!(
            "RX: angle1={} ({:.2}°) angle2={} ({:.2}°)",
            reading.angle1,
            reading.angle1_degrees(),
            reading.angle2,
            reading.angle2_degrees()
        );
        if !reading.is_in_range() {
            debug!("RX: reading outside the 12-bit range: {:?}", reading);
        }

        if let Some(logger) = self.telemetry.as_mut() {
            if let Err(e) = logger.log(reading) {
                warn!("Telemetry write failed: {}", e);
            }
        }

        let stats = self.decoder.stats();
        if stats.frames_decoded % self.stats_interval == 0 {
            info!(
                "Decoded {} frames ({} rejected, {} bytes discarded)",
                stats.frames_decoded, stats.frames_rejected, stats.bytes_discarded
            );
        }
    }
}
