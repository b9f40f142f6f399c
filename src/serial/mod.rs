//! # Serial Communication Module
//!
//! Handles the byte-oriented serial link between sender and receiver.
//!
//! This module handles:
//! - Opening the serial port (8N1, no flow control)
//! - Writing angle frames (best effort, fire and forget)
//! - Reading raw byte chunks for the receive-side decoder

pub mod port_trait;

use bytes::{Bytes, BytesMut};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

use crate::error::{AngleLinkError, Result};
use crate::protocol::frame::Frame;
use port_trait::{SerialPortIO, TokioSerialPort};

/// Default baud rate for the angle link
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Largest chunk returned by a single read
pub const READ_CHUNK_SIZE: usize = 64;

/// Default device paths to try (in order of preference)
const DEFAULT_DEVICE_PATHS: &[&str] = &[
    "/dev/ttyUSB0", // USB-to-serial adapters
    "/dev/ttyACM0", // USB CDC devices
];

/// Serial link handle
pub struct LinkSerial {
    /// Port I/O
    port: Box<dyn SerialPortIO>,
    /// Device path (e.g., /dev/ttyUSB0)
    device_path: String,
    /// Reusable receive buffer
    read_buf: BytesMut,
}

impl std::fmt::Debug for LinkSerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkSerial")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl LinkSerial {
    /// Open the link on the first default device path that works
    ///
    /// # Errors
    ///
    /// Returns error if no device could be opened
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use angle_link::serial::{LinkSerial, DEFAULT_BAUD_RATE};
    ///
    /// fn main() -> anyhow::Result<()> {
    ///     let serial = LinkSerial::open(DEFAULT_BAUD_RATE)?;
    ///     Ok(())
    /// }
    /// ```
    pub fn open(baud_rate: u32) -> Result<Self> {
        Self::open_with_paths(DEFAULT_DEVICE_PATHS, baud_rate)
    }

    /// Open the link trying each of `paths` in order
    ///
    /// # Arguments
    ///
    /// * `paths` - Device paths to try (e.g., &["/dev/ttyUSB0"])
    /// * `baud_rate` - Line speed
    ///
    /// # Returns
    ///
    /// * `Result<LinkSerial>` - Connected serial port or error
    pub fn open_with_paths(paths: &[&str], baud_rate: u32) -> Result<Self> {
        for path in paths {
            debug!("Trying to open serial port: {}", path);

            match Self::open_port(path, baud_rate) {
                Ok(port) => {
                    info!("Opened serial link at {} ({} baud)", path, baud_rate);
                    return Ok(Self::with_port(Box::new(TokioSerialPort::new(port)), path));
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                    continue;
                }
            }
        }

        Err(AngleLinkError::SerialPortNotFound(paths.join(", ")))
    }

    /// Wrap an already-open port
    pub fn with_port(port: Box<dyn SerialPortIO>, device_path: &str) -> Self {
        Self {
            port,
            device_path: device_path.to_string(),
            read_buf: BytesMut::with_capacity(READ_CHUNK_SIZE),
        }
    }

    /// Open a specific serial port with 8N1 settings
    fn open_port(path: &str, baud_rate: u32) -> Result<tokio_serial::SerialStream> {
        let port = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| AngleLinkError::Serial(format!("Failed to open {}: {}", path, e)))?;

        Ok(port)
    }

    /// Write one frame to the link
    ///
    /// # Errors
    ///
    /// Returns error if the write or flush fails. Callers treat this as
    /// best effort: the next frame supersedes a lost one.
    pub async fn send_frame(&mut self, frame: &Frame) -> Result<()> {
        self.port
            .write_all(frame.as_bytes())
            .await
            .map_err(|e| AngleLinkError::Serial(format!("Failed to write frame: {}", e)))?;

        self.port
            .flush()
            .await
            .map_err(|e| AngleLinkError::Serial(format!("Failed to flush serial port: {}", e)))?;

        debug!("Sent frame ({} bytes)", Frame::SIZE);
        Ok(())
    }

    /// Read the next chunk of raw bytes (up to [`READ_CHUNK_SIZE`])
    ///
    /// An empty chunk means the port reported end of stream.
    pub async fn read_chunk(&mut self) -> Result<Bytes> {
        self.read_buf.resize(READ_CHUNK_SIZE, 0);
        let n = self
            .port
            .read(&mut self.read_buf[..])
            .await
            .map_err(|e| AngleLinkError::Serial(format!("Failed to read: {}", e)))?;

        self.read_buf.truncate(n);
        Ok(self.read_buf.split().freeze())
    }

    /// Get the device path of the opened serial port
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}
