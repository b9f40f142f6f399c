//! # Sensor Module
//!
//! Two-channel angle acquisition.
//!
//! This module handles:
//! - The [`AngleSource`] capability a sensor bus driver implements
//! - Probing both channels once at startup ([`SensorLinkState`])
//! - Sampling both channels into a tagged [`Sample`]
//! - Summarizing connectivity for a status indicator
//!
//! How raw angles are obtained from the sensor bus is the job of the
//! [`AngleSource`] implementation. [`sweep::SweepSource`] is a bench source
//! that needs no hardware.

pub mod sweep;

use tracing::{info, warn};

use crate::protocol::frame::Reading;

/// Value sent on the wire for a channel whose sensor is unavailable.
///
/// Indistinguishable from a genuine zero angle once encoded.
pub const ANGLE_UNAVAILABLE: u16 = 0;

/// Sensor channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// First sensor (bus 0)
    One,
    /// Second sensor (bus 1)
    Two,
}

impl Channel {
    /// Both channels in wire order
    pub const ALL: [Channel; 2] = [Channel::One, Channel::Two];
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::One => write!(f, "sensor 1"),
            Channel::Two => write!(f, "sensor 2"),
        }
    }
}

/// Capability to read raw angles from the sensor bus
#[cfg_attr(test, mockall::automock)]
pub trait AngleSource {
    /// Probe whether the sensor on `channel` responds
    fn is_connected(&mut self, channel: Channel) -> bool;

    /// Whether the sensor on `channel` currently sees a magnet
    fn magnet_detected(&mut self, channel: Channel) -> bool;

    /// Read the raw 12-bit angle, or `None` if the read failed
    fn read(&mut self, channel: Channel) -> Option<u16>;
}

/// Per-channel connection status, fixed at sampler initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorLinkState {
    pub channel1: bool,
    pub channel2: bool,
}

impl SensorLinkState {
    /// Whether `channel` was found at startup
    pub fn is_connected(&self, channel: Channel) -> bool {
        match channel {
            Channel::One => self.channel1,
            Channel::Two => self.channel2,
        }
    }

    /// Connectivity summary for a status indicator
    pub fn connectivity(&self) -> Connectivity {
        match (self.channel1, self.channel2) {
            (true, true) => Connectivity::BothConnected,
            (false, false) => Connectivity::NoneConnected,
            _ => Connectivity::OneConnected,
        }
    }
}

/// Connectivity summary exposed to indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    BothConnected,
    OneConnected,
    NoneConnected,
}

/// One sampling of both channels, with unavailable channels kept explicit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sample {
    pub angle1: Option<u16>,
    pub angle2: Option<u16>,
}

impl Sample {
    /// Collapse to the wire reading, substituting [`ANGLE_UNAVAILABLE`]
    pub fn to_reading(&self) -> Reading {
        Reading::new(
            self.angle1.unwrap_or(ANGLE_UNAVAILABLE),
            self.angle2.unwrap_or(ANGLE_UNAVAILABLE),
        )
    }
}

/// Samples both channels of an [`AngleSource`]
#[derive(Debug)]
pub struct Sampler<S> {
    source: S,
    link: SensorLinkState,
    magnets: [bool; 2],
}

impl<S: AngleSource> Sampler<S> {
    /// Probe both channels and build a sampler
    ///
    /// Connection status is evaluated here only. A sensor that drops out
    /// later still reads as connected; its failed reads come back as `None`.
    pub fn new(mut source: S) -> Self {
        let mut magnets = [false; 2];
        let mut connected = [false; 2];

        for (i, channel) in Channel::ALL.into_iter().enumerate() {
            connected[i] = source.is_connected(channel);
            if !connected[i] {
                warn!("{}: NOT FOUND", channel);
                continue;
            }

            magnets[i] = source.magnet_detected(channel);
            info!("{}: CONNECTED (magnet detected: {})", channel, magnets[i]);
            if !magnets[i] {
                warn!("{}: no magnet detected, readings will be unreliable", channel);
            }
        }

        Self {
            source,
            link: SensorLinkState {
                channel1: connected[0],
                channel2: connected[1],
            },
            magnets,
        }
    }

    /// Connection state found at startup
    pub fn link_state(&self) -> SensorLinkState {
        self.link
    }

    /// Connectivity summary
    pub fn connectivity(&self) -> Connectivity {
        self.link.connectivity()
    }

    /// Magnet status found at startup (always false for a missing sensor)
    pub fn magnet_detected(&self, channel: Channel) -> bool {
        match channel {
            Channel::One => self.magnets[0],
            Channel::Two => self.magnets[1],
        }
    }

    /// Read one channel; disconnected channels are not polled
    pub fn read_channel(&mut self, channel: Channel) -> Option<u16> {
        if self.link.is_connected(channel) {
            self.source.read(channel)
        } else {
            None
        }
    }

    /// Read both channels
    pub fn sample(&mut self) -> Sample {
        Sample {
            angle1: self.read_channel(Channel::One),
            angle2: self.read_channel(Channel::Two),
        }
    }
}
