//! # Status Reporting
//!
//! Health status for an external indicator (e.g. an RGB LED).
//!
//! Components that need to signal status hold a [`StatusSink`] handed to
//! them; there is no global indicator instance.

use tracing::{error, info, warn};

use crate::sensor::Connectivity;

/// System status as rendered by an indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// Starting up, sensors not yet probed
    Initializing,
    /// Both sensors connected
    Ok,
    /// Exactly one sensor connected
    Partial,
    /// No sensor connected
    Error,
}

impl LinkStatus {
    /// Conventional indicator color as `(r, g, b)`
    ///
    /// Yellow while initializing, green when healthy, blue when degraded,
    /// red on error.
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            LinkStatus::Initializing => (255, 255, 0),
            LinkStatus::Ok => (0, 255, 0),
            LinkStatus::Partial => (0, 0, 255),
            LinkStatus::Error => (255, 0, 0),
        }
    }
}

impl From<Connectivity> for LinkStatus {
    fn from(connectivity: Connectivity) -> Self {
        match connectivity {
            Connectivity::BothConnected => LinkStatus::Ok,
            Connectivity::OneConnected => LinkStatus::Partial,
            Connectivity::NoneConnected => LinkStatus::Error,
        }
    }
}

/// Capability to render a status
pub trait StatusSink: Send + Sync {
    fn report(&self, status: LinkStatus);
}

/// Status sink that writes to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStatusSink;

impl StatusSink for TracingStatusSink {
    fn report(&self, status: LinkStatus) {
        let (r, g, b) = status.rgb();
        match status {
            LinkStatus::Initializing => info!("Status: initializing (rgb {},{},{})", r, g, b),
            LinkStatus::Ok => info!("Status: OK, both sensors connected (rgb {},{},{})", r, g, b),
            LinkStatus::Partial => {
                warn!("Status: PARTIAL, one sensor connected (rgb {},{},{})", r, g, b)
            }
            LinkStatus::Error => error!("Status: ERROR, no sensors connected (rgb {},{},{})", r, g, b),
        }
    }
}
