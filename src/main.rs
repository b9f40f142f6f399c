//! # Angle Link
//!
//! Stream two rotary encoder angles over a serial link.
//!
//! Runs either end of the link: the transmitter samples both channels at the
//! configured rate and writes 7-byte frames, the receiver decodes the byte
//! stream back into readings.

use anyhow::{Context, Result};
use std::path::Path;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use angle_link::config::{Config, LinkMode};
use angle_link::pipeline::Transmitter;
use angle_link::receiver::Receiver;
use angle_link::scheduler::{Clock, MonotonicClock, SampleScheduler};
use angle_link::sensor::sweep::SweepSource;
use angle_link::sensor::Sampler;
use angle_link::serial::LinkSerial;
use angle_link::status::{LinkStatus, StatusSink, TracingStatusSink};

/// Environment variable naming the configuration file
const CONFIG_ENV_VAR: &str = "ANGLE_LINK_CONFIG";

/// Configuration file used when the environment variable is unset
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// How often the transmit loop polls the scheduler
const POLL_PERIOD_MS: u64 = 1;

/// Main entry point for Angle Link
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (defaults if the file does not exist)
///    - Open the serial link
///
/// 2. **Main Loop** (by `link.mode`)
///    - `transmit`: poll the sample scheduler every millisecond, send a frame
///      whenever a sample is due
///    - `receive`: read byte chunks, decode frames, optionally log readings;
///      back off after a failed read and stop once the link is lost
///    - Log status every `stats_interval_frames` frames
///    - Handle Ctrl+C for graceful shutdown
///
/// # Errors
///
/// Returns error if:
/// - Configuration is invalid
/// - Serial port cannot be opened
///
/// # Examples
///
/// ```bash
/// ANGLE_LINK_CONFIG=config/default.toml cargo run --release
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Angle Link v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path =
        std::env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = load_config(Path::new(&config_path))?;

    let serial = LinkSerial::open_with_paths(&[config.serial.port.as_str()], config.serial.baud_rate)?;
    info!("Serial link opened at: {}", serial.device_path());

    match config.link.mode {
        LinkMode::Transmit => run_transmitter(&config, serial).await,
        LinkMode::Receive => run_receiver(&config, serial).await,
    }
}

/// Load configuration from `path`, or defaults if the file does not exist
fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        warn!("Config file {} not found, using defaults", path.display());
        return Ok(Config::default());
    }

    let config = Config::load(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Sample and transmit frames until Ctrl+C
async fn run_transmitter(config: &Config, mut serial: LinkSerial) -> Result<()> {
    let status = TracingStatusSink;
    status.report(LinkStatus::Initializing);

    // The sensor bus driver is provided by the board integration; the
    // bench sweep source stands in for it here.
    let sampler = Sampler::new(SweepSource::default());
    let scheduler = SampleScheduler::new(config.sampling.sample_rate_hz)?;
    let mut transmitter = Transmitter::new(sampler, scheduler);
    transmitter.report_status(&status);

    info!(
        "Sample rate: {} Hz ({} ms interval)",
        config.sampling.sample_rate_hz,
        transmitter.interval_ms()
    );
    info!("Press Ctrl+C to exit");

    let clock = MonotonicClock::new();
    transmitter.start(clock.now_ms());

    let mut poll = interval(Duration::from_millis(POLL_PERIOD_MS));
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let stats_interval = config.link.stats_interval_frames;
    let mut frames_sent: u64 = 0;
    let mut send_failures: u64 = 0;

    loop {
        tokio::select! {
            _ = poll.tick() => {
                let Some(frame) = transmitter.poll(clock.now_ms()) else {
                    continue;
                };

                if let Err(e) = serial.send_frame(&frame).await {
                    send_failures += 1;
                    debug!("Failed to send frame: {}", e);
                    continue;
                }

                frames_sent += 1;
                if frames_sent % stats_interval == 0 {
                    if let Some(reading) = transmitter.latest_reading() {
                        info!(
                            "Sent {} frames ({} failed), latest: {} ({:.2}°) / {} ({:.2}°)",
                            frames_sent,
                            send_failures,
                            reading.angle1,
                            reading.angle1_degrees(),
                            reading.angle2,
                            reading.angle2_degrees()
                        );
                    }
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total frames sent: {} ({} failed)", frames_sent, send_failures);
                break;
            }
        }
    }

    Ok(())
}

/// Receive and decode frames until Ctrl+C, end of stream, or link loss
async fn run_receiver(config: &Config, serial: LinkSerial) -> Result<()> {
    let mut receiver = Receiver::from_config(config, serial)?;

    info!("Waiting for frames...");
    info!("Press Ctrl+C to exit");

    receiver
        .run_until(tokio::signal::ctrl_c())
        .await
        .context("Receive loop stopped")?;
    Ok(())
}
