//! # Angle Link Library
//!
//! Stream two rotary encoder angles over a serial link.
//!
//! This library provides the 7-byte angle frame protocol (encoder, XOR
//! checksum, resynchronizing stream decoder) and the fixed-rate acquisition
//! pipeline that feeds it from two 12-bit angle sensors.

pub mod config;
pub mod error;
pub mod protocol;
pub mod sensor;
pub mod status;
pub mod scheduler;
pub mod pipeline;
pub mod receiver;
pub mod serial;
pub mod telemetry;
