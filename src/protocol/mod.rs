//! # Angle Frame Protocol Module
//!
//! Implementation of the 7-byte angle frame exchanged over the serial link.
//!
//! This module handles:
//! - Frame layout and wire constants (start/end markers, frame size)
//! - Frame encoding from an angle pair
//! - XOR checksum calculation
//! - Receiver-side stream framing, validation and resynchronization
//!
//! ## Wire Format
//!
//! ```text
//! [0xAA][A1_HI][A1_LO][A2_HI][A2_LO][CHECKSUM][0x55]
//! ```
//!
//! Angles are written high byte first by explicit byte extraction, so the
//! layout does not depend on host endianness.

pub mod frame;
pub mod checksum;
pub mod encoder;
pub mod decoder;
