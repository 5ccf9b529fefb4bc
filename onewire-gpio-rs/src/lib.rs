#![no_std]
#![deny(missing_docs)]
//! # onewire-gpio
//!
//! A no-std 1-Wire bus master bit-banged on a single open-drain GPIO line.
//!
//! The crate provides the transport only: reset with presence detection, bit slots and
//! LSB-first bytes. ROM search, CRC checks and device command sets belong to the layers
//! built on top of it.
//!
//! The line is reached through the [`Line`] trait, with [`OpenDrainPin`] adapting any
//! embedded-hal pin; timing comes from an [`embedded_hal::delay::DelayNs`] that must
//! busy-wait. Pairing a bus with its delay through [`OneWireBus::with_delay`] gives a
//! [`OneWirePort`], which implements [`embedded_onewire::OneWire`] so ROM search and the
//! device drivers written against that trait run over the bit-banged line.
mod bus;
mod error;
mod hal;
mod line;
mod port;
#[cfg(test)]
mod sim;
pub mod timing;

pub use bus::OneWireBus;
pub use error::Error;
pub use hal::OpenDrainPin;
pub use line::{Direction, Level, Line, LineConfig, ParasitePower};
pub use port::{OneWirePort, PresenceStatus};
