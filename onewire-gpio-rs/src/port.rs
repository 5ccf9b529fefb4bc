use embedded_hal::delay::DelayNs;
use embedded_onewire::{OneWire, OneWireError, OneWireResult, OneWireStatus};

use crate::{Error, Line, OneWireBus};

/// Bus state reported by [`OneWirePort`] after a reset.
///
/// A bit-banged master only sees the presence sample; it has no short-circuit detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceStatus {
    presence: bool,
}

impl OneWireStatus for PresenceStatus {
    fn presence(&self) -> bool {
        self.presence
    }

    fn shortcircuit(&self) -> bool {
        false
    }
}

/// A [`OneWireBus`] paired with its busy-wait delay, usable wherever an
/// [`embedded_onewire::OneWire`] bus is expected (ROM search, device drivers).
///
/// Only standard speed is supported; overdrive requests are refused.
#[derive(Debug)]
pub struct OneWirePort<L, D> {
    bus: OneWireBus<L>,
    delay: D,
}

impl<L: Line, D: DelayNs> OneWirePort<L, D> {
    /// Pair a configured bus with the delay every slot will use.
    pub fn new(bus: OneWireBus<L>, delay: D) -> Self {
        Self { bus, delay }
    }

    /// Split the port back into the bus and the delay.
    pub fn into_inner(self) -> (OneWireBus<L>, D) {
        (self.bus, self.delay)
    }
}

impl<L: Line> OneWireBus<L> {
    /// Bind a delay to the bus, turning it into an [`embedded_onewire::OneWire`] port.
    pub fn with_delay<D: DelayNs>(self, delay: D) -> OneWirePort<L, D> {
        OneWirePort::new(self, delay)
    }
}

/// Configuration errors cannot reach a port; a bus only exists once its line is configured.
fn lift<E>(e: Error<E>) -> OneWireError<E> {
    OneWireError::Other(e.into_inner())
}

impl<L: Line, D: DelayNs> OneWire for OneWirePort<L, D> {
    type Status = PresenceStatus;

    type BusError = L::Error;

    fn reset(&mut self) -> OneWireResult<Self::Status, Self::BusError> {
        if self.bus.reset(&mut self.delay).map_err(lift)? {
            Ok(PresenceStatus { presence: true })
        } else {
            Err(OneWireError::NoDevicePresent)
        }
    }

    fn write_byte(&mut self, byte: u8) -> OneWireResult<(), Self::BusError> {
        self.bus.write_byte(byte, &mut self.delay).map_err(lift)
    }

    fn read_byte(&mut self) -> OneWireResult<u8, Self::BusError> {
        self.bus.read_byte(&mut self.delay).map_err(lift)
    }

    fn write_bit(&mut self, bit: bool) -> OneWireResult<(), Self::BusError> {
        self.bus.write_bit(bit, &mut self.delay).map_err(lift)
    }

    fn read_bit(&mut self) -> OneWireResult<bool, Self::BusError> {
        self.bus.read_bit(&mut self.delay).map_err(lift)
    }

    fn get_overdrive_mode(&mut self) -> bool {
        false
    }

    fn set_overdrive_mode(&mut self, enable: bool) -> OneWireResult<(), Self::BusError> {
        if enable {
            Err(OneWireError::Unimplemented)
        } else {
            Ok(())
        }
    }
}
