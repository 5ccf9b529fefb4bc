use embedded_hal::delay::DelayNs;

use crate::{
    Error,
    line::{Direction, Level, Line, LineConfig, ParasitePower},
    timing::*,
};

/// A 1-Wire bus master bit-banged on a single open-drain line.
///
/// The handle owns the line and nothing else: the bus is stateless between operations.
/// Every operation takes the timing primitive as an argument; it must busy-wait, since any
/// scheduling gap inside a slot stretches a pulse out of its window.
#[derive(Debug)]
pub struct OneWireBus<L> {
    line: L,
}

impl<L: Line> OneWireBus<L> {
    /// Configure the line for 1-Wire use and create the bus handle.
    ///
    /// The line is set up as a bidirectional open-drain output with the pull-up enabled,
    /// the pull-down disabled and no interrupt (see [`LineConfig::default`]).
    ///
    /// # Errors
    /// [`Error::Configuration`] with the platform error, unchanged, if the line cannot be
    /// configured. No handle exists in that case.
    pub fn init(mut line: L) -> Result<Self, Error<L::Error>> {
        let config = LineConfig::default();
        line.configure(&config).map_err(Error::Configuration)?;
        log::debug!("1-Wire line configured: {config:?}");
        Ok(Self { line })
    }

    /// Give the line back. The bus leaves it released high; de-configuring it is up to the
    /// caller.
    pub fn release(self) -> L {
        self.line
    }

    /// Start a slot: switch to output and pull the line low.
    fn pull_low(&mut self) -> Result<(), L::Error> {
        self.line.set_direction(Direction::Output)?;
        self.line.set_level(Level::Low)
    }

    /// Let the pull-up take the line high and hand it over to the devices.
    fn release_to_input(&mut self) -> Result<(), L::Error> {
        self.line.set_level(Level::High)?;
        self.line.set_direction(Direction::Input)
    }

    /// Write a single bit in one time slot.
    ///
    /// A `1` is a short 6µs low pulse followed by 64µs released; a `0` holds the line low
    /// for 60µs and releases it for the remaining 10µs.
    pub fn write_bit<D: DelayNs>(
        &mut self,
        bit: bool,
        delay: &mut D,
    ) -> Result<(), Error<L::Error>> {
        let (low, high) = if bit {
            (WRITE_ONE_LOW_US, WRITE_ONE_HIGH_US)
        } else {
            (WRITE_ZERO_LOW_US, WRITE_ZERO_HIGH_US)
        };
        self.pull_low()?;
        delay.delay_us(low);
        self.line.set_level(Level::High)?;
        delay.delay_us(high);
        Ok(())
    }

    /// Read a single bit in one time slot.
    ///
    /// The line is pulled low for 6µs to open the slot, then released and sampled 9µs
    /// later. A device answering `0` holds the line low across the sample point.
    pub fn read_bit<D: DelayNs>(&mut self, delay: &mut D) -> Result<bool, Error<L::Error>> {
        self.pull_low()?;
        delay.delay_us(READ_LOW_US);
        self.release_to_input()?;
        delay.delay_us(READ_SAMPLE_US);
        let bit = self.line.get_level()?;
        delay.delay_us(READ_RECOVERY_US);
        Ok(bit.into())
    }

    /// Write a byte, least significant bit first.
    pub fn write_byte<D: DelayNs>(
        &mut self,
        mut byte: u8,
        delay: &mut D,
    ) -> Result<(), Error<L::Error>> {
        for _ in 0..8 {
            self.write_bit(byte & 0x01 == 0x01, delay)?;
            byte >>= 1;
        }
        Ok(())
    }

    /// Read a byte, least significant bit first.
    pub fn read_byte<D: DelayNs>(&mut self, delay: &mut D) -> Result<u8, Error<L::Error>> {
        let mut byte = 0u8;
        for _ in 0..8 {
            byte >>= 1;
            if self.read_bit(delay)? {
                byte |= 0x80;
            }
        }
        Ok(byte)
    }

    /// Write a sequence of bytes back to back.
    pub fn write_bytes<D: DelayNs>(
        &mut self,
        bytes: &[u8],
        delay: &mut D,
    ) -> Result<(), Error<L::Error>> {
        for &b in bytes {
            self.write_byte(b, delay)?;
        }
        Ok(())
    }

    /// Fill `buf` with bytes read from the bus.
    pub fn read_bytes<D: DelayNs>(
        &mut self,
        buf: &mut [u8],
        delay: &mut D,
    ) -> Result<(), Error<L::Error>> {
        for b in buf.iter_mut() {
            *b = self.read_byte(delay)?;
        }
        Ok(())
    }

    /// Send a reset pulse and look for a presence pulse.
    ///
    /// The line is held low for 480µs, released, and sampled 70µs later; a device that
    /// is attached answers by pulling the line low. The call returns after a further
    /// 410µs of recovery, so it always takes 960µs.
    ///
    /// # Returns
    /// `true` if at least one device answered. An empty bus is `Ok(false)`, not an error.
    pub fn reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<bool, Error<L::Error>> {
        self.pull_low()?;
        delay.delay_us(RESET_LOW_US);
        self.release_to_input()?;
        delay.delay_us(PRESENCE_SAMPLE_US);
        let presence = self.line.get_level()? == Level::Low;
        delay.delay_us(RESET_RECOVERY_US);
        log::trace!("1-Wire reset, presence: {presence}");
        Ok(presence)
    }
}

impl<L: ParasitePower> OneWireBus<L> {
    /// Power parasite-powered devices through the data line.
    pub fn enable_parasite_power(&mut self) -> Result<(), Error<L::Error>> {
        Ok(self.line.enable_parasite_power()?)
    }

    /// Stop powering the bus through the data line.
    pub fn disable_parasite_power(&mut self) -> Result<(), Error<L::Error>> {
        Ok(self.line.disable_parasite_power()?)
    }
}
