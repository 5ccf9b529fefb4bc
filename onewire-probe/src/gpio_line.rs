use embedded_hal::digital::ErrorType;
use linux_embedded_hal::{
    CdevPin,
    gpio_cdev::{Chip, LineRequestFlags, errors::Error as CdevError},
};
use onewire_gpio::{Direction, Level, Line, LineConfig, OpenDrainPin};

const CONSUMER: &str = "onewire-probe";

#[derive(Debug)]
pub enum GpioLineError {
    /// The kernel refused the line request (bad offset, line busy, no permission).
    Request(CdevError),
    /// Reading or writing the requested line failed.
    Pin(<CdevPin as ErrorType>::Error),
    /// The character device cannot provide this configuration.
    Unsupported(LineConfig),
    /// The line was used before being configured.
    NotConfigured,
}

/// A line on a GPIO character device, requested as an open-drain output.
///
/// Releasing an open-drain output leaves it floating at the pull-up, so the line is never
/// re-requested as an input: the direction switch is the release itself, and samples are
/// taken from the same handle.
pub struct GpioLine {
    chip: Chip,
    offset: u32,
    pin: Option<OpenDrainPin<CdevPin>>,
}

impl GpioLine {
    pub fn new(chip: Chip, offset: u32) -> Self {
        Self {
            chip,
            offset,
            pin: None,
        }
    }

    fn pin(&mut self) -> Result<&mut OpenDrainPin<CdevPin>, GpioLineError> {
        configured(&mut self.pin)
    }
}

fn configured<P>(pin: &mut Option<P>) -> Result<&mut P, GpioLineError> {
    pin.as_mut().ok_or(GpioLineError::NotConfigured)
}

/// Request flags for `config`. The line must be usable both ways, and the character
/// device has no pull-down or edge-event support on an output request.
fn request_flags(config: &LineConfig) -> Result<LineRequestFlags, GpioLineError> {
    if config.pull_down() || config.interrupt() || !config.output() || !config.input() {
        return Err(GpioLineError::Unsupported(*config));
    }
    let mut flags = LineRequestFlags::OUTPUT;
    if config.open_drain() {
        flags |= LineRequestFlags::OPEN_DRAIN;
    }
    Ok(flags)
}

impl Line for GpioLine {
    type Error = GpioLineError;

    fn configure(&mut self, config: &LineConfig) -> Result<(), Self::Error> {
        let flags = request_flags(config)?;
        if config.pull_up() {
            // v1 line requests carry no bias flags
            log::debug!("[OW] line {}: relying on the external pull-up", self.offset);
        }
        let handle = self
            .chip
            .get_line(self.offset)
            .and_then(|line| line.request(flags, 1, CONSUMER))
            .map_err(GpioLineError::Request)?;
        let mut pin = OpenDrainPin::new(CdevPin::new(handle).map_err(GpioLineError::Request)?);
        pin.configure(config).map_err(GpioLineError::Pin)?;
        self.pin = Some(pin);
        Ok(())
    }

    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        self.pin()?
            .set_direction(direction)
            .map_err(GpioLineError::Pin)
    }

    fn set_level(&mut self, level: Level) -> Result<(), Self::Error> {
        self.pin()?.set_level(level).map_err(GpioLineError::Pin)
    }

    fn get_level(&mut self) -> Result<Level, Self::Error> {
        self.pin()?.get_level().map_err(GpioLineError::Pin)
    }
}
