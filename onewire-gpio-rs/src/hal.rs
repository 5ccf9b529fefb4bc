use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::{Direction, Level, Line, LineConfig};

/// [`Line`] over an embedded-hal pin that its HAL has already set up as open-drain.
///
/// embedded-hal has no notion of pin direction, so the adapter tracks it: the pin is only
/// ever driven low while the direction is [`Direction::Output`] and the level is
/// [`Level::Low`]; every other state releases it to the pull-up. Redundant writes are
/// skipped so that the release-and-switch-to-input step of a slot costs one pin access.
#[derive(Debug)]
pub struct OpenDrainPin<P> {
    pin: P,
    direction: Direction,
    level: Level,
    driven_low: bool,
}

impl<P> OpenDrainPin<P> {
    /// Wrap an open-drain pin.
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            direction: Direction::Input,
            level: Level::High,
            driven_low: false,
        }
    }

    /// Give the pin back.
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: InputPin + OutputPin> OpenDrainPin<P> {
    fn apply(&mut self) -> Result<(), <P as ErrorType>::Error> {
        let drive_low = self.direction == Direction::Output && self.level == Level::Low;
        if drive_low != self.driven_low {
            if drive_low {
                self.pin.set_low()?;
            } else {
                self.pin.set_high()?;
            }
            self.driven_low = drive_low;
        }
        Ok(())
    }
}

impl<P: InputPin + OutputPin> Line for OpenDrainPin<P> {
    type Error = <P as ErrorType>::Error;

    /// The electrical mode belongs to whoever built the pin; this only releases the line so
    /// the bus starts idle high.
    fn configure(&mut self, config: &LineConfig) -> Result<(), Self::Error> {
        if !config.open_drain() {
            log::warn!("OpenDrainPin cannot change the electrical mode, requested {config:?}");
        }
        self.pin.set_high()?;
        self.direction = Direction::Input;
        self.level = Level::High;
        self.driven_low = false;
        Ok(())
    }

    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        self.direction = direction;
        self.apply()
    }

    fn set_level(&mut self, level: Level) -> Result<(), Self::Error> {
        self.level = level;
        self.apply()
    }

    fn get_level(&mut self) -> Result<Level, Self::Error> {
        Ok(self.pin.is_high()?.into())
    }
}
