use bitfield_struct::bitfield;

#[bitfield(u8)]
#[derive(PartialEq, Eq)]
/// Electrical configuration requested for the 1-Wire line.
///
/// The default value is the only configuration the bus uses: a bidirectional open-drain
/// line with the pull-up enabled, the pull-down disabled and no interrupt attached.
pub struct LineConfig {
    /// The line can be sampled.
    #[bits(1, default = true)]
    pub input: bool,
    /// The line can be driven.
    #[bits(1, default = true)]
    pub output: bool,
    /// The driver can only pull the line low; a high level comes from the pull-up.
    #[bits(1, default = true)]
    pub open_drain: bool,
    /// Internal pull-up resistor.
    #[bits(1, default = true)]
    pub pull_up: bool,
    /// Internal pull-down resistor.
    #[bits(1, default = false)]
    pub pull_down: bool,
    /// Edge interrupt on the line.
    #[bits(1, default = false)]
    pub interrupt: bool,
    #[bits(2)]
    __: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Direction of the line.
pub enum Direction {
    /// The line is released and sampled.
    Input,
    /// The line is driven to the level last set.
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Logic level of the line.
pub enum Level {
    /// Pulled to ground.
    Low,
    /// Released to the pull-up.
    High,
}

impl From<bool> for Level {
    fn from(value: bool) -> Self {
        if value { Level::High } else { Level::Low }
    }
}

impl From<Level> for bool {
    fn from(level: Level) -> Self {
        level == Level::High
    }
}

impl core::ops::Not for Level {
    type Output = Level;

    fn not(self) -> Self::Output {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// Minimal GPIO capability the bus needs from the platform.
///
/// Implementations are expected to act immediately: every call happens inside a timed
/// 1-Wire slot, so none of them may block, sleep or yield.
pub trait Line {
    /// Platform error type.
    type Error: core::fmt::Debug;

    /// Apply the electrical configuration to the line.
    fn configure(&mut self, config: &LineConfig) -> Result<(), Self::Error>;

    /// Switch the line direction.
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error>;

    /// Set the output level. Only meaningful while the direction is [`Direction::Output`].
    fn set_level(&mut self, level: Level) -> Result<(), Self::Error>;

    /// Sample the instantaneous level of the line.
    fn get_level(&mut self) -> Result<Level, Self::Error>;
}

/// Optional strong pull-up control for devices running on parasite power.
///
/// The bus exposes [`enable_parasite_power`](crate::OneWireBus::enable_parasite_power) and
/// [`disable_parasite_power`](crate::OneWireBus::disable_parasite_power) only for lines
/// implementing this trait; what the switch does electrically is up to the implementor.
pub trait ParasitePower: Line {
    /// Supply power to the bus through the data line.
    fn enable_parasite_power(&mut self) -> Result<(), Self::Error>;

    /// Remove the strong pull-up, returning the line to normal operation.
    fn disable_parasite_power(&mut self) -> Result<(), Self::Error>;
}
