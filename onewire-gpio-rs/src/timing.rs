//! Standard-speed 1-Wire slot timings, in microseconds.
//!
//! Receivers sample close to the slot boundaries, so these values must not be shortened.

/// Low phase of a write-1 slot.
pub const WRITE_ONE_LOW_US: u32 = 6;
/// Release phase of a write-1 slot.
pub const WRITE_ONE_HIGH_US: u32 = 64;
/// Low phase of a write-0 slot.
pub const WRITE_ZERO_LOW_US: u32 = 60;
/// Release phase of a write-0 slot.
pub const WRITE_ZERO_HIGH_US: u32 = 10;

/// Low pulse that opens a read slot.
pub const READ_LOW_US: u32 = 6;
/// Settle window between releasing the line and sampling it.
pub const READ_SAMPLE_US: u32 = 9;
/// Recovery after the sample.
pub const READ_RECOVERY_US: u32 = 55;

/// Reset pulse.
pub const RESET_LOW_US: u32 = 480;
/// Presence detection window between releasing the line and sampling it.
pub const PRESENCE_SAMPLE_US: u32 = 70;
/// Recovery after the presence sample.
pub const RESET_RECOVERY_US: u32 = 410;

/// Duration of every bit slot, read or write.
pub const SLOT_US: u32 = WRITE_ONE_LOW_US + WRITE_ONE_HIGH_US;
/// Duration of the reset/presence sequence.
pub const RESET_SLOT_US: u32 = RESET_LOW_US + PRESENCE_SAMPLE_US + RESET_RECOVERY_US;

const _: () = assert!(WRITE_ZERO_LOW_US + WRITE_ZERO_HIGH_US == SLOT_US);
const _: () = assert!(READ_LOW_US + READ_SAMPLE_US + READ_RECOVERY_US == SLOT_US);
const _: () = assert!(RESET_SLOT_US == 960);
