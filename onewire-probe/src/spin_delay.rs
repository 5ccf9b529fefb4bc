use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;

/// Busy-wait delay on the monotonic clock.
///
/// `linux_embedded_hal::Delay` sleeps, which hands the CPU back to the scheduler and
/// stretches 1-Wire slots far past their windows.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpinDelay;

impl SpinDelay {
    fn spin(duration: Duration) {
        let start = Instant::now();
        while start.elapsed() < duration {
            std::hint::spin_loop();
        }
    }
}

impl DelayNs for SpinDelay {
    fn delay_ns(&mut self, ns: u32) {
        Self::spin(Duration::from_nanos(ns.into()));
    }

    fn delay_us(&mut self, us: u32) {
        Self::spin(Duration::from_micros(us.into()));
    }
}
