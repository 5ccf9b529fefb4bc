//! Simulated open-drain line with a virtual microsecond clock and an optional slave device.
//!
//! The line and the clock share one state, so the device sees every edge at the simulated
//! time it happens and the tests can inspect the exact sequence of line operations.
extern crate std;

use std::{cell::RefCell, collections::VecDeque, rc::Rc, vec::Vec};

use embedded_hal::delay::DelayNs;

use crate::{Direction, Level, Line, LineConfig, ParasitePower};

/// Longest low pulse a device still reads as a `1`.
const WRITE_ONE_MAX_US: u64 = 15;
/// Shortest low pulse a device takes as a reset.
const RESET_MIN_US: u64 = 480;
/// Presence pulse: delay after the rising edge, then length.
const PRESENCE_WAIT_US: u64 = 15;
const PRESENCE_LEN_US: u64 = 120;
/// How long a device holds the line low to answer `0` in a read slot.
const READ_ZERO_HOLD_US: u64 = 30;
/// SEARCH ROM command.
const SEARCH_ROM: u8 = 0xf0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Event {
    Direction(Direction),
    Level(Level),
    Sample(Level),
    Delay(u32),
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SimError {
    Rejected,
}

#[derive(Debug, Default)]
struct Device {
    presence: bool,
    rx: Vec<bool>,
    tx: VecDeque<bool>,
    answering: bool,
    hold_low: Option<(u64, u64)>,
    rom: Option<u64>,
    /// ROM bit under arbitration during a search.
    search: Option<u32>,
}

impl Device {
    fn on_fall(&mut self, now: u64) {
        self.answering = match self.tx.pop_front() {
            Some(bit) => {
                if !bit {
                    self.hold_low = Some((now, now + READ_ZERO_HOLD_US));
                }
                true
            }
            None => false,
        };
    }

    fn on_rise(&mut self, now: u64, low_for: u64) {
        if low_for >= RESET_MIN_US {
            self.rx.clear();
            self.tx.clear();
            self.answering = false;
            self.search = None;
            if self.presence {
                let start = now + PRESENCE_WAIT_US;
                self.hold_low = Some((start, start + PRESENCE_LEN_US));
            }
            return;
        }
        if self.answering {
            return;
        }
        let bit = low_for <= WRITE_ONE_MAX_US;
        match (self.search, self.rom) {
            (Some(idx), Some(rom)) => {
                // the master's direction bit: stay in the search only if it matches ours
                self.search = None;
                if bit == Self::rom_bit(rom, idx) && idx < 63 {
                    self.start_search_bit(rom, idx + 1);
                }
            }
            _ => {
                self.rx.push(bit);
                if let Some(rom) = self.rom {
                    if self.rx.len() == 8 && Self::first_byte(&self.rx) == SEARCH_ROM {
                        self.start_search_bit(rom, 0);
                    }
                }
            }
        }
    }

    fn rom_bit(rom: u64, idx: u32) -> bool {
        (rom >> idx) & 1 == 1
    }

    fn first_byte(bits: &[bool]) -> u8 {
        bits[..8]
            .iter()
            .enumerate()
            .fold(0, |acc, (i, &b)| acc | (u8::from(b) << i))
    }

    /// Answer the next two read slots with the bit and its complement.
    fn start_search_bit(&mut self, rom: u64, idx: u32) {
        let bit = Self::rom_bit(rom, idx);
        self.tx.extend([bit, !bit]);
        self.search = Some(idx);
    }

    fn pulling_low(&self, now: u64) -> bool {
        matches!(self.hold_low, Some((start, end)) if (start..end).contains(&now))
    }
}

#[derive(Debug)]
struct State {
    now: u64,
    direction: Direction,
    level: Level,
    low_since: Option<u64>,
    events: Vec<Event>,
    config: Option<LineConfig>,
    reject_config: bool,
    parasite: bool,
    device: Option<Device>,
}

impl State {
    fn update_edges(&mut self) {
        let driven_low = self.direction == Direction::Output && self.level == Level::Low;
        match (self.low_since, driven_low) {
            (None, true) => {
                self.low_since = Some(self.now);
                if let Some(dev) = self.device.as_mut() {
                    dev.on_fall(self.now);
                }
            }
            (Some(since), false) => {
                self.low_since = None;
                if let Some(dev) = self.device.as_mut() {
                    dev.on_rise(self.now, self.now - since);
                }
            }
            _ => {}
        }
    }

    fn level(&self) -> Level {
        let device_low = self
            .device
            .as_ref()
            .is_some_and(|dev| dev.pulling_low(self.now));
        if self.low_since.is_some() || device_low {
            Level::Low
        } else {
            Level::High
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Sim(Rc<RefCell<State>>);

impl Sim {
    pub(crate) fn new() -> Self {
        Sim(Rc::new(RefCell::new(State {
            now: 0,
            direction: Direction::Input,
            level: Level::High,
            low_since: None,
            events: Vec::new(),
            config: None,
            reject_config: false,
            parasite: false,
            device: None,
        })))
    }

    /// Attach a device; `presence` selects whether it answers resets.
    pub(crate) fn with_device(self, presence: bool) -> Self {
        self.0.borrow_mut().device = Some(Device {
            presence,
            ..Default::default()
        });
        self
    }

    /// Give the attached device a ROM code it reports during SEARCH ROM.
    pub(crate) fn with_rom(self, rom: u64) -> Self {
        self.device(|dev| dev.rom = Some(rom));
        self
    }

    pub(crate) fn rejecting_config(self) -> Self {
        self.0.borrow_mut().reject_config = true;
        self
    }

    pub(crate) fn line(&self) -> SimLine {
        SimLine(self.clone())
    }

    pub(crate) fn clock(&self) -> SimClock {
        SimClock(self.clone())
    }

    pub(crate) fn now(&self) -> u64 {
        self.0.borrow().now
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.0.borrow().events.clone()
    }

    pub(crate) fn config(&self) -> Option<LineConfig> {
        self.0.borrow().config
    }

    pub(crate) fn parasite_power(&self) -> bool {
        self.0.borrow().parasite
    }

    /// Bits the device has received since the last reset or loop-back.
    pub(crate) fn received(&self) -> Vec<bool> {
        self.device(|dev| dev.rx.clone())
    }

    /// Queue bits for the device to answer the next read slots with.
    pub(crate) fn transmit(&self, bits: &[bool]) {
        self.device(|dev| dev.tx.extend(bits.iter().copied()));
    }

    /// Make the device answer with everything it has received so far.
    pub(crate) fn loop_back(&self) {
        self.device(|dev| {
            let rx = core::mem::take(&mut dev.rx);
            dev.tx.extend(rx);
        });
    }

    fn device<T>(&self, f: impl FnOnce(&mut Device) -> T) -> T {
        let mut state = self.0.borrow_mut();
        f(state.device.as_mut().expect("no simulated device attached"))
    }
}

#[derive(Debug)]
pub(crate) struct SimLine(Sim);

impl Line for SimLine {
    type Error = SimError;

    fn configure(&mut self, config: &LineConfig) -> Result<(), Self::Error> {
        let mut state = self.0.0.borrow_mut();
        if state.reject_config {
            return Err(SimError::Rejected);
        }
        state.config = Some(*config);
        Ok(())
    }

    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        let mut state = self.0.0.borrow_mut();
        state.direction = direction;
        state.events.push(Event::Direction(direction));
        state.update_edges();
        Ok(())
    }

    fn set_level(&mut self, level: Level) -> Result<(), Self::Error> {
        let mut state = self.0.0.borrow_mut();
        state.level = level;
        state.events.push(Event::Level(level));
        state.update_edges();
        Ok(())
    }

    fn get_level(&mut self) -> Result<Level, Self::Error> {
        let mut state = self.0.0.borrow_mut();
        let level = state.level();
        state.events.push(Event::Sample(level));
        Ok(level)
    }
}

impl ParasitePower for SimLine {
    fn enable_parasite_power(&mut self) -> Result<(), Self::Error> {
        self.0.0.borrow_mut().parasite = true;
        Ok(())
    }

    fn disable_parasite_power(&mut self) -> Result<(), Self::Error> {
        self.0.0.borrow_mut().parasite = false;
        Ok(())
    }
}

/// Virtual clock: delays advance simulated time instead of blocking.
#[derive(Debug)]
pub(crate) struct SimClock(Sim);

impl SimClock {
    fn advance(&mut self, us: u32) {
        let mut state = self.0.0.borrow_mut();
        state.now += u64::from(us);
        state.events.push(Event::Delay(us));
    }
}

impl DelayNs for SimClock {
    fn delay_ns(&mut self, ns: u32) {
        self.advance(ns.div_ceil(1000));
    }

    fn delay_us(&mut self, us: u32) {
        self.advance(us);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_decodes_write_slots_by_low_time() {
        let sim = Sim::new().with_device(true);
        let mut line = sim.line();
        let mut clock = sim.clock();
        for low in [6, 60] {
            line.set_direction(Direction::Output).unwrap();
            line.set_level(Level::Low).unwrap();
            clock.delay_us(low);
            line.set_level(Level::High).unwrap();
            clock.delay_us(70 - low);
        }
        assert_eq!(sim.received(), [true, false]);
    }

    #[test]
    fn presence_pulse_window() {
        let sim = Sim::new().with_device(true);
        let mut line = sim.line();
        let mut clock = sim.clock();
        line.set_direction(Direction::Output).unwrap();
        line.set_level(Level::Low).unwrap();
        clock.delay_us(480);
        line.set_direction(Direction::Input).unwrap();
        assert_eq!(line.get_level(), Ok(Level::High));
        clock.delay_us(20);
        assert_eq!(line.get_level(), Ok(Level::Low));
        clock.delay_us(200);
        assert_eq!(line.get_level(), Ok(Level::High));
    }
}
