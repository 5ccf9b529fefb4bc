use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use clap::Parser;
use embedded_onewire::{OneWire, OneWireError, OneWireSearch, OneWireSearchKind};
use linux_embedded_hal::gpio_cdev::Chip;
use onewire_gpio::{OneWireBus, OneWirePort};

// Local imports
mod gpio_line;
mod spin_delay;

use gpio_line::{GpioLine, GpioLineError};
use spin_delay::SpinDelay;

type Port = OneWirePort<GpioLine, SpinDelay>;

/// Check for 1-Wire devices on a bit-banged GPIO line
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the GPIO character device (e.g., /dev/gpiochip0)
    #[arg(short, long, default_value = "/dev/gpiochip0")]
    chip: String,
    /// Offset of the 1-Wire data line on the chip
    #[arg(short, long)]
    line: u32,
    /// Enumerate the ROM codes of all devices after each reset
    #[arg(long, default_value_t = false)]
    search: bool,
    /// Number of probes, 0 to run until interrupted
    #[arg(short = 'n', long, default_value_t = 1)]
    count: u32,
    /// Interval between probes in milliseconds
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,
}

#[derive(Debug)]
enum Scan {
    Absent,
    Present,
    Devices(Vec<u64>),
}

fn main() {
    // Initialize the logger
    env_logger::init();
    // Parse command line arguments
    let args = Args::parse();
    log::info!("Arguments: {args:#?}");
    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || {
            log::info!("Received Ctrl+C, stopping the probe...");
            running.store(false, Ordering::Relaxed);
        })
        .expect("Error setting Ctrl-C handler");
    }
    let name = format!("{}:{}", args.chip, args.line);
    let chip = Chip::new(&args.chip)
        .unwrap_or_else(|e| panic!("[OW] {name}> Failed to open GPIO chip: {e}"));
    let mut port = match OneWireBus::init(GpioLine::new(chip, args.line)) {
        Ok(bus) => {
            log::info!("[OW] {name}> Bus configured");
            bus.with_delay(SpinDelay)
        }
        Err(e) => {
            log::error!("[OW] {name}> {e}");
            std::process::exit(1);
        }
    };
    let mut found = 0;
    let mut probes = 0;
    while running.load(Ordering::Relaxed) && (args.count == 0 || probes < args.count) {
        let start = Instant::now();
        probes += 1;
        match scan(&mut port, args.search) {
            Ok(Scan::Absent) => log::warn!("[OW] {name}> No presence pulse"),
            Ok(Scan::Present) => {
                found += 1;
                log::info!("[OW] {name}> Device present");
            }
            Ok(Scan::Devices(roms)) => {
                found += 1;
                log::info!("[OW] {name}> Found {} device(s)", roms.len());
                for rom in roms {
                    log::info!(
                        "[OW] {name}> ROM 0x{rom:016x}, family 0x{:02x}, serial 0x{:012x}",
                        rom & 0xff,
                        (rom & 0x00ffffff_ffffffff) >> 8
                    );
                }
            }
            Err(OneWireError::InvalidCrc) => {
                log::warn!("[OW] {name}> Search returned a ROM with an invalid CRC");
            }
            Err(e) => log::error!("[OW] {name}> Scan failed: {e:?}"),
        }
        if args.count != 0 && probes == args.count {
            break;
        }
        thread::sleep(Duration::from_millis(args.interval_ms).saturating_sub(start.elapsed()));
    }
    println!("[OW] {name}> Devices answered {found} of {probes} probes");
}

/// Reset the bus and, if asked to, walk the ROM search tree for every device on it.
fn scan(port: &mut Port, search: bool) -> Result<Scan, OneWireError<GpioLineError>> {
    match port.reset() {
        Ok(_) => {}
        Err(OneWireError::NoDevicePresent) => return Ok(Scan::Absent),
        Err(e) => return Err(e),
    }
    if !search {
        return Ok(Scan::Present);
    }
    let mut roms = Vec::new();
    let mut search = OneWireSearch::new(port, OneWireSearchKind::Normal);
    while let Some(rom) = search.next()? {
        roms.push(rom);
    }
    Ok(Scan::Devices(roms))
}
