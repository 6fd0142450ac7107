use std::{fs, path::PathBuf, process};

use clap::Parser;
use emu::config::DEFAULT_MEMORY_SIZE;
use emu::{Endianness, Exception, Simulator, SimulatorConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// `SWI` comment that asks the driver to stop the simulation.
const END_SIMULATION_COMMENT: u32 = 0x12_3456;

#[derive(Parser, Debug)]
#[command(version, about = "ARMv5T instruction-level simulator.", long_about = None)]
struct Args {
    /// Raw image copied into memory at the entry address.
    #[arg(name = "IMAGE")]
    image: PathBuf,

    /// Memory capacity in bytes.
    #[arg(long, value_parser = parse_number::<usize>, default_value_t = DEFAULT_MEMORY_SIZE)]
    memory_size: usize,

    /// Simulate a big-endian target.
    #[arg(long)]
    big_endian: bool,

    /// Load address of the image and initial PC.
    #[arg(long, value_parser = parse_number::<u32>, default_value_t = 0)]
    entry: u32,

    /// Stop after this many executed instructions.
    #[arg(long, value_parser = parse_number::<u64>)]
    max_steps: Option<u64>,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    const fn config(&self) -> SimulatorConfig {
        SimulatorConfig {
            memory_size: self.memory_size,
            endianness: if self.big_endian {
                Endianness::Big
            } else {
                Endianness::Little
            },
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Ended { steps: u64 },
    StepLimit { steps: u64 },
    Stopped { steps: u64, exception: Exception },
}

fn main() {
    println!("armator v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let _guard = match init_logging(args.log_file.as_ref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let image = match fs::read(&args.image) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("cannot read {}: {e}", args.image.display());
            process::exit(1);
        }
    };

    let mut simulator = Simulator::with_config(args.config());
    if let Err(e) = simulator.load_image(args.entry, &image) {
        eprintln!("cannot load {}: {e}", args.image.display());
        process::exit(1);
    }
    simulator.write_register(15, args.entry);

    match run(&mut simulator, args.max_steps) {
        Outcome::Ended { steps } => {
            tracing::info!("simulation ended after {steps} steps");
        }
        Outcome::StepLimit { steps } => {
            tracing::warn!("stopped after reaching the limit of {steps} steps");
        }
        Outcome::Stopped { steps, exception } => {
            let pc = simulator.read_register(15);
            eprintln!("{exception} at 0x{pc:08X} after {steps} steps");
            tracing::error!("registers: {:08X?}", simulator.registers());
            process::exit(10 + i32::try_from(exception.code()).unwrap_or_default());
        }
    }
}

/// Steps until the program asks to end, faults, or hits `max_steps`.
fn run(simulator: &mut Simulator, max_steps: Option<u64>) -> Outcome {
    let mut steps = 0;
    loop {
        if max_steps.is_some_and(|max| steps >= max) {
            return Outcome::StepLimit { steps };
        }

        match simulator.step() {
            Ok(()) => steps += 1,
            Err(
                Exception::EndSimulation
                | Exception::SoftwareInterrupt {
                    comment: END_SIMULATION_COMMENT,
                },
            ) => return Outcome::Ended { steps },
            Err(exception) => return Outcome::Stopped { steps, exception },
        }
    }
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<Option<WorkerGuard>, String> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = fs::File::create(path)
                .map_err(|e| format!("cannot create log file {}: {e}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
            Ok(None)
        }
    }
}

/// Decimal, or hexadecimal with a `0x` prefix.
fn parse_number<T>(text: &str) -> Result<T, String>
where
    T: TryFrom<u64>,
{
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse::<u64>(),
    };

    parsed
        .ok()
        .and_then(|n| T::try_from(n).ok())
        .ok_or_else(|| format!("invalid number {text}"))
}
