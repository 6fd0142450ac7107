//! An instruction-level simulator for the ARMv5T architecture.
//!
//! [`Simulator`] owns a register bank and a flat memory. Each call to
//! [`Simulator::step`] fetches, decodes and executes one ARM instruction;
//! anything that stops it from completing normally comes back as an
//! [`Exception`].

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
pub mod bitwise;

pub mod config;
pub mod cpu;

#[allow(clippy::cast_possible_truncation)]
pub mod memory;

pub use config::SimulatorConfig;
pub use cpu::armv5t::Simulator;
pub use cpu::exception::Exception;
pub use memory::Endianness;
