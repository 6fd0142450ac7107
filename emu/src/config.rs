use serde::{Deserialize, Serialize};

use crate::memory::Endianness;

/// One MiB, enough for the small programs the simulator is meant to run.
pub const DEFAULT_MEMORY_SIZE: usize = 1 << 20;

/// How a [`Simulator`](crate::cpu::armv5t::Simulator) is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Capacity of the flat memory, in bytes.
    pub memory_size: usize,

    /// Byte order of the simulated target.
    pub endianness: Endianness,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_MEMORY_SIZE,
            endianness: Endianness::Little,
        }
    }
}
