//! # Exceptions
//!
//! Everything that stops a `step` from completing normally. The first seven
//! kinds are the architectural exception vectors; [`Exception::EndSimulation`]
//! is the simulator's own way of asking the caller to stop.
//!
//! ```text
//! ┌─────────────────────────┬──────┬────────┐
//! │ Kind                    │ Code │ Vector │
//! ├─────────────────────────┼──────┼────────┤
//! │ Reset                   │  1   │  0x00  │
//! │ Data abort              │  2   │  0x10  │
//! │ Fast interrupt          │  3   │  0x1C  │
//! │ Interrupt               │  4   │  0x18  │
//! │ Prefetch abort          │  6   │  0x0C  │
//! │ Undefined instruction   │  7   │  0x04  │
//! │ Software interrupt      │  8   │  0x08  │
//! │ End of simulation       │  9   │   -    │
//! └─────────────────────────┴──────┴────────┘
//! ```

use thiserror::Error;

use crate::cpu::cpu_modes::Mode;
use crate::memory::MemoryError;

/// Register bank misuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("mode {0} has no SPSR")]
    InvalidSpsrAccess(Mode),
}

/// Why a `step` did not complete normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Exception {
    #[error("reset")]
    Reset,

    #[error("data abort")]
    DataAbort,

    #[error("fast interrupt")]
    FastInterrupt,

    #[error("interrupt")]
    Interrupt,

    #[error("prefetch abort")]
    PrefetchAbort,

    #[error("undefined instruction")]
    UndefinedInstruction,

    #[error("software interrupt 0x{comment:06X}")]
    SoftwareInterrupt { comment: u32 },

    #[error("end of simulation")]
    EndSimulation,
}

impl Exception {
    /// Numeric code handed to exception-entry handling.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Reset => 1,
            Self::DataAbort => 2,
            Self::FastInterrupt => 3,
            Self::Interrupt => 4,
            Self::PrefetchAbort => 6,
            Self::UndefinedInstruction => 7,
            Self::SoftwareInterrupt { .. } => 8,
            Self::EndSimulation => 9,
        }
    }
}

impl From<MemoryError> for Exception {
    fn from(e: MemoryError) -> Self {
        tracing::debug!("data abort: {e}");
        Self::DataAbort
    }
}

impl From<RegisterError> for Exception {
    fn from(e: RegisterError) -> Self {
        tracing::debug!("undefined instruction: {e}");
        Self::UndefinedInstruction
    }
}
