//! # Processor Modes
//!
//! The mode lives in CPSR bits 4-0 and decides which physical registers back
//! R8-R14 and which SPSR is visible.
//!
//! ```text
//! ┌──────┬───────┬────────────┬──────────────────────┬──────┐
//! │ Mode │ Bits  │ Privileged │ Banked registers     │ SPSR │
//! ├──────┼───────┼────────────┼──────────────────────┼──────┤
//! │ USR  │ 10000 │ no         │ -                    │ no   │
//! │ FIQ  │ 10001 │ yes        │ R8-R14               │ yes  │
//! │ IRQ  │ 10010 │ yes        │ R13-R14              │ yes  │
//! │ SVC  │ 10011 │ yes        │ R13-R14              │ yes  │
//! │ ABT  │ 10111 │ yes        │ R13-R14              │ yes  │
//! │ UND  │ 11011 │ yes        │ R13-R14              │ yes  │
//! │ SYS  │ 11111 │ yes        │ - (shares USR)       │ no   │
//! └──────┴───────┴────────────┴──────────────────────┴──────┘
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// The normal ARM program execution state.
    User = 0b10000,

    /// Designed to support a data transfer or channel process.
    Fiq = 0b10001,

    /// Used for general-purpose interrupt handling.
    Irq = 0b10010,

    /// Protected mode for the operating system
    Supervisor = 0b10011,

    /// Entered after a data or instruction prefetch abort.
    Abort = 0b10111,

    /// Entered when an undefined instruction is executed
    Undefined = 0b11011,

    /// A privileged user mode for the operating system.
    System = 0b11111,
}

impl Mode {
    pub const ALL: [Self; 7] = [
        Self::User,
        Self::Fiq,
        Self::Irq,
        Self::Supervisor,
        Self::Abort,
        Self::Undefined,
        Self::System,
    ];

    /// Every mode but User may change the control bits of the CPSR.
    #[must_use]
    pub const fn is_privileged(self) -> bool {
        !matches!(self, Self::User)
    }

    /// Exception modes own a SPSR, User and System do not.
    #[must_use]
    pub const fn has_spsr(self) -> bool {
        matches!(
            self,
            Self::Fiq | Self::Irq | Self::Supervisor | Self::Abort | Self::Undefined
        )
    }
}

impl From<Mode> for u32 {
    fn from(m: Mode) -> Self {
        m as Self
    }
}

impl TryFrom<u32> for Mode {
    type Error = u32;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        match n {
            0b10000 => Ok(Self::User),
            0b10001 => Ok(Self::Fiq),
            0b10010 => Ok(Self::Irq),
            0b10011 => Ok(Self::Supervisor),
            0b10111 => Ok(Self::Abort),
            0b11011 => Ok(Self::Undefined),
            0b11111 => Ok(Self::System),
            _ => Err(n),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => f.write_str("USR"),
            Self::Fiq => f.write_str("FIQ"),
            Self::Irq => f.write_str("IRQ"),
            Self::Supervisor => f.write_str("SVC"),
            Self::Abort => f.write_str("ABT"),
            Self::Undefined => f.write_str("UND"),
            Self::System => f.write_str("SYS"),
        }
    }
}
