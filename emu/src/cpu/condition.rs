//! # ARM Conditional Execution
//!
//! Almost every ARM instruction carries a condition in bits 31-28 and only
//! takes effect when the CPSR flags satisfy it; otherwise it behaves as a NOP.
//!
//! ```text
//! ┌───────┬────────┬─────────────────────┬─────────────────────────────────┐
//! │ Code  │ Suffix │     Meaning         │          Flags Tested           │
//! ├───────┼────────┼─────────────────────┼─────────────────────────────────┤
//! │ 0000  │   EQ   │ Equal               │ Z=1                             │
//! │ 0001  │   NE   │ Not equal           │ Z=0                             │
//! │ 0010  │ CS/HS  │ Carry set / ≥ (uns) │ C=1                             │
//! │ 0011  │ CC/LO  │ Carry clear / < (u) │ C=0                             │
//! │ 0100  │   MI   │ Minus / negative    │ N=1                             │
//! │ 0101  │   PL   │ Plus / non-negative │ N=0                             │
//! │ 0110  │   VS   │ Overflow set        │ V=1                             │
//! │ 0111  │   VC   │ Overflow clear      │ V=0                             │
//! │ 1000  │   HI   │ Higher (unsigned)   │ C=1 AND Z=0                     │
//! │ 1001  │   LS   │ Lower/same (unsig)  │ C=0 OR Z=1                      │
//! │ 1010  │   GE   │ ≥ (signed)          │ N=V                             │
//! │ 1011  │   LT   │ < (signed)          │ N≠V                             │
//! │ 1100  │   GT   │ > (signed)          │ Z=0 AND N=V                     │
//! │ 1101  │   LE   │ ≤ (signed)          │ Z=1 OR N≠V                      │
//! │ 1110  │   AL   │ Always              │ (unconditional)                 │
//! │ 1111  │   -    │ Unconditional space │ (always, non-ALU classes only)   │
//! └───────┴────────┴─────────────────────┴─────────────────────────────────┘
//! ```
//!
//! On `ARMv5` the `1111` encoding no longer means "never": it opens an
//! unconditional instruction space. The flags are not consulted for it.
//!
//! Evaluation against the flags lives in [`Psr::can_execute`](super::psr::Psr::can_execute).

use serde::{Deserialize, Serialize};

/// Bits 31-28 of an ARM instruction. Discriminants are the encodings.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub enum Condition {
    EQ = 0x0,
    NE = 0x1,
    CS = 0x2,
    CC = 0x3,
    MI = 0x4,
    PL = 0x5,
    VS = 0x6,
    VC = 0x7,
    HI = 0x8,
    LS = 0x9,
    GE = 0xA,
    LT = 0xB,
    GT = 0xC,
    LE = 0xD,
    AL = 0xE,

    /// `1111`: the unconditional space, never tested against the flags.
    Unconditional = 0xF,
}

impl Condition {
    const ALL: [Self; 16] = [
        Self::EQ,
        Self::NE,
        Self::CS,
        Self::CC,
        Self::MI,
        Self::PL,
        Self::VS,
        Self::VC,
        Self::HI,
        Self::LS,
        Self::GE,
        Self::LT,
        Self::GT,
        Self::LE,
        Self::AL,
        Self::Unconditional,
    ];

    /// Mnemonic suffix; empty for the two always-executing encodings.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        const SUFFIXES: [&str; 16] = [
            "EQ", "NE", "CS", "CC", "MI", "PL", "VS", "VC", "HI", "LS", "GE", "LT", "GT", "LE", "",
            "",
        ];
        SUFFIXES[self as usize]
    }
}

impl From<u8> for Condition {
    /// # Panics
    ///
    /// Callers extract a 4-bit field, anything above `0xF` is a decoder bug.
    fn from(item: u8) -> Self {
        match Self::ALL.get(usize::from(item)) {
            Some(condition) => *condition,
            None => unreachable!("condition field is 4 bits wide, got 0x{item:X}"),
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.suffix())
    }
}
