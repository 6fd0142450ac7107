//! # Program Status Registers (CPSR and SPSR)
//!
//! The PSR contains condition flags (N, Z, C, V) and control bits (mode, state, interrupts).
//!
//! ```text
//! 31 30 29 28 27           8 7 6 5 4   0
//! ┌──┬──┬──┬──┬──────────────┬─┬─┬─┬─────┐
//! │N │Z │C │V │  Reserved    │I│F│T│Mode │
//! └──┴──┴──┴──┴──────────────┴─┴─┴─┴─────┘
//! ```
//!
//! - **Flags (28-31)**: See [`condition`](super::condition) for how these are tested
//! - **Mode (0-4)**: See [`cpu_modes`](super::cpu_modes) for operating modes
//! - **T bit (5)**: ARM (0) or Thumb (1) state
//! - **I/F bits (6-7)**: IRQ/FIQ disable
//!
//! Each exception mode has a **SPSR** to save CPSR on exception entry.
//! See [`register_bank`](super::register_bank) for SPSR storage.

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::arm::alu_instruction::ArithmeticOpResult;
use crate::cpu::{condition::Condition, cpu_modes::Mode};

/// Program Status Register (CPSR or SPSR).
///
/// Wraps the raw word and exposes one accessor per field. Every setter
/// touches only its own bit(s).
///
/// # Example
///
/// ```
/// use emu::cpu::psr::Psr;
///
/// let mut cpsr = Psr::default();
///
/// cpsr.set_zero_flag(true);
/// assert!(cpsr.zero_flag());
/// assert_eq!(u32::from(cpsr), 0x4000_0000);
/// ```
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Psr(u32);

impl Psr {
    /// Bits with no meaning on `ARMv5T`. MSR must not set them.
    pub const UNALLOC_MASK: u32 = 0x0FFF_FF00;

    /// Bits any mode may write through MSR (N, Z, C, V).
    pub const USER_MASK: u32 = 0xF000_0000;

    /// Bits only privileged modes may write through MSR (I, F, mode).
    pub const PRIV_MASK: u32 = 0x0000_00DF;

    /// Execution state bit. MSR must not set it on the CPSR.
    pub const STATE_MASK: u32 = 0x0000_0020;

    const MODE_MASK: u32 = 0b1_1111;

    /// Value of the CPSR out of reset: Supervisor, IRQ and FIQ masked, ARM state.
    pub const RESET: Self = Self(0xD3);

    #[must_use]
    pub fn can_execute(self, cond: Condition) -> bool {
        use Condition::{AL, CC, CS, EQ, GE, GT, HI, LE, LS, LT, MI, NE, PL, Unconditional, VC, VS};
        match cond {
            EQ => self.zero_flag(),
            NE => !self.zero_flag(),
            CS => self.carry_flag(),
            CC => !self.carry_flag(),
            MI => self.sign_flag(),
            PL => !self.sign_flag(),
            VS => self.overflow_flag(),
            VC => !self.overflow_flag(),
            HI => self.carry_flag() && !self.zero_flag(),
            LS => !self.carry_flag() || self.zero_flag(),
            GE => self.sign_flag() == self.overflow_flag(),
            LT => self.sign_flag() != self.overflow_flag(),
            GT => !self.zero_flag() && (self.sign_flag() == self.overflow_flag()),
            LE => self.zero_flag() || (self.sign_flag() != self.overflow_flag()),
            AL | Unconditional => true,
        }
    }

    /// N => Bit 31, (0=Not Signed, 1=Signed)
    #[must_use]
    pub fn sign_flag(self) -> bool {
        self.0.get_bit(31)
    }

    /// Z => Bit 30, (0=Not Zero, 1=Zero)
    #[must_use]
    pub fn zero_flag(self) -> bool {
        self.0.get_bit(30)
    }

    /// C => Bit 29, (0=Borrow/No Carry, 1=Carry/No Borrow)
    #[must_use]
    pub fn carry_flag(self) -> bool {
        self.0.get_bit(29)
    }

    /// V => Bit 28, (0=No Overflow, 1=Overflow)
    #[must_use]
    pub fn overflow_flag(self) -> bool {
        self.0.get_bit(28)
    }

    /// I => Bit 7, (0=Enable, 1=Disable)
    #[must_use]
    pub fn irq_disable(self) -> bool {
        self.0.get_bit(7)
    }

    /// F => Bit 6, (0=Enable, 1=Disable)
    #[must_use]
    pub fn fiq_disable(self) -> bool {
        self.0.get_bit(6)
    }

    /// T => Bit 5, (0=ARM, 1=THUMB)
    #[must_use]
    pub fn state_bit(self) -> bool {
        self.0.get_bit(5)
    }

    /// The raw M4-M0 field, whether or not it names a mode.
    #[must_use]
    pub const fn mode_bits(self) -> u32 {
        self.0 & Self::MODE_MASK
    }

    /// Returns the mode named by M4-M0, or the raw bits when they name none.
    pub fn try_mode(self) -> Result<Mode, u32> {
        Mode::try_from(self.mode_bits())
    }

    /// M4-M0 => Bits 4-0
    ///
    /// Mode bits that do not name a mode are reported as User so that a
    /// corrupted PSR never grants privilege.
    #[must_use]
    pub fn mode(self) -> Mode {
        self.try_mode().unwrap_or_else(|bits| {
            tracing::warn!(
                "invalid mode bits 0b{bits:05b} in PSR=0x{:08X}, treating as User",
                self.0
            );
            Mode::User
        })
    }

    pub fn set_sign_flag(&mut self, value: bool) {
        self.0.set_bit(31, value);
    }

    pub fn set_zero_flag(&mut self, value: bool) {
        self.0.set_bit(30, value);
    }

    pub fn set_carry_flag(&mut self, value: bool) {
        self.0.set_bit(29, value);
    }

    pub fn set_overflow_flag(&mut self, value: bool) {
        self.0.set_bit(28, value);
    }

    /// Copies all four condition flags from an ALU result.
    pub fn set_flags(&mut self, op_result: &ArithmeticOpResult) {
        self.set_carry_flag(op_result.carry);
        self.set_zero_flag(op_result.zero);
        self.set_sign_flag(op_result.sign);
        self.set_overflow_flag(op_result.overflow);
    }

    pub fn set_irq_disable(&mut self, value: bool) {
        self.0.set_bit(7, value);
    }

    pub fn set_fiq_disable(&mut self, value: bool) {
        self.0.set_bit(6, value);
    }

    pub fn set_state_bit(&mut self, value: bool) {
        self.0.set_bit(5, value);
    }

    /// The Mode Bits M4-M0 contain the current operating mode.
    pub const fn set_mode(&mut self, m: Mode) {
        self.0 &= !Self::MODE_MASK;
        self.0 |= m as u32;
    }

    #[must_use]
    pub fn cpu_state(self) -> CpuState {
        self.state_bit().into()
    }

    pub fn set_cpu_state(&mut self, state: CpuState) {
        self.set_state_bit(state.into());
    }
}

impl From<u32> for Psr {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<Psr> for u32 {
    fn from(p: Psr) -> Self {
        p.0
    }
}

/// The CPU execution state, selected by the T bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuState {
    /// Thumb: 16-bit instructions. Not executed by this core.
    Thumb,
    /// ARM: 32-bit instructions.
    Arm,
}

impl From<CpuState> for bool {
    fn from(state: CpuState) -> Self {
        match state {
            CpuState::Arm => false,
            CpuState::Thumb => true,
        }
    }
}

impl From<bool> for CpuState {
    fn from(state: bool) -> Self {
        if state { Self::Thumb } else { Self::Arm }
    }
}
