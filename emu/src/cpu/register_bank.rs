//! # Register File and Banked Registers
//!
//! Physical storage behind the 16 visible registers, the CPSR and the five
//! SPSRs. See [`cpu_modes`](super::cpu_modes) for the banking table.
//!
//! Every `(register, mode)` pair is routed by [`slot`] to exactly one cell:
//!
//! ```text
//! ┌───────────┬──────┬──────┬──────┬──────┬──────┬──────┬──────┐
//! │ Register  │ USR  │ SYS  │ FIQ  │ IRQ  │ SVC  │ ABT  │ UND  │
//! ├───────────┼──────┼──────┼──────┼──────┼──────┼──────┼──────┤
//! │ R0-R7     │  -   │  -   │  -   │  -   │  -   │  -   │  -   │
//! │ R8-R12    │  -   │  -   │ fiq  │  -   │  -   │  -   │  -   │
//! │ R13-R14   │  -   │  -   │ fiq  │ irq  │ svc  │ abt  │ und  │
//! │ R15       │  -   │  -   │  -   │  -   │  -   │  -   │  -   │
//! └───────────┴──────┴──────┴──────┴──────┴──────┴──────┴──────┘
//!   "-" is the unbanked cell shared by every mode.
//! ```

use serde::{Deserialize, Serialize};

use crate::cpu::cpu_modes::Mode;
use crate::cpu::exception::RegisterError;
use crate::cpu::psr::Psr;

/// Stack Pointer register index.
pub const REG_SP: usize = 0xD;

/// Link Register index (return address for subroutines).
pub const REG_LR: usize = 0xE;

/// Program Counter register index.
pub const REG_PROGRAM_COUNTER: usize = 0xF;

/// The physical cell backing a visible register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Unbanked(usize),
    Fiq(usize),
    Irq(usize),
    Supervisor(usize),
    Abort(usize),
    Undefined(usize),
}

/// Routes a visible register in `mode` to its physical cell.
#[must_use]
pub const fn slot(reg: usize, mode: Mode) -> Slot {
    match (reg, mode) {
        (8..=14, Mode::Fiq) => Slot::Fiq(reg - 8),
        (13..=14, Mode::Irq) => Slot::Irq(reg - 13),
        (13..=14, Mode::Supervisor) => Slot::Supervisor(reg - 13),
        (13..=14, Mode::Abort) => Slot::Abort(reg - 13),
        (13..=14, Mode::Undefined) => Slot::Undefined(reg - 13),
        _ => Slot::Unbanked(reg),
    }
}

/// Storage for every register across all CPU modes.
///
/// Registers are read and written through the mode they are seen from; the
/// bank never copies values around on a mode change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterBank {
    /// R0-R15 as seen by User and System, and by any mode that does not bank them.
    unbanked: [u32; 16],

    /// R8-R14 for FIQ mode.
    fiq: [u32; 7],

    /// R13-R14 for IRQ mode.
    irq: [u32; 2],

    /// R13-R14 for Supervisor mode.
    svc: [u32; 2],

    /// R13-R14 for Abort mode.
    abt: [u32; 2],

    /// R13-R14 for Undefined mode.
    und: [u32; 2],

    cpsr: Psr,

    spsr_fiq: Psr,
    spsr_irq: Psr,
    spsr_svc: Psr,
    spsr_abt: Psr,
    spsr_und: Psr,
}

impl Default for RegisterBank {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBank {
    /// All registers zero, CPSR at its reset value.
    #[must_use]
    pub fn new() -> Self {
        Self {
            unbanked: [0; 16],
            fiq: [0; 7],
            irq: [0; 2],
            svc: [0; 2],
            abt: [0; 2],
            und: [0; 2],
            cpsr: Psr::RESET,
            spsr_fiq: Psr::default(),
            spsr_irq: Psr::default(),
            spsr_svc: Psr::default(),
            spsr_abt: Psr::default(),
            spsr_und: Psr::default(),
        }
    }

    fn cell(&self, reg: usize, mode: Mode) -> &u32 {
        assert!(reg <= 15, "Invalid register index: {reg} (0x{reg:X})");
        match slot(reg, mode) {
            Slot::Unbanked(i) => &self.unbanked[i],
            Slot::Fiq(i) => &self.fiq[i],
            Slot::Irq(i) => &self.irq[i],
            Slot::Supervisor(i) => &self.svc[i],
            Slot::Abort(i) => &self.abt[i],
            Slot::Undefined(i) => &self.und[i],
        }
    }

    fn cell_mut(&mut self, reg: usize, mode: Mode) -> &mut u32 {
        assert!(reg <= 15, "Invalid register index: {reg} (0x{reg:X})");
        match slot(reg, mode) {
            Slot::Unbanked(i) => &mut self.unbanked[i],
            Slot::Fiq(i) => &mut self.fiq[i],
            Slot::Irq(i) => &mut self.irq[i],
            Slot::Supervisor(i) => &mut self.svc[i],
            Slot::Abort(i) => &mut self.abt[i],
            Slot::Undefined(i) => &mut self.und[i],
        }
    }

    /// # Panics
    ///
    /// Panics if `reg` is not in `0..=15`.
    #[must_use]
    pub fn read(&self, reg: usize, mode: Mode) -> u32 {
        *self.cell(reg, mode)
    }

    /// # Panics
    ///
    /// Panics if `reg` is not in `0..=15`.
    pub fn write(&mut self, reg: usize, mode: Mode, value: u32) {
        *self.cell_mut(reg, mode) = value;
    }

    /// Reads `reg` as seen from the mode in the CPSR.
    #[must_use]
    pub fn read_current(&self, reg: usize) -> u32 {
        self.read(reg, self.current_mode())
    }

    /// Writes `reg` as seen from the mode in the CPSR.
    pub fn write_current(&mut self, reg: usize, value: u32) {
        let mode = self.current_mode();
        self.write(reg, mode, value);
    }

    #[must_use]
    pub const fn program_counter(&self) -> u32 {
        self.unbanked[REG_PROGRAM_COUNTER]
    }

    pub const fn set_program_counter(&mut self, new_value: u32) {
        self.unbanked[REG_PROGRAM_COUNTER] = new_value;
    }

    pub const fn advance_program_counter(&mut self, bytes: u32) {
        self.unbanked[REG_PROGRAM_COUNTER] = self.unbanked[REG_PROGRAM_COUNTER].wrapping_add(bytes);
    }

    #[must_use]
    pub const fn cpsr(&self) -> Psr {
        self.cpsr
    }

    /// Flag and control bit accessors go through the returned [`Psr`].
    pub const fn cpsr_mut(&mut self) -> &mut Psr {
        &mut self.cpsr
    }

    #[must_use]
    pub fn read_cpsr(&self) -> u32 {
        self.cpsr.into()
    }

    pub fn write_cpsr(&mut self, value: u32) {
        self.cpsr = Psr::from(value);
    }

    /// The mode the CPSR names, User if its mode bits are invalid.
    #[must_use]
    pub fn current_mode(&self) -> Mode {
        self.cpsr.mode()
    }

    fn spsr_mut(&mut self, mode: Mode) -> Result<&mut Psr, RegisterError> {
        match mode {
            Mode::Fiq => Ok(&mut self.spsr_fiq),
            Mode::Irq => Ok(&mut self.spsr_irq),
            Mode::Supervisor => Ok(&mut self.spsr_svc),
            Mode::Abort => Ok(&mut self.spsr_abt),
            Mode::Undefined => Ok(&mut self.spsr_und),
            Mode::User | Mode::System => Err(RegisterError::InvalidSpsrAccess(mode)),
        }
    }

    pub fn spsr(&self, mode: Mode) -> Result<Psr, RegisterError> {
        match mode {
            Mode::Fiq => Ok(self.spsr_fiq),
            Mode::Irq => Ok(self.spsr_irq),
            Mode::Supervisor => Ok(self.spsr_svc),
            Mode::Abort => Ok(self.spsr_abt),
            Mode::Undefined => Ok(self.spsr_und),
            Mode::User | Mode::System => Err(RegisterError::InvalidSpsrAccess(mode)),
        }
    }

    pub fn read_spsr(&self, mode: Mode) -> Result<u32, RegisterError> {
        self.spsr(mode).map(u32::from)
    }

    pub fn write_spsr(&mut self, mode: Mode, value: u32) -> Result<(), RegisterError> {
        *self.spsr_mut(mode)? = Psr::from(value);
        Ok(())
    }

    /// The 16 registers visible in the current mode.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u32> {
        let mode = self.current_mode();
        (0..=15).map(|reg| self.read(reg, mode)).collect()
    }
}
