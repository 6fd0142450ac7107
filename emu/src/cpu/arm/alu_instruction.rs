//! # ALU Opcodes and Barrel Shifter
//!
//! Pure arithmetic shared by the data processing, load/store and PSR
//! transfer instructions. Nothing here touches CPU state: callers pass the
//! current carry in and decide which flags to commit.
//!
//! ## Shifter carry out
//!
//! ```text
//! ┌────────────┬───────────────┬────────────────┬───────────────────────────┐
//! │ Shift      │ Amount        │ Result         │ Carry out                 │
//! ├────────────┼───────────────┼────────────────┼───────────────────────────┤
//! │ any        │ 0 (register)  │ Rm             │ C                         │
//! │ LSL        │ 1-31          │ Rm << n        │ Rm[32-n]                  │
//! │ LSL        │ 32            │ 0              │ Rm[0]                     │
//! │ LSL        │ > 32          │ 0              │ 0                         │
//! │ LSR        │ 1-31          │ Rm >> n        │ Rm[n-1]                   │
//! │ LSR        │ 32            │ 0              │ Rm[31]                    │
//! │ LSR        │ > 32          │ 0              │ 0                         │
//! │ ASR        │ 1-31          │ Rm >>> n       │ Rm[n-1]                   │
//! │ ASR        │ >= 32         │ Rm[31] filled  │ Rm[31]                    │
//! │ ROR        │ n % 32 != 0   │ Rm ror n       │ Rm[(n % 32) - 1]          │
//! │ ROR        │ n % 32 == 0   │ Rm             │ Rm[31]                    │
//! │ RRX        │ (ROR #0 imm)  │ C:Rm[31:1]     │ Rm[0]                     │
//! └────────────┴───────────────┴────────────────┴───────────────────────────┘
//! ```
//!
//! In the immediate-amount encoding `LSR #0` and `ASR #0` stand for a shift
//! by 32 and `ROR #0` stands for RRX, see [`shift_immediate`].

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::flags::ShiftKind;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum ArmModeAluInstr {
    And = 0x0,
    Eor = 0x1,
    Sub = 0x2,
    Rsb = 0x3,
    Add = 0x4,
    Adc = 0x5,
    Sbc = 0x6,
    Rsc = 0x7,
    Tst = 0x8,
    Teq = 0x9,
    Cmp = 0xA,
    Cmn = 0xB,
    Orr = 0xC,
    Mov = 0xD,
    Bic = 0xE,
    Mvn = 0xF,
}

impl Display for ArmModeAluInstr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::And => f.write_str("AND"),
            Self::Eor => f.write_str("EOR"),
            Self::Sub => f.write_str("SUB"),
            Self::Rsb => f.write_str("RSB"),
            Self::Add => f.write_str("ADD"),
            Self::Adc => f.write_str("ADC"),
            Self::Sbc => f.write_str("SBC"),
            Self::Rsc => f.write_str("RSC"),
            Self::Tst => f.write_str("TST"),
            Self::Teq => f.write_str("TEQ"),
            Self::Cmp => f.write_str("CMP"),
            Self::Cmn => f.write_str("CMN"),
            Self::Orr => f.write_str("ORR"),
            Self::Mov => f.write_str("MOV"),
            Self::Bic => f.write_str("BIC"),
            Self::Mvn => f.write_str("MVN"),
        }
    }
}

#[derive(Eq, PartialEq, Debug)]
pub enum AluInstructionKind {
    Logical,
    Arithmetic,
}

pub trait Kind {
    fn kind(&self) -> AluInstructionKind;
}

impl Kind for ArmModeAluInstr {
    fn kind(&self) -> AluInstructionKind {
        use ArmModeAluInstr::{
            Adc, Add, And, Bic, Cmn, Cmp, Eor, Mov, Mvn, Orr, Rsb, Rsc, Sbc, Sub, Teq, Tst,
        };
        match &self {
            And | Eor | Tst | Teq | Orr | Mov | Bic | Mvn => AluInstructionKind::Logical,
            Sub | Rsb | Add | Adc | Sbc | Rsc | Cmp | Cmn => AluInstructionKind::Arithmetic,
        }
    }
}

impl From<u32> for ArmModeAluInstr {
    fn from(alu_op_code: u32) -> Self {
        use ArmModeAluInstr::{
            Adc, Add, And, Bic, Cmn, Cmp, Eor, Mov, Mvn, Orr, Rsb, Rsc, Sbc, Sub, Teq, Tst,
        };
        match alu_op_code & 0xF {
            0x0 => And,
            0x1 => Eor,
            0x2 => Sub,
            0x3 => Rsb,
            0x4 => Add,
            0x5 => Adc,
            0x6 => Sbc,
            0x7 => Rsc,
            0x8 => Tst,
            0x9 => Teq,
            0xA => Cmp,
            0xB => Cmn,
            0xC => Orr,
            0xD => Mov,
            0xE => Bic,
            _ => Mvn,
        }
    }
}

impl ArmModeAluInstr {
    /// TST, TEQ, CMP and CMN only set flags, their result is discarded.
    #[must_use]
    pub const fn is_test(self) -> bool {
        matches!(self, Self::Tst | Self::Teq | Self::Cmp | Self::Cmn)
    }

    /// Computes the opcode on `op1` (Rn) and `op2` (shifter operand).
    ///
    /// `carry` is the current C flag, `shifter_carry` the carry out of the
    /// barrel shifter. Logical results carry the shifter carry and no
    /// overflow; the caller leaves V alone for them.
    #[must_use]
    pub fn compute(
        self,
        op1: u32,
        op2: u32,
        carry: bool,
        shifter_carry: bool,
    ) -> ArithmeticOpResult {
        match self {
            Self::And | Self::Tst => logical(op1 & op2, shifter_carry),
            Self::Eor | Self::Teq => logical(op1 ^ op2, shifter_carry),
            Self::Orr => logical(op1 | op2, shifter_carry),
            Self::Mov => logical(op2, shifter_carry),
            Self::Bic => logical(op1 & !op2, shifter_carry),
            Self::Mvn => logical(!op2, shifter_carry),
            Self::Add | Self::Cmn => add_with_carry(op1, op2, false),
            Self::Adc => add_with_carry(op1, op2, carry),
            Self::Sub | Self::Cmp => add_with_carry(op1, !op2, true),
            Self::Sbc => add_with_carry(op1, !op2, carry),
            Self::Rsb => add_with_carry(op2, !op1, true),
            Self::Rsc => add_with_carry(op2, !op1, carry),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArithmeticOpResult {
    pub result: u32,
    pub carry: bool,
    pub overflow: bool,
    pub sign: bool,
    pub zero: bool,
}

fn logical(result: u32, carry: bool) -> ArithmeticOpResult {
    ArithmeticOpResult {
        result,
        carry,
        overflow: false,
        sign: result.get_bit(31),
        zero: result == 0,
    }
}

/// `first_op + second_op + carry_in` with the flags of the 33-bit sum.
///
/// Subtraction is `add_with_carry(a, !b, true)`, so C is the inverted borrow.
#[must_use]
pub fn add_with_carry(first_op: u32, second_op: u32, carry_in: bool) -> ArithmeticOpResult {
    // we do the sum in 64bits so that the 32nd bit is the carry
    let wide = u64::from(first_op) + u64::from(second_op) + u64::from(carry_in);
    let result = wide as u32;

    ArithmeticOpResult {
        result,
        carry: wide.get_bit(32),
        // overflow only occurs when operands have the same sign and result has the opposite one
        overflow: ((first_op ^ result) & (second_op ^ result)).get_bit(31),
        sign: result.get_bit(31),
        zero: result == 0,
    }
}

/// Shifts `rm` by an amount taken from a register (only its low byte counts).
///
/// Only `result` and `carry` of the returned value are meaningful.
#[must_use]
pub fn shift(kind: ShiftKind, shift_amount: u32, rm: u32, carry: bool) -> ArithmeticOpResult {
    let (result, carry) = if shift_amount == 0 {
        (rm, carry)
    } else {
        match kind {
            ShiftKind::Lsl => match shift_amount {
                1..=31 => (rm << shift_amount, rm.get_bit((32 - shift_amount) as u8)),
                32 => (0, rm.get_bit(0)),
                _ => (0, false),
            },
            ShiftKind::Lsr => match shift_amount {
                1..=31 => (rm >> shift_amount, rm.get_bit((shift_amount - 1) as u8)),
                32 => (0, rm.get_bit(31)),
                _ => (0, false),
            },
            ShiftKind::Asr => match shift_amount {
                1..=31 => (
                    ((rm as i32) >> shift_amount) as u32,
                    rm.get_bit((shift_amount - 1) as u8),
                ),
                _ => (((rm as i32) >> 31) as u32, rm.get_bit(31)),
            },
            ShiftKind::Ror => match shift_amount % 32 {
                0 => (rm, rm.get_bit(31)),
                r => (rm.rotate_right(r), rm.get_bit((r - 1) as u8)),
            },
        }
    };

    ArithmeticOpResult {
        result,
        carry,
        ..Default::default()
    }
}

/// Shifts `rm` by a 5-bit amount encoded in the instruction.
#[must_use]
pub fn shift_immediate(
    kind: ShiftKind,
    shift_amount: u32,
    rm: u32,
    carry: bool,
) -> ArithmeticOpResult {
    match (kind, shift_amount) {
        // LSR#0 and ASR#0 are used to encode a shift by 32
        (ShiftKind::Lsr | ShiftKind::Asr, 0) => shift(kind, 32, rm, carry),
        // ROR#0 is RRX: rotate right by one through the carry
        (ShiftKind::Ror, 0) => ArithmeticOpResult {
            result: (u32::from(carry) << 31) | (rm >> 1),
            carry: rm.get_bit(0),
            ..Default::default()
        },
        _ => shift(kind, shift_amount, rm, carry),
    }
}

/// The rotated 8-bit immediate operand. The carry out is bit 31 of the
/// result when there is a rotation, the unchanged `carry` otherwise.
#[must_use]
pub fn rotate_immediate(base: u32, shift: u32, carry: bool) -> ArithmeticOpResult {
    let result = base.rotate_right(shift);
    ArithmeticOpResult {
        result,
        carry: if shift == 0 { carry } else { result.get_bit(31) },
        ..Default::default()
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum ShiftOperator {
    /// Shift amount in bits 11-7.
    Immediate(u32),
    /// Register (bits 11-8) holding the shift amount in its low byte.
    Register(u32),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum AluSecondOperandInfo {
    Register {
        shift_op: ShiftOperator,
        shift_kind: ShiftKind,
        register: u32,
    },
    Immediate {
        base: u32,
        /// Already doubled: the rotation in bits, not the 4-bit field.
        shift: u32,
    },
}

impl Display for AluSecondOperandInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Immediate { base, shift } => write!(f, "#{}", base.rotate_right(*shift)),
            Self::Register {
                shift_op,
                shift_kind,
                register,
            } => match (shift_op, shift_kind) {
                (ShiftOperator::Immediate(0), ShiftKind::Lsl) => write!(f, "R{register}"),
                (ShiftOperator::Immediate(0), ShiftKind::Ror) => write!(f, "R{register}, RRX"),
                (ShiftOperator::Immediate(0), _) => write!(f, "R{register}, {shift_kind} #32"),
                (ShiftOperator::Immediate(amount), _) => {
                    write!(f, "R{register}, {shift_kind} #{amount}")
                }
                (ShiftOperator::Register(rs), _) => write!(f, "R{register}, {shift_kind} R{rs}"),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum PsrKind {
    Cpsr,
    Spsr,
}

impl From<bool> for PsrKind {
    fn from(value: bool) -> Self {
        if value { Self::Spsr } else { Self::Cpsr }
    }
}

impl Display for PsrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cpsr => f.write_str("CPSR"),
            Self::Spsr => f.write_str("SPSR"),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum PsrOpKind {
    /// Move PSR to register.
    Mrs { destination_register: u32 },

    /// Move register or immediate to the PSR bytes selected by `field_mask`
    /// (bit 0 = control byte .. bit 3 = flags byte).
    Msr {
        field_mask: u32,
        operand: AluSecondOperandInfo,
    },
}

impl PsrOpKind {
    /// Expands the 4-bit field mask into a byte mask over the PSR.
    #[must_use]
    pub fn byte_mask(field_mask: u32) -> u32 {
        (0..4)
            .filter(|byte| field_mask.get_bit(*byte))
            .fold(0, |mask, byte| mask | (0xFF << (byte * 8)))
    }
}
