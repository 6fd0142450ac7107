//! # ARM Instruction Decoding
//!
//! Turns a 32-bit word into an [`ArmModeInstruction`]. Decoding is total
//! and has no side effects: every word maps to some variant, and anything
//! the core does not implement decodes to [`ArmModeInstruction::Undefined`]
//! or [`ArmModeInstruction::Coprocessor`], which raise an undefined
//! instruction exception when executed.
//!
//! ## Instruction Categories
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    ARM Instruction Categories                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Bits 27-25 determine the basic category:                               │
//! │                                                                         │
//! │  000, bit7=1 bit4=1      →  Multiply, Multiply Long, SWP, LDRH/STRH...  │
//! │  000, 10x0 in 24-20      →  MRS, MSR, BX, BLX, CLZ                      │
//! │  000                     →  Data Processing (register operand)          │
//! │  001, 10x0 in 24-20      →  MSR (immediate)                             │
//! │  001                     →  Data Processing (immediate operand)         │
//! │  010                     →  Load/Store (immediate offset)               │
//! │  011                     →  Load/Store (register offset)                │
//! │  100                     →  Block Data Transfer (LDM/STM)               │
//! │  101                     →  Branch (B/BL), BLX with condition 1111      │
//! │  110                     →  Coprocessor Data Transfer                   │
//! │  111                     →  Software Interrupt / Coprocessor ops        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Condition `1111` is only meaningful for the branch, load/store and
//! software interrupt classes; in the branch class it selects BLX. In the
//! data processing and miscellaneous space it decodes as undefined.
//!
//! ## Instruction Encoding Example
//!
//! ```text
//! ADD R0, R1, R2, LSL #3
//!
//! 31-28  27-26  25  24-21  20  19-16  15-12  11-7   6-5  4  3-0
//! [1110] [ 00 ] [0] [0100] [0] [0001] [0000] [00011][00] [0][0010]
//!   ↑       ↑    ↑    ↑     ↑    ↑      ↑      ↑     ↑   ↑   ↑
//!   │       │    │    │     │    │      │      │     │   │   └─ Rm = R2
//!   │       │    │    │     │    │      │      │     │   └──── Shift by imm
//!   │       │    │    │     │    │      │      │     └──────── LSL
//!   │       │    │    │     │    │      │      └────────────── Shift = 3
//!   │       │    │    │     │    │      └───────────────────── Rd = R0
//!   │       │    │    │     │    └──────────────────────────── Rn = R1
//!   │       │    │    │     └───────────────────────────────── S = 0 (no flags)
//!   │       │    │    └─────────────────────────────────────── ADD opcode
//!   │       │    └──────────────────────────────────────────── Register operand
//!   │       └───────────────────────────────────────────────── Data processing
//!   └───────────────────────────────────────────────────────── Always execute
//! ```

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::arm::alu_instruction::{
    AluSecondOperandInfo, ArmModeAluInstr, PsrKind, PsrOpKind, ShiftOperator,
};
use crate::cpu::condition::Condition;
use crate::cpu::flags::{
    HalfwordDataTransferOffsetKind, HalfwordTransferKind, Indexing, LoadStoreKind, Offsetting,
    OperandKind, ReadWriteKind, ShiftKind,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum SingleDataTransferOffsetInfo {
    Immediate {
        offset: u32,
    },
    RegisterImmediate {
        shift_amount: u32,
        shift_kind: ShiftKind,
        reg_offset: u32,
    },
}

impl SingleDataTransferOffsetInfo {
    fn disassemble(self, sign: &str) -> String {
        match self {
            Self::Immediate { offset } => format!("#{sign}{offset}"),
            Self::RegisterImmediate {
                shift_amount,
                shift_kind,
                reg_offset,
            } => {
                let operand = AluSecondOperandInfo::Register {
                    shift_op: ShiftOperator::Immediate(shift_amount),
                    shift_kind,
                    register: reg_offset,
                };
                format!("{sign}{operand}")
            }
        }
    }

    const fn is_zero(self) -> bool {
        matches!(self, Self::Immediate { offset: 0 })
    }
}

/// All ARM instruction types after decoding.
///
/// | Variant                | Example Instructions       | Description                    |
/// |------------------------|----------------------------|--------------------------------|
/// | `DataProcessing`       | AND, ADD, CMP, MOV         | ALU operations                 |
/// | `Multiply`             | MUL, MLA                   | 32-bit multiply                |
/// | `MultiplyLong`         | UMULL, SMULL               | 64-bit multiply                |
/// | `PSRTransfer`          | MRS, MSR                   | Status register access         |
/// | `SingleDataSwap`       | SWP, SWPB                  | Atomic memory swap             |
/// | `BranchAndExchange`    | BX, BLX                    | Branch + possible ARM↔Thumb    |
/// | `CountLeadingZeros`    | CLZ                        | Leading zero count             |
/// | `HalfwordDataTransfer` | LDRH, STRH, LDRSB          | 16-bit and signed loads        |
/// | `SingleDataTransfer`   | LDR, STR, LDRB             | 32-bit and byte loads/stores   |
/// | `BlockDataTransfer`    | LDM, STM                   | Multiple register load/store   |
/// | `Branch`               | B, BL                      | Branch (and link)              |
/// | `BranchLinkExchange`   | BLX <target>               | Branch, link, enter Thumb      |
/// | `Coprocessor`          | LDC, CDP, MCR              | Not emulated                   |
/// | `SoftwareInterrupt`    | SWI                        | Supervisor call                |
/// | `Undefined`            | -                          | Triggers undefined exception   |
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum ArmModeInstruction {
    DataProcessing {
        condition: Condition,
        alu_instruction: ArmModeAluInstr,
        set_conditions: bool,
        op_kind: OperandKind,
        rn: u32,
        destination: u32,
        op2: AluSecondOperandInfo,
    },
    Multiply {
        variant: ArmModeMultiplyVariant,
        condition: Condition,
        should_set_codes: bool,
        rd_destination_register: u32,
        rn_accumulate_register: u32,
        rs_operand_register: u32,
        rm_operand_register: u32,
    },
    MultiplyLong {
        variant: ArmModeMultiplyLongVariant,
        condition: Condition,
        should_set_codes: bool,
        rdhi_destination_register: u32,
        rdlo_destination_register: u32,
        rs_operand_register: u32,
        rm_operand_register: u32,
    },
    PSRTransfer {
        condition: Condition,
        psr_kind: PsrKind,
        kind: PsrOpKind,
    },
    SingleDataSwap {
        condition: Condition,
        quantity: ReadWriteKind,
        rn: u32,
        rd: u32,
        rm: u32,
    },
    BranchAndExchange {
        condition: Condition,
        link: bool,
        register: u32,
    },
    CountLeadingZeros {
        condition: Condition,
        rd: u32,
        rm: u32,
    },
    HalfwordDataTransfer {
        condition: Condition,
        indexing: Indexing,
        offsetting: Offsetting,
        write_back: bool,
        load_store_kind: LoadStoreKind,
        offset_kind: HalfwordDataTransferOffsetKind,
        base_register: u32,
        source_destination_register: u32,
        transfer_kind: HalfwordTransferKind,
    },
    SingleDataTransfer {
        condition: Condition,
        kind: LoadStoreKind,
        quantity: ReadWriteKind,
        write_back: bool,
        indexing: Indexing,
        rd: u32,
        base_register: u32,
        offset_info: SingleDataTransferOffsetInfo,
        offsetting: Offsetting,
    },
    BlockDataTransfer {
        condition: Condition,
        indexing: Indexing,
        offsetting: Offsetting,
        load_psr: bool,
        write_back: bool,
        load_store: LoadStoreKind,
        rn: u32,
        register_list: u32,
    },
    Branch {
        condition: Condition,
        link: bool,
        /// The 24-bit field shifted left by two, not yet sign extended.
        offset: u32,
    },
    /// `BLX <target>`: always links and always switches to Thumb.
    BranchLinkExchange {
        condition: Condition,
        /// Like [`Self::Branch`], with the H bit folded into bit 1.
        offset: u32,
    },
    Coprocessor {
        condition: Condition,
        cp_number: u32,
    },
    SoftwareInterrupt {
        condition: Condition,
        comment: u32,
    },
    Undefined,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmModeMultiplyVariant {
    Mul,
    Mla,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmModeMultiplyLongVariant {
    Umull,
    Umlal,
    Smull,
    Smlal,
}

impl std::fmt::Display for ArmModeMultiplyLongVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Umull => f.write_str("UMULL"),
            Self::Umlal => f.write_str("UMLAL"),
            Self::Smull => f.write_str("SMULL"),
            Self::Smlal => f.write_str("SMLAL"),
        }
    }
}

impl From<u32> for ArmModeMultiplyLongVariant {
    fn from(op_code: u32) -> Self {
        match (op_code.get_bit(22), op_code.get_bit(21)) {
            (false, false) => Self::Umull,
            (false, true) => Self::Umlal,
            (true, false) => Self::Smull,
            (true, true) => Self::Smlal,
        }
    }
}

fn psr_field_suffix(field_mask: u32) -> String {
    ['c', 'x', 's', 'f']
        .into_iter()
        .enumerate()
        .filter(|(i, _)| field_mask.get_bit(*i as u8))
        .map(|(_, c)| c)
        .collect()
}

impl ArmModeInstruction {
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn disassembler(&self) -> String {
        match self {
            Self::DataProcessing {
                condition,
                alu_instruction,
                set_conditions,
                op_kind: _,
                rn,
                destination,
                op2,
            } => {
                let set_string = if *set_conditions { "S" } else { "" };
                match alu_instruction {
                    ArmModeAluInstr::And
                    | ArmModeAluInstr::Eor
                    | ArmModeAluInstr::Sub
                    | ArmModeAluInstr::Rsb
                    | ArmModeAluInstr::Add
                    | ArmModeAluInstr::Adc
                    | ArmModeAluInstr::Sbc
                    | ArmModeAluInstr::Rsc
                    | ArmModeAluInstr::Orr
                    | ArmModeAluInstr::Bic => {
                        format!(
                            "{alu_instruction}{condition}{set_string} R{destination}, R{rn}, {op2}"
                        )
                    }
                    ArmModeAluInstr::Tst
                    | ArmModeAluInstr::Teq
                    | ArmModeAluInstr::Cmp
                    | ArmModeAluInstr::Cmn => {
                        format!("{alu_instruction}{condition} R{rn}, {op2}")
                    }
                    ArmModeAluInstr::Mov | ArmModeAluInstr::Mvn => {
                        format!("{alu_instruction}{condition}{set_string} R{destination}, {op2}")
                    }
                }
            }
            Self::Multiply {
                variant,
                condition,
                should_set_codes,
                rd_destination_register,
                rn_accumulate_register,
                rs_operand_register,
                rm_operand_register,
            } => {
                let s = if *should_set_codes { "S" } else { "" };
                let (rd, rm, rs) = (
                    rd_destination_register,
                    rm_operand_register,
                    rs_operand_register,
                );
                match variant {
                    ArmModeMultiplyVariant::Mul => format!("MUL{condition}{s} R{rd}, R{rm}, R{rs}"),
                    ArmModeMultiplyVariant::Mla => format!(
                        "MLA{condition}{s} R{rd}, R{rm}, R{rs}, R{rn_accumulate_register}"
                    ),
                }
            }
            Self::MultiplyLong {
                variant,
                condition,
                should_set_codes,
                rdhi_destination_register,
                rdlo_destination_register,
                rs_operand_register,
                rm_operand_register,
            } => {
                let s = if *should_set_codes { "S" } else { "" };
                let (rdlo, rdhi) = (rdlo_destination_register, rdhi_destination_register);
                let (rm, rs) = (rm_operand_register, rs_operand_register);
                format!("{variant}{condition}{s} R{rdlo}, R{rdhi}, R{rm}, R{rs}")
            }
            Self::PSRTransfer {
                condition,
                psr_kind,
                kind,
            } => match kind {
                PsrOpKind::Mrs {
                    destination_register,
                } => {
                    format!("MRS{condition} R{destination_register}, {psr_kind}")
                }
                PsrOpKind::Msr {
                    field_mask,
                    operand,
                } => {
                    let fields = psr_field_suffix(*field_mask);
                    format!("MSR{condition} {psr_kind}_{fields}, {operand}")
                }
            },
            Self::SingleDataSwap {
                condition,
                quantity,
                rn,
                rd,
                rm,
            } => {
                let b = match quantity {
                    ReadWriteKind::Word => "",
                    ReadWriteKind::Byte => "B",
                };
                format!("SWP{condition}{b} R{rd}, R{rm}, [R{rn}]")
            }
            Self::BranchAndExchange {
                condition,
                link,
                register,
            } => {
                let l = if *link { "L" } else { "" };
                format!("B{l}X{condition} R{register}")
            }
            Self::CountLeadingZeros { condition, rd, rm } => format!("CLZ{condition} R{rd}, R{rm}"),
            Self::HalfwordDataTransfer {
                condition,
                indexing,
                offsetting,
                load_store_kind,
                transfer_kind,
                source_destination_register,
                offset_kind,
                base_register,
                write_back,
            } => {
                let sign = match offsetting {
                    Offsetting::Up => "",
                    Offsetting::Down => "-",
                };

                let offset = match offset_kind {
                    HalfwordDataTransferOffsetKind::Immediate { offset } => {
                        if *offset == 0 {
                            String::new()
                        } else {
                            format!(", #{sign}{offset}")
                        }
                    }
                    HalfwordDataTransferOffsetKind::Register { register } => {
                        format!(", {sign}R{register}")
                    }
                };

                let w = if *write_back { "!" } else { "" };

                let address = match indexing {
                    Indexing::Pre => {
                        format!("[R{base_register}{offset}]{w}")
                    }
                    Indexing::Post => {
                        format!("[R{base_register}]{offset}")
                    }
                };

                let rd = source_destination_register;
                format!("{load_store_kind}{condition}{transfer_kind} R{rd}, {address}")
            }
            Self::SingleDataTransfer {
                condition,
                kind,
                quantity,
                write_back,
                indexing,
                rd,
                base_register,
                offset_info,
                offsetting,
            } => {
                let b = match quantity {
                    ReadWriteKind::Word => "",
                    ReadWriteKind::Byte => "B",
                };
                let sign = match offsetting {
                    Offsetting::Up => "",
                    Offsetting::Down => "-",
                };
                let offset = offset_info.disassemble(sign);

                let w = if *write_back { "!" } else { "" };
                let address = match indexing {
                    Indexing::Pre if offset_info.is_zero() => format!("[R{base_register}]{w}"),
                    Indexing::Pre => format!("[R{base_register}, {offset}]{w}"),
                    Indexing::Post => format!("[R{base_register}], {offset}"),
                };

                format!("{kind}{condition}{b} R{rd}, {address}")
            }
            Self::BlockDataTransfer {
                condition,
                indexing,
                offsetting,
                load_psr,
                write_back,
                load_store,
                rn,
                register_list,
            } => {
                let op = match load_store {
                    LoadStoreKind::Store => "STM",
                    LoadStoreKind::Load => "LDM",
                };

                let offset_modifier = match offsetting {
                    Offsetting::Down => "D",
                    Offsetting::Up => "I",
                };
                let index_type = match indexing {
                    Indexing::Pre => "B",
                    Indexing::Post => "A",
                };

                let registers = (0..=15)
                    .filter(|i| register_list.get_bit(*i))
                    .map(|i| format!("R{i}"))
                    .collect::<Vec<_>>()
                    .join(", ");

                let w = if *write_back { "!" } else { "" };
                let f = if *load_psr { "^" } else { "" };
                format!("{op}{condition}{offset_modifier}{index_type} R{rn}{w}, {{{registers}}}{f}")
            }
            Self::Branch {
                condition,
                link,
                offset,
            } => {
                let link = if *link { "L" } else { "" };
                let offset = offset.sign_extended(26);
                format!("B{link}{condition} 0x{offset:08X}")
            }
            Self::BranchLinkExchange { condition: _, offset } => {
                format!("BLX 0x{:08X}", offset.sign_extended(26))
            }
            Self::Coprocessor {
                condition,
                cp_number,
            } => format!("CP{condition} p{cp_number}"),
            Self::SoftwareInterrupt { condition, comment } => {
                format!("SWI{condition} 0x{comment:06X}")
            }
            Self::Undefined => "UND".to_string(),
        }
    }

    fn decode_multiply_and_transfer_extensions(op_code: u32, condition: Condition) -> Self {
        let sh_bits = op_code.get_bits(5..=6);

        if sh_bits != 0b00 {
            let load_store_kind: LoadStoreKind = op_code.get_bit(20).into();
            let Ok(transfer_kind) = HalfwordTransferKind::try_from(sh_bits) else {
                return Self::Undefined;
            };

            // Signed stores are doubleword transfers, introduced after ARMv5T.
            if load_store_kind == LoadStoreKind::Store
                && transfer_kind != HalfwordTransferKind::UnsignedHalfwords
            {
                return Self::Undefined;
            }

            let operand_kind: OperandKind = op_code.get_bit(22).into();
            let offset_kind = match operand_kind {
                OperandKind::Register => HalfwordDataTransferOffsetKind::Register {
                    register: op_code.get_bits(0..=3),
                },
                OperandKind::Immediate => {
                    let immediate_offset_high = op_code.get_bits(8..=11);
                    let immediate_offset_low = op_code.get_bits(0..=3);
                    HalfwordDataTransferOffsetKind::Immediate {
                        offset: (immediate_offset_high << 4) | immediate_offset_low,
                    }
                }
            };

            return Self::HalfwordDataTransfer {
                condition,
                indexing: op_code.get_bit(24).into(),
                offsetting: op_code.get_bit(23).into(),
                write_back: op_code.get_bit(21),
                load_store_kind,
                offset_kind,
                base_register: op_code.get_bits(16..=19),
                source_destination_register: op_code.get_bits(12..=15),
                transfer_kind,
            };
        }

        let should_set_codes = op_code.get_bit(20);
        let rm_operand_register = op_code.get_bits(0..=3);
        let rs_operand_register = op_code.get_bits(8..=11);

        match op_code.get_bits(23..=24) {
            0b00 if !op_code.get_bit(22) => Self::Multiply {
                variant: if op_code.get_bit(21) {
                    ArmModeMultiplyVariant::Mla
                } else {
                    ArmModeMultiplyVariant::Mul
                },
                condition,
                should_set_codes,
                rd_destination_register: op_code.get_bits(16..=19),
                rn_accumulate_register: op_code.get_bits(12..=15),
                rs_operand_register,
                rm_operand_register,
            },
            0b01 => Self::MultiplyLong {
                variant: ArmModeMultiplyLongVariant::from(op_code),
                condition,
                should_set_codes,
                rdhi_destination_register: op_code.get_bits(16..=19),
                rdlo_destination_register: op_code.get_bits(12..=15),
                rs_operand_register,
                rm_operand_register,
            },
            0b10 if op_code.get_bits(20..=21) == 0b00 && op_code.get_bits(8..=11) == 0 => {
                Self::SingleDataSwap {
                    condition,
                    quantity: op_code.get_bit(22).into(),
                    rn: op_code.get_bits(16..=19),
                    rd: op_code.get_bits(12..=15),
                    rm: rm_operand_register,
                }
            }
            _ => Self::Undefined,
        }
    }

    fn decode_miscellaneous(op_code: u32, condition: Condition) -> Self {
        let psr_kind = PsrKind::from(op_code.get_bit(22));
        match (op_code.get_bits(4..=7), op_code.get_bits(21..=22)) {
            (0b0000, 0b00 | 0b10) => Self::PSRTransfer {
                condition,
                psr_kind,
                kind: PsrOpKind::Mrs {
                    destination_register: op_code.get_bits(12..=15),
                },
            },
            (0b0000, 0b01 | 0b11) => Self::PSRTransfer {
                condition,
                psr_kind,
                kind: PsrOpKind::Msr {
                    field_mask: op_code.get_bits(16..=19),
                    operand: AluSecondOperandInfo::Register {
                        shift_op: ShiftOperator::Immediate(0),
                        shift_kind: ShiftKind::Lsl,
                        register: op_code.get_bits(0..=3),
                    },
                },
            },
            (0b0001, 0b01) => Self::BranchAndExchange {
                condition,
                link: false,
                register: op_code.get_bits(0..=3),
            },
            (0b0011, 0b01) => Self::BranchAndExchange {
                condition,
                link: true,
                register: op_code.get_bits(0..=3),
            },
            (0b0001, 0b11) => Self::CountLeadingZeros {
                condition,
                rd: op_code.get_bits(12..=15),
                rm: op_code.get_bits(0..=3),
            },
            _ => {
                tracing::debug!("undefined miscellaneous instruction: opcode=0x{op_code:08X}");
                Self::Undefined
            }
        }
    }

    fn decode_data_processing(op_code: u32, condition: Condition) -> Self {
        let op_kind: OperandKind = op_code.get_bit(25).into();

        let op2 = match op_kind {
            OperandKind::Immediate => AluSecondOperandInfo::Immediate {
                base: op_code.get_bits(0..=7),
                shift: op_code.get_bits(8..=11) * 2,
            },
            OperandKind::Register => {
                let shift_op = if op_code.get_bit(4) {
                    ShiftOperator::Register(op_code.get_bits(8..=11))
                } else {
                    ShiftOperator::Immediate(op_code.get_bits(7..=11))
                };
                AluSecondOperandInfo::Register {
                    shift_op,
                    shift_kind: op_code.get_bits(5..=6).into(),
                    register: op_code.get_bits(0..=3),
                }
            }
        };

        Self::DataProcessing {
            condition,
            alu_instruction: op_code.get_bits(21..=24).into(),
            set_conditions: op_code.get_bit(20),
            op_kind,
            rn: op_code.get_bits(16..=19),
            destination: op_code.get_bits(12..=15),
            op2,
        }
    }

    fn decode_single_data_transfer(op_code: u32, condition: Condition) -> Self {
        // I=0 selects the immediate offset here, the reverse of data processing.
        let op_kind: OperandKind = (!op_code.get_bit(25)).into();

        let offset_info = match op_kind {
            OperandKind::Immediate => SingleDataTransferOffsetInfo::Immediate {
                offset: op_code.get_bits(0..=11),
            },
            OperandKind::Register => SingleDataTransferOffsetInfo::RegisterImmediate {
                shift_amount: op_code.get_bits(7..=11),
                shift_kind: op_code.get_bits(5..=6).into(),
                reg_offset: op_code.get_bits(0..=3),
            },
        };

        Self::SingleDataTransfer {
            condition,
            kind: op_code.get_bit(20).into(),
            quantity: op_code.get_bit(22).into(),
            write_back: op_code.get_bit(21),
            indexing: op_code.get_bit(24).into(),
            rd: op_code.get_bits(12..=15),
            base_register: op_code.get_bits(16..=19),
            offset_info,
            offsetting: op_code.get_bit(23).into(),
        }
    }
}

impl From<u32> for ArmModeInstruction {
    fn from(op_code: u32) -> Self {
        let condition = Condition::from(op_code.get_bits(28..=31) as u8);
        let unconditional_space = condition == Condition::Unconditional;
        let is_miscellaneous = op_code.get_bits(23..=24) == 0b10 && !op_code.get_bit(20);

        match op_code.get_bits(25..=27) {
            0b000 | 0b001 if unconditional_space => Self::Undefined,
            0b000 if op_code.get_bit(7) && op_code.get_bit(4) => {
                Self::decode_multiply_and_transfer_extensions(op_code, condition)
            }
            0b000 if is_miscellaneous => Self::decode_miscellaneous(op_code, condition),
            0b001 if is_miscellaneous => {
                if op_code.get_bit(21) {
                    Self::PSRTransfer {
                        condition,
                        psr_kind: PsrKind::from(op_code.get_bit(22)),
                        kind: PsrOpKind::Msr {
                            field_mask: op_code.get_bits(16..=19),
                            operand: AluSecondOperandInfo::Immediate {
                                base: op_code.get_bits(0..=7),
                                shift: op_code.get_bits(8..=11) * 2,
                            },
                        },
                    }
                } else {
                    Self::Undefined
                }
            }
            0b000 | 0b001 => Self::decode_data_processing(op_code, condition),
            0b011 if op_code.get_bit(4) => {
                tracing::debug!("register offset with bit 4 set is undefined: 0x{op_code:08X}");
                Self::Undefined
            }
            0b010 | 0b011 => Self::decode_single_data_transfer(op_code, condition),
            0b100 => Self::BlockDataTransfer {
                condition,
                indexing: op_code.get_bit(24).into(),
                offsetting: op_code.get_bit(23).into(),
                load_psr: op_code.get_bit(22),
                write_back: op_code.get_bit(21),
                load_store: op_code.get_bit(20).into(),
                rn: op_code.get_bits(16..=19),
                register_list: op_code.get_bits(0..=15),
            },
            0b101 if unconditional_space => Self::BranchLinkExchange {
                condition,
                offset: (op_code.get_bits(0..=23) << 2) | (u32::from(op_code.get_bit(24)) << 1),
            },
            0b101 => Self::Branch {
                condition,
                link: op_code.get_bit(24),
                offset: op_code.get_bits(0..=23) << 2,
            },
            0b111 if op_code.get_bit(24) => Self::SoftwareInterrupt {
                condition,
                comment: op_code.get_bits(0..=23),
            },
            _ => Self::Coprocessor {
                condition,
                cp_number: op_code.get_bits(8..=11),
            },
        }
    }
}
