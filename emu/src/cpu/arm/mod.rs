//! # ARMv5T instruction classes
//!
//! The decoder sorts a word by bits 27-25 first and then looks at the few
//! extra bits that split each group:
//!
//! | 27-25 | Split on            | Classes                                     |
//! |-------|---------------------|---------------------------------------------|
//! | `000` | bits 7 and 4        | MUL/MLA, long multiplies, SWP, LDRH/STRH    |
//! |       | bits 24-23, 20      | MRS/MSR, BX/BLX, CLZ                        |
//! |       | otherwise           | data processing, register operand           |
//! | `001` | bits 24-23, 20      | MSR immediate, data processing immediate    |
//! | `01x` | bit 4 with I=1      | LDR/STR/LDRB/STRB, undefined                |
//! | `100` | bit 22              | LDM/STM, undefined with S set               |
//! | `101` |                     | B/BL                                        |
//! | `11x` | bits 27-24          | coprocessor (undefined here), SWI           |
//!
//! [`mode::ArmModeOpcode`] pairs the decoded [`instructions::ArmModeInstruction`]
//! with the raw word; [`operations`] executes it against the
//! [`Simulator`](super::armv5t::Simulator) and [`alu_instruction`] holds the
//! ALU and barrel shifter.

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
#[allow(clippy::cast_lossless)]
pub mod alu_instruction;

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::similar_names)]
pub mod instructions;

#[allow(clippy::cast_possible_truncation)]
pub mod mode;

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
#[allow(clippy::cast_lossless)]
#[allow(clippy::similar_names)]
pub mod operations;
