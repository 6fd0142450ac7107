use crate::bitwise::Bits;
use crate::cpu::arm::instructions::ArmModeInstruction;
use crate::cpu::condition::Condition;

/// A fetched word together with its decoded form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmModeOpcode {
    pub instruction: ArmModeInstruction,
    pub condition: Condition,
    pub raw: u32,
}

impl From<u32> for ArmModeOpcode {
    fn from(op_code: u32) -> Self {
        Self {
            instruction: ArmModeInstruction::from(op_code),
            condition: Condition::from(op_code.get_bits(28..=31) as u8),
            raw: op_code,
        }
    }
}
