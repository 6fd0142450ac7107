use crate::bitwise::Bits;
use crate::cpu::arm::alu_instruction::{
    AluInstructionKind, AluSecondOperandInfo, ArithmeticOpResult, ArmModeAluInstr, Kind, PsrKind,
    PsrOpKind, ShiftOperator, rotate_immediate, shift, shift_immediate,
};
use crate::cpu::arm::instructions::{
    ArmModeMultiplyLongVariant, ArmModeMultiplyVariant, SingleDataTransferOffsetInfo,
};
use crate::cpu::armv5t::{SIZE_OF_ARM_INSTRUCTION, Simulator};
use crate::cpu::exception::Exception;
use crate::cpu::flags::{
    HalfwordDataTransferOffsetKind, HalfwordTransferKind, Indexing, LoadStoreKind, Offsetting,
    ReadWriteKind,
};
use crate::cpu::psr::{CpuState, Psr};
use crate::cpu::register_bank::{REG_LR, REG_PROGRAM_COUNTER};

/// What each execution unit hands back to `execute`: how many bytes PC
/// still has to advance, `None` when the instruction wrote PC itself.
type Advance = Result<Option<u32>, Exception>;

impl Simulator {
    pub fn data_processing(
        &mut self,
        alu_instruction: ArmModeAluInstr,
        set_conditions: bool,
        rn: u32,
        destination: u32,
        op2: AluSecondOperandInfo,
    ) -> Advance {
        let carry = self.registers.cpsr().carry_flag();
        let shifter = self.shifter_operand(op2, carry);
        let op1 = self.read_operand(rn);

        let op_result = alu_instruction.compute(op1, shifter.result, carry, shifter.carry);

        // Test instructions do not modify destination so they never branch.
        let advance = if alu_instruction.is_test() {
            Some(SIZE_OF_ARM_INSTRUCTION)
        } else {
            self.write_result(destination, op_result.result)
        };

        if set_conditions {
            let mode = self.registers.current_mode();
            if destination as usize == REG_PROGRAM_COUNTER
                && !alu_instruction.is_test()
                && mode.has_spsr()
            {
                // Return from exception: the saved status comes back.
                let spsr = self.registers.spsr(mode)?;
                self.registers.write_cpsr(spsr.into());
            } else {
                self.set_alu_flags(alu_instruction, &op_result);
            }
        }

        Ok(advance)
    }

    fn set_alu_flags(&mut self, alu_instruction: ArmModeAluInstr, op_result: &ArithmeticOpResult) {
        let cpsr = self.registers.cpsr_mut();
        match alu_instruction.kind() {
            AluInstructionKind::Logical => {
                cpsr.set_sign_flag(op_result.sign);
                cpsr.set_zero_flag(op_result.zero);
                cpsr.set_carry_flag(op_result.carry);
            }
            AluInstructionKind::Arithmetic => cpsr.set_flags(op_result),
        }
    }

    /// Resolves the second operand of a data processing instruction.
    ///
    /// Only `result` and `carry` of the returned value are meaningful.
    pub fn shifter_operand(&self, op2: AluSecondOperandInfo, carry: bool) -> ArithmeticOpResult {
        match op2 {
            AluSecondOperandInfo::Immediate { base, shift } => rotate_immediate(base, shift, carry),
            AluSecondOperandInfo::Register {
                shift_op,
                shift_kind,
                register,
            } => {
                let rm = self.read_operand(register);
                match shift_op {
                    ShiftOperator::Immediate(amount) => {
                        shift_immediate(shift_kind, amount, rm, carry)
                    }
                    ShiftOperator::Register(rs) => {
                        let amount = self.read_operand(rs).get_bits(0..=7);
                        shift(shift_kind, amount, rm, carry)
                    }
                }
            }
        }
    }

    pub fn psr_transfer(&mut self, op_kind: PsrOpKind, psr_kind: PsrKind) -> Advance {
        let mode = self.registers.current_mode();

        match op_kind {
            PsrOpKind::Mrs {
                destination_register,
            } => {
                let psr = match psr_kind {
                    PsrKind::Cpsr => self.registers.read_cpsr(),
                    PsrKind::Spsr => self.registers.read_spsr(mode)?,
                };

                Ok(self.write_result(destination_register, psr))
            }
            PsrOpKind::Msr {
                field_mask,
                operand,
            } => {
                let value = match operand {
                    AluSecondOperandInfo::Immediate { base, shift } => base.rotate_right(shift),
                    AluSecondOperandInfo::Register { register, .. } => self.read_operand(register),
                };

                if value & Psr::UNALLOC_MASK != 0 {
                    tracing::debug!("MSR writes reserved PSR bits: 0x{value:08X}");
                    return Err(Exception::UndefinedInstruction);
                }

                let byte_mask = PsrOpKind::byte_mask(field_mask);

                match psr_kind {
                    PsrKind::Cpsr => {
                        if value & Psr::STATE_MASK != 0 {
                            tracing::debug!("MSR tries to set the T bit");
                            return Err(Exception::UndefinedInstruction);
                        }

                        let writable = if mode.is_privileged() {
                            Psr::USER_MASK | Psr::PRIV_MASK
                        } else {
                            Psr::USER_MASK
                        };
                        let mask = byte_mask & writable;
                        let new_cpsr = (self.registers.read_cpsr() & !mask) | (value & mask);

                        if Psr::from(new_cpsr).try_mode().is_err() {
                            tracing::debug!("MSR leaves invalid mode bits: 0x{new_cpsr:08X}");
                            return Err(Exception::UndefinedInstruction);
                        }

                        self.registers.write_cpsr(new_cpsr);
                    }
                    PsrKind::Spsr => {
                        let mask = byte_mask & (Psr::USER_MASK | Psr::PRIV_MASK | Psr::STATE_MASK);
                        let spsr = self.registers.read_spsr(mode)?;
                        self.registers
                            .write_spsr(mode, (spsr & !mask) | (value & mask))?;
                    }
                }

                Ok(Some(SIZE_OF_ARM_INSTRUCTION))
            }
        }
    }

    pub fn branch(&mut self, is_link: bool, offset: u32) -> Option<u32> {
        let address = self.registers.program_counter();
        if is_link {
            self.registers.write_current(
                REG_LR,
                address.wrapping_add(SIZE_OF_ARM_INSTRUCTION),
            );
        }

        let new_pc = self
            .read_operand(REG_PROGRAM_COUNTER as u32)
            .wrapping_add(offset.sign_extended(26));
        self.registers.set_program_counter(new_pc);

        None
    }

    /// The next fetch happens in Thumb state.
    pub fn branch_link_exchange(&mut self, offset: u32) -> Option<u32> {
        let advance = self.branch(true, offset);
        self.registers.cpsr_mut().set_cpu_state(CpuState::Thumb);
        advance
    }

    pub fn branch_and_exchange(&mut self, is_link: bool, register: u32) -> Option<u32> {
        let target = self.read_operand(register);
        if is_link {
            let address = self.registers.program_counter();
            self.registers.write_current(
                REG_LR,
                address.wrapping_add(SIZE_OF_ARM_INSTRUCTION),
            );
        }

        self.registers
            .cpsr_mut()
            .set_cpu_state(target.get_bit(0).into());
        self.registers.set_program_counter(target & !1);

        None
    }

    pub fn count_leading_zeros(&mut self, rd: u32, rm: u32) -> Option<u32> {
        let value = self.read_operand(rm);
        self.write_result(rd, value.leading_zeros())
    }

    pub fn multiply(
        &mut self,
        mul_variant: ArmModeMultiplyVariant,
        set_condition_codes: bool,
        rd: u32,
        rn: u32,
        rs: u32,
        rm: u32,
    ) -> Option<u32> {
        let mut result = self.read_operand(rm).wrapping_mul(self.read_operand(rs));
        if mul_variant == ArmModeMultiplyVariant::Mla {
            result = result.wrapping_add(self.read_operand(rn));
        }

        let advance = self.write_result(rd, result);

        if set_condition_codes {
            let cpsr = self.registers.cpsr_mut();
            cpsr.set_zero_flag(result == 0);
            cpsr.set_sign_flag(result.get_bit(31));
        }

        advance
    }

    pub fn multiply_long(
        &mut self,
        mul_variant: ArmModeMultiplyLongVariant,
        set_condition_codes: bool,
        rdhi: u32,
        rdlo: u32,
        rs: u32,
        rm: u32,
    ) -> Option<u32> {
        use ArmModeMultiplyLongVariant::{Smlal, Smull, Umlal, Umull};

        let rm_value = self.read_operand(rm);
        let rs_value = self.read_operand(rs);

        let product = match mul_variant {
            Umull | Umlal => u64::from(rm_value).wrapping_mul(u64::from(rs_value)),
            Smull | Smlal => {
                i64::from(rm_value as i32).wrapping_mul(i64::from(rs_value as i32)) as u64
            }
        };

        let result = if matches!(mul_variant, Umlal | Smlal) {
            let accumulator =
                (u64::from(self.read_operand(rdhi)) << 32) | u64::from(self.read_operand(rdlo));
            product.wrapping_add(accumulator)
        } else {
            product
        };

        let low = self.write_result(rdlo, result as u32);
        let high = self.write_result(rdhi, (result >> 32) as u32);

        if set_condition_codes {
            let cpsr = self.registers.cpsr_mut();
            cpsr.set_zero_flag(result == 0);
            cpsr.set_sign_flag(result.get_bit(63));
        }

        low.and(high)
    }

    pub fn single_data_swap(
        &mut self,
        quantity: ReadWriteKind,
        rn: u32,
        rd: u32,
        rm: u32,
    ) -> Advance {
        let address = self.read_operand(rn);
        let source = self.read_operand(rm);
        let endianness = self.config().endianness;

        let old = match quantity {
            ReadWriteKind::Word => {
                let old = self.memory.read_word(address, endianness)?;
                self.memory.write_word(address, source, endianness)?;
                old
            }
            ReadWriteKind::Byte => {
                let old = self.memory.read_byte(address)?;
                self.memory.write_byte(address, source as u8)?;
                u32::from(old)
            }
        };

        Ok(self.write_result(rd, old))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn half_word_data_transfer(
        &mut self,
        indexing: Indexing,
        offsetting: Offsetting,
        write_back: bool,
        load_store_kind: LoadStoreKind,
        offset_kind: HalfwordDataTransferOffsetKind,
        base_register: u32,
        source_destination_register: u32,
        transfer_kind: HalfwordTransferKind,
    ) -> Advance {
        let offset = match offset_kind {
            HalfwordDataTransferOffsetKind::Immediate { offset } => offset,
            HalfwordDataTransferOffsetKind::Register { register } => self.read_operand(register),
        };

        let base = self.read_operand(base_register);
        let effective = offsetting.apply(base, offset);
        let address = match indexing {
            Indexing::Pre => effective,
            Indexing::Post => base,
        };
        let endianness = self.config().endianness;

        match load_store_kind {
            LoadStoreKind::Store => {
                let value = self.read_operand(source_destination_register);
                self.memory
                    .write_half_word(address, value as u16, endianness)?;

                Ok(self.write_back(indexing, write_back, base_register, effective))
            }
            LoadStoreKind::Load => {
                let value = match transfer_kind {
                    HalfwordTransferKind::UnsignedHalfwords => {
                        u32::from(self.memory.read_half_word(address, endianness)?)
                    }
                    HalfwordTransferKind::SignedByte => {
                        u32::from(self.memory.read_byte(address)?).sign_extended(8)
                    }
                    HalfwordTransferKind::SignedHalfwords => {
                        u32::from(self.memory.read_half_word(address, endianness)?)
                            .sign_extended(16)
                    }
                };

                let base_advance = self.write_back(indexing, write_back, base_register, effective);
                let advance = self.write_loaded(source_destination_register, value);
                Ok(base_advance.and(advance))
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn single_data_transfer(
        &mut self,
        kind: LoadStoreKind,
        quantity: ReadWriteKind,
        write_back: bool,
        indexing: Indexing,
        rd: u32,
        base_register: u32,
        offset_info: SingleDataTransferOffsetInfo,
        offsetting: Offsetting,
    ) -> Advance {
        let base = self.read_operand(base_register);

        let amount = match offset_info {
            SingleDataTransferOffsetInfo::Immediate { offset } => offset,
            SingleDataTransferOffsetInfo::RegisterImmediate {
                shift_amount,
                shift_kind,
                reg_offset,
            } => {
                let v = self.read_operand(reg_offset);
                let carry = self.registers.cpsr().carry_flag();
                shift_immediate(shift_kind, shift_amount, v, carry).result
            }
        };

        let offset_address = offsetting.apply(base, amount);
        let address = match indexing {
            Indexing::Pre => offset_address,
            Indexing::Post => base,
        };
        let endianness = self.config().endianness;

        match kind {
            LoadStoreKind::Store => {
                let value = self.read_operand(rd);
                match quantity {
                    ReadWriteKind::Byte => self.memory.write_byte(address, value as u8)?,
                    ReadWriteKind::Word => self.memory.write_word(address, value, endianness)?,
                }

                Ok(self.write_back(indexing, write_back, base_register, offset_address))
            }
            LoadStoreKind::Load => {
                let value = match quantity {
                    ReadWriteKind::Byte => u32::from(self.memory.read_byte(address)?),
                    ReadWriteKind::Word => self.memory.read_word(address, endianness)?,
                };

                // Base first, so that a load into the base register keeps the loaded value.
                let base_advance =
                    self.write_back(indexing, write_back, base_register, offset_address);
                let advance = self.write_loaded(rd, value);
                Ok(base_advance.and(advance))
            }
        }
    }

    /// Post-indexed transfers always write back, pre-indexed ones only with W.
    fn write_back(
        &mut self,
        indexing: Indexing,
        write_back: bool,
        base_register: u32,
        address: u32,
    ) -> Option<u32> {
        if indexing == Indexing::Post || write_back {
            self.write_result(base_register, address)
        } else {
            Some(SIZE_OF_ARM_INSTRUCTION)
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn block_data_transfer(
        &mut self,
        indexing: Indexing,
        offsetting: Offsetting,
        load_psr: bool,
        write_back: bool,
        load_store: LoadStoreKind,
        rn: u32,
        reg_list: u32,
    ) -> Advance {
        if load_psr {
            tracing::debug!("LDM/STM with S bit is not supported");
            return Err(Exception::UndefinedInstruction);
        }
        if reg_list == 0 {
            tracing::debug!("LDM/STM with an empty register list");
            return Err(Exception::UndefinedInstruction);
        }

        let base = self.read_operand(rn);
        let endianness = self.config().endianness;
        let mut address = base;
        let mut advance = Some(SIZE_OF_ARM_INSTRUCTION);

        // Registers are always walked from R0 up, whatever the direction.
        for register in (0..=15_u8).filter(|r| reg_list.get_bit(*r)) {
            if indexing == Indexing::Pre {
                address = offsetting.apply(address, SIZE_OF_ARM_INSTRUCTION);
            }

            match load_store {
                LoadStoreKind::Store => {
                    let value = self.read_operand(register.into());
                    self.memory.write_word(address, value, endianness)?;
                }
                LoadStoreKind::Load => {
                    let value = self.memory.read_word(address, endianness)?;
                    advance = advance.and(self.write_loaded(register.into(), value));
                }
            }

            if indexing == Indexing::Post {
                address = offsetting.apply(address, SIZE_OF_ARM_INSTRUCTION);
            }
        }

        let base_loaded = load_store == LoadStoreKind::Load && reg_list.get_bit(rn as u8);
        if write_back && !base_loaded {
            let final_address = offsetting.apply(base, reg_list.count_ones() * 4);
            advance = advance.and(self.write_result(rn, final_address));
        }

        Ok(advance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::arm::instructions::ArmModeInstruction;
    use crate::cpu::arm::mode::ArmModeOpcode;
    use crate::cpu::condition::Condition;
    use crate::cpu::cpu_modes::Mode;
    use crate::cpu::flags::{OperandKind, ShiftKind};
    use crate::memory::Endianness;

    use pretty_assertions::assert_eq;
    use rand::Rng;

    fn cpu() -> Simulator {
        Simulator::new(0x1000)
    }

    #[test]
    fn check_adds_scenario() {
        let op_code: ArmModeOpcode = Simulator::decode(0xE290_1003);
        assert_eq!(
            op_code.instruction,
            ArmModeInstruction::DataProcessing {
                condition: Condition::AL,
                alu_instruction: ArmModeAluInstr::Add,
                set_conditions: true,
                op_kind: OperandKind::Immediate,
                rn: 0,
                destination: 1,
                op2: AluSecondOperandInfo::Immediate { base: 3, shift: 0 },
            }
        );

        let mut cpu = cpu();
        cpu.registers.cpsr_mut().set_mode(Mode::User);
        cpu.write_register(0, 2);
        cpu.execute(op_code).unwrap();

        assert_eq!(cpu.read_register(1), 5);
        let cpsr = cpu.registers.cpsr();
        assert!(!cpsr.sign_flag());
        assert!(!cpsr.zero_flag());
        assert!(!cpsr.carry_flag());
        assert!(!cpsr.overflow_flag());
        assert_eq!(cpu.registers.program_counter(), 4);
    }

    #[test]
    fn check_add_overflow() {
        // ADDS R2, R0, R1
        let op_code = Simulator::decode(0xE090_2001);
        let mut cpu = cpu();
        cpu.write_register(0, 0x7FFF_FFFF);
        cpu.write_register(1, 1);
        cpu.execute(op_code).unwrap();

        assert_eq!(cpu.read_register(2), 0x8000_0000);
        let cpsr = cpu.registers.cpsr();
        assert!(cpsr.sign_flag());
        assert!(!cpsr.zero_flag());
        assert!(!cpsr.carry_flag());
        assert!(cpsr.overflow_flag());
    }

    #[test]
    fn check_random_adds_and_subs_flags() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let a = rng.gen_range(0..=u32::MAX);
            let b = rng.gen_range(0..=u32::MAX);

            // ADDS R2, R0, R1
            let mut adds = cpu();
            adds.write_register(0, a);
            adds.write_register(1, b);
            adds.execute(Simulator::decode(0xE090_2001)).unwrap();
            let (sum, carry) = a.overflowing_add(b);
            let cpsr = adds.registers.cpsr();
            assert_eq!(adds.read_register(2), sum);
            assert_eq!(cpsr.carry_flag(), carry);
            assert_eq!(cpsr.overflow_flag(), (a as i32).checked_add(b as i32).is_none());
            assert_eq!(cpsr.zero_flag(), sum == 0);
            assert_eq!(cpsr.sign_flag(), (sum as i32) < 0);

            // SUBS R2, R0, R1
            let mut subs = cpu();
            subs.write_register(0, a);
            subs.write_register(1, b);
            subs.execute(Simulator::decode(0xE050_2001)).unwrap();
            let difference = a.wrapping_sub(b);
            let cpsr = subs.registers.cpsr();
            assert_eq!(subs.read_register(2), difference);
            assert_eq!(cpsr.carry_flag(), a >= b);
            assert_eq!(cpsr.overflow_flag(), (a as i32).checked_sub(b as i32).is_none());
            assert_eq!(cpsr.zero_flag(), a == b);
        }
    }

    #[test]
    fn check_add_pc_operand() {
        // ADD R0, PC, #4 at 0x100
        let op_code = Simulator::decode(0xE28F_0004);
        let mut cpu = cpu();
        cpu.registers.set_program_counter(0x100);
        cpu.execute(op_code).unwrap();
        assert_eq!(cpu.read_register(0), 0x10C);
    }

    #[test]
    fn check_mov_to_pc_branches() {
        // MOV PC, R0
        let op_code = Simulator::decode(0xE1A0_F000);
        let mut cpu = cpu();
        cpu.write_register(0, 0x200);
        cpu.execute(op_code).unwrap();
        assert_eq!(cpu.registers.program_counter(), 0x200);
    }

    #[test]
    fn check_movs_pc_restores_spsr() {
        // MOVS PC, LR
        let op_code = Simulator::decode(0xE1B0_F00E);
        let mut cpu = cpu();
        cpu.write_register(14, 0x80);
        cpu.registers
            .write_spsr(Mode::Supervisor, 0x6000_0010)
            .unwrap();
        cpu.execute(op_code).unwrap();

        assert_eq!(cpu.registers.program_counter(), 0x80);
        assert_eq!(cpu.registers.read_cpsr(), 0x6000_0010);
        assert_eq!(cpu.registers.current_mode(), Mode::User);
    }

    #[test]
    fn check_movs_pc_in_system_sets_flags() {
        // MOVS PC, #0
        let op_code = Simulator::decode(0xE3B0_F000);
        let mut cpu = cpu();
        cpu.registers.cpsr_mut().set_mode(Mode::System);
        cpu.execute(op_code).unwrap();

        assert_eq!(cpu.registers.program_counter(), 0);
        assert!(cpu.registers.cpsr().zero_flag());
        assert_eq!(cpu.registers.current_mode(), Mode::System);
    }

    #[test]
    fn check_logical_keeps_overflow() {
        // ANDS R1, R0, #0
        let op_code = Simulator::decode(0xE210_1000);
        let mut cpu = cpu();
        cpu.registers.cpsr_mut().set_overflow_flag(true);
        cpu.write_register(0, 0xFFFF_FFFF);
        cpu.execute(op_code).unwrap();

        let cpsr = cpu.registers.cpsr();
        assert!(cpsr.zero_flag());
        assert!(cpsr.overflow_flag());
        assert!(!cpsr.carry_flag());
    }

    #[test]
    fn check_shifter_carry_reaches_flags() {
        // MOVS R0, R1, LSR #1
        let op_code = Simulator::decode(0xE1B0_00A1);
        let mut cpu = cpu();
        cpu.write_register(1, 3);
        cpu.execute(op_code).unwrap();

        assert_eq!(cpu.read_register(0), 1);
        assert!(cpu.registers.cpsr().carry_flag());
    }

    #[test]
    fn check_shift_by_register() {
        // MOV R1, R2, ROR R3
        let op_code = Simulator::decode(0xE1A0_1372);
        let mut cpu = cpu();
        cpu.write_register(2, 0x0000_00F0);
        cpu.write_register(3, 0x104);
        cpu.execute(op_code).unwrap();
        // only the low byte of R3 counts
        assert_eq!(cpu.read_register(1), 0x0000_000F);
    }

    #[test]
    fn check_cmp_discards_result() {
        // CMP R0, #5
        let op_code = Simulator::decode(0xE350_0005);
        let mut cpu = cpu();
        cpu.write_register(0, 5);
        cpu.execute(op_code).unwrap();

        assert_eq!(cpu.read_register(0), 5);
        assert!(cpu.registers.cpsr().zero_flag());
        assert!(cpu.registers.cpsr().carry_flag());
    }

    #[test]
    fn check_carry_in_flags() {
        let flags = |cpu: &Simulator| {
            let cpsr = cpu.registers.cpsr();
            (cpsr.sign_flag(), cpsr.zero_flag(), cpsr.carry_flag(), cpsr.overflow_flag())
        };

        // ADCS R2, R0, R1
        let mut cpu = cpu();
        cpu.write_register(0, 0x7FFF_FFFF);
        cpu.registers.cpsr_mut().set_carry_flag(true);
        cpu.execute(Simulator::decode(0xE0B0_2001)).unwrap();
        assert_eq!(cpu.read_register(2), 0x8000_0000);
        assert_eq!(flags(&cpu), (true, false, false, true));

        let mut cpu = self::cpu();
        cpu.write_register(0, 0xFFFF_FFFF);
        cpu.registers.cpsr_mut().set_carry_flag(true);
        cpu.execute(Simulator::decode(0xE0B0_2001)).unwrap();
        assert_eq!(cpu.read_register(2), 0);
        assert_eq!(flags(&cpu), (false, true, true, false));

        // SBCS R2, R0, R1
        let mut cpu = self::cpu();
        cpu.write_register(0, 0x8000_0000);
        cpu.registers.cpsr_mut().set_carry_flag(false);
        cpu.execute(Simulator::decode(0xE0D0_2001)).unwrap();
        assert_eq!(cpu.read_register(2), 0x7FFF_FFFF);
        assert_eq!(flags(&cpu), (false, false, true, true));

        // RSCS R2, R0, R1
        let mut cpu = self::cpu();
        cpu.write_register(0, 1);
        cpu.registers.cpsr_mut().set_carry_flag(false);
        cpu.execute(Simulator::decode(0xE0F0_2001)).unwrap();
        assert_eq!(cpu.read_register(2), 0xFFFF_FFFE);
        assert_eq!(flags(&cpu), (true, false, false, false));

        let mut cpu = self::cpu();
        cpu.registers.cpsr_mut().set_carry_flag(true);
        cpu.execute(Simulator::decode(0xE0F0_2001)).unwrap();
        assert_eq!(cpu.read_register(2), 0);
        assert_eq!(flags(&cpu), (false, true, true, false));
    }

    #[test]
    fn check_sbc_borrow() {
        // SBCS R2, R0, R1
        let op_code = Simulator::decode(0xE0D0_2001);
        let mut cpu = cpu();
        cpu.write_register(0, 10);
        cpu.write_register(1, 3);
        cpu.execute(op_code).unwrap();
        // C clear: 10 - 3 - 1
        assert_eq!(cpu.read_register(2), 6);
        assert!(cpu.registers.cpsr().carry_flag());
    }

    #[test]
    fn check_mrs_msr() {
        let mut cpu = cpu();

        // MRS R0, CPSR
        cpu.execute(Simulator::decode(0xE10F_0000)).unwrap();
        assert_eq!(cpu.read_register(0), 0xD3);

        // MSR CPSR_f, #0xF0000000
        cpu.execute(Simulator::decode(0xE328_F20F)).unwrap();
        assert_eq!(cpu.registers.read_cpsr(), 0xF000_00D3);

        // MSR CPSR_c, R1 with R1 = IRQ mode
        cpu.write_register(1, 0x12);
        cpu.execute(Simulator::decode(0xE121_F001)).unwrap();
        assert_eq!(cpu.registers.current_mode(), Mode::Irq);
        assert_eq!(cpu.registers.read_cpsr(), 0xF000_0012);
    }

    #[test]
    fn check_msr_user_only_flags() {
        let mut cpu = cpu();
        cpu.registers.cpsr_mut().set_mode(Mode::User);
        // MSR CPSR_fc, R0
        cpu.write_register(0, 0x8000_001F);
        cpu.execute(Simulator::decode(0xE129_F000)).unwrap();

        // mode, I and F are out of reach
        assert_eq!(cpu.registers.read_cpsr(), 0x8000_00D0);
    }

    #[test]
    fn check_msr_undefined_cases() {
        // reserved bits
        let mut cpu = cpu();
        cpu.write_register(0, 0x0000_0100);
        assert_eq!(
            cpu.execute(Simulator::decode(0xE129_F000)),
            Err(Exception::UndefinedInstruction)
        );

        // T bit
        let mut cpu = self::cpu();
        cpu.write_register(0, 0x0000_0033);
        assert_eq!(
            cpu.execute(Simulator::decode(0xE121_F000)),
            Err(Exception::UndefinedInstruction)
        );

        // invalid mode
        let mut cpu = self::cpu();
        cpu.write_register(0, 0x0000_0005);
        assert_eq!(
            cpu.execute(Simulator::decode(0xE121_F000)),
            Err(Exception::UndefinedInstruction)
        );
        assert_eq!(cpu.registers.read_cpsr(), 0xD3);

        // SPSR in System mode
        let mut cpu = self::cpu();
        cpu.registers.cpsr_mut().set_mode(Mode::System);
        assert_eq!(
            cpu.execute(Simulator::decode(0xE14F_0000)),
            Err(Exception::UndefinedInstruction)
        );
    }

    #[test]
    fn check_msr_spsr() {
        let mut cpu = cpu();
        cpu.write_register(0, 0x2000_0030);
        // MSR SPSR_fc, R0
        cpu.execute(Simulator::decode(0xE169_F000)).unwrap();
        assert_eq!(cpu.registers.read_spsr(Mode::Supervisor), Ok(0x2000_0030));
        // MRS R1, SPSR
        cpu.execute(Simulator::decode(0xE14F_1000)).unwrap();
        assert_eq!(cpu.read_register(1), 0x2000_0030);
    }

    #[test]
    fn check_branch_with_link() {
        let op_code = Simulator::decode(0xEB00_0003);
        let mut cpu = cpu();
        cpu.registers.set_program_counter(8);
        cpu.execute(op_code).unwrap();

        assert_eq!(cpu.registers.program_counter(), 28);
        assert_eq!(cpu.read_register(14), 12);
    }

    #[test]
    fn check_branch_backwards() {
        // B .-8 at 0x100
        let op_code = Simulator::decode(0xEAFF_FFFC);
        let mut cpu = cpu();
        cpu.registers.set_program_counter(0x100);
        cpu.execute(op_code).unwrap();

        assert_eq!(cpu.registers.program_counter(), 0xF8);
        assert_eq!(cpu.read_register(14), 0);
    }

    #[test]
    fn check_branch_and_exchange() {
        // BX R1
        let mut cpu = cpu();
        cpu.write_register(1, 0x201);
        cpu.execute(Simulator::decode(0xE12F_FF11)).unwrap();
        assert_eq!(cpu.registers.program_counter(), 0x200);
        assert_eq!(cpu.registers.cpsr().cpu_state(), CpuState::Thumb);

        // BLX R3
        let mut cpu = self::cpu();
        cpu.registers.set_program_counter(0x40);
        cpu.write_register(3, 0x300);
        cpu.execute(Simulator::decode(0xE12F_FF33)).unwrap();
        assert_eq!(cpu.registers.program_counter(), 0x300);
        assert_eq!(cpu.read_register(14), 0x44);
        assert_eq!(cpu.registers.cpsr().cpu_state(), CpuState::Arm);
    }

    #[test]
    fn check_branch_link_exchange_immediate() {
        // BLX #0 at 0x20
        let mut cpu = cpu();
        cpu.registers.set_program_counter(0x20);
        cpu.execute(Simulator::decode(0xFA00_0000)).unwrap();
        assert_eq!(cpu.registers.program_counter(), 0x28);
        assert_eq!(cpu.read_register(14), 0x24);
        assert_eq!(cpu.registers.cpsr().cpu_state(), CpuState::Thumb);

        // H=1 moves the target by a halfword
        let mut cpu = self::cpu();
        cpu.registers.set_program_counter(0x20);
        cpu.execute(Simulator::decode(0xFB00_0001)).unwrap();
        assert_eq!(cpu.registers.program_counter(), 0x2E);
        assert_eq!(cpu.read_register(14), 0x24);
        assert_eq!(cpu.registers.cpsr().cpu_state(), CpuState::Thumb);
    }

    #[test]
    fn check_clz() {
        let mut cpu = cpu();
        cpu.write_register(2, 0x0001_0000);
        cpu.execute(Simulator::decode(0xE16F_1F12)).unwrap();
        assert_eq!(cpu.read_register(1), 15);

        cpu.write_register(2, 0);
        cpu.execute(Simulator::decode(0xE16F_1F12)).unwrap();
        assert_eq!(cpu.read_register(1), 32);
    }

    #[test]
    fn check_multiply() {
        let mut cpu = cpu();
        cpu.write_register(1, 6);
        cpu.write_register(2, 7);
        cpu.write_register(3, 100);

        // MLA R0, R1, R2, R3
        cpu.execute(Simulator::decode(0xE020_3291)).unwrap();
        assert_eq!(cpu.read_register(0), 142);

        // MULS R0, R1, R2 with R1 = 0
        cpu.write_register(1, 0);
        cpu.registers.cpsr_mut().set_carry_flag(true);
        cpu.execute(Simulator::decode(0xE010_0291)).unwrap();
        assert_eq!(cpu.read_register(0), 0);
        assert!(cpu.registers.cpsr().zero_flag());
        assert!(cpu.registers.cpsr().carry_flag());
    }

    #[test]
    fn check_multiply_long() {
        let mut cpu = cpu();
        cpu.write_register(2, 0xFFFF_FFFF);
        cpu.write_register(3, 2);

        // UMULL R0, R1, R2, R3
        cpu.execute(Simulator::decode(0xE081_0392)).unwrap();
        assert_eq!(cpu.read_register(0), 0xFFFF_FFFE);
        assert_eq!(cpu.read_register(1), 1);

        // SMULL R0, R1, R2, R3: -1 * 2
        cpu.execute(Simulator::decode(0xE0C1_0392)).unwrap();
        assert_eq!(cpu.read_register(0), 0xFFFF_FFFE);
        assert_eq!(cpu.read_register(1), 0xFFFF_FFFF);

        // UMLALS R0, R1, R2, R3: 0xFFFFFFFF_FFFFFFFE + 0x1_FFFFFFFE
        cpu.execute(Simulator::decode(0xE0B1_0392)).unwrap();
        assert_eq!(cpu.read_register(0), 0xFFFF_FFFC);
        assert_eq!(cpu.read_register(1), 1);
        assert!(!cpu.registers.cpsr().sign_flag());
    }

    #[test]
    fn check_swap() {
        let mut cpu = cpu();
        cpu.memory_mut()
            .write_word(0x100, 0xAABB_CCDD, Endianness::Little)
            .unwrap();
        cpu.write_register(3, 0x100);
        cpu.write_register(2, 0x1122_3344);

        // SWP R1, R2, [R3]
        cpu.execute(Simulator::decode(0xE103_1092)).unwrap();
        assert_eq!(cpu.read_register(1), 0xAABB_CCDD);
        assert_eq!(
            cpu.memory().read_word(0x100, Endianness::Little),
            Ok(0x1122_3344)
        );

        // SWPB R4, R5, [R6]
        cpu.write_register(6, 0x100);
        cpu.write_register(5, 0xEE);
        cpu.execute(Simulator::decode(0xE146_4095)).unwrap();
        assert_eq!(cpu.read_register(4), 0x44);
        assert_eq!(cpu.memory().read_byte(0x100), Ok(0xEE));
    }

    #[test]
    fn check_single_data_transfer() {
        let mut cpu = cpu();
        cpu.write_register(13, 0x200);
        cpu.write_register(0, 0xDEAD_BEEF);

        // STR R0, [R13, #-4]!
        cpu.execute(Simulator::decode(0xE52D_0004)).unwrap();
        assert_eq!(cpu.read_register(13), 0x1FC);
        assert_eq!(
            cpu.memory().read_word(0x1FC, Endianness::Little),
            Ok(0xDEAD_BEEF)
        );

        // LDR R1, [R13], #4
        cpu.execute(Simulator::decode(0xE49D_1004)).unwrap();
        assert_eq!(cpu.read_register(1), 0xDEAD_BEEF);
        assert_eq!(cpu.read_register(13), 0x200);

        // LDRB R5, [R1, -R12] with R1 = 0x1FE, R12 = 1
        cpu.write_register(1, 0x1FE);
        cpu.write_register(12, 1);
        cpu.execute(Simulator::decode(0xE751_500C)).unwrap();
        assert_eq!(cpu.read_register(5), 0xBE);
        assert_eq!(cpu.read_register(1), 0x1FE);
    }

    #[test]
    fn check_load_into_base_keeps_loaded_value() {
        let mut cpu = cpu();
        cpu.memory_mut()
            .write_word(0x100, 0x1234, Endianness::Little)
            .unwrap();
        cpu.write_register(0, 0x100);

        // LDR R0, [R0], #4
        cpu.execute(Simulator::decode(0xE490_0004)).unwrap();
        assert_eq!(cpu.read_register(0), 0x1234);
    }

    #[test]
    fn check_store_pc() {
        let mut cpu = cpu();
        cpu.registers.set_program_counter(0x40);
        cpu.write_register(1, 0x100);

        // STR PC, [R1]
        cpu.execute(Simulator::decode(0xE581_F000)).unwrap();
        assert_eq!(cpu.memory().read_word(0x100, Endianness::Little), Ok(0x48));
    }

    #[test]
    fn check_load_pc_interworking() {
        let mut cpu = cpu();
        cpu.memory_mut()
            .write_word(0x100, 0x301, Endianness::Little)
            .unwrap();
        cpu.write_register(1, 0x100);

        // LDR PC, [R1]
        cpu.execute(Simulator::decode(0xE591_F000)).unwrap();
        assert_eq!(cpu.registers.program_counter(), 0x300);
        assert_eq!(cpu.registers.cpsr().cpu_state(), CpuState::Thumb);
    }

    #[test]
    fn check_data_abort_leaves_registers() {
        let mut cpu = cpu();
        cpu.write_register(1, 0x1000);

        // LDR R0, [R1], #4
        assert_eq!(
            cpu.execute(Simulator::decode(0xE491_0004)),
            Err(Exception::DataAbort)
        );
        assert_eq!(cpu.read_register(0), 0);
        assert_eq!(cpu.read_register(1), 0x1000);
        assert_eq!(cpu.registers.program_counter(), 0);
    }

    #[test]
    fn check_half_word_transfers() {
        let mut cpu = cpu();
        cpu.write_register(0, 0x1234_8765);
        cpu.write_register(1, 0x100);

        // STRH R0, [R1]
        cpu.execute(Simulator::decode(0xE1C1_00B0)).unwrap();
        assert_eq!(cpu.memory().read_half_word(0x100, Endianness::Little), Ok(0x8765));

        // LDRH R2, [R1]
        cpu.execute(Simulator::decode(0xE1D1_20B0)).unwrap();
        assert_eq!(cpu.read_register(2), 0x8765);

        // LDRSH R3, [R1]
        cpu.execute(Simulator::decode(0xE1D1_30F0)).unwrap();
        assert_eq!(cpu.read_register(3), 0xFFFF_8765);

        // LDRSB R4, [R1], #-2
        cpu.execute(Simulator::decode(0xE051_40D2)).unwrap();
        assert_eq!(cpu.read_register(4), 0x65);
        assert_eq!(cpu.read_register(1), 0xFE);
    }

    #[test]
    fn check_block_transfer_round_trip() {
        let mut cpu = cpu();
        cpu.write_register(13, 0x400);
        for reg in [0, 1, 14] {
            cpu.write_register(reg, 0x1000 + reg as u32);
        }

        // STMDB R13, {R0, R1, R14}
        cpu.execute(Simulator::decode(0xE90D_4003)).unwrap();
        assert_eq!(cpu.read_register(13), 0x400);
        // lowest register first, at the first address reached
        assert_eq!(cpu.memory().read_word(0x3FC, Endianness::Little), Ok(0x1000));
        assert_eq!(cpu.memory().read_word(0x3F4, Endianness::Little), Ok(0x100E));

        for reg in [0, 1, 14] {
            cpu.write_register(reg, 0);
        }

        // LDMDB R13, {R0, R1, R14}
        cpu.execute(Simulator::decode(0xE91D_4003)).unwrap();
        for reg in [0, 1, 14] {
            assert_eq!(cpu.read_register(reg), 0x1000 + reg as u32);
        }

        // STMDB R13!, {R0, R1, R14}
        cpu.execute(Simulator::decode(0xE92D_4003)).unwrap();
        assert_eq!(cpu.read_register(13), 0x400 - 12);
    }

    #[test]
    fn check_block_transfer_same_mode_round_trip() {
        let mut cpu = cpu();
        cpu.write_register(0, 0x300);
        cpu.write_register(2, 22);
        cpu.write_register(5, 55);

        // STMIA R0, {R2, R5}
        cpu.execute(Simulator::decode(0xE880_0024)).unwrap();
        assert_eq!(cpu.memory().read_word(0x300, Endianness::Little), Ok(22));
        assert_eq!(cpu.memory().read_word(0x304, Endianness::Little), Ok(55));
        assert_eq!(cpu.read_register(0), 0x300);

        cpu.write_register(2, 0);
        cpu.write_register(5, 0);

        // LDMIA R0, {R2, R5}
        cpu.execute(Simulator::decode(0xE890_0024)).unwrap();
        assert_eq!(cpu.read_register(2), 22);
        assert_eq!(cpu.read_register(5), 55);
    }

    #[test]
    fn check_block_transfer_increment_before() {
        let mut cpu = cpu();
        cpu.write_register(0, 0x300);
        cpu.write_register(2, 22);
        cpu.write_register(5, 55);

        // STMIB R0, {R2, R5}
        cpu.execute(Simulator::decode(0xE980_0024)).unwrap();
        assert_eq!(cpu.memory().read_word(0x300, Endianness::Little), Ok(0));
        assert_eq!(cpu.memory().read_word(0x304, Endianness::Little), Ok(22));
        assert_eq!(cpu.memory().read_word(0x308, Endianness::Little), Ok(55));
        assert_eq!(cpu.read_register(0), 0x300);

        cpu.write_register(2, 0);
        cpu.write_register(5, 0);

        // LDMIB R0!, {R2, R5}
        cpu.execute(Simulator::decode(0xE9B0_0024)).unwrap();
        assert_eq!(cpu.read_register(2), 22);
        assert_eq!(cpu.read_register(5), 55);
        assert_eq!(cpu.read_register(0), 0x308);

        // STMIB R0!, {R2, R5}
        cpu.execute(Simulator::decode(0xE9A0_0024)).unwrap();
        assert_eq!(cpu.memory().read_word(0x30C, Endianness::Little), Ok(22));
        assert_eq!(cpu.memory().read_word(0x310, Endianness::Little), Ok(55));
        assert_eq!(cpu.read_register(0), 0x310);

        cpu.write_register(0, 0x308);
        cpu.write_register(2, 0);
        cpu.write_register(5, 0);

        // LDMIB R0, {R2, R5}
        cpu.execute(Simulator::decode(0xE990_0024)).unwrap();
        assert_eq!(cpu.read_register(2), 22);
        assert_eq!(cpu.read_register(5), 55);
        assert_eq!(cpu.read_register(0), 0x308);
    }

    #[test]
    fn check_block_transfer_decrement_after() {
        let mut cpu = cpu();
        cpu.write_register(0, 0x300);
        cpu.write_register(2, 22);
        cpu.write_register(5, 55);

        // STMDA R0, {R2, R5}
        cpu.execute(Simulator::decode(0xE800_0024)).unwrap();
        assert_eq!(cpu.memory().read_word(0x300, Endianness::Little), Ok(22));
        assert_eq!(cpu.memory().read_word(0x2FC, Endianness::Little), Ok(55));
        assert_eq!(cpu.memory().read_word(0x2F8, Endianness::Little), Ok(0));
        assert_eq!(cpu.read_register(0), 0x300);

        cpu.write_register(2, 0);
        cpu.write_register(5, 0);

        // LDMDA R0!, {R2, R5}
        cpu.execute(Simulator::decode(0xE830_0024)).unwrap();
        assert_eq!(cpu.read_register(2), 22);
        assert_eq!(cpu.read_register(5), 55);
        assert_eq!(cpu.read_register(0), 0x2F8);

        // STMDA R0!, {R2, R5}
        cpu.execute(Simulator::decode(0xE820_0024)).unwrap();
        assert_eq!(cpu.memory().read_word(0x2F8, Endianness::Little), Ok(22));
        assert_eq!(cpu.memory().read_word(0x2F4, Endianness::Little), Ok(55));
        assert_eq!(cpu.read_register(0), 0x2F0);

        cpu.write_register(0, 0x300);
        cpu.write_register(2, 0);
        cpu.write_register(5, 0);

        // LDMDA R0, {R2, R5}
        cpu.execute(Simulator::decode(0xE810_0024)).unwrap();
        assert_eq!(cpu.read_register(2), 22);
        assert_eq!(cpu.read_register(5), 55);
        assert_eq!(cpu.read_register(0), 0x300);
    }

    #[test]
    fn check_block_transfer_undefined() {
        let mut cpu = cpu();
        // LDMIA R0, {}
        assert_eq!(
            cpu.execute(Simulator::decode(0xE890_0000)),
            Err(Exception::UndefinedInstruction)
        );
        // STMIA R0, {R1}^
        assert_eq!(
            cpu.execute(Simulator::decode(0xE8C0_0002)),
            Err(Exception::UndefinedInstruction)
        );
    }

    #[test]
    fn check_block_load_base_in_list_skips_write_back() {
        let mut cpu = cpu();
        cpu.memory_mut()
            .write_word(0x100, 0xAB, Endianness::Little)
            .unwrap();
        cpu.write_register(0, 0x100);

        // LDMIA R0!, {R0}
        cpu.execute(Simulator::decode(0xE8B0_0001)).unwrap();
        assert_eq!(cpu.read_register(0), 0xAB);
    }

    #[test]
    fn check_block_load_pc() {
        let mut cpu = cpu();
        cpu.memory_mut()
            .write_word(0x100, 0x80, Endianness::Little)
            .unwrap();
        cpu.write_register(0, 0x100);

        // LDMIA R0, {PC}
        cpu.execute(Simulator::decode(0xE890_8000)).unwrap();
        assert_eq!(cpu.registers.program_counter(), 0x80);
    }

    #[test]
    fn check_shifter_immediate_carry() {
        let cpu = cpu();
        let op = cpu.shifter_operand(
            AluSecondOperandInfo::Register {
                shift_op: ShiftOperator::Immediate(0),
                shift_kind: ShiftKind::Ror,
                register: 0,
            },
            true,
        );
        // RRX of 0 with C set
        assert_eq!(op.result, 0x8000_0000);
        assert!(!op.carry);
    }
}
