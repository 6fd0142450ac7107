use crate::bitwise::Bits;
use crate::config::SimulatorConfig;
use crate::cpu::arm::instructions::ArmModeInstruction;
use crate::cpu::arm::mode::ArmModeOpcode;
use crate::cpu::exception::Exception;
use crate::cpu::psr::CpuState;
use crate::cpu::register_bank::{REG_PROGRAM_COUNTER, RegisterBank};
use crate::memory::MemoryError;
use crate::memory::internal_memory::InternalMemory;

pub const SIZE_OF_ARM_INSTRUCTION: u32 = 4;

/// Offset between the address of the executing instruction and the value R15
/// reads as while executing it.
pub const PC_READ_OFFSET: u32 = 8;

/// One complete simulated machine: registers, memory and how it was built.
///
/// During `execute` the PC register still holds the address of the
/// instruction being executed; reads of R15 by the instruction see that
/// address plus [`PC_READ_OFFSET`].
pub struct Simulator {
    pub registers: RegisterBank,
    pub(crate) memory: InternalMemory,
    config: SimulatorConfig,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::with_config(SimulatorConfig::default())
    }
}

impl Simulator {
    /// A little-endian simulator with `memory_size` bytes of memory.
    #[must_use]
    pub fn new(memory_size: usize) -> Self {
        Self::with_config(SimulatorConfig {
            memory_size,
            ..SimulatorConfig::default()
        })
    }

    #[must_use]
    pub fn with_config(config: SimulatorConfig) -> Self {
        tracing::debug!(
            "new simulator: {} bytes of {:?} memory",
            config.memory_size,
            config.endianness
        );
        Self {
            registers: RegisterBank::new(),
            memory: InternalMemory::new(config.memory_size),
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    #[must_use]
    pub const fn memory(&self) -> &InternalMemory {
        &self.memory
    }

    pub const fn memory_mut(&mut self) -> &mut InternalMemory {
        &mut self.memory
    }

    /// Copies `image` into memory at `address`.
    pub fn load_image(&mut self, address: u32, image: &[u8]) -> Result<(), MemoryError> {
        self.memory.load(address, image)?;
        tracing::info!("loaded {} bytes at 0x{address:08X}", image.len());
        Ok(())
    }

    /// Reads `index` in the current mode. R15 reads as the raw PC.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not in `0..=15`.
    #[must_use]
    pub fn read_register(&self, index: usize) -> u32 {
        self.registers.read_current(index)
    }

    /// Writes `index` in the current mode. Writing R15 is a jump.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not in `0..=15`.
    pub fn write_register(&mut self, index: usize, value: u32) {
        self.registers.write_current(index, value);
    }

    /// The 16 registers visible in the current mode.
    #[must_use]
    pub fn registers(&self) -> Vec<u32> {
        self.registers.to_vec()
    }

    /// Reads the instruction at PC.
    pub fn fetch(&self) -> Result<u32, Exception> {
        if self.registers.cpsr().cpu_state() == CpuState::Thumb {
            tracing::debug!(
                "fetch in Thumb state at 0x{:08X}",
                self.registers.program_counter()
            );
            return Err(Exception::UndefinedInstruction);
        }

        let pc = self.registers.program_counter();
        self.memory
            .read_word(pc, self.config.endianness)
            .map_err(|e| {
                tracing::debug!("prefetch abort: {e}");
                Exception::PrefetchAbort
            })
    }

    /// Decodes `op_code` without touching any state.
    #[must_use]
    pub fn decode(op_code: u32) -> ArmModeOpcode {
        ArmModeOpcode::from(op_code)
    }

    /// Executes an already decoded instruction and moves PC past it, unless
    /// the instruction wrote PC itself.
    pub fn execute(&mut self, op_code: ArmModeOpcode) -> Result<(), Exception> {
        use ArmModeInstruction::{
            BlockDataTransfer, Branch, BranchAndExchange, BranchLinkExchange, Coprocessor,
            CountLeadingZeros,
            DataProcessing, HalfwordDataTransfer, Multiply, MultiplyLong, PSRTransfer,
            SingleDataSwap, SingleDataTransfer, SoftwareInterrupt, Undefined,
        };

        // Instruction functions return how far PC has to be advanced after
        // the instruction executed, `None` when they set it themselves.
        let bytes_to_advance = if self.registers.cpsr().can_execute(op_code.condition) {
            match op_code.instruction {
                DataProcessing {
                    condition: _,
                    alu_instruction,
                    set_conditions,
                    op_kind: _,
                    rn,
                    destination,
                    op2,
                } => self.data_processing(alu_instruction, set_conditions, rn, destination, op2)?,
                Multiply {
                    variant,
                    condition: _,
                    should_set_codes,
                    rd_destination_register,
                    rn_accumulate_register,
                    rs_operand_register,
                    rm_operand_register,
                } => self.multiply(
                    variant,
                    should_set_codes,
                    rd_destination_register,
                    rn_accumulate_register,
                    rs_operand_register,
                    rm_operand_register,
                ),
                MultiplyLong {
                    variant,
                    condition: _,
                    should_set_codes,
                    rdhi_destination_register,
                    rdlo_destination_register,
                    rs_operand_register,
                    rm_operand_register,
                } => self.multiply_long(
                    variant,
                    should_set_codes,
                    rdhi_destination_register,
                    rdlo_destination_register,
                    rs_operand_register,
                    rm_operand_register,
                ),
                PSRTransfer {
                    condition: _,
                    psr_kind,
                    kind,
                } => self.psr_transfer(kind, psr_kind)?,
                SingleDataSwap {
                    condition: _,
                    quantity,
                    rn,
                    rd,
                    rm,
                } => self.single_data_swap(quantity, rn, rd, rm)?,
                BranchAndExchange {
                    condition: _,
                    link,
                    register,
                } => self.branch_and_exchange(link, register),
                CountLeadingZeros {
                    condition: _,
                    rd,
                    rm,
                } => self.count_leading_zeros(rd, rm),
                HalfwordDataTransfer {
                    condition: _,
                    indexing,
                    offsetting,
                    write_back,
                    load_store_kind,
                    offset_kind,
                    base_register,
                    source_destination_register,
                    transfer_kind,
                } => self.half_word_data_transfer(
                    indexing,
                    offsetting,
                    write_back,
                    load_store_kind,
                    offset_kind,
                    base_register,
                    source_destination_register,
                    transfer_kind,
                )?,
                SingleDataTransfer {
                    condition: _,
                    kind,
                    quantity,
                    write_back,
                    indexing,
                    rd,
                    base_register,
                    offset_info,
                    offsetting,
                } => self.single_data_transfer(
                    kind,
                    quantity,
                    write_back,
                    indexing,
                    rd,
                    base_register,
                    offset_info,
                    offsetting,
                )?,
                BlockDataTransfer {
                    condition: _,
                    indexing,
                    offsetting,
                    load_psr,
                    write_back,
                    load_store,
                    rn,
                    register_list,
                } => self.block_data_transfer(
                    indexing,
                    offsetting,
                    load_psr,
                    write_back,
                    load_store,
                    rn,
                    register_list,
                )?,
                Branch {
                    condition: _,
                    link,
                    offset,
                } => self.branch(link, offset),
                BranchLinkExchange {
                    condition: _,
                    offset,
                } => self.branch_link_exchange(offset),
                SoftwareInterrupt {
                    condition: _,
                    comment,
                } => return Err(Exception::SoftwareInterrupt { comment }),
                Coprocessor { .. } | Undefined => {
                    tracing::debug!("undefined instruction 0x{:08X}", op_code.raw);
                    return Err(Exception::UndefinedInstruction);
                }
            }
        } else {
            tracing::debug!(
                "condition {:?} failed, skipping 0x{:08X}",
                op_code.condition,
                op_code.raw
            );
            Some(SIZE_OF_ARM_INSTRUCTION)
        };

        if let Some(bytes) = bytes_to_advance {
            self.registers.advance_program_counter(bytes);
        }

        Ok(())
    }

    /// Fetches, decodes and executes the instruction at PC.
    ///
    /// On error the machine is left as the failing instruction left it and
    /// PC still points at that instruction.
    pub fn step(&mut self) -> Result<(), Exception> {
        let address = self.registers.program_counter();
        let op_code = Self::decode(self.fetch()?);

        #[cfg(feature = "disassembler")]
        tracing::trace!(
            "0x{address:08X}: {:08X} {}",
            op_code.raw,
            op_code.instruction.disassembler()
        );
        #[cfg(not(feature = "disassembler"))]
        tracing::trace!("0x{address:08X}: {:08X}", op_code.raw);

        self.execute(op_code)
    }

    /// R15 as the executing instruction sees it, any other register as stored.
    pub(crate) fn read_operand(&self, register: u32) -> u32 {
        let register = register as usize;
        if register == REG_PROGRAM_COUNTER {
            self.registers
                .program_counter()
                .wrapping_add(PC_READ_OFFSET)
        } else {
            self.registers.read_current(register)
        }
    }

    /// Writes a computed value to `register`.
    ///
    /// Returns how far PC must still advance: nothing if `register` is R15.
    pub(crate) fn write_result(&mut self, register: u32, value: u32) -> Option<u32> {
        self.registers.write_current(register as usize, value);
        if register as usize == REG_PROGRAM_COUNTER {
            None
        } else {
            Some(SIZE_OF_ARM_INSTRUCTION)
        }
    }

    /// Writes a value loaded from memory to `register`. A load into R15
    /// selects the instruction set from bit 0 of the value.
    pub(crate) fn write_loaded(&mut self, register: u32, value: u32) -> Option<u32> {
        if register as usize == REG_PROGRAM_COUNTER {
            self.registers
                .cpsr_mut()
                .set_cpu_state(value.get_bit(0).into());
            self.registers.set_program_counter(value & !1);
            None
        } else {
            self.write_result(register, value)
        }
    }
}
