//! CPU execution engine for the LC-3.
//!
//! Implements the fetch-decode-execute cycle and all instruction behaviors.

use crate::asm::disasm::disassemble_instruction;
use crate::cpu::console::Console;
use crate::cpu::decode::{self, Opcode};
use crate::cpu::memory::MemoryError;
use crate::cpu::registers::{Register, Registers};
use crate::cpu::Memory;
use crate::image::Image;
use log::*;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// CPU execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuState {
    /// CPU is running normally.
    Running,
    /// CPU has halted (executed the HALT trap).
    Halted,
    /// CPU stopped on an error.
    Failed,
}

/// What the loop should do after an instruction retires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Halt,
}

/// The LC-3 CPU.
///
/// One instance owns the registers and memory for exactly one run.
#[derive(Clone)]
pub struct Cpu {
    /// CPU registers.
    pub regs: Registers,
    /// Main memory.
    pub mem: Memory,
    /// Current execution state.
    pub state: CpuState,
    /// Instruction count.
    pub cycles: u64,
    /// Address of the instruction that failed, once the CPU is `Failed`.
    pub fault_pc: Option<u16>,
}

impl Cpu {
    /// Create a new CPU with zeroed memory and PC at 0x3000.
    pub fn new() -> Self {
        Self::with_memory(Memory::new())
    }

    /// Create a CPU over a pre-populated memory.
    pub fn with_memory(mem: Memory) -> Self {
        Self {
            regs: Registers::new(),
            mem,
            state: CpuState::Running,
            cycles: 0,
            fault_pc: None,
        }
    }

    /// Create a CPU with an image loaded at its origin.
    pub fn with_image(image: &Image) -> Self {
        Self::with_memory(Memory::from(image))
    }

    /// Reset the CPU to initial state.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.mem.clear();
        self.state = CpuState::Running;
        self.cycles = 0;
        self.fault_pc = None;
    }

    /// Execute a single instruction.
    ///
    /// Returns the state the CPU is in afterwards. Any error leaves the CPU
    /// in [`CpuState::Failed`].
    pub fn step(&mut self, console: &mut dyn Console) -> Result<CpuState, CpuError> {
        if self.state != CpuState::Running {
            return Err(CpuError::NotRunning(self.state));
        }

        let pc = self.regs.pc();
        match self.fetch_execute(console) {
            Ok(flow) => {
                self.cycles += 1;
                if flow == Flow::Halt {
                    self.state = CpuState::Halted;
                }
                Ok(self.state)
            }
            Err(e) => {
                debug!("CPU failed at {:#06x}: {}", pc, e);
                self.fault_pc = Some(pc);
                self.state = CpuState::Failed;
                Err(e)
            }
        }
    }

    /// Run until halt or error.
    ///
    /// Returns the number of instructions executed.
    pub fn run(&mut self, console: &mut dyn Console) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;

        while self.state == CpuState::Running {
            self.step(console)?;
        }

        Ok(self.cycles - start_cycles)
    }

    /// Run for at most `max_cycles` instructions.
    pub fn run_limited(&mut self, console: &mut dyn Console, max_cycles: u64) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;
        let limit = self.cycles.saturating_add(max_cycles);

        while self.state == CpuState::Running && self.cycles < limit {
            self.step(console)?;
        }

        Ok(self.cycles - start_cycles)
    }

    fn fetch_execute(&mut self, console: &mut dyn Console) -> Result<Flow, CpuError> {
        // Fetch
        let pc = self.regs.pc();
        let instr = self.mem.read(pc, console)?;
        self.regs.advance_pc();

        if log_enabled!(Level::Trace) {
            trace!("{:#06x}: {:#06x}  {}", pc, instr, disassemble_instruction(instr));
        }

        // Decode
        let op = Opcode::of(instr).ok_or(CpuError::UnhandledOpcode(decode::opcode_bits(instr)))?;

        // Execute
        self.execute(op, instr, console)
    }

    fn execute(&mut self, op: Opcode, instr: u16, console: &mut dyn Console) -> Result<Flow, CpuError> {
        match op {
            // ==================== Arithmetic / Logic ====================

            Opcode::Add => {
                let lhs = self.regs.read(decode::sr1(instr));
                let rhs = self.second_operand(instr);
                self.set_result(decode::dr(instr), lhs.wrapping_add(rhs));
            }

            Opcode::And => {
                let lhs = self.regs.read(decode::sr1(instr));
                let rhs = self.second_operand(instr);
                self.set_result(decode::dr(instr), lhs & rhs);
            }

            Opcode::Not => {
                let value = self.regs.read(decode::sr1(instr));
                self.set_result(decode::dr(instr), !value);
            }

            // ==================== Loads ====================

            Opcode::Ld => {
                let addr = self.pc_relative(instr);
                let value = self.mem.read(addr, console)?;
                self.set_result(decode::dr(instr), value);
            }

            Opcode::Ldi => {
                let pointer = self.pc_relative(instr);
                let addr = self.mem.read(pointer, console)?;
                let value = self.mem.read(addr, console)?;
                self.set_result(decode::dr(instr), value);
            }

            Opcode::Ldr => {
                let addr = self.base_relative(instr);
                let value = self.mem.read(addr, console)?;
                self.set_result(decode::dr(instr), value);
            }

            Opcode::Lea => {
                let addr = self.pc_relative(instr);
                self.set_result(decode::dr(instr), addr);
            }

            // ==================== Stores ====================

            Opcode::St => {
                let addr = self.pc_relative(instr);
                self.mem.write(addr, self.regs.read(decode::dr(instr)));
            }

            Opcode::Sti => {
                let pointer = self.pc_relative(instr);
                let addr = self.mem.read(pointer, console)?;
                self.mem.write(addr, self.regs.read(decode::dr(instr)));
            }

            Opcode::Str => {
                let addr = self.base_relative(instr);
                self.mem.write(addr, self.regs.read(decode::dr(instr)));
            }

            // ==================== Control Flow ====================

            Opcode::Br => {
                if decode::cond_mask(instr) & self.regs.read(Register::Cond) != 0 {
                    let target = self.pc_relative(instr);
                    self.regs.jump(target);
                }
            }

            Opcode::Jmp => {
                let target = self.regs.read(decode::base_r(instr));
                self.regs.jump(target);
            }

            Opcode::Jsr => {
                // Link first; JSRR R7 therefore jumps to the new link value.
                self.regs.write(Register::R7, self.regs.pc());
                let target = if decode::long_flag(instr) {
                    self.regs.pc().wrapping_add(decode::pc_offset11(instr))
                } else {
                    self.regs.read(decode::base_r(instr))
                };
                self.regs.jump(target);
            }

            Opcode::Trap => {
                self.regs.write(Register::R7, self.regs.pc());
                return self.dispatch_trap(decode::trap_vector(instr), console);
            }

            Opcode::Rti | Opcode::Res => {
                return Err(CpuError::UnhandledOpcode(op.bits()));
            }
        }

        Ok(Flow::Continue)
    }

    /// Write a general purpose register and update COND from it.
    pub(crate) fn set_result(&mut self, dr: Register, value: u16) {
        self.regs.write(dr, value);
        self.regs.update_flags(dr);
    }

    /// SR2 or the sign-extended imm5, selected by bit 5.
    fn second_operand(&self, instr: u16) -> u16 {
        if decode::imm_flag(instr) {
            decode::imm5(instr)
        } else {
            self.regs.read(decode::sr2(instr))
        }
    }

    /// PC + sign-extended PCoffset9. PC has already been incremented.
    fn pc_relative(&self, instr: u16) -> u16 {
        self.regs.pc().wrapping_add(decode::pc_offset9(instr))
    }

    /// BaseR + sign-extended offset6.
    fn base_relative(&self, instr: u16) -> u16 {
        self.regs
            .read(decode::base_r(instr))
            .wrapping_add(decode::offset6(instr))
    }

    /// Snapshot of the architectural state, for reporting.
    pub fn report(&self) -> RunReport {
        RunReport {
            state: self.state,
            cycles: self.cycles,
            registers: self.regs.clone(),
        }
    }

    /// Check if the CPU is halted.
    pub fn is_halted(&self) -> bool {
        self.state == CpuState::Halted
    }

    /// Check if the CPU is running.
    pub fn is_running(&self) -> bool {
        self.state == CpuState::Running
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("state", &self.state)
            .field("cycles", &self.cycles)
            .field("fault_pc", &self.fault_pc)
            .field("regs", &self.regs)
            .finish()
    }
}

/// Architectural state at the end of (or during) a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub state: CpuState,
    pub cycles: u64,
    pub registers: Registers,
}

/// Errors that can occur during CPU execution.
#[derive(Debug, Error)]
pub enum CpuError {
    #[error("CPU not running: {0:?}")]
    NotRunning(CpuState),

    #[error("unhandled opcode {0:#x}")]
    UnhandledOpcode(u16),

    #[error("unrecognized trap {0:#04x}")]
    UnknownTrap(u8),

    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("console I/O error: {0}")]
    Io(#[from] std::io::Error),
}
