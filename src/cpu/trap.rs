//! LC-3 trap routines.
//!
//! The six system calls are implemented natively instead of as LC-3 code in a
//! trap table. All of them talk to the host through a [`Console`].

use crate::cpu::console::Console;
use crate::cpu::execute::{Cpu, CpuError, Flow};
use crate::cpu::registers::Register;
use log::*;
use serde::{Serialize, Deserialize};

/// Prompt printed by the IN trap.
pub const IN_PROMPT: &str = "Enter a character: ";

/// Trap vectors understood by this machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TrapVector {
    /// Read one character, no echo.
    Getc = 0x20,
    /// Write the character in R0.
    Out = 0x21,
    /// Write a zero-terminated string, one character per word.
    Puts = 0x22,
    /// Prompt for and read one character.
    In = 0x23,
    /// Write a zero-terminated string, two characters per word.
    Putsp = 0x24,
    /// Stop the machine.
    Halt = 0x25,
}

impl TrapVector {
    pub const fn from_byte(byte: u8) -> Option<TrapVector> {
        match byte {
            0x20 => Some(TrapVector::Getc),
            0x21 => Some(TrapVector::Out),
            0x22 => Some(TrapVector::Puts),
            0x23 => Some(TrapVector::In),
            0x24 => Some(TrapVector::Putsp),
            0x25 => Some(TrapVector::Halt),
            _ => None,
        }
    }

    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Assembler alias for `TRAP xNN`.
    pub const fn name(self) -> &'static str {
        match self {
            TrapVector::Getc => "GETC",
            TrapVector::Out => "OUT",
            TrapVector::Puts => "PUTS",
            TrapVector::In => "IN",
            TrapVector::Putsp => "PUTSP",
            TrapVector::Halt => "HALT",
        }
    }
}

impl Cpu {
    /// Run the trap routine named by an 8-bit vector.
    pub(crate) fn dispatch_trap(&mut self, vector: u8, console: &mut dyn Console) -> Result<Flow, CpuError> {
        let trap = TrapVector::from_byte(vector).ok_or(CpuError::UnknownTrap(vector))?;

        match trap {
            TrapVector::Getc => self.trap_getc(console),
            TrapVector::Out => self.trap_out(console),
            TrapVector::Puts => self.trap_puts(console),
            TrapVector::In => self.trap_in(console),
            TrapVector::Putsp => self.trap_putsp(console),
            TrapVector::Halt => {
                info!("HALT at {:#06x}", self.regs.pc().wrapping_sub(1));
                Ok(Flow::Halt)
            }
        }
    }

    fn trap_getc(&mut self, console: &mut dyn Console) -> Result<Flow, CpuError> {
        let byte = console.read_byte()?;
        self.set_result(Register::R0, u16::from(byte));
        Ok(Flow::Continue)
    }

    fn trap_out(&mut self, console: &mut dyn Console) -> Result<Flow, CpuError> {
        let byte = self.regs.read(Register::R0) as u8;
        console.write_bytes(&[byte])?;
        console.flush()?;
        Ok(Flow::Continue)
    }

    fn trap_puts(&mut self, console: &mut dyn Console) -> Result<Flow, CpuError> {
        let mut addr = self.regs.read(Register::R0);
        loop {
            let word = self.mem.read(addr, console)?;
            if word == 0 {
                break;
            }
            console.write_bytes(&[word as u8])?;
            addr = addr.wrapping_add(1);
        }
        console.flush()?;
        Ok(Flow::Continue)
    }

    // The echo goes back to the input side of the console, not the display.
    fn trap_in(&mut self, console: &mut dyn Console) -> Result<Flow, CpuError> {
        console.write_bytes(IN_PROMPT.as_bytes())?;
        console.flush()?;

        let byte = console.read_byte()?;
        console.echo_input(byte)?;

        self.set_result(Register::R0, u16::from(byte));
        console.flush()?;
        Ok(Flow::Continue)
    }

    fn trap_putsp(&mut self, console: &mut dyn Console) -> Result<Flow, CpuError> {
        let mut addr = self.regs.read(Register::R0);
        loop {
            let word = self.mem.read(addr, console)?;
            if word == 0 {
                break;
            }
            let [high, low] = word.to_be_bytes();
            console.write_bytes(&[low])?;
            if high != 0 {
                console.write_bytes(&[high])?;
            }
            addr = addr.wrapping_add(1);
        }
        console.flush()?;
        Ok(Flow::Continue)
    }
}
