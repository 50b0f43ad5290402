//! CPU emulation for the LC-3.
//!
//! This module implements the complete LC-3 architecture:
//! - 65536 sixteen-bit memory words with a memory-mapped keyboard
//! - 10 registers: R0-R7, PC, COND
//! - 16 opcodes and 6 native trap routines

pub mod console;
pub mod memory;
pub mod registers;
pub mod decode;
pub mod execute;
pub mod trap;

pub use console::{Console, StdConsole, BufferConsole};
pub use memory::{Memory, MemoryError};
pub use registers::{Register, Registers, CondFlag};
pub use decode::{Opcode, sign_extend};
pub use execute::{Cpu, CpuError, CpuState, RunReport};
pub use trap::TrapVector;
