//! # LC-3 Emulator
//!
//! An emulator of the LC-3, the 16-bit teaching computer.
//!
//! Programs are loaded from object images and run from address 0x3000 until
//! they execute the HALT trap. Keyboard and display traps are serviced by a
//! pluggable [`Console`].

pub mod cpu;
pub mod asm;
pub mod image;

// Re-export commonly used types
pub use cpu::{Cpu, CpuState, CpuError, Console, StdConsole, BufferConsole, Memory, Registers, Register, CondFlag};
pub use image::{Image, ImageError, load_image};
pub use asm::{disassemble, disassemble_instruction};
