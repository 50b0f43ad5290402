//! Encoder and disassembler for LC-3 programs.
//!
//! This module provides:
//! - Instruction word builders, one per instruction form
//! - A disassembler (image → readable text)

pub mod disasm;
pub mod encode;

pub use disasm::{disassemble, disassemble_instruction};
