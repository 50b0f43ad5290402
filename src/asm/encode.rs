//! Instruction word builders.
//!
//! One function per LC-3 instruction form. Immediates and offsets are given as
//! signed values and truncated to their field width.

use crate::cpu::decode::Opcode;
use crate::cpu::registers::Register;

/// BR condition mask (n, z, p in bits 11-9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cond(u16);

impl Cond {
    pub const N: Cond = Cond(0b100);
    pub const Z: Cond = Cond(0b010);
    pub const P: Cond = Cond(0b001);
    pub const NZ: Cond = Cond(0b110);
    pub const NP: Cond = Cond(0b101);
    pub const ZP: Cond = Cond(0b011);
    pub const NZP: Cond = Cond(0b111);

    pub const fn bits(self) -> u16 {
        self.0
    }
}

#[inline]
fn op(opcode: Opcode) -> u16 {
    opcode.bits() << 12
}

#[inline]
fn reg(r: Register) -> u16 {
    r as u16 & 0x7
}

#[inline]
fn field(value: i16, bits: u32) -> u16 {
    value as u16 & ((1 << bits) - 1)
}

pub fn add_reg(dr: Register, sr1: Register, sr2: Register) -> u16 {
    op(Opcode::Add) | reg(dr) << 9 | reg(sr1) << 6 | reg(sr2)
}

pub fn add_imm(dr: Register, sr1: Register, imm5: i16) -> u16 {
    op(Opcode::Add) | reg(dr) << 9 | reg(sr1) << 6 | 1 << 5 | field(imm5, 5)
}

pub fn and_reg(dr: Register, sr1: Register, sr2: Register) -> u16 {
    op(Opcode::And) | reg(dr) << 9 | reg(sr1) << 6 | reg(sr2)
}

pub fn and_imm(dr: Register, sr1: Register, imm5: i16) -> u16 {
    op(Opcode::And) | reg(dr) << 9 | reg(sr1) << 6 | 1 << 5 | field(imm5, 5)
}

pub fn not(dr: Register, sr: Register) -> u16 {
    op(Opcode::Not) | reg(dr) << 9 | reg(sr) << 6 | 0x3F
}

pub fn br(cond: Cond, offset9: i16) -> u16 {
    op(Opcode::Br) | cond.bits() << 9 | field(offset9, 9)
}

pub fn jmp(base: Register) -> u16 {
    op(Opcode::Jmp) | reg(base) << 6
}

/// `JMP R7`.
pub fn ret() -> u16 {
    jmp(Register::R7)
}

pub fn jsr(offset11: i16) -> u16 {
    op(Opcode::Jsr) | 1 << 11 | field(offset11, 11)
}

pub fn jsrr(base: Register) -> u16 {
    op(Opcode::Jsr) | reg(base) << 6
}

pub fn ld(dr: Register, offset9: i16) -> u16 {
    op(Opcode::Ld) | reg(dr) << 9 | field(offset9, 9)
}

pub fn ldi(dr: Register, offset9: i16) -> u16 {
    op(Opcode::Ldi) | reg(dr) << 9 | field(offset9, 9)
}

pub fn ldr(dr: Register, base: Register, offset6: i16) -> u16 {
    op(Opcode::Ldr) | reg(dr) << 9 | reg(base) << 6 | field(offset6, 6)
}

pub fn lea(dr: Register, offset9: i16) -> u16 {
    op(Opcode::Lea) | reg(dr) << 9 | field(offset9, 9)
}

pub fn st(sr: Register, offset9: i16) -> u16 {
    op(Opcode::St) | reg(sr) << 9 | field(offset9, 9)
}

pub fn sti(sr: Register, offset9: i16) -> u16 {
    op(Opcode::Sti) | reg(sr) << 9 | field(offset9, 9)
}

pub fn str(sr: Register, base: Register, offset6: i16) -> u16 {
    op(Opcode::Str) | reg(sr) << 9 | reg(base) << 6 | field(offset6, 6)
}

pub fn trap(vector: u8) -> u16 {
    op(Opcode::Trap) | u16::from(vector)
}
