//! Instruction decoding for the LC-3.
//!
//! Every instruction is one 16-bit word. The top four bits select the opcode;
//! the remaining twelve are laid out per opcode, so handlers pull their own
//! operand fields with the helpers below.

use crate::cpu::registers::Register;
use serde::{Serialize, Deserialize};

/// LC-3 opcodes, in encoding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum Opcode {
    /// Conditional branch
    Br = 0,
    /// Add
    Add,
    /// Load PC-relative
    Ld,
    /// Store PC-relative
    St,
    /// Jump to subroutine (JSR / JSRR)
    Jsr,
    /// Bitwise and
    And,
    /// Load base + offset
    Ldr,
    /// Store base + offset
    Str,
    /// Return from interrupt (not implemented by this machine)
    Rti,
    /// Bitwise not
    Not,
    /// Load indirect
    Ldi,
    /// Store indirect
    Sti,
    /// Jump (and RET)
    Jmp,
    /// Reserved
    Res,
    /// Load effective address
    Lea,
    /// System call
    Trap,
}

impl Opcode {
    /// All opcodes, indexed by their encoding.
    pub const ALL: [Opcode; 16] = [
        Opcode::Br,
        Opcode::Add,
        Opcode::Ld,
        Opcode::St,
        Opcode::Jsr,
        Opcode::And,
        Opcode::Ldr,
        Opcode::Str,
        Opcode::Rti,
        Opcode::Not,
        Opcode::Ldi,
        Opcode::Sti,
        Opcode::Jmp,
        Opcode::Res,
        Opcode::Lea,
        Opcode::Trap,
    ];

    /// Look up an opcode by its 4-bit encoding.
    pub fn from_bits(bits: u16) -> Option<Opcode> {
        Self::ALL.get(bits as usize).copied()
    }

    /// Decode the opcode of an instruction word.
    #[inline]
    pub fn of(instr: u16) -> Option<Opcode> {
        Self::from_bits(opcode_bits(instr))
    }

    /// The 4-bit encoding.
    #[inline]
    pub const fn bits(self) -> u16 {
        self as u16
    }

    /// Assembly mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Br => "BR",
            Opcode::Add => "ADD",
            Opcode::Ld => "LD",
            Opcode::St => "ST",
            Opcode::Jsr => "JSR",
            Opcode::And => "AND",
            Opcode::Ldr => "LDR",
            Opcode::Str => "STR",
            Opcode::Rti => "RTI",
            Opcode::Not => "NOT",
            Opcode::Ldi => "LDI",
            Opcode::Sti => "STI",
            Opcode::Jmp => "JMP",
            Opcode::Res => "RES",
            Opcode::Lea => "LEA",
            Opcode::Trap => "TRAP",
        }
    }
}

/// Widen the low `bit_count` bits of `value` to 16 bits, two's complement.
///
/// Field widths run from 1 to 16. A 16-bit field is already full width and is
/// returned as is; a zero-width field holds no bits and yields 0.
#[inline]
pub const fn sign_extend(value: u16, bit_count: u32) -> u16 {
    if bit_count == 0 {
        return 0;
    }
    if bit_count >= 16 {
        return value;
    }
    if (value >> (bit_count - 1)) & 1 != 0 {
        value | (0xFFFF << bit_count)
    } else {
        value
    }
}

/// Bits 15-12.
#[inline]
pub const fn opcode_bits(instr: u16) -> u16 {
    instr >> 12
}

// ==================== Operand fields ====================

/// Destination (or store source) register, bits 11-9.
#[inline]
pub const fn dr(instr: u16) -> Register {
    Register::gpr(instr >> 9)
}

/// First source or base register, bits 8-6.
#[inline]
pub const fn sr1(instr: u16) -> Register {
    Register::gpr(instr >> 6)
}

/// Base register for JMP/JSRR/LDR/STR, bits 8-6.
#[inline]
pub const fn base_r(instr: u16) -> Register {
    sr1(instr)
}

/// Second source register, bits 2-0.
#[inline]
pub const fn sr2(instr: u16) -> Register {
    Register::gpr(instr)
}

/// ADD/AND immediate mode, bit 5.
#[inline]
pub const fn imm_flag(instr: u16) -> bool {
    (instr >> 5) & 0x1 == 1
}

/// JSR (as opposed to JSRR), bit 11.
#[inline]
pub const fn long_flag(instr: u16) -> bool {
    (instr >> 11) & 0x1 == 1
}

/// BR condition mask, bits 11-9 (n, z, p).
#[inline]
pub const fn cond_mask(instr: u16) -> u16 {
    (instr >> 9) & 0x7
}

#[inline]
pub const fn imm5(instr: u16) -> u16 {
    sign_extend(instr & 0x1F, 5)
}

#[inline]
pub const fn offset6(instr: u16) -> u16 {
    sign_extend(instr & 0x3F, 6)
}

#[inline]
pub const fn pc_offset9(instr: u16) -> u16 {
    sign_extend(instr & 0x1FF, 9)
}

#[inline]
pub const fn pc_offset11(instr: u16) -> u16 {
    sign_extend(instr & 0x7FF, 11)
}

/// TRAP vector, bits 7-0.
#[inline]
pub const fn trap_vector(instr: u16) -> u8 {
    (instr & 0xFF) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sign_extend_boundaries() {
        for bits in [5u32, 6, 9, 11] {
            let mask = (1u16 << bits) - 1;
            let midpoint = 1u16 << (bits - 1);

            assert_eq!(sign_extend(0, bits), 0);
            assert_eq!(sign_extend(mask, bits), 0xFFFF, "all ones, {bits} bits");
            assert_eq!(
                sign_extend(midpoint, bits) as i16,
                -(1i16 << (bits - 1)),
                "sign bit only, {bits} bits"
            );
            assert_eq!(sign_extend(midpoint - 1, bits), midpoint - 1);
        }
    }

    #[test]
    fn test_sign_extend_degenerate_widths() {
        assert_eq!(sign_extend(0x8000, 16), 0x8000);
        assert_eq!(sign_extend(0x7FFF, 16), 0x7FFF);
        assert_eq!(sign_extend(0x0001, 1), 0xFFFF);
        assert_eq!(sign_extend(0x1234, 0), 0);
    }

    #[test]
    fn test_opcode_from_bits() {
        for (bits, op) in Opcode::ALL.iter().enumerate() {
            assert_eq!(Opcode::from_bits(bits as u16), Some(*op));
            assert_eq!(op.bits(), bits as u16);
        }
        assert_eq!(Opcode::from_bits(16), None);
    }

    #[test]
    fn test_opcode_of_instruction() {
        assert_eq!(Opcode::of(0x1025), Some(Opcode::Add));
        assert_eq!(Opcode::of(0xF025), Some(Opcode::Trap));
        assert_eq!(Opcode::of(0x0000), Some(Opcode::Br));
    }

    #[test]
    fn test_operand_fields() {
        // ADD R3, R1, #-2
        let instr = 0b0001_011_001_1_11110;
        assert_eq!(dr(instr), Register::R3);
        assert_eq!(sr1(instr), Register::R1);
        assert!(imm_flag(instr));
        assert_eq!(imm5(instr) as i16, -2);

        // ADD R7, R6, R5
        let instr = 0b0001_111_110_0_00_101;
        assert_eq!(dr(instr), Register::R7);
        assert_eq!(sr1(instr), Register::R6);
        assert_eq!(sr2(instr), Register::R5);
        assert!(!imm_flag(instr));

        assert_eq!(cond_mask(0b0000_101_000000000), 0b101);
        assert!(long_flag(0x4800));
        assert_eq!(trap_vector(0xF025), 0x25);
    }

    proptest! {
        #[test]
        fn sign_extend_matches_arithmetic_widening(value in any::<u16>(), bits in prop::sample::select(vec![5u32, 6, 9, 11])) {
            let field = value & ((1u16 << bits) - 1);
            let shift = 16 - bits;
            let expected = (((field << shift) as i16) >> shift) as u16;
            prop_assert_eq!(sign_extend(field, bits), expected);
        }
    }
}
