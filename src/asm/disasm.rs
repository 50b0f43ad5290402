//! Disassembler for LC-3 programs.
//!
//! Converts instruction words back to readable assembly.

use crate::cpu::decode::{self, Opcode};
use crate::cpu::registers::Register;
use crate::cpu::trap::TrapVector;
use crate::image::Image;

/// Disassemble a single instruction to text.
///
/// Words that are not executable (RTI, the reserved opcode) render as `.FILL`.
pub fn disassemble_instruction(instr: u16) -> String {
    match Opcode::of(instr) {
        Some(op) => format_instruction(op, instr),
        None => format!(".FILL x{:04X}", instr),
    }
}

/// Disassemble a whole image, one line per word with its address.
pub fn disassemble(image: &Image) -> String {
    let mut output = String::new();
    output.push_str(&format!("; LC-3 Disassembly, origin x{:04X}\n", image.origin));
    output.push_str("; ----------------------------\n\n");

    for (addr, instr) in image.iter() {
        let line = disassemble_instruction(instr);
        output.push_str(&format!("x{:04X}: {:04X}  {}\n", addr, instr, line));
    }

    output
}

/// Format a decoded instruction as assembly text.
fn format_instruction(op: Opcode, instr: u16) -> String {
    let name = op.mnemonic();
    match op {
        Opcode::Add | Opcode::And => {
            let second = if decode::imm_flag(instr) {
                format_imm(decode::imm5(instr))
            } else {
                decode::sr2(instr).to_string()
            };
            format!("{} {}, {}, {}", name, decode::dr(instr), decode::sr1(instr), second)
        }
        Opcode::Not => format!("NOT {}, {}", decode::dr(instr), decode::sr1(instr)),

        Opcode::Br => {
            let mask = decode::cond_mask(instr);
            let mut flags = String::new();
            for (bit, c) in [(0b100, 'n'), (0b010, 'z'), (0b001, 'p')] {
                if mask & bit != 0 {
                    flags.push(c);
                }
            }
            if mask == 0 {
                "NOP".to_string()
            } else {
                format!("BR{} {}", flags, format_imm(decode::pc_offset9(instr)))
            }
        }
        Opcode::Jmp => match decode::base_r(instr) {
            Register::R7 => "RET".to_string(),
            base => format!("JMP {}", base),
        },
        Opcode::Jsr => {
            if decode::long_flag(instr) {
                format!("JSR {}", format_imm(decode::pc_offset11(instr)))
            } else {
                format!("JSRR {}", decode::base_r(instr))
            }
        }

        Opcode::Ld | Opcode::Ldi | Opcode::Lea | Opcode::St | Opcode::Sti => {
            format!("{} {}, {}", name, decode::dr(instr), format_imm(decode::pc_offset9(instr)))
        }
        Opcode::Ldr | Opcode::Str => format!(
            "{} {}, {}, {}",
            name,
            decode::dr(instr),
            decode::base_r(instr),
            format_imm(decode::offset6(instr))
        ),

        Opcode::Trap => {
            let vector = decode::trap_vector(instr);
            match TrapVector::from_byte(vector) {
                Some(trap) => format!("TRAP x{:02X}  ; {}", vector, trap.name()),
                None => format!("TRAP x{:02X}", vector),
            }
        }

        Opcode::Rti | Opcode::Res => format!(".FILL x{:04X}  ; {}", instr, name),
    }
}

/// Format a sign-extended field as a signed decimal immediate.
fn format_imm(value: u16) -> String {
    format!("#{}", value as i16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::encode::{self, Cond};
    use crate::cpu::registers::Register::{R0, R1, R2, R3, R7};

    #[test]
    fn test_disassemble_arithmetic() {
        assert_eq!(disassemble_instruction(encode::add_imm(R0, R0, 5)), "ADD R0, R0, #5");
        assert_eq!(disassemble_instruction(encode::and_reg(R1, R2, R3)), "AND R1, R2, R3");
        assert_eq!(disassemble_instruction(encode::not(R2, R3)), "NOT R2, R3");
    }

    #[test]
    fn test_disassemble_control_flow() {
        assert_eq!(disassemble_instruction(encode::br(Cond::NZ, -3)), "BRnz #-3");
        assert_eq!(disassemble_instruction(encode::ret()), "RET");
        assert_eq!(disassemble_instruction(encode::jmp(R2)), "JMP R2");
        assert_eq!(disassemble_instruction(encode::jsr(10)), "JSR #10");
        assert_eq!(disassemble_instruction(encode::jsrr(R7)), "JSRR R7");
        assert_eq!(disassemble_instruction(0x0000), "NOP");
    }

    #[test]
    fn test_disassemble_memory() {
        assert_eq!(disassemble_instruction(encode::ldr(R0, R1, -2)), "LDR R0, R1, #-2");
        assert_eq!(disassemble_instruction(encode::sti(R3, 7)), "STI R3, #7");
    }

    #[test]
    fn test_disassemble_traps() {
        assert_eq!(disassemble_instruction(0xF025), "TRAP x25  ; HALT");
        assert_eq!(disassemble_instruction(0xF099), "TRAP x99");
        assert!(disassemble_instruction(0x8000).starts_with(".FILL x8000"));
    }

    #[test]
    fn test_disassemble_image_listing() {
        let image = Image::new(0x3000, vec![0x1025, 0xF025]);
        let listing = disassemble(&image);

        assert!(listing.contains("x3000: 1025  ADD R0, R0, #5"));
        assert!(listing.contains("x3001: F025  TRAP x25  ; HALT"));
    }
}
