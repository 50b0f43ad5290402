//! LC-3 register file.
//!
//! The LC-3 has 10 registers:
//! - R0-R7: 16-bit general purpose registers
//! - PC: program counter
//! - COND: condition flags, holding exactly one of P/Z/N

use serde::{Serialize, Deserialize};

/// Address the program counter starts from on every run.
pub const PC_START: u16 = 0x3000;

/// A register slot in the register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Register {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    /// Program counter.
    Pc,
    /// Condition flags.
    Cond,
}

impl Register {
    /// Number of slots in the register file.
    pub const COUNT: usize = 10;

    /// General purpose registers, in encoding order.
    pub const GPRS: [Register; 8] = [
        Register::R0,
        Register::R1,
        Register::R2,
        Register::R3,
        Register::R4,
        Register::R5,
        Register::R6,
        Register::R7,
    ];

    /// Map a 3-bit operand field to a general purpose register.
    /// Bits above the low three are ignored.
    #[inline]
    pub const fn gpr(bits: u16) -> Register {
        Self::GPRS[(bits & 0x7) as usize]
    }

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Register::Pc => write!(f, "PC"),
            Register::Cond => write!(f, "COND"),
            gpr => write!(f, "R{}", gpr.index()),
        }
    }
}

/// Condition flag held in COND.
///
/// The flags are mutually exclusive tags, never accumulated as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum CondFlag {
    Positive = 1 << 0,
    Zero = 1 << 1,
    Negative = 1 << 2,
}

impl CondFlag {
    /// Classify a value by its signed interpretation.
    #[inline]
    pub const fn of(value: u16) -> Self {
        if value == 0 {
            CondFlag::Zero
        } else if value >> 15 != 0 {
            CondFlag::Negative
        } else {
            CondFlag::Positive
        }
    }

    /// Decode a raw COND word.
    pub const fn from_word(word: u16) -> Option<Self> {
        match word {
            1 => Some(CondFlag::Positive),
            2 => Some(CondFlag::Zero),
            4 => Some(CondFlag::Negative),
            _ => None,
        }
    }

    /// Raw COND word for this flag.
    #[inline]
    pub const fn bits(self) -> u16 {
        self as u16
    }
}

/// The LC-3 register file.
///
/// Plain storage; the CPU is responsible for only ever writing flag tags into COND.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    slots: [u16; Register::COUNT],
}

impl Registers {
    /// Create a register file in its power-on state: PC at 0x3000, COND zero.
    pub fn new() -> Self {
        let mut regs = Self {
            slots: [0; Register::COUNT],
        };
        regs.reset();
        regs
    }

    /// Reset to the power-on state.
    pub fn reset(&mut self) {
        self.slots = [0; Register::COUNT];
        self.write(Register::Pc, PC_START);
        self.write(Register::Cond, CondFlag::Zero.bits());
    }

    #[inline]
    pub fn read(&self, reg: Register) -> u16 {
        self.slots[reg.index()]
    }

    #[inline]
    pub fn write(&mut self, reg: Register, value: u16) {
        self.slots[reg.index()] = value;
    }

    /// Program counter.
    #[inline]
    pub fn pc(&self) -> u16 {
        self.read(Register::Pc)
    }

    /// Set the program counter to an absolute address.
    #[inline]
    pub fn jump(&mut self, addr: u16) {
        self.write(Register::Pc, addr);
    }

    /// Increment the program counter by 1, wrapping at the end of memory.
    /// Returns the old value.
    pub fn advance_pc(&mut self) -> u16 {
        let old = self.pc();
        self.jump(old.wrapping_add(1));
        old
    }

    /// Current condition flag, or `None` if COND holds something other than a tag.
    pub fn cond(&self) -> Option<CondFlag> {
        CondFlag::from_word(self.read(Register::Cond))
    }

    /// Recompute COND from the current value of `reg`.
    pub fn update_flags(&mut self, reg: Register) {
        let flag = CondFlag::of(self.read(reg));
        self.write(Register::Cond, flag.bits());
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Registers");
        for reg in Register::GPRS {
            s.field(&reg.to_string(), &format_args!("{:#06x}", self.read(reg)));
        }
        s.field("PC", &format_args!("{:#06x}", self.pc()))
            .field("COND", &self.cond())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_power_on_state() {
        let regs = Registers::new();
        assert_eq!(regs.pc(), 0x3000);
        assert_eq!(regs.cond(), Some(CondFlag::Zero));
        for reg in Register::GPRS {
            assert_eq!(regs.read(reg), 0);
        }
    }

    #[test]
    fn test_gpr_masks_field() {
        assert_eq!(Register::gpr(0), Register::R0);
        assert_eq!(Register::gpr(7), Register::R7);
        assert_eq!(Register::gpr(0b1010), Register::R2);
    }

    #[test]
    fn test_update_flags() {
        let mut regs = Registers::new();

        regs.write(Register::R3, 100);
        regs.update_flags(Register::R3);
        assert_eq!(regs.cond(), Some(CondFlag::Positive));

        regs.write(Register::R3, 0x8000);
        regs.update_flags(Register::R3);
        assert_eq!(regs.cond(), Some(CondFlag::Negative));

        regs.write(Register::R3, 0);
        regs.update_flags(Register::R3);
        assert_eq!(regs.cond(), Some(CondFlag::Zero));
    }

    #[test]
    fn test_advance_pc_wraps() {
        let mut regs = Registers::new();
        regs.jump(0xFFFF);

        let old = regs.advance_pc();
        assert_eq!(old, 0xFFFF);
        assert_eq!(regs.pc(), 0);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Register::R5.to_string(), "R5");
        assert_eq!(Register::Pc.to_string(), "PC");
        assert_eq!(Register::Cond.to_string(), "COND");
    }

    proptest! {
        #[test]
        fn flags_track_signed_value(value in any::<u16>()) {
            let mut regs = Registers::new();
            regs.write(Register::R0, value);
            regs.update_flags(Register::R0);

            let expected = match (value as i16).signum() {
                0 => CondFlag::Zero,
                1 => CondFlag::Positive,
                _ => CondFlag::Negative,
            };
            prop_assert_eq!(regs.cond(), Some(expected));
        }
    }
}
