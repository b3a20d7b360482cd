//! eBPF registers and instruction operands.

use core::fmt;

/// One of the eleven eBPF registers.
///
/// `R0` holds helper return values and the program exit code, `R1`..`R5`
/// carry helper arguments, `R6`..`R9` are callee saved and `R10` is the
/// read-only frame pointer.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Register {
    R0 = 0,
    R1 = 1,
    R2 = 2,
    R3 = 3,
    R4 = 4,
    R5 = 5,
    R6 = 6,
    R7 = 7,
    R8 = 8,
    R9 = 9,
    R10 = 10,
}

const REGISTER_NAMES: [&str; 11] = [
    "BPF_REG_0",
    "BPF_REG_1",
    "BPF_REG_2",
    "BPF_REG_3",
    "BPF_REG_4",
    "BPF_REG_5",
    "BPF_REG_6",
    "BPF_REG_7",
    "BPF_REG_8",
    "BPF_REG_9",
    "BPF_REG_10",
];

impl Register {
    /// Registers that carry helper arguments, in calling-convention order.
    pub const ARGS: [Register; 5] = [
        Register::R1,
        Register::R2,
        Register::R3,
        Register::R4,
        Register::R5,
    ];

    /// Number encoded in the `dst`/`src` nibbles of an instruction.
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Kernel macro name, e.g. `BPF_REG_3`.
    pub const fn name(self) -> &'static str {
        REGISTER_NAMES[self as usize]
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Second operand of an ALU or jump instruction: a 32-bit constant or a
/// source register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    Imm(i32),
    Reg(Register),
}

impl Operand {
    pub fn is_immediate(&self) -> bool {
        matches!(self, Operand::Imm(_))
    }
}

impl From<i32> for Operand {
    fn from(value: i32) -> Self {
        Operand::Imm(value)
    }
}

impl From<Register> for Operand {
    fn from(reg: Register) -> Self {
        Operand::Reg(reg)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Imm(value) => write!(f, "{}", value),
            Operand::Reg(reg) => write!(f, "{}", reg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToString;

    #[test]
    fn test_register_names() {
        assert_eq!(Register::R0.name(), "BPF_REG_0");
        assert_eq!(Register::R10.name(), "BPF_REG_10");
        assert_eq!(Register::R7.to_string(), "BPF_REG_7");
    }

    #[test]
    fn test_register_numbers() {
        assert_eq!(Register::R0.number(), 0);
        assert_eq!(Register::R10.number(), 10);
        assert_eq!(Register::ARGS.map(Register::number), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_operand_conversions() {
        assert_eq!(Operand::from(5), Operand::Imm(5));
        assert_eq!(Operand::from(Register::R2), Operand::Reg(Register::R2));
        assert!(Operand::Imm(-1).is_immediate());
        assert!(!Operand::Reg(Register::R1).is_immediate());
    }
}
