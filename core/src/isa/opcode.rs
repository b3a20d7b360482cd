//! eBPF opcode fields.
//!
//! # Instruction Code
//!
//! The low byte of every instruction is split into three fields:
//! ```text
//! ┌────────────┬────────┬───────────┐
//! │ Operation  │ Source │   Class   │
//! │  (4 bits)  │ (1 bit)│  (3 bits) │
//! └────────────┴────────┴───────────┘
//! ```
//!
//! Load and store classes reuse the upper five bits as `mode | size`.
//! The values below are the kernel's `BPF_*` constants, so `op as u8`
//! can be OR-ed straight into the code byte.

use core::fmt;

// ============================================================================
// Instruction Classes
// ============================================================================

/// The 3-bit instruction class.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsClass {
    Ld = 0x00,
    Ldx = 0x01,
    St = 0x02,
    Stx = 0x03,
    Alu = 0x04,
    Jmp = 0x05,
    Jmp32 = 0x06,
    Alu64 = 0x07,
}

impl InsClass {
    pub const fn name(self) -> &'static str {
        match self {
            InsClass::Ld => "BPF_LD",
            InsClass::Ldx => "BPF_LDX",
            InsClass::St => "BPF_ST",
            InsClass::Stx => "BPF_STX",
            InsClass::Alu => "BPF_ALU",
            InsClass::Jmp => "BPF_JMP",
            InsClass::Jmp32 => "BPF_JMP32",
            InsClass::Alu64 => "BPF_ALU64",
        }
    }

    pub const fn from_code(code: u8) -> InsClass {
        match code & 0x07 {
            0x00 => InsClass::Ld,
            0x01 => InsClass::Ldx,
            0x02 => InsClass::St,
            0x03 => InsClass::Stx,
            0x04 => InsClass::Alu,
            0x05 => InsClass::Jmp,
            0x06 => InsClass::Jmp32,
            _ => InsClass::Alu64,
        }
    }
}

// ============================================================================
// Source Operand
// ============================================================================

/// Use the 32-bit immediate as the second operand.
pub const SRC_K: u8 = 0x00;

/// Use the source register as the second operand.
pub const SRC_X: u8 = 0x08;

/// `BPF_MEM` addressing mode for loads and stores.
pub const MODE_MEM: u8 = 0x60;

// ============================================================================
// Jump Operations
// ============================================================================

/// Operation field of `BPF_JMP` / `BPF_JMP32` instructions.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JmpOp {
    /// Unconditional jump (`BPF_JMP` only)
    Ja = 0x00,
    Jeq = 0x10,
    Jgt = 0x20,
    Jge = 0x30,
    /// Jump if `dst & src` is non-zero
    Jset = 0x40,
    Jne = 0x50,
    Jsgt = 0x60,
    Jsge = 0x70,
    /// Helper function call
    Call = 0x80,
    /// Return from the program, `R0` is the exit code
    Exit = 0x90,
    Jlt = 0xa0,
    Jle = 0xb0,
    Jslt = 0xc0,
    Jsle = 0xd0,
}

impl JmpOp {
    pub const fn name(self) -> &'static str {
        match self {
            JmpOp::Ja => "BPF_JA",
            JmpOp::Jeq => "BPF_JEQ",
            JmpOp::Jgt => "BPF_JGT",
            JmpOp::Jge => "BPF_JGE",
            JmpOp::Jset => "BPF_JSET",
            JmpOp::Jne => "BPF_JNE",
            JmpOp::Jsgt => "BPF_JSGT",
            JmpOp::Jsge => "BPF_JSGE",
            JmpOp::Call => "BPF_CALL",
            JmpOp::Exit => "BPF_EXIT",
            JmpOp::Jlt => "BPF_JLT",
            JmpOp::Jle => "BPF_JLE",
            JmpOp::Jslt => "BPF_JSLT",
            JmpOp::Jsle => "BPF_JSLE",
        }
    }
}

impl fmt::Display for JmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// ALU Operations
// ============================================================================

/// Operation field of `BPF_ALU` / `BPF_ALU64` instructions.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AluOp {
    Add = 0x00,
    Sub = 0x10,
    Mul = 0x20,
    Div = 0x30,
    Or = 0x40,
    And = 0x50,
    Lsh = 0x60,
    Rsh = 0x70,
    Neg = 0x80,
    Mod = 0x90,
    Xor = 0xa0,
    Mov = 0xb0,
    Arsh = 0xc0,
}

impl AluOp {
    pub const fn name(self) -> &'static str {
        match self {
            AluOp::Add => "BPF_ADD",
            AluOp::Sub => "BPF_SUB",
            AluOp::Mul => "BPF_MUL",
            AluOp::Div => "BPF_DIV",
            AluOp::Or => "BPF_OR",
            AluOp::And => "BPF_AND",
            AluOp::Lsh => "BPF_LSH",
            AluOp::Rsh => "BPF_RSH",
            AluOp::Neg => "BPF_NEG",
            AluOp::Mod => "BPF_MOD",
            AluOp::Xor => "BPF_XOR",
            AluOp::Mov => "BPF_MOV",
            AluOp::Arsh => "BPF_ARSH",
        }
    }
}

impl fmt::Display for AluOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Memory Access Size
// ============================================================================

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemSize {
    /// 32 bits
    W = 0x00,
    /// 16 bits
    H = 0x08,
    /// 8 bits
    B = 0x10,
    /// 64 bits
    Dw = 0x18,
}

impl MemSize {
    pub const fn name(self) -> &'static str {
        match self {
            MemSize::W => "BPF_W",
            MemSize::H => "BPF_H",
            MemSize::B => "BPF_B",
            MemSize::Dw => "BPF_DW",
        }
    }
}
