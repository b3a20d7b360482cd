//! Bit packing for eBPF instruction words.
//!
//! # Word Format
//!
//! Every instruction is one 64-bit word, laid out like the kernel's
//! `struct bpf_insn` when read as little-endian:
//! ```text
//! ┌───────────────┬────────────────┬───────┬───────┬──────────┐
//! │      imm      │     offset     │  src  │  dst  │   code   │
//! │   (32 bits)   │   (16 bits)    │ (4 b) │ (4 b) │ (8 bits) │
//! └───────────────┴────────────────┴───────┴───────┴──────────┘
//!  63           32 31            16 15   12 11    8 7        0
//! ```
//!
//! `u64::to_le_bytes` on a word yields the exact 8 bytes the loader expects.

use super::opcode::{AluOp, InsClass, JmpOp, MODE_MEM, MemSize, SRC_K, SRC_X};

/// Pack the raw fields of one instruction.
pub const fn encode(code: u8, dst: u8, src: u8, offset: i16, imm: i32) -> u64 {
    (imm as u32 as u64) << 32
        | (offset as u16 as u64) << 16
        | ((src & 0x0f) as u64) << 12
        | ((dst & 0x0f) as u64) << 8
        | code as u64
}

/// Jump comparing `dst` against a constant.
pub const fn encode_immediate_jmp(
    op: JmpOp,
    class: InsClass,
    dst: u8,
    imm: i32,
    offset: i16,
) -> u64 {
    encode(op as u8 | SRC_K | class as u8, dst, 0, offset, imm)
}

/// Jump comparing `dst` against register `src`.
pub const fn encode_register_jmp(
    op: JmpOp,
    class: InsClass,
    dst: u8,
    src: u8,
    offset: i16,
) -> u64 {
    encode(op as u8 | SRC_X | class as u8, dst, src, offset, 0)
}

pub const fn encode_immediate_alu(op: AluOp, class: InsClass, dst: u8, imm: i32) -> u64 {
    encode(op as u8 | SRC_K | class as u8, dst, 0, 0, imm)
}

pub const fn encode_register_alu(op: AluOp, class: InsClass, dst: u8, src: u8) -> u64 {
    encode(op as u8 | SRC_X | class as u8, dst, src, 0, 0)
}

/// `*(size *)(dst + offset) = imm`
pub const fn encode_store_immediate(size: MemSize, dst: u8, offset: i16, imm: i32) -> u64 {
    encode(InsClass::St as u8 | MODE_MEM | size as u8, dst, 0, offset, imm)
}

/// The fields of an encoded word, for inspection and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedInsn {
    pub code: u8,
    pub dst: u8,
    pub src: u8,
    pub offset: i16,
    pub imm: i32,
}

impl DecodedInsn {
    pub const fn decode(word: u64) -> Self {
        Self {
            code: word as u8,
            dst: (word >> 8) as u8 & 0x0f,
            src: (word >> 12) as u8 & 0x0f,
            offset: (word >> 16) as u16 as i16,
            imm: (word >> 32) as u32 as i32,
        }
    }

    pub const fn class(&self) -> InsClass {
        InsClass::from_code(self.code)
    }

    pub const fn uses_register_source(&self) -> bool {
        self.code & SRC_X != 0
    }
}
