//! Straight-line instructions: helper calls, ALU operations and stores.

use super::NodeId;
use crate::{
    String, format,
    isa::{
        AluOp, InsClass, JmpOp, MemSize, Operand, Register,
        encoding::{
            encode_immediate_alu, encode_immediate_jmp, encode_register_alu,
            encode_store_immediate,
        },
        helpers::helper_name,
    },
};

/// A node with exactly one successor.
#[derive(Debug, Clone)]
pub struct Linear {
    pub(crate) insn: LinearInsn,
    pub(crate) next: Option<NodeId>,
}

impl Linear {
    pub(crate) fn new(insn: LinearInsn) -> Self {
        Self { insn, next: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinearInsn {
    /// `call helper`, arguments in `R1`..`R5`, result in `R0`.
    Call { helper: i32 },

    /// `dst op= src` in 64-bit (`Alu64`) or 32-bit (`Alu`) width.
    Alu {
        op: AluOp,
        class: InsClass,
        dst: Register,
        src: Operand,
    },

    /// `*(size *)(dst + offset) = imm`
    Store {
        size: MemSize,
        dst: Register,
        offset: i16,
        imm: i32,
    },
}

impl LinearInsn {
    pub fn encode(&self) -> u64 {
        match *self {
            LinearInsn::Call { helper } => {
                encode_immediate_jmp(JmpOp::Call, InsClass::Jmp, 0, helper, 0)
            }
            LinearInsn::Alu {
                op,
                class,
                dst,
                src: Operand::Imm(imm),
            } => encode_immediate_alu(op, class, dst.number(), imm),
            LinearInsn::Alu {
                op,
                class,
                dst,
                src: Operand::Reg(src),
            } => encode_register_alu(op, class, dst.number(), src.number()),
            LinearInsn::Store {
                size,
                dst,
                offset,
                imm,
            } => encode_store_immediate(size, dst.number(), offset, imm),
        }
    }

    pub fn render(&self) -> String {
        match *self {
            LinearInsn::Call { helper } => format!("BPF_CALL_FUNC({})", helper_name(helper)),
            LinearInsn::Alu {
                op,
                class,
                dst,
                src,
            } => {
                let width = if class == InsClass::Alu64 { "64" } else { "32" };
                let suffix = if src.is_immediate() { "IMM" } else { "REG" };
                if op == AluOp::Mov {
                    format!("BPF_MOV{}_{}({}, {})", width, suffix, dst, src)
                } else {
                    format!("BPF_ALU{}_{}({}, {}, {})", width, suffix, op, dst, src)
                }
            }
            LinearInsn::Store {
                size,
                dst,
                offset,
                imm,
            } => format!("BPF_ST_MEM({}, {}, {}, {})", size.name(), dst, offset, imm),
        }
    }
}
