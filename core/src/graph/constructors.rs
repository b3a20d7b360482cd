//! Node constructors.
//!
//! Every constructor allocates one node in the program and returns its id.
//! Conditional jumps take the second operand as `impl Into<Operand>`, so
//! `jeq(R1, 5, 2)` builds an immediate comparison and `jeq(R1, R2, 2)` a
//! register comparison.

use super::{Branch, Linear, LinearInsn, NodeId, NodeKind, Program};
use crate::isa::{AluOp, InsClass, JmpOp, MemSize, Operand, Register};

macro_rules! conditional_jumps {
    ($($(#[$doc:meta])* $name:ident, $name32:ident => $op:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $name(&mut self, dst: Register, src: impl Into<Operand>, offset: i16) -> NodeId {
                self.new_jmp(JmpOp::$op, InsClass::Jmp, dst, src.into(), offset)
            }

            $(#[$doc])*
            ///
            /// Compares the lower 32 bits only (`BPF_JMP32`).
            pub fn $name32(&mut self, dst: Register, src: impl Into<Operand>, offset: i16) -> NodeId {
                self.new_jmp(JmpOp::$op, InsClass::Jmp32, dst, src.into(), offset)
            }
        )*
    };
}

impl<Ctx> Program<Ctx> {
    fn new_jmp(
        &mut self,
        op: JmpOp,
        class: InsClass,
        dst: Register,
        src: Operand,
        offset: i16,
    ) -> NodeId {
        self.alloc(NodeKind::Branch(Branch::new(op, class, dst, src, offset)))
    }

    fn new_linear(&mut self, insn: LinearInsn) -> NodeId {
        self.alloc(NodeKind::Linear(Linear::new(insn)))
    }

    // ========================================================================
    // Jumps
    // ========================================================================

    /// Unconditional jump over `offset` instructions.
    pub fn jmp(&mut self, offset: i16) -> NodeId {
        self.new_jmp(JmpOp::Ja, InsClass::Jmp, Register::R0, Operand::Imm(0), offset)
    }

    /// Return from the program with `R0` as exit code.
    pub fn exit(&mut self) -> NodeId {
        self.new_jmp(JmpOp::Exit, InsClass::Jmp, Register::R0, Operand::Imm(0), 0)
    }

    conditional_jumps! {
        /// Jump if `dst == src`.
        jeq, jeq32 => Jeq;
        /// Jump if `dst != src`.
        jne, jne32 => Jne;
        /// Jump if `dst > src`, unsigned.
        jgt, jgt32 => Jgt;
        /// Jump if `dst >= src`, unsigned.
        jge, jge32 => Jge;
        /// Jump if `dst < src`, unsigned.
        jlt, jlt32 => Jlt;
        /// Jump if `dst <= src`, unsigned.
        jle, jle32 => Jle;
        /// Jump if `dst > src`, signed.
        jsgt, jsgt32 => Jsgt;
        /// Jump if `dst >= src`, signed.
        jsge, jsge32 => Jsge;
        /// Jump if `dst < src`, signed.
        jslt, jslt32 => Jslt;
        /// Jump if `dst <= src`, signed.
        jsle, jsle32 => Jsle;
        /// Jump if `dst & src != 0`.
        jset, jset32 => Jset;
    }

    // ========================================================================
    // Calls
    // ========================================================================

    /// Call kernel helper `helper` (see [`crate::isa::helpers`]).
    pub fn call(&mut self, helper: i32) -> NodeId {
        self.new_linear(LinearInsn::Call { helper })
    }

    // ========================================================================
    // ALU
    // ========================================================================

    pub fn alu64(&mut self, op: AluOp, dst: Register, src: impl Into<Operand>) -> NodeId {
        self.new_linear(LinearInsn::Alu {
            op,
            class: InsClass::Alu64,
            dst,
            src: src.into(),
        })
    }

    pub fn alu32(&mut self, op: AluOp, dst: Register, src: impl Into<Operand>) -> NodeId {
        self.new_linear(LinearInsn::Alu {
            op,
            class: InsClass::Alu,
            dst,
            src: src.into(),
        })
    }

    pub fn mov64(&mut self, dst: Register, src: impl Into<Operand>) -> NodeId {
        self.alu64(AluOp::Mov, dst, src)
    }

    pub fn add64(&mut self, dst: Register, src: impl Into<Operand>) -> NodeId {
        self.alu64(AluOp::Add, dst, src)
    }

    pub fn mov32(&mut self, dst: Register, src: impl Into<Operand>) -> NodeId {
        self.alu32(AluOp::Mov, dst, src)
    }

    pub fn add32(&mut self, dst: Register, src: impl Into<Operand>) -> NodeId {
        self.alu32(AluOp::Add, dst, src)
    }

    // ========================================================================
    // Stores
    // ========================================================================

    /// `*(size *)(dst + offset) = imm`
    pub fn st_mem(&mut self, size: MemSize, dst: Register, offset: i16, imm: i32) -> NodeId {
        self.new_linear(LinearInsn::Store {
            size,
            dst,
            offset,
            imm,
        })
    }

    /// `*(u32 *)(dst + offset) = imm`
    pub fn st_w(&mut self, dst: Register, offset: i16, imm: i32) -> NodeId {
        self.st_mem(MemSize::W, dst, offset, imm)
    }
}
