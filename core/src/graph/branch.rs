//! Two-way conditional jumps and the algorithms shared by every branch kind.
//!
//! Immediate and register comparisons are one type: the second operand is an
//! [`Operand`], and only encoding and rendering look at which variant it is.
//! Numbering, generation and serialization of both kinds are written once here.

use core::fmt;

use tracing::trace;

use super::{FalseGenerator, NodeId, NodeKind, Program, TrueGenerator};
use crate::{
    String, Vec,
    api::AsmError,
    format,
    isa::{
        InsClass, JmpOp, Operand, Register,
        encoding::{encode_immediate_jmp, encode_register_jmp},
    },
};

/// A conditional (or unconditional, or exit) jump instruction.
pub struct Branch<Ctx> {
    pub(crate) op: JmpOp,
    /// `Jmp` or `Jmp32`
    pub(crate) class: InsClass,
    pub(crate) dst: Register,
    pub(crate) operand: Operand,

    /// Taken when the comparison holds. May be shared with other branches.
    pub(crate) on_true: Option<NodeId>,

    /// Falls through when the comparison fails. Laid out right after the
    /// branch.
    pub(crate) on_false: Option<NodeId>,

    /// Words of `on_false` that run on the false path; the encoded offset.
    pub(crate) false_size: i16,

    pub(crate) true_generator: Option<TrueGenerator<Ctx>>,
    pub(crate) false_generator: Option<FalseGenerator<Ctx>>,
}

impl<Ctx> Branch<Ctx> {
    pub(crate) fn new(
        op: JmpOp,
        class: InsClass,
        dst: Register,
        operand: Operand,
        false_size: i16,
    ) -> Self {
        Self {
            op,
            class,
            dst,
            operand,
            on_true: None,
            on_false: None,
            false_size,
            true_generator: None,
            false_generator: None,
        }
    }

    pub fn op(&self) -> JmpOp {
        self.op
    }

    pub fn class(&self) -> InsClass {
        self.class
    }

    pub fn dst(&self) -> Register {
        self.dst
    }

    pub fn operand(&self) -> Operand {
        self.operand
    }

    pub fn on_true(&self) -> Option<NodeId> {
        self.on_true
    }

    pub fn on_false(&self) -> Option<NodeId> {
        self.on_false
    }

    pub fn false_size(&self) -> i16 {
        self.false_size
    }

    pub fn is_exit(&self) -> bool {
        self.op == JmpOp::Exit
    }

    pub fn has_pending_generators(&self) -> bool {
        self.true_generator.is_some() || self.false_generator.is_some()
    }

    pub fn encode(&self) -> u64 {
        let dst = self.dst.number();
        match self.operand {
            Operand::Imm(imm) => encode_immediate_jmp(self.op, self.class, dst, imm, self.false_size),
            Operand::Reg(src) => {
                encode_register_jmp(self.op, self.class, dst, src.number(), self.false_size)
            }
        }
    }

    pub fn render(&self) -> String {
        if self.is_exit() {
            return String::from("BPF_EXIT_INSN()");
        }
        let class = match self.class {
            InsClass::Jmp32 => InsClass::Jmp32.name(),
            _ => InsClass::Jmp.name(),
        };
        match self.operand {
            Operand::Imm(imm) => format!(
                "BPF_JMP_IMM({}, /*dst=*/{}, /*imm=*/{}, /*off=*/{}, /*ins_class=*/{})",
                self.op, self.dst, imm, self.false_size, class
            ),
            Operand::Reg(src) => format!(
                "BPF_JMP_REG({}, /*dst=*/{}, /*src=*/{}, /*off=*/{}, /*ins_class=*/{})",
                self.op, self.dst, src, self.false_size, class
            ),
        }
    }
}

impl<Ctx> fmt::Debug for Branch<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Branch")
            .field("op", &self.op)
            .field("class", &self.class)
            .field("dst", &self.dst)
            .field("operand", &self.operand)
            .field("on_true", &self.on_true)
            .field("on_false", &self.on_false)
            .field("false_size", &self.false_size)
            .field("true_generator", &self.true_generator.is_some())
            .field("false_generator", &self.false_generator.is_some())
            .finish()
    }
}

impl<Ctx> Program<Ctx> {
    pub(crate) fn branch(&self, id: NodeId) -> Result<&Branch<Ctx>, AsmError> {
        match &self.node(id)?.kind {
            NodeKind::Branch(branch) => Ok(branch),
            NodeKind::Linear(_) => Err(AsmError::NotABranch(id)),
        }
    }

    pub(crate) fn branch_mut(&mut self, id: NodeId) -> Result<&mut Branch<Ctx>, AsmError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Branch(branch) => Ok(branch),
            NodeKind::Linear(_) => Err(AsmError::NotABranch(id)),
        }
    }

    /// Branch that may still receive successors (anything but exit).
    fn open_branch_mut(&mut self, id: NodeId) -> Result<&mut Branch<Ctx>, AsmError> {
        let branch = self.branch_mut(id)?;
        if branch.is_exit() {
            return Err(AsmError::LinkAfterExit(id));
        }
        Ok(branch)
    }

    /// Set the true continuation directly, replacing any previous one.
    pub fn set_true_branch(&mut self, id: NodeId, next: NodeId) -> Result<(), AsmError> {
        self.node(next)?;
        self.open_branch_mut(id)?;
        self.check_edge(id, next)?;
        self.branch_mut(id)?.on_true = Some(next);
        Ok(())
    }

    /// Set the false continuation directly. The branch keeps the offset it
    /// was constructed with.
    pub fn set_false_branch(&mut self, id: NodeId, next: NodeId) -> Result<(), AsmError> {
        self.node(next)?;
        self.open_branch_mut(id)?;
        self.check_edge(id, next)?;
        self.branch_mut(id)?.on_false = Some(next);
        Ok(())
    }

    /// Defer construction of the true continuation to [`finalize`](Self::finalize).
    ///
    /// The generator only runs if the branch has no true continuation by then.
    pub fn set_true_generator(
        &mut self,
        id: NodeId,
        generator: impl FnOnce(&mut Program<Ctx>, &mut Ctx) -> NodeId + 'static,
    ) -> Result<(), AsmError> {
        self.open_branch_mut(id)?.true_generator = Some(alloc::boxed::Box::new(generator));
        Ok(())
    }

    /// Defer construction of the false continuation to [`finalize`](Self::finalize).
    ///
    /// The generator returns the subtree and the offset to encode; both
    /// replace whatever the branch held before.
    pub fn set_false_generator(
        &mut self,
        id: NodeId,
        generator: impl FnOnce(&mut Program<Ctx>, &mut Ctx) -> (NodeId, i16) + 'static,
    ) -> Result<(), AsmError> {
        self.open_branch_mut(id)?.false_generator = Some(alloc::boxed::Box::new(generator));
        Ok(())
    }

    /// Run this branch's generators. Returns the true continuation when it
    /// already existed, so the caller keeps finalizing along it.
    pub(super) fn finalize_branch(
        &mut self,
        id: NodeId,
        ctx: &mut Ctx,
    ) -> Result<Option<NodeId>, AsmError> {
        if self.branch(id)?.is_exit() {
            return Ok(None);
        }

        // The false side decides this branch's offset, so it is resolved
        // first. Do not reorder.
        let false_generator = self.branch_mut(id)?.false_generator.take();
        if let Some(generate) = false_generator {
            let (subtree, size) = generate(self, ctx);
            self.node(subtree)?;
            self.check_edge(id, subtree)?;
            trace!(branch = %id, %subtree, size, "generated false continuation");
            let branch = self.branch_mut(id)?;
            branch.on_false = Some(subtree);
            branch.false_size = size;
        }

        let on_true = self.branch(id)?.on_true;
        if on_true.is_some() {
            return Ok(on_true);
        }
        let true_generator = self.branch_mut(id)?.true_generator.take();
        if let Some(generate) = true_generator {
            let subtree = generate(self, ctx);
            self.node(subtree)?;
            self.check_edge(id, subtree)?;
            trace!(branch = %id, %subtree, "generated true continuation");
            self.branch_mut(id)?.on_true = Some(subtree);
        }
        Ok(None)
    }

    /// Number the false continuation and return the true continuation with
    /// the width of this branch plus its skipped words.
    pub(super) fn numerate_branch(
        &mut self,
        id: NodeId,
        start: u32,
    ) -> Result<(Option<NodeId>, usize), AsmError> {
        let branch = self.branch(id)?;
        if branch.is_exit() {
            return Ok((None, 1));
        }
        let (on_false, on_true) = (branch.on_false, branch.on_true);
        // A backward offset skips nothing going forward.
        let skipped = branch.false_size.max(0) as usize;

        // The false subtree always starts right after the branch, whatever
        // size was recorded for it.
        if let Some(on_false) = on_false {
            self.numerate(on_false, start + 1)?;
        }
        Ok((on_true, 1 + skipped))
    }

    /// Push the branch word and the false prefix; returns the true
    /// continuation for the caller to continue with.
    pub(super) fn branch_words(
        &self,
        id: NodeId,
        branch: &Branch<Ctx>,
        verify: bool,
        out: &mut Vec<u64>,
    ) -> Result<Option<NodeId>, AsmError> {
        out.push(branch.encode());
        if branch.is_exit() {
            return Ok(None);
        }

        if let Some(on_false) = branch.on_false {
            let declared =
                usize::try_from(branch.false_size).map_err(|_| AsmError::NegativeFalseBranch {
                    node: id,
                    size: branch.false_size,
                })?;
            let mark = out.len();
            self.emit_words(on_false, verify, out)?;
            let actual = out.len() - mark;
            // Only the prefix that runs on the false path belongs here; the
            // rest of the subtree is reached through its own true edges.
            if actual >= declared {
                out.truncate(mark + declared);
            } else if verify {
                return Err(AsmError::FalseBranchTooShort {
                    node: id,
                    declared,
                    actual,
                });
            }
        }
        Ok(branch.on_true)
    }

    pub(super) fn branch_lines(
        &self,
        branch: &Branch<Ctx>,
        out: &mut Vec<String>,
    ) -> Result<Option<NodeId>, AsmError> {
        out.push(branch.render());
        if branch.is_exit() {
            return Ok(None);
        }
        if let Some(on_false) = branch.on_false {
            self.emit_lines(on_false, out)?;
        }
        Ok(branch.on_true)
    }
}
