//! The assembly driver.

use tracing::debug;

use super::{AsmError, AssemblerOptions};
use crate::{
    String, Vec,
    graph::{NodeId, Program},
};

/// Turns an instruction graph into a loadable program.
///
/// # Example
///
/// ```
/// use ebpf_asm_core::api::{Assembler, AssemblerOptions};
/// use ebpf_asm_core::graph::Program;
/// use ebpf_asm_core::isa::Register;
///
/// let mut program: Program = Program::new();
/// let check = program.jeq(Register::R1, 0, 1);
/// let set = program.mov64(Register::R0, 1);
/// let exit = program.exit();
/// program.set_false_branch(check, set).unwrap();
/// program.link(check, exit).unwrap();
///
/// let assembled = Assembler::new(AssemblerOptions::default())
///     .assemble(&mut program, check, &mut ())
///     .unwrap();
/// assert_eq!(assembled.words.len(), 3);
/// assert_eq!(assembled.listing[2], "BPF_EXIT_INSN()");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Assembler {
    options: AssemblerOptions,
}

/// Output of [`Assembler::assemble`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembled {
    /// Encoded instruction words in load order.
    pub words: Vec<u64>,

    /// C macros in traversal order. False continuations are never truncated
    /// here, so when one of them branches the listing is longer than `words`.
    pub listing: Vec<String>,

    /// Instruction count reported by numbering the root.
    pub instruction_count: usize,
}

impl Assembler {
    pub fn new(options: AssemblerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AssemblerOptions {
        &self.options
    }

    /// Finalize, number and serialize the graph rooted at `root`.
    ///
    /// `ctx` is passed unmodified to every pending generator.
    pub fn assemble<Ctx>(
        &self,
        program: &mut Program<Ctx>,
        root: NodeId,
        ctx: &mut Ctx,
    ) -> Result<Assembled, AsmError> {
        debug!(%root, nodes = program.len(), "assembling program");
        program.check_acyclic(root)?;

        program.finalize(root, ctx)?;
        debug!(nodes = program.len(), "finalized generators");

        let instruction_count = program.numerate(root, 0)?;
        // Emission never yields more words than numbering counted.
        if instruction_count > self.options.max_instructions {
            return Err(AsmError::TooManyInstructions {
                count: instruction_count,
                limit: self.options.max_instructions,
            });
        }
        let words = program.words(root, self.options.verify_false_branch_sizes)?;
        let listing = program.poc(root)?;
        debug!(
            words = words.len(),
            lines = listing.len(),
            instruction_count,
            "assembled program"
        );

        Ok(Assembled {
            words,
            listing,
            instruction_count,
        })
    }
}

impl Assembled {
    /// The program as the kernel loader reads it: 8 little-endian bytes per
    /// instruction.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.words
            .iter()
            .flat_map(|word| word.to_le_bytes())
            .collect()
    }

    /// The listing as a C array initializer named `name`.
    pub fn c_array(&self, name: &str) -> String {
        let mut out = crate::format!("struct bpf_insn {}[] = {{\n", name);
        for line in &self.listing {
            out.push('\t');
            out.push_str(line);
            out.push_str(",\n");
        }
        out.push_str("};\n");
        out
    }
}
