//! ebpf-asm - Build eBPF programs as instruction graphs
//!
//! # Overview
//!
//! Hand-writing eBPF means keeping jump offsets in sync with the code they
//! skip. ebpf-asm builds programs as a graph instead: linear nodes chain to
//! one successor, branch nodes split into a false continuation laid out right
//! after them and a true continuation reached by skipping it. Offsets come
//! from the graph, and continuations can be generated late, once the rest of
//! the program exists.
//!
//! # Quick Start
//!
//! ```
//! use ebpf_asm::{Assembler, AssemblerOptions, Program, Register};
//! use ebpf_asm::builders::ld_map_element;
//!
//! let mut program: Program = Program::new();
//! let lookup = ld_map_element(&mut program, Register::R1, 3, Register::R10, -4).unwrap();
//!
//! // if r0 == NULL goto exit, else r0 = 1
//! let check = program.jeq(Register::R0, 0, 1);
//! let found = program.mov64(Register::R0, 1);
//! program.set_false_branch(check, found).unwrap();
//! let exit = program.exit();
//! program.link(check, exit).unwrap();
//! program.link(lookup, check).unwrap();
//!
//! let assembled = Assembler::new(AssemblerOptions::default())
//!     .assemble(&mut program, lookup, &mut ())
//!     .unwrap();
//! assert_eq!(assembled.words.len(), 8);
//! assert_eq!(assembled.listing.last().unwrap(), "BPF_EXIT_INSN()");
//! ```
//!
//! # Output
//!
//! [`Assembled::to_bytes`] yields the byte stream the kernel loader expects
//! and [`Assembled::c_array`] the same program as C macros, ready to paste
//! into a proof of concept.

// Re-export public API from ebpf_asm_core
pub use ebpf_asm_core::api::{AsmError, Assembled, Assembler, AssemblerOptions, KERNEL_MAX_INSNS};

// Re-export graph construction
pub use ebpf_asm_core::graph::{NodeId, Program};
pub use ebpf_asm_core::isa::{self, AluOp, InsClass, JmpOp, MemSize, Operand, Register};
pub use ebpf_asm_core::{builders, samples};
