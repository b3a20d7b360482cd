//! Public API for assembling instruction graphs.
//!
//! # Example
//!
//! ```
//! use ebpf_asm_core::api::{Assembler, AssemblerOptions};
//! use ebpf_asm_core::builders::ld_map_element;
//! use ebpf_asm_core::graph::Program;
//! use ebpf_asm_core::isa::Register;
//!
//! let mut program: Program = Program::new();
//! let lookup = ld_map_element(&mut program, Register::R6, 7, Register::R10, -4).unwrap();
//! let exit = program.exit();
//! program.link(lookup, exit).unwrap();
//!
//! let assembled = Assembler::new(AssemblerOptions::default())
//!     .assemble(&mut program, lookup, &mut ())
//!     .unwrap();
//! assert_eq!(assembled.to_bytes().len(), 6 * 8);
//! ```

pub mod assembler;
pub mod error;
pub mod options;

pub use assembler::{Assembled, Assembler};
pub use error::AsmError;
pub use options::{AssemblerOptions, KERNEL_MAX_INSNS};
