#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

//! Assemble eBPF programs from a graph of instruction nodes.
//!
//! Programs are built in a [`graph::Program`] arena: linear nodes (calls, ALU,
//! stores) chain to one successor, branch nodes split into a false
//! continuation laid out right after them and a true continuation reached by
//! skipping it. [`api::Assembler`] resolves deferred continuations, numbers
//! the graph and serializes it to kernel instruction words and to the
//! equivalent C macro listing.

extern crate alloc;

// Re-export for convenience so other modules don't need alloc:: prefix
#[allow(unused_imports)]
pub(crate) use alloc::{boxed::Box, format, string::String, string::ToString, vec, vec::Vec};

pub mod api;
pub mod builders;
pub mod graph;
pub mod isa;
pub mod samples;

#[cfg(test)]
mod builders_test;

pub use api::{AsmError, Assembled, Assembler, AssemblerOptions};
pub use graph::{NodeId, Program};
pub use isa::{Operand, Register};

/// Test utilities for enabling logging in tests
#[cfg(test)]
pub mod test_utils {
    /// Initialize tracing subscriber for tests with DEBUG level
    /// Call this at the start of tests where you want to see logging output
    ///
    /// # Example
    /// ```ignore
    /// #[test]
    /// fn test_generated_branch() {
    ///     test_utils::init_test_logging();
    ///     // ... your test code
    /// }
    /// ```
    pub fn init_test_logging() {
        use tracing_subscriber::{EnvFilter, fmt};

        // Try to initialize, ignore error if already initialized
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }
}
