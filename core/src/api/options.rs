//! Configuration options for the assembler.

/// Largest program the kernel verifier accepts (`BPF_COMPLEXITY_LIMIT_INSNS`).
pub const KERNEL_MAX_INSNS: usize = 1_000_000;

/// Configuration options for [`Assembler`](super::Assembler).
///
/// # Example
///
/// ```
/// use ebpf_asm_core::api::AssemblerOptions;
///
/// let options = AssemblerOptions {
///     max_instructions: 4096,
///     ..AssemblerOptions::default()
/// };
/// assert!(options.verify_false_branch_sizes);
/// ```
#[derive(Debug, Clone)]
pub struct AssemblerOptions {
    /// Maximum number of instructions the assembled program may contain,
    /// checked after numbering and before any word is emitted.
    ///
    /// Default: 1_000_000
    pub max_instructions: usize,

    /// Reject branches whose false continuation serializes to fewer words
    /// than the recorded offset.
    ///
    /// When disabled, a short false continuation contributes every word it
    /// has and the encoded offset is left as declared.
    ///
    /// Default: true
    pub verify_false_branch_sizes: bool,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            max_instructions: KERNEL_MAX_INSNS,
            verify_false_branch_sizes: true,
        }
    }
}
