//! Errors reported while building or assembling an instruction graph.
//!
//! Construction itself cannot fail: operands are a sum type, so every
//! constructor yields a node. What can go wrong is the shape of the graph
//! (cycles, dangling ids) and the sizes recorded on branches.

use thiserror::Error;

use crate::graph::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AsmError {
    /// The id was not allocated by this program.
    #[error("node {0} does not belong to this program")]
    UnknownNode(NodeId),

    /// `instruction_sequence` was given nothing to chain.
    #[error("cannot build an empty instruction sequence")]
    EmptySequence,

    /// Adding the edge `from -> to` would make the graph cyclic.
    #[error("linking {from} -> {to} would create a cycle")]
    Cycle { from: NodeId, to: NodeId },

    /// Exit ends every path; nothing may follow it.
    #[error("cannot link a successor after exit instruction {0}")]
    LinkAfterExit(NodeId),

    /// Helpers take at most five arguments.
    #[error("helper {helper} called with {count} arguments, at most 5 fit in R1-R5")]
    TooManyArguments { helper: i32, count: usize },

    /// Generators can only be attached to branch nodes.
    #[error("node {0} is not a branch")]
    NotABranch(NodeId),

    /// The false continuation emits fewer words than the branch offset skips.
    #[error(
        "false branch of {node} declares {declared} instructions but only serializes to {actual}"
    )]
    FalseBranchTooShort {
        node: NodeId,
        declared: usize,
        actual: usize,
    },

    /// A backward offset cannot be paired with an inline false continuation.
    #[error("branch {node} has a false continuation but a negative offset ({size})")]
    NegativeFalseBranch { node: NodeId, size: i16 },

    /// The assembled program is longer than the configured limit.
    #[error("program has {count} instructions, limit is {limit}")]
    TooManyInstructions { count: usize, limit: usize },
}
