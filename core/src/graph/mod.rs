//! The instruction graph.
//!
//! Programs are built as a graph of nodes held in a [`Program`] arena and
//! addressed by [`NodeId`]. Linear nodes (calls, ALU, stores) have a single
//! successor. Branch nodes have two: the false continuation, laid out right
//! after the branch, and the true continuation, reached by skipping
//! `false_size` words.
//!
//! ## Design
//!
//! - Nodes never move and are never freed, so a `NodeId` stays valid for the
//!   life of the program. Sharing a continuation between branches is just
//!   storing the same id twice.
//! - Every traversal (finalize, numerate, bytecode, text) visits a branch as
//!   self, false, true. Shared nodes are visited once per path, never
//!   deduplicated.
//! - The graph is kept acyclic: [`Program::link`] and generated continuations
//!   are checked before an edge is added.

mod branch;
mod constructors;
mod linear;


pub use branch::Branch;
pub use linear::{Linear, LinearInsn};

use alloc::boxed::Box;
use core::fmt;

use hashbrown::{HashMap, HashSet};

use crate::{String, Vec, api::AsmError, format, vec};

/// Stable index of a node inside its [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Deferred construction of a true continuation.
pub type TrueGenerator<Ctx> = Box<dyn FnOnce(&mut Program<Ctx>, &mut Ctx) -> NodeId>;

/// Deferred construction of a false continuation, returning the subtree and
/// the number of its words that run on the false path.
pub type FalseGenerator<Ctx> = Box<dyn FnOnce(&mut Program<Ctx>, &mut Ctx) -> (NodeId, i16)>;

/// A single instruction in the graph.
pub struct Node<Ctx> {
    /// Absolute index in the emitted stream, set by [`Program::numerate`].
    position: Option<u32>,
    kind: NodeKind<Ctx>,
}

pub enum NodeKind<Ctx> {
    Linear(Linear),
    Branch(Branch<Ctx>),
}

impl<Ctx> Node<Ctx> {
    pub fn position(&self) -> Option<u32> {
        self.position
    }

    pub fn as_branch(&self) -> Option<&Branch<Ctx>> {
        match &self.kind {
            NodeKind::Branch(branch) => Some(branch),
            NodeKind::Linear(_) => None,
        }
    }

    /// The successor followed by linear traversal: the single successor of a
    /// linear node, the true continuation of a branch.
    pub fn next(&self) -> Option<NodeId> {
        match &self.kind {
            NodeKind::Linear(linear) => linear.next,
            NodeKind::Branch(branch) => branch.on_true,
        }
    }

    /// This node's own instruction word.
    pub fn encode(&self) -> u64 {
        match &self.kind {
            NodeKind::Linear(linear) => linear.insn.encode(),
            NodeKind::Branch(branch) => branch.encode(),
        }
    }

    /// This node's own C macro line.
    pub fn render(&self) -> String {
        match &self.kind {
            NodeKind::Linear(linear) => linear.insn.render(),
            NodeKind::Branch(branch) => branch.render(),
        }
    }
}

/// Arena owning every node of one program under construction.
///
/// `Ctx` is the caller's generation context. It is handed unmodified to
/// generator callbacks during [`Program::finalize`].
pub struct Program<Ctx = ()> {
    nodes: Vec<Node<Ctx>>,
}

impl<Ctx> Default for Program<Ctx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ctx> Program<Ctx> {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Number of allocated nodes (reachable or not).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Result<&Node<Ctx>, AsmError> {
        self.nodes.get(id.index()).ok_or(AsmError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node<Ctx>, AsmError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(AsmError::UnknownNode(id))
    }

    fn alloc(&mut self, kind: NodeKind<Ctx>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            position: None,
            kind,
        });
        id
    }

    /// Position assigned by the last [`numerate`](Self::numerate) that
    /// reached this node.
    pub fn position(&self, id: NodeId) -> Option<u32> {
        self.nodes.get(id.index()).and_then(|node| node.position)
    }

    /// See [`Node::next`].
    pub fn next(&self, id: NodeId) -> Result<Option<NodeId>, AsmError> {
        Ok(self.node(id)?.next())
    }

    // === Linking ===

    /// Attach `next` at the first open successor slot of the chain starting
    /// at `id`.
    ///
    /// Linear nodes follow their single successor; branches follow their true
    /// continuation. False continuations are never touched.
    pub fn link(&mut self, id: NodeId, next: NodeId) -> Result<(), AsmError> {
        self.node(next)?;
        let mut tail = id;
        loop {
            let node = self.node(tail)?;
            if node.as_branch().is_some_and(Branch::is_exit) {
                return Err(AsmError::LinkAfterExit(tail));
            }
            match node.next() {
                Some(successor) => tail = successor,
                None => break,
            }
        }

        self.check_edge(tail, next)?;
        match &mut self.node_mut(tail)?.kind {
            NodeKind::Linear(linear) => linear.next = Some(next),
            NodeKind::Branch(branch) => branch.on_true = Some(next),
        }
        Ok(())
    }

    /// Check that adding `from -> to` keeps the graph acyclic.
    fn check_edge(&self, from: NodeId, to: NodeId) -> Result<(), AsmError> {
        if self.reaches(to, from)? {
            return Err(AsmError::Cycle { from, to });
        }
        Ok(())
    }

    // === Finalize ===

    /// Resolve deferred generators reachable along the chain from `id`.
    ///
    /// For every branch the false generator runs before the true side is
    /// looked at: the false subtree's size is the branch's encoded offset,
    /// so it must be known before anything else depends on the branch.
    pub fn finalize(&mut self, id: NodeId, ctx: &mut Ctx) -> Result<(), AsmError> {
        let mut current = Some(id);
        while let Some(id) = current {
            current = match &self.node(id)?.kind {
                NodeKind::Linear(linear) => linear.next,
                NodeKind::Branch(_) => self.finalize_branch(id, ctx)?,
            };
        }
        Ok(())
    }

    // === Numbering ===

    /// Assign absolute positions starting at `start` and return the number
    /// of instructions the subtree occupies.
    ///
    /// Positions are informational only. A shared node keeps the position of
    /// the last path that numbered it.
    pub fn numerate(&mut self, id: NodeId, start: u32) -> Result<usize, AsmError> {
        let mut count = 0;
        let mut position = start;
        let mut current = Some(id);
        while let Some(id) = current {
            self.node_mut(id)?.position = Some(position);
            let (next, width) = match &self.node(id)?.kind {
                NodeKind::Linear(linear) => (linear.next, 1),
                NodeKind::Branch(_) => self.numerate_branch(id, position)?,
            };
            count += width;
            position += width as u32;
            current = next;
        }
        Ok(count)
    }

    // === Serialization ===
    //
    // Linear runs are walked in a loop; only false continuations recurse, so
    // stack depth follows branch nesting, not program length.

    /// Encoded words of the subtree rooted at `id`, in load order.
    ///
    /// Fails if a branch's false continuation is shorter than its offset.
    pub fn bytecode(&self, id: NodeId) -> Result<Vec<u64>, AsmError> {
        self.words(id, true)
    }

    /// Like [`bytecode`](Self::bytecode); with `verify` off a short false
    /// continuation is emitted whole instead of failing.
    pub(crate) fn words(&self, id: NodeId, verify: bool) -> Result<Vec<u64>, AsmError> {
        let mut words = Vec::new();
        self.emit_words(id, verify, &mut words)?;
        Ok(words)
    }

    fn emit_words(&self, id: NodeId, verify: bool, out: &mut Vec<u64>) -> Result<(), AsmError> {
        let mut current = Some(id);
        while let Some(id) = current {
            current = match &self.node(id)?.kind {
                NodeKind::Linear(linear) => {
                    out.push(linear.insn.encode());
                    linear.next
                }
                NodeKind::Branch(branch) => self.branch_words(id, branch, verify, out)?,
            };
        }
        Ok(())
    }

    /// C macro lines reproducing the subtree rooted at `id`.
    ///
    /// Visits nodes in the same order as [`bytecode`](Self::bytecode) but
    /// never truncates false continuations.
    pub fn poc(&self, id: NodeId) -> Result<Vec<String>, AsmError> {
        let mut lines = Vec::new();
        self.emit_lines(id, &mut lines)?;
        Ok(lines)
    }

    fn emit_lines(&self, id: NodeId, out: &mut Vec<String>) -> Result<(), AsmError> {
        let mut current = Some(id);
        while let Some(id) = current {
            current = match &self.node(id)?.kind {
                NodeKind::Linear(linear) => {
                    out.push(linear.insn.render());
                    linear.next
                }
                NodeKind::Branch(branch) => self.branch_lines(branch, out)?,
            };
        }
        Ok(())
    }

    // === Graph checks ===

    /// Outgoing edges of `id`, false side first.
    pub fn successors(&self, id: NodeId) -> Result<[Option<NodeId>; 2], AsmError> {
        Ok(match &self.node(id)?.kind {
            NodeKind::Linear(linear) => [linear.next, None],
            NodeKind::Branch(branch) if branch.is_exit() => [None, None],
            NodeKind::Branch(branch) => [branch.on_false, branch.on_true],
        })
    }

    /// Whether `target` can be reached from `from` (including `from == target`).
    pub fn reaches(&self, from: NodeId, target: NodeId) -> Result<bool, AsmError> {
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut stack = vec![from];

        while let Some(id) = stack.pop() {
            if id == target {
                return Ok(true);
            }
            if !visited.insert(id) {
                continue;
            }
            stack.extend(self.successors(id)?.into_iter().flatten());
        }
        Ok(false)
    }

    /// Fail with [`AsmError::Cycle`] if any cycle is reachable from `root`.
    ///
    /// Iterative so that a malformed graph cannot overflow the stack before
    /// it is rejected.
    pub fn check_acyclic(&self, root: NodeId) -> Result<(), AsmError> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            OnPath,
            Done,
        }

        let mut marks: HashMap<NodeId, Mark> = HashMap::new();
        // (node, index of the next successor to visit)
        let mut stack: Vec<(NodeId, usize)> = vec![(root, 0)];
        self.node(root)?;
        marks.insert(root, Mark::OnPath);

        while let Some(top) = stack.last_mut() {
            let (id, child) = *top;
            if child == 2 {
                marks.insert(id, Mark::Done);
                stack.pop();
                continue;
            }
            top.1 += 1;

            let Some(next) = self.successors(id)?[child] else {
                continue;
            };
            match marks.get(&next) {
                Some(Mark::OnPath) => return Err(AsmError::Cycle { from: id, to: next }),
                Some(Mark::Done) => {}
                None => {
                    self.node(next)?;
                    marks.insert(next, Mark::OnPath);
                    stack.push((next, 0));
                }
            }
        }
        Ok(())
    }
}

impl<Ctx> fmt::Debug for Program<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Program {{")?;
        for (index, node) in self.nodes.iter().enumerate() {
            let position = node
                .position
                .map(|p| format!("@{}", p))
                .unwrap_or_default();
            write!(f, "  #{:<4} {:>6}  {}", index, position, node.render())?;
            match &node.kind {
                NodeKind::Linear(Linear { next: Some(next), .. }) => {
                    write!(f, " -> {}", next)?;
                }
                NodeKind::Branch(branch) => {
                    if let Some(on_false) = branch.on_false {
                        write!(f, " false: {}", on_false)?;
                    }
                    if let Some(on_true) = branch.on_true {
                        write!(f, " true: {}", on_true)?;
                    }
                }
                NodeKind::Linear(_) => {}
            }
            writeln!(f)?;
        }
        write!(f, "}}")
    }
}
