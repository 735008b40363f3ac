//! Arena-backed program tree.
//!
//! Nodes live in one `Vec` owned by [`Program`] and refer to each other by
//! [`NodeId`]. Blocks own their children through id lists; every node also
//! keeps the id of its enclosing node, which is used for lookups only.

use num_bigint::BigInt;
use spendscript_common::Opcode;
use std::fmt;
use std::ops::Range;

/// Index of a node in its [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One IF or NOTIF statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfStmt {
    /// True for NOTIF.
    pub negated: bool,
    pub else_pos: Option<usize>,
    pub endif_pos: usize,
    /// Block run when the popped condition (after polarity) is true.
    pub then_block: NodeId,
    pub else_block: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An ordered sequence of statements.
    Block(Vec<NodeId>),
    /// A code separator and every statement that follows it in the same
    /// block.
    CodeSeparator(Vec<NodeId>),
    Operation(Opcode),
    Data(Vec<u8>),
    Number(BigInt),
    If(IfStmt),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Byte offset where the node starts in its source.
    pub pos: usize,
    /// Byte offset where the token following the node starts.
    pub end: usize,
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
}

/// A parsed script: an arena of nodes and the id of the root block.
#[derive(Debug, Clone)]
pub struct Program {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
}

impl Program {
    pub(crate) fn with_root(pos: usize) -> Self {
        Self {
            nodes: vec![Node {
                pos,
                end: pos,
                parent: None,
                kind: NodeKind::Block(Vec::new()),
            }],
            root: NodeId(0),
        }
    }

    /// Add a node under `parent`. The caller links it into the parent's
    /// child list (or IF slot) itself.
    pub(crate) fn alloc(&mut self, parent: NodeId, pos: usize, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            pos,
            end: pos,
            parent: Some(parent),
            kind,
        });
        id
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The node behind `id`.
    ///
    /// Ids are only handed out by the program that owns them, so this never
    /// fails for an id obtained from `self`.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Total number of nodes, the root block included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the root block has no statements.
    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    /// Children of a block or code separator. Empty for any other node.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.node(id).kind {
            NodeKind::Block(children) | NodeKind::CodeSeparator(children) => children,
            _ => &[],
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Enclosing nodes of `id`, innermost first, ending at the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// The innermost IF statement containing `id`, if any.
    pub fn enclosing_if(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .find(|&a| matches!(self.node(a).kind, NodeKind::If(_)))
    }

    /// Source byte range covered by the node, trailing whitespace included.
    pub fn extent(&self, id: NodeId) -> Range<usize> {
        let node = self.node(id);
        node.pos..node.end
    }

    /// Structural equality of two subtrees, ignoring source positions.
    pub fn subtree_eq(&self, id: NodeId, other: &Program, other_id: NodeId) -> bool {
        let mut pending = vec![(id, other_id)];
        while let Some((x, y)) = pending.pop() {
            match (&self.node(x).kind, &other.node(y).kind) {
                (NodeKind::Block(xs), NodeKind::Block(ys))
                | (NodeKind::CodeSeparator(xs), NodeKind::CodeSeparator(ys)) => {
                    if xs.len() != ys.len() {
                        return false;
                    }
                    pending.extend(xs.iter().copied().zip(ys.iter().copied()));
                }
                (NodeKind::Operation(a), NodeKind::Operation(b)) if a == b => {}
                (NodeKind::Data(a), NodeKind::Data(b)) if a == b => {}
                (NodeKind::Number(a), NodeKind::Number(b)) if a == b => {}
                (NodeKind::If(a), NodeKind::If(b)) if a.negated == b.negated => {
                    pending.push((a.then_block, b.then_block));
                    match (a.else_block, b.else_block) {
                        (None, None) => {}
                        (Some(ae), Some(be)) => pending.push((ae, be)),
                        _ => return false,
                    }
                }
                _ => return false,
            }
        }
        true
    }

    /// Number of operations in the subtree, counted the way the interpreter
    /// charges them: every opcode and code separator, and for each IF its
    /// IF, ELSE and ENDIF markers. Pushes are free.
    pub fn operation_count(&self, id: NodeId) -> usize {
        let mut count = 0;
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            match &self.node(id).kind {
                NodeKind::Block(children) => pending.extend(children),
                NodeKind::CodeSeparator(children) => {
                    count += 1;
                    pending.extend(children);
                }
                NodeKind::Operation(_) => count += 1,
                NodeKind::Data(_) | NodeKind::Number(_) => {}
                NodeKind::If(stmt) => {
                    count += if stmt.else_pos.is_some() { 3 } else { 2 };
                    pending.push(stmt.then_block);
                    pending.extend(stmt.else_block);
                }
            }
        }
        count
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, id: NodeId) -> fmt::Result {
        enum Line {
            Node(NodeId),
            Keyword(&'static str),
        }

        let mut pending = vec![Line::Node(id)];
        while let Some(line) = pending.pop() {
            let id = match line {
                Line::Keyword(word) => {
                    writeln!(f, "{word}")?;
                    continue;
                }
                Line::Node(id) => id,
            };
            match &self.node(id).kind {
                NodeKind::Block(children) => {
                    pending.extend(children.iter().rev().map(|&c| Line::Node(c)));
                }
                NodeKind::CodeSeparator(children) => {
                    writeln!(f, "CODESEPARATOR")?;
                    pending.extend(children.iter().rev().map(|&c| Line::Node(c)));
                }
                NodeKind::Operation(op) => writeln!(f, "{}", op.mnemonic())?,
                NodeKind::Data(bytes) => writeln!(f, "0x{}", hex::encode(bytes))?,
                NodeKind::Number(n) => writeln!(f, "{n}")?,
                NodeKind::If(stmt) => {
                    writeln!(f, "{}", if stmt.negated { "NOTIF" } else { "IF" })?;
                    pending.push(Line::Keyword("ENDIF"));
                    if let Some(else_block) = stmt.else_block {
                        pending.push(Line::Node(else_block));
                        pending.push(Line::Keyword("ELSE"));
                    }
                    pending.push(Line::Node(stmt.then_block));
                }
            }
        }
        Ok(())
    }
}

/// Two programs are equal when their trees have the same shape and values.
/// Positions are ignored.
impl PartialEq for Program {
    fn eq(&self, other: &Self) -> bool {
        self.subtree_eq(self.root, other, other.root)
    }
}

impl Eq for Program {}

/// Renders the tree as assembly text, one token per line. Data is always
/// written in `0x` form so that re-parsing yields the same node kinds.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, self.root)
    }
}

/// Builds trees by hand without positions, mainly for tests.
///
/// Every node is given position 0.
#[derive(Debug)]
pub struct Builder {
    program: Program,
    open: Vec<NodeId>,
}

impl Builder {
    pub fn new() -> Self {
        let program = Program::with_root(0);
        let root = program.root;
        Self {
            program,
            open: vec![root],
        }
    }

    fn current(&self) -> NodeId {
        // The root is never popped.
        self.open[self.open.len() - 1]
    }

    fn append(&mut self, kind: NodeKind) -> NodeId {
        let parent = self.current();
        let id = self.program.alloc(parent, 0, kind);
        if let NodeKind::Block(children) | NodeKind::CodeSeparator(children) =
            &mut self.program.node_mut(parent).kind
        {
            children.push(id);
        }
        id
    }

    pub fn op(mut self, op: Opcode) -> Self {
        self.append(NodeKind::Operation(op));
        self
    }

    pub fn data(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.append(NodeKind::Data(bytes.into()));
        self
    }

    pub fn number(mut self, n: impl Into<BigInt>) -> Self {
        self.append(NodeKind::Number(n.into()));
        self
    }

    /// Open a code separator; following statements go inside it until the
    /// enclosing block is closed.
    pub fn code_separator(mut self) -> Self {
        let id = self.append(NodeKind::CodeSeparator(Vec::new()));
        self.open.push(id);
        self
    }

    /// Add an IF (or NOTIF when `negated`) statement with the given
    /// branches.
    pub fn if_stmt(mut self, negated: bool, then: Builder, otherwise: Option<Builder>) -> Self {
        let then_tree = then.finish();
        let else_tree = otherwise.map(Builder::finish);

        let if_id = self.append(NodeKind::If(IfStmt {
            negated,
            else_pos: None,
            endif_pos: 0,
            then_block: NodeId(usize::MAX),
            else_block: None,
        }));
        let then_block = self.graft(if_id, &then_tree, then_tree.root);
        let else_block = else_tree
            .as_ref()
            .map(|tree| self.graft(if_id, tree, tree.root));
        if let NodeKind::If(stmt) = &mut self.program.node_mut(if_id).kind {
            stmt.then_block = then_block;
            stmt.else_block = else_block;
            stmt.else_pos = else_block.map(|_| 0);
        }
        self
    }

    /// Copy the subtree `id` of `src` into this builder under `parent`.
    fn graft(&mut self, parent: NodeId, src: &Program, id: NodeId) -> NodeId {
        let node = src.node(id);
        let new_id = self.program.alloc(parent, 0, NodeKind::Block(Vec::new()));
        let kind = match &node.kind {
            NodeKind::Block(children) => NodeKind::Block(
                children
                    .iter()
                    .map(|&c| self.graft(new_id, src, c))
                    .collect(),
            ),
            NodeKind::CodeSeparator(children) => NodeKind::CodeSeparator(
                children
                    .iter()
                    .map(|&c| self.graft(new_id, src, c))
                    .collect(),
            ),
            NodeKind::If(stmt) => {
                let then_block = self.graft(new_id, src, stmt.then_block);
                let else_block = stmt.else_block.map(|e| self.graft(new_id, src, e));
                NodeKind::If(IfStmt {
                    then_block,
                    else_block,
                    ..stmt.clone()
                })
            }
            other => other.clone(),
        };
        self.program.node_mut(new_id).kind = kind;
        new_id
    }

    pub fn finish(self) -> Program {
        self.program
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}
