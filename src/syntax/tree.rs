//! Arena-backed syntax tree and the derived parent index.

use std::fmt;

/// Source location span with byte offsets and line/column positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end_byte: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed).
    pub end_col: usize,
}

impl Span {
    /// Create a span from a tree-sitter node.
    pub fn from_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        // A node that swallows its trailing newline ends at column 0 of the
        // following row; its last line is the row before.
        let end_line = if end.column == 0 && end.row > start.row {
            end.row
        } else {
            end.row + 1
        };
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line: start.row + 1,
            start_col: start.column + 1,
            end_line,
            end_col: end.column + 1,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// Short-circuiting boolean operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolOp {
    And,
    Or,
}

/// The closed set of node kinds the analyses care about.
///
/// Everything else is kept as `Other` with the grammar's node name so the
/// tree stays complete for walks and parent lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Module,
    /// `def` / `async def`. The name is absent only for malformed input.
    FunctionDefinition { name: Option<String> },
    ClassDefinition { name: Option<String> },
    Lambda,
    /// An identifier used as a value or assignment target.
    NameReference { name: String },
    /// A call; `callee` is set when the called expression is a bare name.
    Call { callee: Option<String> },
    /// `with` / `async with` block.
    ScopedAcquisition,
    If,
    Elif,
    ConditionalExpression,
    For,
    While,
    ComprehensionFor,
    ComprehensionIf,
    BooleanOperator(BoolOp),
    ExceptClause,
    Match,
    CaseClause,
    Other(&'static str),
}

impl NodeKind {
    /// Convert to a string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Module => "module",
            NodeKind::FunctionDefinition { .. } => "function_definition",
            NodeKind::ClassDefinition { .. } => "class_definition",
            NodeKind::Lambda => "lambda",
            NodeKind::NameReference { .. } => "name_reference",
            NodeKind::Call { .. } => "call",
            NodeKind::ScopedAcquisition => "with_statement",
            NodeKind::If => "if_statement",
            NodeKind::Elif => "elif_clause",
            NodeKind::ConditionalExpression => "conditional_expression",
            NodeKind::For => "for_statement",
            NodeKind::While => "while_statement",
            NodeKind::ComprehensionFor => "for_in_clause",
            NodeKind::ComprehensionIf => "if_clause",
            NodeKind::BooleanOperator(BoolOp::And) => "and",
            NodeKind::BooleanOperator(BoolOp::Or) => "or",
            NodeKind::ExceptClause => "except_clause",
            NodeKind::Match => "match_statement",
            NodeKind::CaseClause => "case_clause",
            NodeKind::Other(kind) => *kind,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Index of a node inside its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node in the parsed tree. Children are owned through the arena; there
/// is no upward link.
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub span: Span,
    pub children: Vec<NodeId>,
}

/// Immutable syntax tree for one source unit.
///
/// Nodes are stored in pre-order, so the root is always the first entry and
/// `preorder()` yields nodes in source order.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
}

impl SyntaxTree {
    /// Build a tree from pre-ordered nodes. The first node is the root.
    pub(crate) fn from_nodes(nodes: Vec<SyntaxNode>) -> Self {
        debug_assert!(!nodes.is_empty(), "syntax tree needs a root");
        Self { nodes }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Get a node by id.
    ///
    /// Ids are only ever handed out by this tree, so lookups cannot miss.
    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&SyntaxNode> {
        self.nodes.get(id.0)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over every node in the tree, parents before children.
    pub fn preorder(&self) -> Preorder<'_> {
        self.descendants(self.root())
    }

    /// Iterate over `id` and everything below it, parents before children.
    pub fn descendants(&self, id: NodeId) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![id],
        }
    }
}

/// Depth-first, pre-order traversal.
pub struct Preorder<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Derived `child -> parent` lookup for one tree.
///
/// Built by a single pass over the tree and borrowed from it, so it cannot
/// outlive the tree it describes.
pub struct ParentIndex<'t> {
    tree: &'t SyntaxTree,
    parents: Vec<Option<NodeId>>,
}

impl<'t> ParentIndex<'t> {
    /// Visit every node once and record its parent.
    pub fn build(tree: &'t SyntaxTree) -> Self {
        let mut parents = vec![None; tree.len()];
        for id in tree.preorder() {
            for &child in tree.children(id) {
                parents[child.0] = Some(id);
            }
        }
        Self { tree, parents }
    }

    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(id.0).copied().flatten()
    }

    /// Iterate from the parent of `id` up to the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_, 't> {
        Ancestors {
            index: self,
            current: Some(id),
        }
    }
}

pub struct Ancestors<'i, 't> {
    index: &'i ParentIndex<'t>,
    current: Option<NodeId>,
}

impl Iterator for Ancestors<'_, '_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let parent = self.index.parent(self.current?);
        self.current = parent;
        parent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(line: usize) -> Span {
        Span {
            start_byte: 0,
            end_byte: 0,
            start_line: line,
            start_col: 1,
            end_line: line,
            end_col: 1,
        }
    }

    fn node(kind: NodeKind, children: &[usize]) -> SyntaxNode {
        SyntaxNode {
            kind,
            span: span(1),
            children: children.iter().map(|&i| NodeId(i)).collect(),
        }
    }

    // module
    //   with_statement
    //     call
    //   name_reference
    fn sample_tree() -> SyntaxTree {
        SyntaxTree::from_nodes(vec![
            node(NodeKind::Module, &[1, 3]),
            node(NodeKind::ScopedAcquisition, &[2]),
            node(
                NodeKind::Call {
                    callee: Some("open".to_string()),
                },
                &[],
            ),
            node(
                NodeKind::NameReference {
                    name: "x".to_string(),
                },
                &[],
            ),
        ])
    }

    #[test]
    fn test_preorder_visits_in_source_order() {
        let tree = sample_tree();
        let order: Vec<usize> = tree.preorder().map(NodeId::index).collect();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_parent_index() {
        let tree = sample_tree();
        let parents = ParentIndex::build(&tree);

        assert_eq!(parents.parent(tree.root()), None);
        assert_eq!(parents.parent(NodeId(2)), Some(NodeId(1)));
        assert_eq!(parents.parent(NodeId(3)), Some(NodeId(0)));

        let chain: Vec<NodeId> = parents.ancestors(NodeId(2)).collect();
        assert_eq!(chain, vec![NodeId(1), NodeId(0)]);
    }

    #[test]
    fn test_node_kind_names() {
        assert_eq!(NodeKind::ScopedAcquisition.as_str(), "with_statement");
        assert_eq!(NodeKind::BooleanOperator(BoolOp::Or).to_string(), "or");
        assert_eq!(NodeKind::Other("pass_statement").as_str(), "pass_statement");
    }
}
