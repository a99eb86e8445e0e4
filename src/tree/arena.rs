use crate::tree::{NodeKind, SyntaxTree, TextRange};

/// Index of a node in a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    pub kind: NodeKind,
    pub children: Vec<NodeId>,
    /// Byte range of the node, if the producer knows it
    pub hint: Option<TextRange>,
    /// Source text of a leaf, used to resolve it without a hint
    pub text: Option<String>,
}

/// Arena-allocated syntax tree.
///
/// Nodes are created bottom-up through [`TreeBuilder`]; a node's children
/// always have smaller ids than the node itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Tree {
    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids in creation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.node(id).children.is_empty()
    }
}

impl SyntaxTree for Tree {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        self.root
    }

    fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(node).children.iter().copied()
    }

    fn kind(&self, node: NodeId) -> NodeKind {
        self.node(node).kind
    }

    fn position(&self, node: NodeId) -> Option<TextRange> {
        self.node(node).hint
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        self.node(node).text.as_deref()
    }
}

#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<NodeData>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, data: NodeData) -> NodeId {
        debug_assert!(
            data.children.iter().all(|c| c.index() < self.nodes.len()),
            "children must be built before their parent"
        );
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(data);
        id
    }

    /// Leaf resolved by text alone.
    pub fn leaf(&mut self, kind: NodeKind, text: impl Into<String>) -> NodeId {
        self.push(NodeData {
            kind,
            children: Vec::new(),
            hint: None,
            text: Some(text.into()),
        })
    }

    /// Leaf with a byte-range hint.
    pub fn leaf_at(&mut self, kind: NodeKind, text: impl Into<String>, hint: TextRange) -> NodeId {
        self.push(NodeData {
            kind,
            children: Vec::new(),
            hint: Some(hint),
            text: Some(text.into()),
        })
    }

    /// Leaf with neither text nor hint; resolved by its kind.
    pub fn bare(&mut self, kind: NodeKind) -> NodeId {
        self.push(NodeData {
            kind,
            children: Vec::new(),
            hint: None,
            text: None,
        })
    }

    pub fn node(&mut self, kind: NodeKind, children: impl IntoIterator<Item = NodeId>) -> NodeId {
        self.push(NodeData {
            kind,
            children: children.into_iter().collect(),
            hint: None,
            text: None,
        })
    }

    /// Internal node with the byte range its parser reported.
    pub fn node_at(
        &mut self,
        kind: NodeKind,
        children: impl IntoIterator<Item = NodeId>,
        span: TextRange,
    ) -> NodeId {
        self.push(NodeData {
            kind,
            children: children.into_iter().collect(),
            hint: Some(span),
            text: None,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn finish(self, root: NodeId) -> Tree {
        Tree {
            nodes: self.nodes,
            root,
        }
    }
}
