//! Arena-backed tree under construction
//!
//! Every representation opened by the builder lives in one arena and is addressed by
//! [`NodeId`]. A parent refers to an attached child through [`Item::Tree`], which is
//! what lets a node be attached before it is complete: the parent holds the id, the
//! builder's stack holds the same id, and later children land in the arena slot both
//! point to.

use super::schema::TreeSchema;

/// Index of a representation in a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The root sentinel.
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// A generic node: its kind, the tokens that opened and closed it, and its children.
///
/// The root sentinel has no kind and no tokens, and is never closed.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<S: TreeSchema> {
    pub kind: Option<S::Kind>,
    pub start: Option<S::Token>,
    pub content: Vec<Item<S>>,
    pub end: Option<S::Token>,
}

impl<S: TreeSchema> Node<S> {
    pub fn new(kind: Option<S::Kind>, start: Option<S::Token>) -> Self {
        Node {
            kind,
            start,
            content: Vec::new(),
            end: None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.end.is_some()
    }
}

/// What an open or closed node is represented by.
#[derive(Debug, Clone, PartialEq)]
pub enum Repr<S: TreeSchema> {
    /// Generic node; children are appended to its content.
    Node(Node<S>),
    /// Plain ordered container; children are appended to it.
    Seq(Vec<Item<S>>),
    /// Schema-defined aggregate; children need a custom push.
    Custom(S::Aggregate),
}

impl<S: TreeSchema> Repr<S> {
    pub fn as_node(&self) -> Option<&Node<S>> {
        match self {
            Repr::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            Repr::Node(_) => "node",
            Repr::Seq(_) => "sequence",
            Repr::Custom(_) => "custom aggregate",
        }
    }
}

/// A child entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Item<S: TreeSchema> {
    /// Leaf token without an evaluator.
    Token(S::Token),
    /// Evaluated leaf or evaluated subtree.
    Value(S::Value),
    /// Attached subtree.
    Tree(NodeId),
}

/// All representations created during one build.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree<S: TreeSchema> {
    slots: Vec<Repr<S>>,
}

impl<S: TreeSchema> Tree<S> {
    pub(crate) fn new() -> Self {
        Tree {
            slots: vec![Repr::Node(Node::new(None, None))],
        }
    }

    pub(crate) fn insert(&mut self, repr: Repr<S>) -> NodeId {
        self.slots.push(repr);
        NodeId(self.slots.len() - 1)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Repr<S>> {
        self.slots.get_mut(id.0)
    }

    pub fn get(&self, id: NodeId) -> Option<&Repr<S>> {
        self.slots.get(id.0)
    }

    /// The root sentinel.
    pub fn root(&self) -> &Node<S> {
        match &self.slots[NodeId::ROOT.0] {
            Repr::Node(node) => node,
            // The builder never hands the root slot to a hook, so it stays a node.
            _ => unreachable!("root slot always holds a node"),
        }
    }

    /// Number of representations, the root included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.len() == 1
    }

    /// Children of the representation at `id`, for shapes that keep them in order.
    pub fn children(&self, id: NodeId) -> Option<&[Item<S>]> {
        match self.get(id)? {
            Repr::Node(node) => Some(&node.content),
            Repr::Seq(items) => Some(items),
            Repr::Custom(_) => None,
        }
    }
}
