//! Builder configuration: token roles and per-kind handlers
//!
//! A [`TreeSchema`] names the types one tree builder works with. The builder is then
//! configured with a classification function, mapping each token to a [`Role`] and a
//! node kind, and a [`Handlers`] table with the hooks of each kind.
//!
//! Every hook is optional. Without hooks a kind opens a generic [`Node`] that is
//! attached to its parent right away and collects its children in order.
//!
//! | hook    | called on | effect |
//! |---------|-----------|--------|
//! | `start` | Start     | builds the representation instead of a generic node |
//! | `end`   | End       | sees a non-node representation and the end token, may reject it |
//! | `eval`  | End, Leaf | replaces the subtree or the leaf with a value; subtrees with an evaluator stay detached until they close |
//! | `push`  | any child | absorbs a child instead of appending it |

use super::error::BuildError;
use super::tree::{Item, Node, NodeId, Repr, Tree};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// The types a tree builder is instantiated with.
pub trait TreeSchema: fmt::Debug + Clone + PartialEq {
    /// Semantic node kind produced by classification.
    type Kind: Copy + Eq + Hash + fmt::Debug;
    /// Tokens fed to the builder.
    type Token: Clone + PartialEq + fmt::Debug;
    /// Results of evaluators.
    type Value: Clone + PartialEq + fmt::Debug;
    /// Custom aggregates created by `start` hooks.
    type Aggregate: Clone + PartialEq + fmt::Debug;
    /// State handed to every hook.
    type Context;
}

/// What a token does to the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Opens a node.
    Start,
    /// Closes the innermost open node.
    End,
    /// Ignored.
    Skip,
    /// Becomes a child of the innermost open node.
    Leaf,
}

pub type Classify<S> = fn(&<S as TreeSchema>::Token) -> (Role, <S as TreeSchema>::Kind);

pub type StartFn<S> = fn(
    &mut <S as TreeSchema>::Context,
    <S as TreeSchema>::Kind,
    &<S as TreeSchema>::Token,
) -> Repr<S>;

pub type EndFn<S> = fn(
    &mut <S as TreeSchema>::Context,
    &mut Repr<S>,
    &<S as TreeSchema>::Token,
) -> Result<(), BuildError>;

pub type LeafEvalFn<S> = fn(
    &mut <S as TreeSchema>::Context,
    &<S as TreeSchema>::Token,
) -> Result<<S as TreeSchema>::Value, BuildError>;

pub type SubtreeEvalFn<S> = fn(
    &mut <S as TreeSchema>::Context,
    &Tree<S>,
    NodeId,
) -> Result<<S as TreeSchema>::Value, BuildError>;

pub type PushFn<S> = fn(
    &mut <S as TreeSchema>::Context,
    &mut Repr<S>,
    <S as TreeSchema>::Kind,
    Item<S>,
) -> Result<(), BuildError>;

/// Evaluator of a kind. Leaf tokens and closed subtrees take different inputs.
pub enum Eval<S: TreeSchema> {
    Leaf(LeafEvalFn<S>),
    Subtree(SubtreeEvalFn<S>),
}

impl<S: TreeSchema> Clone for Eval<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: TreeSchema> Copy for Eval<S> {}

impl<S: TreeSchema> fmt::Debug for Eval<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eval::Leaf(_) => f.write_str("Leaf(..)"),
            Eval::Subtree(_) => f.write_str("Subtree(..)"),
        }
    }
}

/// Hooks of one node kind.
pub struct Handler<S: TreeSchema> {
    pub start: Option<StartFn<S>>,
    pub end: Option<EndFn<S>>,
    pub eval: Option<Eval<S>>,
    pub push: Option<PushFn<S>>,
}

impl<S: TreeSchema> Handler<S> {
    pub fn new() -> Self {
        Handler {
            start: None,
            end: None,
            eval: None,
            push: None,
        }
    }

    pub fn with_start(mut self, start: StartFn<S>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_end(mut self, end: EndFn<S>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_leaf_eval(mut self, eval: LeafEvalFn<S>) -> Self {
        self.eval = Some(Eval::Leaf(eval));
        self
    }

    pub fn with_subtree_eval(mut self, eval: SubtreeEvalFn<S>) -> Self {
        self.eval = Some(Eval::Subtree(eval));
        self
    }

    pub fn with_push(mut self, push: PushFn<S>) -> Self {
        self.push = Some(push);
        self
    }

    /// Whether subtrees of this kind are buffered until they close.
    pub fn buffers(&self) -> bool {
        self.eval.is_some()
    }
}

impl<S: TreeSchema> Default for Handler<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TreeSchema> Clone for Handler<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: TreeSchema> Copy for Handler<S> {}

impl<S: TreeSchema> fmt::Debug for Handler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("start", &self.start.is_some())
            .field("end", &self.end.is_some())
            .field("eval", &self.eval)
            .field("push", &self.push.is_some())
            .finish()
    }
}

/// Handler table keyed by node kind.
pub type Handlers<S> = HashMap<<S as TreeSchema>::Kind, Handler<S>>;

/// Representation a kind without a `start` hook opens with.
pub fn default_start<S: TreeSchema>(kind: S::Kind, token: &S::Token) -> Repr<S> {
    Repr::Node(Node::new(Some(kind), Some(token.clone())))
}
