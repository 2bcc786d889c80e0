//! Generic tree building
//!
//! Turns a flat, classified token sequence into a tree. The builder itself knows
//! nothing about any format: a [`TreeSchema`] names the types involved, a
//! classification function assigns each token a [`Role`] and a node kind, and a
//! [`Handlers`] table says how each kind is constructed, evaluated and fed with
//! children. See [`schema`] for the hooks and their defaults.

pub mod builder;
pub mod error;
pub mod schema;
pub mod tree;

pub use builder::TreeBuilder;
pub use error::BuildError;
pub use schema::{Classify, Eval, Handler, Handlers, Role, TreeSchema};
pub use tree::{Item, Node, NodeId, Repr, Tree};
