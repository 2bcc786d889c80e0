//! Incremental tree builder
//!
//! The builder is fed one token at a time through [`TreeBuilder::write`]. It keeps a
//! stack of open representations, starting with the root sentinel, and decides per
//! token, based on its classified role and the handler of its kind, what to open,
//! close, evaluate, and where to push.
//!
//! Subtrees whose kind has no evaluator are attached to their parent as soon as they
//! open, so the tree can be inspected mid-build. Subtrees with an evaluator are
//! buffered: they stay detached until they close, and then only the evaluated value
//! reaches the parent.
//!
//! Nothing is rolled back on error. Whatever was attached before a failing `write`
//! stays in the tree.

use super::error::BuildError;
use super::schema::{default_start, Classify, Eval, Handler, Handlers, Role, TreeSchema};
use super::tree::{Item, Node, NodeId, Repr, Tree};

/// An entry of the open-node stack.
#[derive(Debug, Clone, Copy)]
struct Frame<K> {
    kind: Option<K>,
    id: NodeId,
}

/// Builds a [`Tree`] from a classified token sequence.
pub struct TreeBuilder<S: TreeSchema> {
    classify: Classify<S>,
    handlers: Handlers<S>,
    context: S::Context,
    tree: Tree<S>,
    stack: Vec<Frame<S::Kind>>,
}

impl<S: TreeSchema> TreeBuilder<S> {
    pub fn new(classify: Classify<S>, handlers: Handlers<S>, context: S::Context) -> Self {
        TreeBuilder {
            classify,
            handlers,
            context,
            tree: Tree::new(),
            stack: vec![Frame {
                kind: None,
                id: NodeId::ROOT,
            }],
        }
    }

    /// Feed the next token.
    pub fn write(&mut self, token: S::Token) -> Result<(), BuildError> {
        let (role, kind) = (self.classify)(&token);
        match role {
            Role::Skip => Ok(()),
            Role::Start => self.open(kind, token),
            Role::End => self.close(kind, token),
            Role::Leaf => self.leaf(kind, token),
        }
    }

    /// The root sentinel. Its content is the result once the input is exhausted.
    pub fn root(&self) -> &Node<S> {
        self.tree.root()
    }

    pub fn tree(&self) -> &Tree<S> {
        &self.tree
    }

    pub fn context(&self) -> &S::Context {
        &self.context
    }

    /// Number of open nodes, not counting the root.
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    /// End the build. Fails if any node is still open.
    pub fn finish(self) -> Result<Tree<S>, BuildError> {
        if self.depth() > 0 {
            let open = self.stack[1..]
                .iter()
                .filter_map(|frame| frame.kind)
                .map(|kind| format!("{kind:?}"))
                .collect();
            return Err(BuildError::Unclosed { open });
        }
        Ok(self.tree)
    }

    fn handler(&self, kind: S::Kind) -> Handler<S> {
        self.handlers.get(&kind).copied().unwrap_or_default()
    }

    fn top(&self) -> Frame<S::Kind> {
        // The root frame is never popped.
        self.stack[self.stack.len() - 1]
    }

    fn open(&mut self, kind: S::Kind, token: S::Token) -> Result<(), BuildError> {
        let handler = self.handler(kind);
        let repr = match handler.start {
            Some(start) => start(&mut self.context, kind, &token),
            None => default_start::<S>(kind, &token),
        };
        log::trace!("tree builder: open {kind:?} as {}", repr.shape());

        let parent = self.top();
        let id = self.tree.insert(repr);
        self.stack.push(Frame {
            kind: Some(kind),
            id,
        });

        if handler.buffers() {
            Ok(())
        } else {
            self.push(parent, kind, Item::Tree(id))
        }
    }

    fn close(&mut self, kind: S::Kind, token: S::Token) -> Result<(), BuildError> {
        if self.depth() == 0 {
            return Err(BuildError::Unbalanced {
                kind: format!("{kind:?}"),
            });
        }
        let frame = self.top();
        if frame.kind != Some(kind) {
            return Err(BuildError::Mismatched {
                expected: frame
                    .kind
                    .map(|open| format!("{open:?}"))
                    .unwrap_or_default(),
                found: format!("{kind:?}"),
            });
        }
        self.stack.pop();
        log::trace!("tree builder: close {kind:?}");

        let handler = self.handler(kind);
        if let Some(repr) = self.tree.get_mut(frame.id) {
            match repr {
                Repr::Node(node) => node.end = Some(token),
                other => {
                    if let Some(end) = handler.end {
                        end(&mut self.context, other, &token)?;
                    }
                }
            }
        }

        match handler.eval {
            None => Ok(()),
            Some(Eval::Subtree(eval)) => {
                let value = eval(&mut self.context, &self.tree, frame.id)?;
                let parent = self.top();
                self.push(parent, kind, Item::Value(value))
            }
            Some(Eval::Leaf(_)) => Err(BuildError::MisplacedEval {
                kind: format!("{kind:?}"),
                role: "subtree",
            }),
        }
    }

    fn leaf(&mut self, kind: S::Kind, token: S::Token) -> Result<(), BuildError> {
        let item = match self.handler(kind).eval {
            None => Item::Token(token),
            Some(Eval::Leaf(eval)) => Item::Value(eval(&mut self.context, &token)?),
            Some(Eval::Subtree(_)) => {
                return Err(BuildError::MisplacedEval {
                    kind: format!("{kind:?}"),
                    role: "leaf",
                })
            }
        };
        let parent = self.top();
        self.push(parent, kind, item)
    }

    fn push(&mut self, parent: Frame<S::Kind>, kind: S::Kind, item: Item<S>) -> Result<(), BuildError> {
        let handler = parent.kind.map(|k| self.handler(k)).unwrap_or_default();
        let Some(repr) = self.tree.get_mut(parent.id) else {
            return Err(BuildError::Unabsorbable {
                parent: format!("{:?}", parent.kind),
                child: format!("{kind:?}"),
            });
        };

        if let Some(push) = handler.push {
            return push(&mut self.context, repr, kind, item);
        }
        match repr {
            Repr::Node(node) => node.content.push(item),
            Repr::Seq(items) => items.push(item),
            Repr::Custom(_) => {
                return Err(BuildError::Unabsorbable {
                    parent: parent
                        .kind
                        .map(|k| format!("{k:?}"))
                        .unwrap_or_else(|| "root".to_string()),
                    child: format!("{kind:?}"),
                })
            }
        }
        Ok(())
    }
}
