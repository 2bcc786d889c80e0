//! Tree builder errors

use std::fmt;
use thiserror::Error;

/// Failures reported by [`TreeBuilder`](super::TreeBuilder).
///
/// Node kinds are carried as their `Debug` rendering so the error type does not
/// depend on the schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The parent has neither a custom push nor a shape that takes children.
    #[error("tree builder: don't know how to push {child} onto {parent}")]
    Unabsorbable { parent: String, child: String },

    /// A leaf evaluator was registered for a node kind, or the other way round.
    #[error("tree builder: the evaluator for {kind} cannot evaluate a {role}")]
    MisplacedEval { kind: String, role: &'static str },

    /// An end token arrived while no node was open.
    #[error("tree builder: end of {kind} without a matching start")]
    Unbalanced { kind: String },

    /// An end token closes a different kind than the innermost open node.
    #[error("tree builder: end of {found} while {expected} is open")]
    Mismatched { expected: String, found: String },

    /// The token stream ended with nodes still open.
    #[error("tree builder: {count} node(s) left open: {list}", count = .open.len(), list = .open.join(", "))]
    Unclosed { open: Vec<String> },

    /// A handler refused its input.
    #[error("{kind}: {message}")]
    Rejected { kind: String, message: String },
}

impl BuildError {
    pub fn rejected(kind: impl fmt::Debug, message: impl Into<String>) -> Self {
        BuildError::Rejected {
            kind: format!("{kind:?}"),
            message: message.into(),
        }
    }

    /// True for errors caused by a handler table that cannot work for any input.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            BuildError::Unabsorbable { .. } | BuildError::MisplacedEval { .. }
        )
    }

    /// True when starts and ends of the token stream did not pair up.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            BuildError::Unbalanced { .. } | BuildError::Mismatched { .. } | BuildError::Unclosed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unclosed_lists_open_kinds() {
        let err = BuildError::Unclosed {
            open: vec!["Array".into(), "Dict".into()],
        };
        assert_eq!(
            err.to_string(),
            "tree builder: 2 node(s) left open: Array, Dict"
        );
        assert!(err.is_structural());
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_rejected_formats_kind_with_debug() {
        #[derive(Debug)]
        enum Kind {
            Int,
        }
        let err = BuildError::rejected(Kind::Int, "out of range");
        assert_eq!(err.to_string(), "Int: out of range");
    }
}
