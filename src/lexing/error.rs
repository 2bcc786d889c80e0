//! Errors raised while compiling rule tables and while scanning

use super::rules::Symbol;
use thiserror::Error;

/// A rule table could not be compiled.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A rule's pattern is not a valid regular expression.
    #[error("lexer: invalid pattern for rule {index} of state {state}: {source}")]
    Pattern {
        state: Symbol,
        index: usize,
        #[source]
        source: regex_automata::meta::BuildError,
    },
}

/// A scan stopped before the end of its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// The grammar transitioned into a state it never declared.
    #[error("lexer: no such state: {state}")]
    UnknownState { state: Symbol },

    /// No rule of the current state matches at the current offset.
    #[error("lexer: invalid input at offset {position} in state {state} before {excerpt:?}")]
    NoMatch {
        position: usize,
        state: Symbol,
        excerpt: String,
    },
}

impl ScanError {
    /// True for errors caused by the grammar itself rather than by the input.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ScanError::UnknownState { .. })
    }

    /// Offset at which the scan stopped, for errors tied to the input.
    pub fn position(&self) -> Option<usize> {
        match self {
            ScanError::NoMatch { position, .. } => Some(*position),
            ScanError::UnknownState { .. } => None,
        }
    }
}
