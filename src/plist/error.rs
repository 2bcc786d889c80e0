//! Property-list parse errors

use crate::building::BuildError;
use crate::lexing::{ScanError, Symbol};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlistError {
    /// The scanner found no rule matching the input.
    #[error("plist: syntax error at line {line}, column {column} in state {state}")]
    Syntax {
        line: usize,
        column: usize,
        state: Symbol,
        #[source]
        source: ScanError,
    },

    /// The rule table itself is broken.
    #[error("plist: broken grammar")]
    Grammar(#[source] ScanError),

    /// A token was scanned but could not be placed or evaluated.
    #[error("plist: invalid value at line {line}, column {column}")]
    Invalid {
        line: usize,
        column: usize,
        #[source]
        source: BuildError,
    },

    /// The token stream did not form a complete tree.
    #[error("plist: incomplete input")]
    Build(#[from] BuildError),

    /// The input holds no value at all.
    #[error("plist: empty input")]
    Empty,
}

impl PlistError {
    /// Line and column the error points at, when it points anywhere.
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            PlistError::Syntax { line, column, .. } | PlistError::Invalid { line, column, .. } => {
                Some((*line, *column))
            }
            _ => None,
        }
    }
}
