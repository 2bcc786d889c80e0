//! Property-list token stream with line/column tracking

use super::error::PlistError;
use super::grammar::{PlistState, GRAMMAR, MAIN};
use super::kinds::Tag;
use crate::lexing::{ScanError, Token, Tokens};
use std::fmt;
use std::iter::FusedIterator;

/// A 1-based line and column. Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Line bookkeeping of the scanner at one offset, taken before a step so the
/// location of the token it produces can be computed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    position: usize,
    line: usize,
    line_start: usize,
}

/// Scans property-list text. Scan failures carry the line and column they happened at.
pub struct PlistTokens<'a> {
    inner: Tokens<'static, 'a, Tag, PlistState>,
}

/// Start scanning `input` at its beginning.
pub fn tokens(input: &str) -> PlistTokens<'_> {
    PlistTokens {
        inner: GRAMMAR.run(input, 0, MAIN, PlistState::default()),
    }
}

impl<'a> PlistTokens<'a> {
    /// Limit the input excerpt carried by syntax errors.
    pub fn with_excerpt_len(mut self, len: usize) -> Self {
        self.inner = self.inner.with_excerpt_len(len);
        self
    }

    /// Location of the scanner's current offset.
    pub fn location(&self) -> Location {
        self.location_at(self.checkpoint())
    }

    /// The scanner's current offset and line. The next token starts there.
    pub fn checkpoint(&self) -> Checkpoint {
        let cx = self.inner.context();
        Checkpoint {
            position: cx.position,
            line: cx.ext.line,
            line_start: cx.ext.last_newline,
        }
    }

    /// Location of a checkpoint taken earlier in this scan.
    pub fn location_at(&self, checkpoint: Checkpoint) -> Location {
        let column = self
            .inner
            .context()
            .input
            .get(checkpoint.line_start..checkpoint.position)
            .map_or(0, |text| text.chars().count());
        Location {
            line: checkpoint.line,
            column: column + 1,
        }
    }

    /// Name of the state the scanner is in.
    pub fn state(&self) -> &'static str {
        self.inner.context().symbol
    }

    /// Nesting depth of open arrays and dicts.
    pub fn depth(&self) -> usize {
        self.inner.context().ext.stack.len()
    }

    fn translate(&self, error: ScanError) -> PlistError {
        match error {
            // The scanner does not advance past a failed step.
            ScanError::NoMatch { state, .. } => {
                let Location { line, column } = self.location();
                PlistError::Syntax {
                    line,
                    column,
                    state,
                    source: error,
                }
            }
            ScanError::UnknownState { .. } => PlistError::Grammar(error),
        }
    }
}

impl<'a> Iterator for PlistTokens<'a> {
    type Item = Result<Token<'a, Tag>, PlistError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.next()? {
            Ok(token) => Some(Ok(token)),
            Err(error) => Some(Err(self.translate(error))),
        }
    }
}

impl FusedIterator for PlistTokens<'_> {}
