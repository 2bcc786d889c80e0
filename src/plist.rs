//! Textual property lists
//!
//! A parser for the old-style (NeXTSTEP/TextMate) property-list format, built from
//! the generic [`lexing`](crate::lexing) scanner and [`building`](crate::building)
//! tree builder:
//!
//! ```ignore
//! let value = parsetools::plist::parse("{ name = JSON; fileTypes = (json); }")?;
//! assert_eq!(value.get("name").and_then(Value::as_str), Some("JSON"));
//! ```
//!
//! The grammar lives in [`grammar`], the mapping from tokens to values in
//! [`handlers`]. [`parse_with`] takes [`ParseOptions`], usually produced by
//! [`config::Loader`](crate::config::Loader).

pub mod error;
pub mod grammar;
pub mod handlers;
pub mod kinds;
pub mod lexer;
pub mod value;

pub use error::PlistError;
pub use handlers::{handlers, Plist};
pub use kinds::{classify, Kind, Tag};
pub use lexer::{tokens, Checkpoint, Location, PlistTokens};
pub use value::Value;

use crate::building::{Tree, TreeBuilder};
use crate::config::ParseOptions;

/// Parse `input` with the default options.
pub fn parse(input: &str) -> Result<Value, PlistError> {
    parse_with(input, &ParseOptions::default())
}

/// Parse `input` into a single value.
pub fn parse_with(input: &str, options: &ParseOptions) -> Result<Value, PlistError> {
    let tree = build_tree(input, options)?;
    let first = tree.root().content.first().ok_or(PlistError::Empty)?;
    let value = handlers::resolve(&tree, first)?;
    log::debug!("plist: parsed a {} from {} bytes", value.type_name(), input.len());
    Ok(value)
}

/// Scan `input` and build its tree without resolving it into a [`Value`].
///
/// Strings, numbers and booleans are already evaluated in the tree. Arrays, dicts
/// and data blocks are separate nodes referenced from their parents.
pub fn build_tree<'a>(input: &'a str, options: &ParseOptions) -> Result<Tree<Plist<'a>>, PlistError> {
    let mut stream = tokens(input).with_excerpt_len(options.excerpt_len);
    let mut builder = TreeBuilder::new(classify, handlers(), options.clone());

    loop {
        let before = stream.checkpoint();
        let Some(token) = stream.next() else {
            break;
        };
        let token = token?;
        log::trace!("plist: {:?} {:?} at {}", token.tag.role, token.tag.kind, token.span.start);
        builder.write(token).map_err(|source| {
            let Location { line, column } = stream.location_at(before);
            PlistError::Invalid {
                line,
                column,
                source,
            }
        })?;
    }

    Ok(builder.finish()?)
}
