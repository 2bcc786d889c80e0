//! Table-driven scanner generator
//!
//! A grammar is a [`RuleTable`]: named states, each with an ordered list of rules.
//! [`compile`] turns the table into a [`CompiledGrammar`], and
//! [`CompiledGrammar::run`] scans an input with it, yielding one token per step.
//!
//! The scanner is a state machine with context. Rules can compute both the token
//! they emit and the next state from a mutable [`Context`] shared by the whole scan,
//! which is how grammars track things a plain state machine cannot, such as the
//! nesting of brackets.
//!
//! ```ignore
//! let table: RuleTable<Tag, ()> = vec![
//!     ("main", vec![
//!         Rule::new("[0-9]+", Tag::Number),
//!         Rule::new(" +", Tag::Space),
//!         Rule::new(r"\(", Tag::Open).then("inner"),
//!     ]),
//!     ("inner", vec![Rule::new(r"\)", Tag::Close).then("main")]),
//! ];
//! let grammar = compile(table)?;
//! for token in grammar.run("1 (", 0, "main", ()) { ... }
//! ```

pub mod compiler;
pub mod error;
pub mod rules;
pub mod scanner;

pub use compiler::{compile, CompiledGrammar, CompiledState, Edge};
pub use error::{CompileError, ScanError};
pub use rules::{Emit, Goto, Rule, RuleTable, Symbol, ZERO_WIDTH};
pub use scanner::{Context, Token, Tokens, DEFAULT_EXCERPT_LEN};
