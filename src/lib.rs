//! # parsetools
//!
//! Building blocks for small hand-configured parsers.
//!
//! - [`lexing`] compiles a table of regex rules, grouped in named states, into a
//!   pull scanner whose rules can read and update a shared run context.
//! - [`building`] turns a classified token sequence into a tree, with per-kind hooks
//!   for construction, evaluation and custom aggregation.
//! - [`plist`] combines the two into a parser for textual property lists.
//! - [`config`] loads [`ParseOptions`](config::ParseOptions) from TOML.
//!
//! Diagnostics go through the `log` facade: compiled grammars are reported at
//! `debug`, every scanner step and tree-builder event at `trace`.

pub mod building;
pub mod config;
pub mod lexing;
pub mod plist;
