//! Property-list rule table
//!
//! The grammar scans the textual property-list format used by TextMate grammars:
//!
//! ```text
//! value  := dict | array | string | int | hexint | float | bool | date | data
//! dict   := '{' (key '=' value ';')* '}'        the last ';' is optional
//! array  := '(' (value (',' value)* ','?)? ')'
//! string := '"' (chars | escape)* '"'  |  "'" (chars | "''")* "'"
//! ```
//!
//! Whitespace, `// line` and `/* block */` comments are skipped wherever whitespace
//! is allowed.
//!
//! Nesting is tracked with an explicit stack in [`PlistState`]. Opening an array or a
//! dict pushes the name of its tail state; closing pops it. After every scalar the
//! scanner returns to whatever tail state is on top of the stack, or to `end` when
//! the stack is empty.
//!
//! States:
//!
//! - `main` dispatches on the next value.
//! - `data`, `string`, `sstring` read the bodies of `<...>`, `"..."` and `'...'`.
//! - `arrayHead` follows `(` and lets `()` close immediately.
//! - `arrayTail` and `afterComma` follow array elements. A single trailing comma is
//!   accepted, a second comma in a row is not.
//! - `dictTail`, `beforeKey`, `afterKey` walk the `key = value;` entries.
//! - `end` follows the top-level value and accepts only whitespace.
//!
//! Dates (`@2020-01-31 12:00:00 +0100`) and data blocks (`<0fa1>`) are scanned but
//! not decoded.

use super::kinds::{Kind, Tag};
use crate::lexing::{compile, CompiledGrammar, Context, Emit, Goto, Rule, RuleTable, Symbol};
use once_cell::sync::Lazy;

pub const MAIN: Symbol = "main";
pub const END: Symbol = "end";

const DATE: &str =
    r"@[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2} [+\-][0-9]{4}";
// Allows leading digits and digit-only keys.
const KEY: &str = r"[a-zA-Z0-9_$+/.\-]+";
// `\"` and `\\` escape the quote and the backslash.
const QUOTED_KEY: &str = r#""(?:[^"\\]|\\.)*""#;

/// Grammar-specific part of the run context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlistState {
    /// Tail states of the open arrays and dicts, innermost last.
    pub stack: Vec<Symbol>,
    /// Current line, 1-based.
    pub line: usize,
    /// Byte offset where the current line starts.
    pub last_newline: usize,
}

impl Default for PlistState {
    fn default() -> Self {
        PlistState {
            stack: Vec::new(),
            line: 1,
            last_newline: 0,
        }
    }
}

type Cx<'a> = Context<'a, PlistState>;
type PlistRule = Rule<Tag, PlistState>;

/// The compiled grammar, shared by every scan.
pub static GRAMMAR: Lazy<CompiledGrammar<Tag, PlistState>> =
    Lazy::new(|| compile(rule_table()).expect("property-list grammar compiles"));

/// Advance the line counter past the newlines in `text`, matched at the current position.
fn track_lines(cx: &mut Cx<'_>, text: &str) {
    if let Some(last) = text.rfind('\n') {
        cx.ext.line += text.matches('\n').count();
        cx.ext.last_newline = cx.position + last + 1;
    }
}

fn newline(cx: &mut Cx<'_>, _: Symbol, text: &str) -> Tag {
    track_lines(cx, text);
    Tag::skip(Kind::Newline)
}

fn block_comment(cx: &mut Cx<'_>, _: Symbol, text: &str) -> Tag {
    track_lines(cx, text);
    Tag::skip(Kind::Comment)
}

fn quoted_key(cx: &mut Cx<'_>, _: Symbol, text: &str) -> Tag {
    track_lines(cx, text);
    Tag::leaf(Kind::Key)
}

fn chars(cx: &mut Cx<'_>, _: Symbol, text: &str) -> Tag {
    track_lines(cx, text);
    Tag::leaf(Kind::Chars)
}

fn innermost(cx: &Cx<'_>) -> Symbol {
    cx.ext.stack.last().copied().unwrap_or(END)
}

fn after_value(cx: &mut Cx<'_>, _: Symbol, _: &str) -> Symbol {
    innermost(cx)
}

fn open_array(cx: &mut Cx<'_>, _: Symbol, _: &str) -> Symbol {
    cx.ext.stack.push("arrayTail");
    "arrayHead"
}

fn open_dict(cx: &mut Cx<'_>, _: Symbol, _: &str) -> Symbol {
    cx.ext.stack.push("dictTail");
    "beforeKey"
}

fn close(cx: &mut Cx<'_>, _: Symbol, _: &str) -> Symbol {
    cx.ext.stack.pop();
    innermost(cx)
}

fn space_rules() -> Vec<PlistRule> {
    vec![
        Rule::new(r"\n\r?", Emit::with(newline)),
        Rule::new(r"[ \t\r]+", Tag::skip(Kind::Space)),
        Rule::new(r"//[^\n]*", Tag::skip(Kind::Comment)),
        Rule::new(r"/\*.*?\*/", Emit::with(block_comment)),
    ]
}

fn with_spaces(rules: Vec<PlistRule>) -> Vec<PlistRule> {
    let mut all = space_rules();
    all.extend(rules);
    all
}

fn scalar(pattern: &str, kind: Kind) -> PlistRule {
    Rule::new(pattern, Tag::leaf(kind)).then_with(Goto::with(after_value))
}

fn close_array() -> PlistRule {
    Rule::new(r"\)", Tag::end(Kind::Array)).then_with(Goto::with(close))
}

fn close_dict() -> PlistRule {
    Rule::new(r"\}", Tag::end(Kind::Dict)).then_with(Goto::with(close))
}

/// The property-list rule table.
pub fn rule_table() -> RuleTable<Tag, PlistState> {
    vec![
        (
            MAIN,
            with_spaces(vec![
                Rule::new(r"\(", Tag::start(Kind::Array)).then_with(Goto::with(open_array)),
                Rule::new(r"\{", Tag::start(Kind::Dict)).then_with(Goto::with(open_dict)),
                Rule::new("<", Tag::start(Kind::Data)).then("data"),
                Rule::new("\"", Tag::start(Kind::String)).then("string"),
                Rule::new("'", Tag::start(Kind::String)).then("sstring"),
                // Hex before decimal: "0x1f" would otherwise lex as "0".
                scalar(r"[+\-]?0x[0-9a-fA-F]+", Kind::HexInt),
                // Floats need a point, so trying them before integers is unambiguous.
                scalar(r"[+\-]?[0-9]*\.[0-9]+", Kind::Float),
                scalar(r"[+\-]?[0-9]+", Kind::Int),
                scalar(r":true\b|:false\b", Kind::Bool),
                scalar(DATE, Kind::Date),
            ]),
        ),
        (
            "data",
            with_spaces(vec![
                Rule::new("[0-9a-fA-F]{1,8}", Tag::leaf(Kind::Data)),
                Rule::new(">", Tag::end(Kind::Data)).then_with(Goto::with(after_value)),
            ]),
        ),
        (
            "string",
            vec![
                Rule::new(r#"[^"\\]+"#, Emit::with(chars)),
                Rule::new(r#"\\["\\/bfnrt]"#, Tag::leaf(Kind::Escape)),
                Rule::new("\"", Tag::end(Kind::String)).then_with(Goto::with(after_value)),
            ],
        ),
        (
            // Verbatim except for the quote itself, which is escaped by doubling it.
            "sstring",
            vec![
                Rule::new("[^']+", Emit::with(chars)),
                Rule::new("''", Tag::leaf(Kind::Escape)),
                Rule::new("'", Tag::end(Kind::String)).then_with(Goto::with(after_value)),
            ],
        ),
        (
            "arrayHead",
            with_spaces(vec![
                close_array(),
                Rule::fallback(Tag::skip(Kind::Space)).then(MAIN),
            ]),
        ),
        (
            "arrayTail",
            with_spaces(vec![
                Rule::new(",", Tag::skip(Kind::Separator)).then("afterComma"),
                close_array(),
            ]),
        ),
        (
            "afterComma",
            with_spaces(vec![
                close_array(),
                Rule::fallback(Tag::skip(Kind::Space)).then(MAIN),
            ]),
        ),
        (
            "dictTail",
            with_spaces(vec![
                Rule::new(";", Tag::skip(Kind::Separator)).then("beforeKey"),
                close_dict(),
            ]),
        ),
        (
            "beforeKey",
            with_spaces(vec![
                Rule::new(KEY, Tag::leaf(Kind::Key)).then("afterKey"),
                Rule::new(QUOTED_KEY, Emit::with(quoted_key)).then("afterKey"),
                close_dict(),
            ]),
        ),
        (
            "afterKey",
            with_spaces(vec![Rule::new("=", Tag::skip(Kind::Equals)).then(MAIN)]),
        ),
        (END, space_rules()),
    ]
}
