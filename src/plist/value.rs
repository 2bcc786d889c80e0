//! Parsed property-list values
//!
//! [`Value`] renders back to property-list text through `Display` (single line) and
//! [`Value::to_plist_string`] (indented), and to JSON through serde.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt::{self, Write};

/// A property-list value.
///
/// Dates and data blocks are kept as scanned: a date holds its literal text, a data
/// block holds its hex chunks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Dict(IndexMap<String, Value>),
    Array(Vec<Value>),
    String(String),
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Date(String),
    Data(Vec<String>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Dict(_) => "dict",
            Value::Array(_) => "array",
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Boolean(_) => "boolean",
            Value::Date(_) => "date",
            Value::Data(_) => "data",
        }
    }

    pub fn as_dict(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Dict(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Reals, and integers converted to reals.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Entry `key` of a dict.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_dict()?.get(key)
    }

    /// Indented property-list text, one entry per line.
    ///
    /// Parsing the text gives back an equal value, as long as every real in it is
    /// finite. NaN and the infinities render as `NaN` and `inf`, which do not parse.
    pub fn to_plist_string(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = write_value(&mut out, self, Some(0));
        out.push('\n');
        out
    }

    /// Pretty-printed JSON. Dates and data blocks become a string and an array of strings.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Single-line property-list text. Like [`Value::to_plist_string`], this only parses
/// back to an equal value when every real in it is finite.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, None)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Real(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(entries: IndexMap<String, Value>) -> Self {
        Value::Dict(entries)
    }
}

const INDENT: &str = "    ";

fn newline(out: &mut impl Write, indent: Option<usize>) -> fmt::Result {
    match indent {
        Some(depth) => {
            out.write_char('\n')?;
            for _ in 0..depth {
                out.write_str(INDENT)?;
            }
            Ok(())
        }
        None => out.write_char(' '),
    }
}

/// `indent` is the current depth for indented output, `None` for a single line.
fn write_value(out: &mut impl Write, value: &Value, indent: Option<usize>) -> fmt::Result {
    let inner = indent.map(|depth| depth + 1);
    match value {
        Value::Dict(entries) if entries.is_empty() => out.write_str("{}"),
        Value::Dict(entries) => {
            out.write_char('{')?;
            for (key, value) in entries {
                newline(out, inner)?;
                write_key(out, key)?;
                out.write_str(" = ")?;
                write_value(out, value, inner)?;
                out.write_char(';')?;
            }
            newline(out, indent)?;
            out.write_char('}')
        }
        Value::Array(items) if items.is_empty() => out.write_str("()"),
        Value::Array(items) => {
            out.write_char('(')?;
            for (i, item) in items.iter().enumerate() {
                if indent.is_some() {
                    newline(out, inner)?;
                } else if i > 0 {
                    out.write_char(' ')?;
                }
                write_value(out, item, inner)?;
                if indent.is_some() || i + 1 < items.len() {
                    out.write_char(',')?;
                }
            }
            if indent.is_some() {
                newline(out, indent)?;
            }
            out.write_char(')')
        }
        Value::String(s) => write_string(out, s),
        Value::Integer(i) => write!(out, "{i}"),
        Value::Real(f) => {
            let text = f.to_string();
            out.write_str(&text)?;
            if f.is_finite() && !text.contains('.') {
                out.write_str(".0")?;
            }
            Ok(())
        }
        Value::Boolean(true) => out.write_str(":true"),
        Value::Boolean(false) => out.write_str(":false"),
        Value::Date(text) => out.write_str(text),
        Value::Data(chunks) => {
            out.write_char('<')?;
            for (i, chunk) in chunks.iter().enumerate() {
                if i > 0 {
                    out.write_char(' ')?;
                }
                out.write_str(chunk)?;
            }
            out.write_char('>')
        }
    }
}

fn write_string(out: &mut impl Write, s: &str) -> fmt::Result {
    out.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            '\u{8}' => out.write_str("\\b")?,
            '\u{c}' => out.write_str("\\f")?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}

fn is_bare_key(key: &str) -> bool {
    !key.is_empty()
        && !key.contains('/')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '+' | '.' | '-'))
}

fn write_key(out: &mut impl Write, key: &str) -> fmt::Result {
    if is_bare_key(key) {
        return out.write_str(key);
    }
    out.write_char('"')?;
    for c in key.chars() {
        if matches!(c, '"' | '\\') {
            out.write_char('\\')?;
        }
        out.write_char(c)?;
    }
    out.write_char('"')
}
