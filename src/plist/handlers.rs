//! Tree-builder handlers of the property-list grammar
//!
//! Arrays collect their elements in a plain sequence. Dicts use a custom aggregate
//! that pairs each key leaf with the value pushed after it. Scalars and strings are
//! evaluated on the spot, strings by joining their buffered character runs and
//! escapes. Dates and data blocks have no handlers and stay as raw tokens and
//! generic nodes.

use super::error::PlistError;
use super::kinds::{Kind, Tag};
use super::value::Value;
use crate::building::{BuildError, Handler, Handlers, Item, NodeId, Repr, Tree, TreeSchema};
use crate::config::{KeyPolicy, ParseOptions};
use crate::lexing::Token;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::marker::PhantomData;

/// Tree schema of property lists borrowing from an input of lifetime `'a`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plist<'a>(PhantomData<&'a str>);

impl<'a> TreeSchema for Plist<'a> {
    type Kind = Kind;
    type Token = Token<'a, Tag>;
    type Value = Value;
    type Aggregate = DictEntries<'a>;
    type Context = ParseOptions;
}

/// Entries of a dict under construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DictEntries<'a> {
    pub entries: IndexMap<String, Item<Plist<'a>>>,
    /// The key still waiting for its value.
    pub pending: Option<String>,
}

type PlistHandler<'a> = Handler<Plist<'a>>;

/// The handler table.
pub fn handlers<'a>() -> Handlers<Plist<'a>> {
    let mut handlers: Handlers<Plist<'a>> = HashMap::new();
    handlers.insert(Kind::Array, PlistHandler::new().with_start(start_array));
    handlers.insert(
        Kind::Dict,
        PlistHandler::new()
            .with_start(start_dict)
            .with_push(push_entry)
            .with_end(end_dict),
    );
    handlers.insert(Kind::String, PlistHandler::new().with_subtree_eval(join_string));
    handlers.insert(Kind::Chars, PlistHandler::new().with_leaf_eval(eval_chars));
    handlers.insert(Kind::Escape, PlistHandler::new().with_leaf_eval(eval_escape));
    handlers.insert(Kind::Key, PlistHandler::new().with_leaf_eval(eval_key));
    handlers.insert(Kind::Int, PlistHandler::new().with_leaf_eval(eval_int));
    handlers.insert(Kind::HexInt, PlistHandler::new().with_leaf_eval(eval_hex_int));
    handlers.insert(Kind::Float, PlistHandler::new().with_leaf_eval(eval_float));
    handlers.insert(Kind::Bool, PlistHandler::new().with_leaf_eval(eval_bool));
    handlers
}

fn start_array<'a>(_: &mut ParseOptions, _: Kind, _: &Token<'a, Tag>) -> Repr<Plist<'a>> {
    Repr::Seq(Vec::new())
}

fn start_dict<'a>(_: &mut ParseOptions, _: Kind, _: &Token<'a, Tag>) -> Repr<Plist<'a>> {
    Repr::Custom(DictEntries::default())
}

fn push_entry<'a>(
    options: &mut ParseOptions,
    repr: &mut Repr<Plist<'a>>,
    kind: Kind,
    item: Item<Plist<'a>>,
) -> Result<(), BuildError> {
    let shape = repr.shape();
    let Repr::Custom(dict) = repr else {
        return Err(BuildError::Unabsorbable {
            parent: shape.to_string(),
            child: format!("{kind:?}"),
        });
    };

    if kind == Kind::Key {
        let Item::Value(Value::String(key)) = item else {
            return Err(BuildError::rejected(Kind::Key, "key did not evaluate to a string"));
        };
        if let Some(pending) = &dict.pending {
            if options.key_policy == KeyPolicy::Reject {
                return Err(BuildError::rejected(
                    Kind::Dict,
                    format!("key {pending:?} has no value before key {key:?}"),
                ));
            }
            log::trace!("plist: key {key:?} replaces pending key {pending:?}");
        }
        dict.pending = Some(key);
        return Ok(());
    }

    match dict.pending.take() {
        Some(key) => {
            dict.entries.insert(key, item);
            Ok(())
        }
        None => Err(BuildError::rejected(
            Kind::Dict,
            format!("{kind:?} value without a key"),
        )),
    }
}

fn end_dict<'a>(
    options: &mut ParseOptions,
    repr: &mut Repr<Plist<'a>>,
    _: &Token<'a, Tag>,
) -> Result<(), BuildError> {
    let Repr::Custom(dict) = repr else {
        return Ok(());
    };
    let Some(pending) = dict.pending.take() else {
        return Ok(());
    };
    if options.key_policy == KeyPolicy::Reject {
        return Err(BuildError::rejected(
            Kind::Dict,
            format!("key {pending:?} has no value before the dict closes"),
        ));
    }
    log::trace!("plist: dropping key {pending:?} without a value");
    Ok(())
}

fn join_string<'a>(
    _: &mut ParseOptions,
    tree: &Tree<Plist<'a>>,
    id: NodeId,
) -> Result<Value, BuildError> {
    let mut joined = String::new();
    for item in tree.children(id).unwrap_or_default() {
        match item {
            Item::Value(Value::String(part)) => joined.push_str(part),
            other => {
                return Err(BuildError::rejected(
                    Kind::String,
                    format!("unexpected string part {other:?}"),
                ))
            }
        }
    }
    Ok(Value::String(joined))
}

fn eval_chars(_: &mut ParseOptions, token: &Token<'_, Tag>) -> Result<Value, BuildError> {
    Ok(Value::String(token.text.to_string()))
}

fn eval_escape(_: &mut ParseOptions, token: &Token<'_, Tag>) -> Result<Value, BuildError> {
    let decoded = match token.text {
        "''" => '\'',
        r"\n" => '\n',
        r"\r" => '\r',
        r"\t" => '\t',
        r"\b" => '\u{8}',
        r"\f" => '\u{c}',
        other => other
            .strip_prefix('\\')
            .and_then(|rest| rest.chars().next())
            .ok_or_else(|| BuildError::rejected(Kind::Escape, format!("unknown escape {other:?}")))?,
    };
    Ok(Value::String(decoded.to_string()))
}

fn eval_key(_: &mut ParseOptions, token: &Token<'_, Tag>) -> Result<Value, BuildError> {
    let Some(quoted) = token
        .text
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return Ok(Value::String(token.text.to_string()));
    };
    // A backslash takes the next character literally.
    let mut key = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => key.extend(chars.next()),
            c => key.push(c),
        }
    }
    Ok(Value::String(key))
}

fn eval_int(_: &mut ParseOptions, token: &Token<'_, Tag>) -> Result<Value, BuildError> {
    token
        .text
        .parse::<i64>()
        .map(Value::Integer)
        .map_err(|e| BuildError::rejected(Kind::Int, format!("{:?}: {e}", token.text)))
}

fn eval_hex_int(_: &mut ParseOptions, token: &Token<'_, Tag>) -> Result<Value, BuildError> {
    let text = token.text;
    let (sign, rest) = match text.as_bytes().first() {
        Some(b'-') => ("-", &text[1..]),
        Some(b'+') => ("", &text[1..]),
        _ => ("", text),
    };
    let digits = rest.strip_prefix("0x").unwrap_or(rest);
    i64::from_str_radix(&format!("{sign}{digits}"), 16)
        .map(Value::Integer)
        .map_err(|e| BuildError::rejected(Kind::HexInt, format!("{text:?}: {e}")))
}

fn eval_float(_: &mut ParseOptions, token: &Token<'_, Tag>) -> Result<Value, BuildError> {
    token
        .text
        .parse::<f64>()
        .map(Value::Real)
        .map_err(|e| BuildError::rejected(Kind::Float, format!("{:?}: {e}", token.text)))
}

fn eval_bool(_: &mut ParseOptions, token: &Token<'_, Tag>) -> Result<Value, BuildError> {
    match token.text {
        ":true" => Ok(Value::Boolean(true)),
        ":false" => Ok(Value::Boolean(false)),
        other => Err(BuildError::rejected(Kind::Bool, format!("{other:?} is not a boolean"))),
    }
}

/// Turn a child of the finished tree into a [`Value`].
pub fn resolve(tree: &Tree<Plist<'_>>, item: &Item<Plist<'_>>) -> Result<Value, PlistError> {
    match item {
        Item::Value(value) => Ok(value.clone()),
        Item::Token(token) if token.tag.kind == Kind::Date => {
            Ok(Value::Date(token.text.to_string()))
        }
        Item::Token(token) => Err(BuildError::rejected(
            token.tag.kind,
            format!("no value for token {:?}", token.text),
        )
        .into()),
        Item::Tree(id) => match tree.get(*id) {
            Some(Repr::Seq(items)) => items
                .iter()
                .map(|item| resolve(tree, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Some(Repr::Custom(dict)) => dict
                .entries
                .iter()
                .map(|(key, item)| Ok((key.clone(), resolve(tree, item)?)))
                .collect::<Result<IndexMap<_, _>, PlistError>>()
                .map(Value::Dict),
            Some(Repr::Node(node)) if node.kind == Some(Kind::Data) => Ok(Value::Data(
                node.content
                    .iter()
                    .filter_map(|item| match item {
                        Item::Token(token) => Some(token.text.to_string()),
                        _ => None,
                    })
                    .collect(),
            )),
            Some(Repr::Node(node)) => Err(BuildError::rejected(
                node.kind,
                "node has no value representation",
            )
            .into()),
            None => Err(BuildError::Rejected {
                kind: "tree".to_string(),
                message: format!("dangling node {id:?}"),
            }
            .into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::{Role, TreeBuilder};
    use crate::plist::kinds::classify;

    fn token(tag: Tag, text: &str) -> Token<'_, Tag> {
        Token {
            tag,
            text,
            span: 0..text.len(),
        }
    }

    fn builder<'a>(options: ParseOptions) -> TreeBuilder<Plist<'a>> {
        TreeBuilder::new(classify, handlers(), options)
    }

    #[test]
    fn test_escapes_decode() {
        let decode = |text: &str| {
            let escape = token(Tag::leaf(Kind::Escape), text);
            match eval_escape(&mut ParseOptions::default(), &escape) {
                Ok(Value::String(s)) => s,
                other => panic!("unexpected {other:?}"),
            }
        };
        assert_eq!(decode(r"\n"), "\n");
        assert_eq!(decode(r"\b"), "\u{8}");
        assert_eq!(decode(r"\f"), "\u{c}");
        assert_eq!(decode(r"\/"), "/");
        assert_eq!(decode(r#"\""#), "\"");
        assert_eq!(decode("''"), "'");
    }

    #[test]
    fn test_hex_ints_keep_their_sign() {
        let eval = |text: &str| {
            eval_hex_int(&mut ParseOptions::default(), &token(Tag::leaf(Kind::HexInt), text))
        };
        assert_eq!(eval("0x1F"), Ok(Value::Integer(31)));
        assert_eq!(eval("-0x10"), Ok(Value::Integer(-16)));
        assert_eq!(eval("+0xff"), Ok(Value::Integer(255)));
        assert_eq!(eval("-0x8000000000000000"), Ok(Value::Integer(i64::MIN)));
        assert!(eval("0x8000000000000000").is_err());
    }

    #[test]
    fn test_int_overflow_is_rejected() {
        let result = eval_int(
            &mut ParseOptions::default(),
            &token(Tag::leaf(Kind::Int), "99999999999999999999"),
        );
        assert!(matches!(result, Err(BuildError::Rejected { .. })));
    }

    #[test]
    fn test_quoted_keys_are_unquoted() {
        let options = &mut ParseOptions::default();
        assert_eq!(
            eval_key(options, &token(Tag::leaf(Kind::Key), "\"a b\"")),
            Ok(Value::from("a b"))
        );
        assert_eq!(
            eval_key(options, &token(Tag::leaf(Kind::Key), "plain")),
            Ok(Value::from("plain"))
        );
    }

    #[test]
    fn test_quoted_keys_unescape() {
        let options = &mut ParseOptions::default();
        assert_eq!(
            eval_key(options, &token(Tag::leaf(Kind::Key), r#""a\"b\\c""#)),
            Ok(Value::from(r#"a"b\c"#))
        );
        assert_eq!(
            eval_key(options, &token(Tag::leaf(Kind::Key), r#""""#)),
            Ok(Value::from(""))
        );
    }

    #[test]
    fn test_dangling_key_is_overwritten_by_default() {
        let mut builder = builder(ParseOptions::default());
        for t in [
            token(Tag::start(Kind::Dict), "{"),
            token(Tag::leaf(Kind::Key), "a"),
            token(Tag::leaf(Kind::Key), "b"),
            token(Tag::leaf(Kind::Int), "1"),
            token(Tag::end(Kind::Dict), "}"),
        ] {
            builder.write(t).expect("token accepted");
        }
        let tree = builder.finish().expect("tree closes");
        let value = resolve(&tree, &tree.root().content[0]).expect("value resolves");
        assert_eq!(value.get("b"), Some(&Value::Integer(1)));
        assert_eq!(value.get("a"), None);
    }

    #[test]
    fn test_dangling_key_can_be_rejected() {
        let options = ParseOptions {
            key_policy: KeyPolicy::Reject,
            ..ParseOptions::default()
        };
        let mut builder = builder(options);
        builder.write(token(Tag::start(Kind::Dict), "{")).expect("start accepted");
        builder.write(token(Tag::leaf(Kind::Key), "a")).expect("first key accepted");
        let error = builder
            .write(token(Tag::leaf(Kind::Key), "b"))
            .expect_err("second key rejected");
        insta::assert_snapshot!(error.to_string(), @r#"Dict: key "a" has no value before key "b""#);
    }

    #[test]
    fn test_key_left_open_at_close_can_be_rejected() {
        let feed = |policy| {
            let mut builder = builder(ParseOptions {
                key_policy: policy,
                ..ParseOptions::default()
            });
            for t in [token(Tag::start(Kind::Dict), "{"), token(Tag::leaf(Kind::Key), "a")] {
                builder.write(t).expect("token accepted");
            }
            builder.write(token(Tag::end(Kind::Dict), "}"))
        };
        assert_eq!(feed(KeyPolicy::Overwrite), Ok(()));
        let error = feed(KeyPolicy::Reject).expect_err("dangling key rejected");
        insta::assert_snapshot!(error.to_string(), @r#"Dict: key "a" has no value before the dict closes"#);
    }

    #[test]
    fn test_value_without_key_is_rejected() {
        let mut builder = builder(ParseOptions::default());
        builder.write(token(Tag::start(Kind::Dict), "{")).expect("start accepted");
        let error = builder
            .write(token(Tag::leaf(Kind::Int), "1"))
            .expect_err("value rejected");
        assert_eq!(error, BuildError::rejected(Kind::Dict, "Int value without a key"));
    }

    #[test]
    fn test_string_joins_its_parts() {
        let mut builder = builder(ParseOptions::default());
        for t in [
            token(Tag::start(Kind::String), "\""),
            token(Tag::leaf(Kind::Chars), "a"),
            token(Tag::leaf(Kind::Escape), r"\t"),
            token(Tag::leaf(Kind::Chars), "b"),
            token(Tag::end(Kind::String), "\""),
        ] {
            builder.write(t).expect("token accepted");
        }
        let tree = builder.finish().expect("tree closes");
        assert_eq!(tree.root().content, vec![Item::Value(Value::from("a\tb"))]);
        assert_eq!(classify(&token(Tag::leaf(Kind::Chars), "x")), (Role::Leaf, Kind::Chars));
    }
}
