//! Property-based tests for the property-list parser
//!
//! Values are generated, rendered to text, and parsed back. Dates and data blocks are
//! left out since they are not decoded.

use indexmap::IndexMap;
use parsetools::plist::{self, Value};
use proptest::prelude::*;

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Integer),
        (prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL | prop::num::f64::ZERO)
            .prop_map(Value::Real),
        any::<bool>().prop_map(Value::Boolean),
        any::<String>().prop_map(Value::String),
        "[a-z]{0,6}".prop_map(Value::String),
    ]
}

fn key() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z_$][a-zA-Z0-9_$+.\\-]{0,8}",
        "(?s).{0,8}",
        "[a-z\"\\\\]{1,6}",
    ]
}

fn value() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec((key(), inner), 0..6)
                .prop_map(|entries| Value::Dict(entries.into_iter().collect::<IndexMap<_, _>>())),
        ]
    })
}

proptest! {
    #[test]
    fn test_single_line_rendering_round_trips(value in value()) {
        let text = value.to_string();
        prop_assert_eq!(plist::parse(&text), Ok(value), "rendered as {}", text);
    }

    #[test]
    fn test_indented_rendering_round_trips(value in value()) {
        let text = value.to_plist_string();
        prop_assert_eq!(plist::parse(&text), Ok(value), "rendered as {}", text);
    }

    #[test]
    fn test_token_spans_cover_accepted_input(value in value()) {
        let text = value.to_plist_string();
        let tokens = plist::tokens(&text)
            .collect::<Result<Vec<_>, _>>()
            .expect("rendered text scans");

        let mut next = 0;
        for token in &tokens {
            prop_assert_eq!(token.span.start, next);
            prop_assert_eq!(&text[token.span.clone()], token.text);
            next = token.span.end;
        }
        prop_assert_eq!(next, text.len());
    }

    #[test]
    fn test_trailing_comma_is_equivalent(items in prop::collection::vec(any::<i64>(), 1..8)) {
        let list = items.iter().map(i64::to_string).collect::<Vec<_>>().join(",");
        let with = plist::parse(&format!("({list},)"));
        let without = plist::parse(&format!("({list})"));
        prop_assert_eq!(&with, &without);
        prop_assert_eq!(
            without,
            Ok(Value::Array(items.into_iter().map(Value::Integer).collect()))
        );
    }

    #[test]
    fn test_doubled_comma_is_rejected(items in prop::collection::vec(any::<i64>(), 2..8), at in 1usize..7) {
        let at = at.min(items.len() - 1);
        let mut parts: Vec<String> = items.iter().map(i64::to_string).collect();
        parts.insert(at, String::new());
        let text = format!("({})", parts.join(","));
        prop_assert!(plist::parse(&text).is_err(), "accepted {}", text);
    }

    #[test]
    fn test_arbitrary_input_never_panics(text in any::<String>()) {
        let _ = plist::parse(&text);
    }
}
