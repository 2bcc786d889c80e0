//! Scanner runtime
//!
//! Drives a [`CompiledGrammar`] over an input string. The scanner is a pull-based
//! iterator: every call to `next` performs exactly one step (one anchored match in the
//! current state) and returns the token that step emitted. Nothing is buffered and
//! nothing is re-scanned.
//!
//! All callbacks of one scan share a single [`Context`]. The scanner writes the new
//! state and position into it after every step, so a callback always observes where
//! the scan currently is. Grammars keep their own bookkeeping (nesting stacks, line
//! counters, ...) in the context's `ext` field.

use super::compiler::CompiledGrammar;
use super::error::ScanError;
use super::rules::Symbol;
use std::iter::FusedIterator;
use std::ops::Range;

/// Default number of characters quoted in [`ScanError::NoMatch`].
pub const DEFAULT_EXCERPT_LEN: usize = 80;

/// Mutable state shared by every callback during one scan.
#[derive(Debug, Clone)]
pub struct Context<'a, X> {
    pub input: &'a str,
    pub position: usize,
    pub symbol: Symbol,
    /// Grammar-specific fields.
    pub ext: X,
}

impl<'a, X> Context<'a, X> {
    pub fn new(input: &'a str, position: usize, symbol: Symbol, ext: X) -> Self {
        Context {
            input,
            position,
            symbol,
            ext,
        }
    }
}

/// A token emitted by one scanner step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a, T> {
    pub tag: T,
    /// The text matched by the rule that emitted this token.
    pub text: &'a str,
    /// Byte range of `text` within the input.
    pub span: Range<usize>,
}

/// Lazily produced token stream of one scan.
pub struct Tokens<'g, 'a, T, X> {
    grammar: &'g CompiledGrammar<T, X>,
    context: Context<'a, X>,
    excerpt_len: usize,
    done: bool,
}

impl<'g, 'a, T, X> Tokens<'g, 'a, T, X> {
    pub(crate) fn new(grammar: &'g CompiledGrammar<T, X>, context: Context<'a, X>) -> Self {
        Tokens {
            grammar,
            context,
            excerpt_len: DEFAULT_EXCERPT_LEN,
            done: false,
        }
    }

    /// Quote up to `len` characters of upcoming input in scan errors.
    pub fn with_excerpt_len(mut self, len: usize) -> Self {
        self.excerpt_len = len;
        self
    }

    /// The run context, as left by the most recent step.
    pub fn context(&self) -> &Context<'a, X> {
        &self.context
    }

    /// Consume the stream and hand back the run context.
    pub fn into_context(self) -> Context<'a, X> {
        self.context
    }

    fn excerpt(&self) -> String {
        self.context.input[self.context.position..]
            .chars()
            .take(self.excerpt_len)
            .collect()
    }
}

impl<'g, 'a, T: Clone, X> Tokens<'g, 'a, T, X> {
    fn step(&mut self) -> Option<Result<Token<'a, T>, ScanError>> {
        let grammar = self.grammar;
        let input = self.context.input;
        let position = self.context.position;
        let symbol = self.context.symbol;

        let Some(state) = grammar.state(symbol) else {
            return Some(Err(ScanError::UnknownState { state: symbol }));
        };

        let Some((edge, span)) = state.match_at(input, position) else {
            if position == input.len() {
                return None;
            }
            return Some(Err(ScanError::NoMatch {
                position,
                state: symbol,
                excerpt: self.excerpt(),
            }));
        };

        let text = &input[span.clone()];
        log::trace!("lexer: {symbol}@{position} matched {text:?}");

        let tag = edge.emit.apply(&mut self.context, symbol, text);
        let next = edge.goto.apply(&mut self.context, symbol, text);
        self.context.symbol = next;
        self.context.position = span.end;

        Some(Ok(Token { tag, text, span }))
    }
}

impl<'g, 'a, T: Clone, X> Iterator for Tokens<'g, 'a, T, X> {
    type Item = Result<Token<'a, T>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.context.position > self.context.input.len() {
            return None;
        }
        let item = self.step();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

impl<'g, 'a, T: Clone, X> FusedIterator for Tokens<'g, 'a, T, X> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexing::compiler::compile;
    use crate::lexing::rules::{Goto, Rule, RuleTable};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tag {
        Word,
        Space,
        Close,
    }

    fn grammar() -> CompiledGrammar<Tag, usize> {
        let table: RuleTable<Tag, usize> = vec![
            (
                "main",
                vec![
                    Rule::new("[a-z]+", Tag::Word),
                    Rule::new(" +", Tag::Space),
                    Rule::new(r"\.", Tag::Close).then_with(Goto::<usize>::with(|cx, _, _| {
                        cx.ext += 1;
                        "done"
                    })),
                ],
            ),
            ("done", vec![Rule::new(" +", Tag::Space)]),
        ];
        compile(table).expect("grammar compiles")
    }

    #[test]
    fn test_tokens_carry_text_and_span() {
        let grammar = grammar();
        let tokens: Vec<_> = grammar
            .run("ab cd.", 0, "main", 0)
            .collect::<Result<_, _>>()
            .expect("input scans");

        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].tag, Tag::Word);
        assert_eq!(tokens[0].text, "ab");
        assert_eq!(tokens[0].span, 0..2);
        assert_eq!(tokens[2].text, "cd");
        assert_eq!(tokens[3].tag, Tag::Close);
        assert_eq!(tokens[3].span, 5..6);
    }

    #[test]
    fn test_context_follows_each_step() {
        let grammar = grammar();
        let mut tokens = grammar.run("ab.", 0, "main", 0);

        assert!(tokens.next().is_some());
        assert_eq!(tokens.context().position, 2);
        assert_eq!(tokens.context().symbol, "main");

        assert!(tokens.next().is_some());
        assert_eq!(tokens.context().position, 3);
        assert_eq!(tokens.context().symbol, "done");
        assert_eq!(tokens.context().ext, 1);

        assert!(tokens.next().is_none());
    }

    #[test]
    fn test_no_match_reports_position_state_and_excerpt() {
        let grammar = grammar();
        let result: Result<Vec<_>, _> = grammar.run("ab. x", 0, "main", 0).collect();

        assert_eq!(
            result.unwrap_err(),
            ScanError::NoMatch {
                position: 4,
                state: "done",
                excerpt: "x".to_string(),
            }
        );
    }

    #[test]
    fn test_excerpt_is_bounded_by_characters() {
        let grammar = grammar();
        let err = grammar
            .run("1äöü", 0, "main", 0)
            .with_excerpt_len(2)
            .find_map(Result::err)
            .expect("scan fails");

        assert_eq!(
            err,
            ScanError::NoMatch {
                position: 0,
                state: "main",
                excerpt: "1ä".to_string(),
            }
        );
    }

    #[test]
    fn test_stream_is_fused_after_error() {
        let grammar = grammar();
        let mut tokens = grammar.run("!", 0, "main", 0);
        assert!(matches!(tokens.next(), Some(Err(_))));
        assert!(tokens.next().is_none());
    }

    #[test]
    fn test_unknown_state_is_a_configuration_error() {
        let grammar = grammar();
        let err = grammar
            .run("ab", 0, "nowhere", 0)
            .find_map(Result::err)
            .expect("scan fails");

        assert!(err.is_configuration());
        assert_eq!(err, ScanError::UnknownState { state: "nowhere" });
    }

    #[test]
    fn test_scan_can_start_mid_input() {
        let grammar = grammar();
        let tokens: Vec<_> = grammar
            .run("xx cd", 3, "main", 0)
            .collect::<Result<_, _>>()
            .expect("input scans");

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].span, 3..5);
    }
}
