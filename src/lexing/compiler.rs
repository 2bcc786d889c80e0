//! Rule table compiler
//!
//! Every state of a [`RuleTable`] compiles into one regular expression: the
//! alternation of the state's rule patterns, each wrapped in its own capture group,
//! in declaration order. Next to it sits a parallel list of [`Edge`]s, one per
//! alternative, holding the rule's emit and goto. After a match, the one wrapping
//! group that participated identifies the edge to follow.
//!
//! User patterns may contain capture groups of their own. The compiler counts them
//! per rule and records the index of each wrapping group, so edge lookup never
//! confuses an inner group with an alternative.
//!
//! Matching runs an anchored search that starts at the current offset, so a failing
//! step never looks past it.
//!
//! Compiled grammars are immutable. One grammar can back any number of scans, each
//! with its own [`Context`](super::scanner::Context).

use super::error::CompileError;
use super::rules::{Emit, Goto, Rule, RuleTable, Symbol};
use super::scanner::{Context, Tokens};
use regex_automata::meta::{self, Regex};
use regex_automata::util::syntax;
use regex_automata::{Anchored, Input};
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

/// Emit and goto of one compiled alternative.
pub struct Edge<T, X> {
    /// Index of the capture group wrapping this alternative.
    group: usize,
    pub(crate) emit: Emit<T, X>,
    pub(crate) goto: Goto<X>,
}

impl<T, X> Edge<T, X> {
    pub fn group(&self) -> usize {
        self.group
    }
}

/// One compiled scanner state.
pub struct CompiledState<T, X> {
    name: Symbol,
    /// The combined alternation and its compiled form. `None` for states without
    /// rules; those never match.
    regex: Option<(String, Regex)>,
    edges: Vec<Edge<T, X>>,
}

impl<T, X> CompiledState<T, X> {
    fn compile(name: Symbol, rules: Vec<Rule<T, X>>) -> Result<Self, CompileError> {
        let mut alternatives = Vec::with_capacity(rules.len());
        let mut edges = Vec::with_capacity(rules.len());
        let mut group = 1;

        for (index, rule) in rules.into_iter().enumerate() {
            let pattern = rule.pattern_or_zero_width().to_string();
            let inner_groups = build(&pattern)
                .map_err(|source| CompileError::Pattern {
                    state: name,
                    index,
                    source,
                })?
                .captures_len()
                - 1;

            alternatives.push(format!("({pattern})"));
            edges.push(Edge {
                group,
                emit: rule.emit,
                goto: rule.goto,
            });
            group += 1 + inner_groups;
        }

        let regex = if alternatives.is_empty() {
            None
        } else {
            let combined = alternatives.join("|");
            let compiled = build(&combined).map_err(|source| CompileError::Pattern {
                state: name,
                index: 0,
                source,
            })?;
            Some((combined, compiled))
        };

        Ok(CompiledState { name, regex, edges })
    }

    pub fn name(&self) -> Symbol {
        self.name
    }

    /// The combined alternation, if the state has any rules.
    pub fn pattern(&self) -> Option<&str> {
        self.regex.as_ref().map(|(pattern, _)| pattern.as_str())
    }

    pub fn edges(&self) -> &[Edge<T, X>] {
        &self.edges
    }

    /// Match this state's alternation starting exactly at `position`.
    ///
    /// Returns the edge of the first declared alternative that matches there, with
    /// the byte range it matched.
    pub fn match_at(&self, input: &str, position: usize) -> Option<(&Edge<T, X>, Range<usize>)> {
        let (_, regex) = self.regex.as_ref()?;
        let search = Input::new(input)
            .range(position..)
            .anchored(Anchored::Yes);
        let mut captures = regex.create_captures();
        regex.search_captures(&search, &mut captures);
        let whole = captures.get_match()?;
        self.edges
            .iter()
            .find(|edge| captures.get_group(edge.group).is_some())
            .map(|edge| (edge, whole.range()))
    }
}

impl<T, X> fmt::Debug for CompiledState<T, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledState")
            .field("name", &self.name)
            .field("pattern", &self.pattern())
            .field("edges", &self.edges.len())
            .finish()
    }
}

fn build(pattern: &str) -> Result<Regex, meta::BuildError> {
    Regex::builder()
        .syntax(syntax::Config::new().dot_matches_new_line(true))
        .build(pattern)
}

/// A compiled rule table.
pub struct CompiledGrammar<T, X> {
    states: HashMap<Symbol, CompiledState<T, X>>,
}

impl<T, X> CompiledGrammar<T, X> {
    pub fn state(&self, symbol: Symbol) -> Option<&CompiledState<T, X>> {
        self.states.get(symbol)
    }

    pub fn has_state(&self, symbol: Symbol) -> bool {
        self.states.contains_key(symbol)
    }

    /// Names of all declared states, sorted.
    pub fn state_names(&self) -> Vec<Symbol> {
        let mut names: Vec<_> = self.states.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Start a scan of `input` at byte offset `position` in state `start`.
    ///
    /// `ext` seeds the grammar-specific part of the run context. `position` must lie
    /// on a character boundary.
    pub fn run<'g, 'a>(
        &'g self,
        input: &'a str,
        position: usize,
        start: Symbol,
        ext: X,
    ) -> Tokens<'g, 'a, T, X> {
        Tokens::new(self, Context::new(input, position, start, ext))
    }
}

impl<T, X> fmt::Debug for CompiledGrammar<T, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledGrammar")
            .field("states", &self.state_names())
            .finish()
    }
}

/// Compile every state of `table`.
///
/// When a state name is declared twice, the later declaration wins.
pub fn compile<T, X>(table: RuleTable<T, X>) -> Result<CompiledGrammar<T, X>, CompileError> {
    let mut states = HashMap::with_capacity(table.len());
    for (name, rules) in table {
        states.insert(name, CompiledState::compile(name, rules)?);
    }
    log::debug!("lexer: compiled {} states", states.len());
    Ok(CompiledGrammar { states })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tag {
        Keyword,
        Ident,
        Number,
        Other,
    }

    fn state(rules: Vec<Rule<Tag, ()>>) -> CompiledState<Tag, ()> {
        CompiledState::compile("main", rules).expect("state compiles")
    }

    fn tag_at(state: &CompiledState<Tag, ()>, input: &str, position: usize) -> Option<Tag> {
        let mut cx = Context::new(input, position, "main", ());
        state
            .match_at(input, position)
            .map(|(edge, range)| edge.emit.apply(&mut cx, "main", &input[range]))
    }

    #[test]
    fn test_first_declared_alternative_wins() {
        let state = state(vec![
            Rule::new("let", Tag::Keyword),
            Rule::new("[a-z]+", Tag::Ident),
        ]);
        assert_eq!(tag_at(&state, "let", 0), Some(Tag::Keyword));

        let state_reversed = self::state(vec![
            Rule::new("[a-z]+", Tag::Ident),
            Rule::new("let", Tag::Keyword),
        ]);
        assert_eq!(tag_at(&state_reversed, "let", 0), Some(Tag::Ident));
    }

    #[test]
    fn test_fallback_fires_only_when_nothing_else_matches() {
        let state = state(vec![
            Rule::new("[0-9]+", Tag::Number),
            Rule::fallback(Tag::Other),
        ]);
        assert_eq!(tag_at(&state, "42", 0), Some(Tag::Number));
        assert_eq!(tag_at(&state, "x", 0), Some(Tag::Other));
        assert_eq!(state.match_at("x", 0).map(|(_, r)| r), Some(0..0));
    }

    #[test]
    fn test_match_must_start_at_position() {
        let state = state(vec![Rule::new("[0-9]+", Tag::Number)]);
        assert!(state.match_at("ab12", 0).is_none());
        assert_eq!(state.match_at("ab12", 2).map(|(_, r)| r), Some(2..4));
    }

    #[test]
    fn test_inner_groups_do_not_shift_edges() {
        let state = state(vec![
            Rule::new("(a)(b)?c", Tag::Keyword),
            Rule::new("(?:x)(y)", Tag::Ident),
            Rule::new("z", Tag::Number),
        ]);
        let groups: Vec<_> = state.edges().iter().map(Edge::group).collect();
        assert_eq!(groups, vec![1, 4, 6]);

        assert_eq!(tag_at(&state, "ac", 0), Some(Tag::Keyword));
        assert_eq!(tag_at(&state, "xy", 0), Some(Tag::Ident));
        assert_eq!(tag_at(&state, "z", 0), Some(Tag::Number));
    }

    #[test]
    fn test_match_keeps_left_context() {
        let state = state(vec![Rule::new(r"\bx", Tag::Ident), Rule::new("x", Tag::Other)]);
        assert_eq!(tag_at(&state, "ax", 1), Some(Tag::Other));
        assert_eq!(tag_at(&state, " x", 1), Some(Tag::Ident));
    }

    #[test]
    fn test_failed_match_does_not_find_later_text() {
        let state = state(vec![Rule::new("[0-9]+", Tag::Number)]);
        let input = format!("{}1", "a".repeat(1000));
        assert!(state.match_at(&input, 0).is_none());
        assert!(state.match_at(&input, 999).is_none());
        assert_eq!(state.match_at(&input, 1000).map(|(_, r)| r), Some(1000..1001));
    }

    #[test]
    fn test_dot_matches_newline() {
        let state = state(vec![Rule::new("/[*].*?[*]/", Tag::Other)]);
        assert_eq!(state.match_at("/* a\nb */", 0).map(|(_, r)| r), Some(0..9));
    }

    #[test]
    fn test_state_without_rules_never_matches() {
        let state = state(vec![]);
        assert!(state.pattern().is_none());
        assert!(state.match_at("", 0).is_none());
    }

    #[test]
    fn test_invalid_pattern_names_state_and_rule() {
        let table: RuleTable<Tag, ()> = vec![(
            "main",
            vec![Rule::new("a", Tag::Other), Rule::new("(", Tag::Other)],
        )];
        match compile(table) {
            Err(CompileError::Pattern { state, index, .. }) => {
                assert_eq!(state, "main");
                assert_eq!(index, 1);
            }
            Ok(_) => panic!("expected a compile error"),
        }
    }

    #[test]
    fn test_grammar_lists_states() {
        let table: RuleTable<Tag, ()> = vec![
            ("main", vec![Rule::new("a", Tag::Other)]),
            ("after", vec![]),
        ];
        let grammar = compile(table).expect("grammar compiles");
        assert_eq!(grammar.state_names(), vec!["after", "main"]);
        assert!(grammar.has_state("after"));
        assert!(!grammar.has_state("missing"));
    }
}
