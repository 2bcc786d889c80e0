//! Declarative rule tables
//!
//! A rule table maps state names to ordered lists of [`Rule`]s. Each rule is one
//! alternative of its state: an optional pattern, what to emit when it matches, and
//! which state to continue in. Alternatives are tried in declaration order and the
//! first one that matches at the current offset wins, so fallback rules without a
//! pattern (zero-width) belong at the end of their state.

use super::scanner::Context;
use std::fmt;
use std::sync::Arc;

/// Name of a scanner state.
pub type Symbol = &'static str;

/// Pattern used for rules that declare none. It matches the empty string.
pub const ZERO_WIDTH: &str = "";

/// Callback signature shared by computed emits and gotos.
///
/// Callbacks receive the run context, the name of the state the match happened in,
/// and the matched text.
pub type Callback<R, X> = Arc<dyn Fn(&mut Context<'_, X>, Symbol, &str) -> R + Send + Sync>;

/// What a rule emits when it matches.
pub enum Emit<T, X> {
    /// Always emit this tag.
    Const(T),
    /// Compute the tag from the run context and the matched text.
    Func(Callback<T, X>),
}

impl<T, X> Emit<T, X> {
    /// Wrap a callback as a computed emit.
    pub fn with<F>(f: F) -> Self
    where
        F: Fn(&mut Context<'_, X>, Symbol, &str) -> T + Send + Sync + 'static,
    {
        Emit::Func(Arc::new(f))
    }
}

impl<T: Clone, X> Emit<T, X> {
    pub(crate) fn apply(&self, cx: &mut Context<'_, X>, symbol: Symbol, text: &str) -> T {
        match self {
            Emit::Const(tag) => tag.clone(),
            Emit::Func(f) => f(cx, symbol, text),
        }
    }
}

impl<T, X> From<T> for Emit<T, X> {
    fn from(tag: T) -> Self {
        Emit::Const(tag)
    }
}

impl<T: Clone, X> Clone for Emit<T, X> {
    fn clone(&self) -> Self {
        match self {
            Emit::Const(tag) => Emit::Const(tag.clone()),
            Emit::Func(f) => Emit::Func(Arc::clone(f)),
        }
    }
}

impl<T: fmt::Debug, X> fmt::Debug for Emit<T, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Emit::Const(tag) => f.debug_tuple("Const").field(tag).finish(),
            Emit::Func(_) => f.write_str("Func(..)"),
        }
    }
}

/// Which state the scanner continues in after a rule matched.
pub enum Goto<X> {
    /// Remain in the state the match happened in.
    Stay,
    /// Always continue in the named state.
    Const(Symbol),
    /// Compute the next state from the run context and the matched text.
    Func(Callback<Symbol, X>),
}

impl<X> Goto<X> {
    /// Wrap a callback as a computed goto.
    pub fn with<F>(f: F) -> Self
    where
        F: Fn(&mut Context<'_, X>, Symbol, &str) -> Symbol + Send + Sync + 'static,
    {
        Goto::Func(Arc::new(f))
    }

    pub(crate) fn apply(&self, cx: &mut Context<'_, X>, symbol: Symbol, text: &str) -> Symbol {
        match self {
            Goto::Stay => symbol,
            Goto::Const(next) => *next,
            Goto::Func(f) => f(cx, symbol, text),
        }
    }
}

impl<X> Default for Goto<X> {
    fn default() -> Self {
        Goto::Stay
    }
}

impl<X> Clone for Goto<X> {
    fn clone(&self) -> Self {
        match self {
            Goto::Stay => Goto::Stay,
            Goto::Const(next) => Goto::Const(*next),
            Goto::Func(f) => Goto::Func(Arc::clone(f)),
        }
    }
}

impl<X> fmt::Debug for Goto<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Goto::Stay => f.write_str("Stay"),
            Goto::Const(next) => f.debug_tuple("Const").field(next).finish(),
            Goto::Func(_) => f.write_str("Func(..)"),
        }
    }
}

/// One alternative of a scanner state.
pub struct Rule<T, X> {
    pub pattern: Option<String>,
    pub emit: Emit<T, X>,
    pub goto: Goto<X>,
}

impl<T, X> Rule<T, X> {
    /// A rule matching `pattern` that stays in its state.
    pub fn new(pattern: impl Into<String>, emit: impl Into<Emit<T, X>>) -> Self {
        Rule {
            pattern: Some(pattern.into()),
            emit: emit.into(),
            goto: Goto::Stay,
        }
    }

    /// A zero-width rule. It always matches, so it only fires when every
    /// alternative declared before it fails.
    pub fn fallback(emit: impl Into<Emit<T, X>>) -> Self {
        Rule {
            pattern: None,
            emit: emit.into(),
            goto: Goto::Stay,
        }
    }

    /// Continue in the named state after this rule matches.
    pub fn then(mut self, next: Symbol) -> Self {
        self.goto = Goto::Const(next);
        self
    }

    /// Continue in the state computed by `goto` after this rule matches.
    pub fn then_with(mut self, goto: Goto<X>) -> Self {
        self.goto = goto;
        self
    }

    pub(crate) fn pattern_or_zero_width(&self) -> &str {
        self.pattern.as_deref().unwrap_or(ZERO_WIDTH)
    }
}

impl<T: Clone, X> Clone for Rule<T, X> {
    fn clone(&self) -> Self {
        Rule {
            pattern: self.pattern.clone(),
            emit: self.emit.clone(),
            goto: self.goto.clone(),
        }
    }
}

impl<T: fmt::Debug, X> fmt::Debug for Rule<T, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("pattern", &self.pattern)
            .field("emit", &self.emit)
            .field("goto", &self.goto)
            .finish()
    }
}

/// Ordered mapping from state name to the state's rules.
pub type RuleTable<T, X> = Vec<(Symbol, Vec<Rule<T, X>>)>;
