//! Token kinds of the property-list grammar
//!
//! Every token the grammar emits is tagged with a [`Tag`]: the role it plays for
//! the tree builder paired with its semantic [`Kind`]. Classification is therefore a
//! plain field read.

use crate::building::Role;
use crate::lexing::Token;

/// Semantic kind of a property-list token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Array,
    Dict,
    Data,
    Chars,
    String,
    Key,
    Comment,
    HexInt,
    Int,
    Float,
    Bool,
    Date,
    Escape,
    Equals,
    Separator,
    Space,
    Newline,
}

/// Role and kind of an emitted token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    pub role: Role,
    pub kind: Kind,
}

impl Tag {
    pub const fn start(kind: Kind) -> Self {
        Tag {
            role: Role::Start,
            kind,
        }
    }

    pub const fn end(kind: Kind) -> Self {
        Tag {
            role: Role::End,
            kind,
        }
    }

    pub const fn skip(kind: Kind) -> Self {
        Tag {
            role: Role::Skip,
            kind,
        }
    }

    pub const fn leaf(kind: Kind) -> Self {
        Tag {
            role: Role::Leaf,
            kind,
        }
    }
}

/// Classification function handed to the tree builder.
pub fn classify(token: &Token<'_, Tag>) -> (Role, Kind) {
    (token.tag.role, token.tag.kind)
}
