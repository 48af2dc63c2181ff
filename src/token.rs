//! The token model shared by every stage: lexer output, filter input and
//! output, and what the consumer finally renders.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Canonical token classification.
///
/// This is a closed set. Lexer definitions refer to these by their lowercase
/// names (`"punctuation"`, `"whitespace"`, ...).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Input no rule could match.
    Error,
    #[default]
    Text,
    Whitespace,
    Comment,
    Entity,
    Attribute,
    String,
    Number,
    Constant,
    Operator,
    Assignment,
    Punctuation,
}

impl TokenType {
    /// Every variant, in declaration order.
    pub const ALL: [Self; 12] = [
        Self::Error,
        Self::Text,
        Self::Whitespace,
        Self::Comment,
        Self::Entity,
        Self::Attribute,
        Self::String,
        Self::Number,
        Self::Constant,
        Self::Operator,
        Self::Assignment,
        Self::Punctuation,
    ];

    /// Lowercase name, as used in lexer definitions and config files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Text => "text",
            Self::Whitespace => "whitespace",
            Self::Comment => "comment",
            Self::Entity => "entity",
            Self::Attribute => "attribute",
            Self::String => "string",
            Self::Number => "number",
            Self::Constant => "constant",
            Self::Operator => "operator",
            Self::Assignment => "assignment",
            Self::Punctuation => "punctuation",
        }
    }

    /// Parse a type name, case-insensitive.
    ///
    /// Accepts `separator` (used by older lexer tables) as [`Punctuation`](Self::Punctuation).
    /// Returns `None` for unrecognized strings.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "error" | "err" => Some(Self::Error),
            "text" => Some(Self::Text),
            "whitespace" | "ws" => Some(Self::Whitespace),
            "comment" => Some(Self::Comment),
            "entity" => Some(Self::Entity),
            "attribute" | "attr" => Some(Self::Attribute),
            "string" | "str" => Some(Self::String),
            "number" | "num" => Some(Self::Number),
            "constant" | "const" => Some(Self::Constant),
            "operator" | "op" => Some(Self::Operator),
            "assignment" => Some(Self::Assignment),
            "punctuation" | "separator" => Some(Self::Punctuation),
            _ => None,
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified span of input text.
///
/// `state` names the lexer state that was active when the token was produced.
/// Tokens synthesized by filters carry the state of the token that caused
/// them, or an empty name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub kind: TokenType,
    pub state: Arc<str>,
}

impl Token {
    /// A token with no originating state.
    pub fn new(kind: TokenType, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind,
            state: Arc::from(""),
        }
    }

    /// Replace the originating state name.
    #[must_use]
    pub fn in_state(mut self, state: Arc<str>) -> Self {
        self.state = state;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}
