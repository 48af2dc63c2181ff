//! Rules: the declarative form lexer definitions are written in, and the
//! compiled form the lexer driver executes.
//!
//! A rule is either a pattern (a regular expression plus the token types its
//! match decomposes into) or an include that delegates to another state.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::state::StateId;
use crate::token::TokenType;

/// Transition keyword that pops the current state.
pub const POP: &str = "#pop";

/// One rule as written in a lexer definition.
///
/// In TOML or JSON a rule is either `{ include = "state" }` or a table with a
/// `pattern` key; see [`PatternSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleSpec {
    Include(IncludeSpec),
    Pattern(PatternSpec),
}

impl RuleSpec {
    /// A rule delegating to the named state.
    pub fn include(state: impl Into<String>) -> Self {
        Self::Include(IncludeSpec {
            include: state.into(),
        })
    }
}

impl From<PatternSpec> for RuleSpec {
    fn from(spec: PatternSpec) -> Self {
        Self::Pattern(spec)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IncludeSpec {
    pub include: String,
}

/// A pattern rule as written in a lexer definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternSpec {
    /// Regular expression, matched against the unconsumed input.
    pub pattern: String,
    /// Type of the whole match, or of the text around captured groups.
    #[serde(rename = "type", default)]
    pub kind: TokenType,
    /// One type per capture group, in group order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_types: Option<Vec<TokenType>>,
    /// Transition expression: space-separated `#pop` or state names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// Append to the previous token when it has the same type.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub extend: bool,
}

impl PatternSpec {
    pub fn new(pattern: impl Into<String>, kind: TokenType) -> Self {
        Self {
            pattern: pattern.into(),
            kind,
            sub_types: None,
            next: None,
            extend: false,
        }
    }

    /// A pattern whose capture groups are typed individually. Text outside
    /// the groups is typed [`TokenType::Text`] unless changed with [`Self::kind`].
    pub fn groups(pattern: impl Into<String>, sub_types: &[TokenType]) -> Self {
        Self {
            sub_types: Some(sub_types.to_vec()),
            ..Self::new(pattern, TokenType::Text)
        }
    }

    #[must_use]
    pub fn kind(mut self, kind: TokenType) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn next(mut self, expression: impl Into<String>) -> Self {
        self.next = Some(expression.into());
        self
    }

    #[must_use]
    pub fn extend(mut self) -> Self {
        self.extend = true;
        self
    }
}

/// One step of a compiled transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Pop,
    Push(StateId),
}

/// Parse a transition expression such as `"#pop #pop"` or `"tag"`.
///
/// `resolve` maps state names to ids; the first name it cannot resolve is
/// returned as the error.
pub fn parse_transition<'e>(
    expression: &'e str,
    resolve: impl Fn(&str) -> Option<StateId>,
) -> Result<Vec<Transition>, &'e str> {
    expression
        .split_whitespace()
        .map(|step| match step {
            POP => Ok(Transition::Pop),
            name => resolve(name).map(Transition::Push).ok_or(name),
        })
        .collect()
}

/// A compiled pattern rule.
#[derive(Debug, Clone)]
pub struct PatternRule {
    regex: Regex,
    kind: TokenType,
    sub_types: Option<Vec<TokenType>>,
    transitions: Vec<Transition>,
    extend: bool,
}

impl PatternRule {
    pub(crate) fn new(
        regex: Regex,
        kind: TokenType,
        sub_types: Option<Vec<TokenType>>,
        transitions: Vec<Transition>,
        extend: bool,
    ) -> Self {
        Self {
            regex,
            kind,
            sub_types,
            transitions,
            extend,
        }
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub const fn kind(&self) -> TokenType {
        self.kind
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub const fn extends(&self) -> bool {
        self.extend
    }

    /// Earliest byte offset at which this rule matches a non-empty span.
    pub fn find(&self, subject: &str) -> Option<usize> {
        self.regex
            .find_iter(subject)
            .find(|m| !m.is_empty())
            .map(|m| m.start())
    }

    /// Match at the very start of `subject`.
    ///
    /// Returns the consumed length and the typed pieces the match decomposes
    /// into, or `None` when the rule does not match a non-empty span at
    /// offset 0. Pieces borrow from `subject` and, concatenated, equal the
    /// consumed span.
    pub fn apply<'s>(&self, subject: &'s str) -> Option<(usize, Vec<(TokenType, &'s str)>)> {
        let captures = self.regex.captures(subject)?;
        let whole = captures.get(0)?;
        if whole.start() != 0 || whole.is_empty() {
            return None;
        }
        let end = whole.end();

        let Some(sub_types) = &self.sub_types else {
            return Some((end, vec![(self.kind, &subject[..end])]));
        };

        let mut pieces = Vec::with_capacity(sub_types.len() * 2 + 1);
        let mut cursor = 0;
        for (group, kind) in captures.iter().skip(1).zip(sub_types) {
            // Groups that did not participate produce nothing; groups nested
            // inside an earlier group are already covered by it.
            let Some(group) = group else { continue };
            if group.start() < cursor {
                continue;
            }
            if group.start() > cursor {
                pieces.push((self.kind, &subject[cursor..group.start()]));
            }
            pieces.push((*kind, group.as_str()));
            cursor = group.end();
        }
        if cursor < end {
            pieces.push((self.kind, &subject[cursor..end]));
        }

        Some((end, pieces))
    }
}

/// A compiled rule.
#[derive(Debug, Clone)]
pub enum Rule {
    Pattern(PatternRule),
    Include(StateId),
}
