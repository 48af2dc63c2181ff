//! JSON lexer and the pretty-printing filter that goes with it.

use std::sync::Arc;

use crate::error::Result;
use crate::filter::FilterSpec;
use crate::lexer::LexerSpec;
use crate::pipeline::{Inlet, Outlet, Stage};
use crate::rule::{PatternSpec, RuleSpec};
use crate::token::{Token, TokenType};

/// Indent used by the JSON formatter unless configured otherwise.
pub const DEFAULT_INDENT: &str = "  ";

const KEY: &str = r#"(")((?:\\.|[^"\\])*)(")(\s*)(:)"#;
const STRING: &str = r#"(")((?:\\.|[^"\\])*)(")"#;

pub fn spec() -> LexerSpec {
    spec_with_indent(DEFAULT_INDENT)
}

/// The JSON lexer, re-indenting its output with `indent` per level.
pub fn spec_with_indent(indent: &str) -> LexerSpec {
    use TokenType::{Assignment, Attribute, Constant, Number, Punctuation, Whitespace};

    LexerSpec::new("json")
        .filenames(&["*.json"])
        .media_types(&["application/json"])
        .filter(FilterSpec::DropEmpty)
        .filter(FilterSpec::JsonFormat {
            indent: indent.to_owned(),
        })
        .state("root", vec![RuleSpec::include("value")])
        .state(
            "whitespace",
            vec![PatternSpec::new(r"\s+", Whitespace).into()],
        )
        .state(
            "boolean",
            vec![PatternSpec::new("(true|false|null)", Constant).into()],
        )
        .state(
            "number",
            vec![
                // -123.456e+78
                PatternSpec::new(r"-?[0-9]+\.?[0-9]*[eE][+-]?[0-9]+", Number).into(),
                PatternSpec::new(r"-?[0-9]+\.[0-9]+", Number).into(),
                PatternSpec::new("-?[0-9]+", Number).into(),
            ],
        )
        .state(
            "string",
            vec![
                PatternSpec::groups(r#"(")(")"#, &[Punctuation, Punctuation]).into(),
                PatternSpec::groups(STRING, &[Punctuation, TokenType::String, Punctuation]).into(),
            ],
        )
        .state(
            "value",
            vec![
                RuleSpec::include("whitespace"),
                RuleSpec::include("boolean"),
                RuleSpec::include("number"),
                RuleSpec::include("string"),
                RuleSpec::include("array"),
                RuleSpec::include("object"),
            ],
        )
        .state(
            "object",
            vec![PatternSpec::new(r"\{", Punctuation).next("objectKey").into()],
        )
        .state(
            "objectKey",
            vec![
                RuleSpec::include("whitespace"),
                PatternSpec::groups(
                    KEY,
                    &[Punctuation, Attribute, Punctuation, Whitespace, Assignment],
                )
                .next("objectValue")
                .into(),
                PatternSpec::new(r"\}", Punctuation).next("#pop").into(),
            ],
        )
        .state(
            "objectValue",
            vec![
                RuleSpec::include("value"),
                PatternSpec::new(",", Punctuation).next("#pop").into(),
                PatternSpec::new(r"\}", Punctuation).next("#pop #pop").into(),
            ],
        )
        .state(
            "array",
            vec![PatternSpec::new(r"\[", Punctuation).next("arrayValue").into()],
        )
        .state(
            "arrayValue",
            vec![
                RuleSpec::include("value"),
                PatternSpec::new(",", Punctuation).into(),
                PatternSpec::new(r"\]", Punctuation).next("#pop").into(),
            ],
        )
}

/// Re-indents a JSON token stream.
///
/// Incoming whitespace is discarded and replaced: a newline and indent after
/// every opening bracket and comma, before every closing bracket, and a
/// space after each key's colon. An empty pair still gets its newline:
/// `{}` becomes `{` and `}` on two lines.
/// The depth counter is the filter's own and never goes below zero, so
/// unbalanced input still formats without failing.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    indent: String,
}

impl JsonFormatter {
    pub fn new(indent: impl Into<String>) -> Self {
        Self {
            indent: indent.into(),
        }
    }

    fn break_line(&self, depth: usize, state: &Arc<str>) -> Token {
        let mut value = String::with_capacity(1 + self.indent.len() * depth);
        value.push('\n');
        for _ in 0..depth {
            value.push_str(&self.indent);
        }
        Token::new(TokenType::Whitespace, value).in_state(Arc::clone(state))
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_INDENT)
    }
}

impl Stage<Token> for JsonFormatter {
    fn name(&self) -> &str {
        "json-format"
    }

    fn process(&self, input: Inlet<Token>, output: &Outlet<Token>) -> Result<()> {
        let mut depth = 0usize;
        // Set right after an opening bracket, until its first child arrives.
        let mut opened = false;

        for token in input {
            let closing = token.kind == TokenType::Punctuation
                && matches!(token.value.as_str(), "}" | "]");

            match token.kind {
                TokenType::Whitespace => continue,
                _ if closing => {
                    depth = depth.saturating_sub(1);
                    output.send(self.break_line(depth, &token.state))?;
                    opened = false;
                    let state = Arc::clone(&token.state);
                    output.send(token)?;
                    if depth == 0 {
                        output.send(Token::new(TokenType::Whitespace, "\n").in_state(state))?;
                    }
                    continue;
                }
                _ => {}
            }

            if opened {
                output.send(self.break_line(depth, &token.state))?;
                opened = false;
            }

            match (token.kind, token.value.as_str()) {
                (TokenType::Punctuation, "{" | "[") => {
                    output.send(token)?;
                    depth += 1;
                    opened = true;
                }
                (TokenType::Punctuation, ",") => {
                    let line = self.break_line(depth, &token.state);
                    output.send(token)?;
                    output.send(line)?;
                }
                (TokenType::Assignment, ":") => {
                    let state = Arc::clone(&token.state);
                    output.send(token)?;
                    output.send(Token::new(TokenType::Whitespace, " ").in_state(state))?;
                }
                _ => output.send(token)?,
            }
        }
        Ok(())
    }
}
