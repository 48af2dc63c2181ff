//! HTTP message head lexer: start line plus header fields.
//!
//! The lexer halts on the blank line that ends the header block, leaving the
//! body unread for whichever tokenizer its `Content-Type` selects.

use crate::filter::FilterSpec;
use crate::lexer::LexerSpec;
use crate::rule::PatternSpec;
use crate::token::TokenType::{
    Assignment, Attribute, Constant, Entity, Number, Punctuation, String, Text, Whitespace,
};

pub fn spec() -> LexerSpec {
    LexerSpec::new("http")
        .filenames(&["*.http"])
        .media_types(&["message/http"])
        .filter(FilterSpec::DropEmpty)
        .state(
            "root",
            vec![
                // HTTP/1.1 200 OK
                PatternSpec::groups(
                    r"(HTTP)(/)([0-9.]+)( +)([0-9]{3})( *)([^\r\n]*)(\r?\n)",
                    &[
                        Entity, Punctuation, Entity, Whitespace, Number, Whitespace, String,
                        Whitespace,
                    ],
                )
                .next("headers")
                .into(),
                // GET /index.html HTTP/1.1
                PatternSpec::groups(
                    r"([A-Z]+)( +)([^ \r\n]+)( +)(HTTP)(/)([0-9.]+)(\r?\n)",
                    &[
                        Constant, Whitespace, String, Whitespace, Entity, Punctuation, Entity,
                        Whitespace,
                    ],
                )
                .next("headers")
                .into(),
            ],
        )
        .state(
            "headers",
            vec![
                PatternSpec::new(r"\r?\n", Whitespace).next("#pop #pop").into(),
                PatternSpec::groups(r"([^:\r\n]+)(:)([ \t]*)", &[Attribute, Assignment, Whitespace])
                    .next("headerValue")
                    .into(),
            ],
        )
        .state(
            "headerValue",
            vec![
                PatternSpec::new(r"\r?\n", Whitespace).next("#pop").into(),
                PatternSpec::new(r"[^;\r\n]+", Text).into(),
                PatternSpec::new(";", Punctuation).into(),
            ],
        )
}
