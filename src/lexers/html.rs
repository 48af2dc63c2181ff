//! HTML lexer.

use crate::filter::FilterSpec;
use crate::lexer::LexerSpec;
use crate::rule::PatternSpec;
use crate::token::TokenType::{
    Assignment, Attribute, Comment, Entity, Punctuation, String, Text, Whitespace,
};

const NAME: &str = r"[\w-]*:?[\w-]+";

pub fn spec() -> LexerSpec {
    LexerSpec::new("html")
        .filenames(&["*.html", "*.htm", "*.xhtml"])
        .media_types(&["text/html", "application/xhtml+xml"])
        .filter(FilterSpec::DropEmpty)
        .state(
            "root",
            vec![
                PatternSpec::new("[^<&]+", Text).extend().into(),
                PatternSpec::new("<!--", Comment).next("comment").into(),
                PatternSpec::new("<![^>]*>", Entity).into(),
                PatternSpec::new(
                    "&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);",
                    Entity,
                )
                .into(),
                // Closing tags and attribute-less opening tags.
                PatternSpec::groups(
                    format!(r"(</?)({NAME})(\s*)(/?>)"),
                    &[Punctuation, Entity, Whitespace, Punctuation],
                )
                .into(),
                PatternSpec::groups(format!(r"(<)({NAME})(\s*)"), &[Punctuation, Entity, Whitespace])
                    .next("tag")
                    .into(),
                // A stray `<` or `&` is just text.
                PatternSpec::new("[<&]", Text).extend().into(),
            ],
        )
        .state(
            "comment",
            vec![
                PatternSpec::new("-->", Comment).next("#pop").extend().into(),
                PatternSpec::new("[^-]+", Comment).extend().into(),
                PatternSpec::new("-", Comment).extend().into(),
            ],
        )
        .state(
            "tag",
            vec![
                PatternSpec::groups(
                    r"([\w:-]+)(\s*)(=)(\s*)",
                    &[Attribute, Whitespace, Assignment, Whitespace],
                )
                .next("tagAttr")
                .into(),
                PatternSpec::new(r"[\w:-]+", Attribute).into(),
                PatternSpec::new(r"\s+", Whitespace).into(),
                PatternSpec::groups(r"(/?)(\s*)(>)", &[Punctuation, Whitespace, Punctuation])
                    .next("#pop")
                    .into(),
            ],
        )
        .state(
            "tagAttr",
            vec![
                PatternSpec::new(r#""[^"]*""#, String).next("#pop").into(),
                PatternSpec::new("'[^']*'", String).next("#pop").into(),
                PatternSpec::new(r"[^\s>]+", String).next("#pop").into(),
            ],
        )
}
