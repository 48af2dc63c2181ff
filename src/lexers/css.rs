//! CSS lexer.

use crate::filter::FilterSpec;
use crate::lexer::LexerSpec;
use crate::rule::{PatternSpec, RuleSpec};
use crate::token::TokenType::{
    Assignment, Attribute, Comment, Constant, Entity, Number, Operator, Punctuation, String,
    Text, Whitespace,
};

pub fn spec() -> LexerSpec {
    LexerSpec::new("css")
        .filenames(&["*.css"])
        .media_types(&["text/css"])
        .filter(FilterSpec::DropEmpty)
        .state(
            "root",
            vec![
                RuleSpec::include("whitespace"),
                RuleSpec::include("comment"),
                PatternSpec::groups(r"(@)([\w-]+)", &[Operator, Constant]).into(),
                PatternSpec::new(r"[^\s{};,/@]+", Entity).into(),
                PatternSpec::new(",", Punctuation).into(),
                PatternSpec::new(";", Punctuation).into(),
                PatternSpec::new(r"\{", Punctuation).next("block").into(),
                PatternSpec::new(r"\}", Punctuation).into(),
                PatternSpec::new("/", Punctuation).into(),
            ],
        )
        .state(
            "block",
            vec![
                RuleSpec::include("whitespace"),
                RuleSpec::include("comment"),
                PatternSpec::groups(r"([\w-]+)(\s*)(:)", &[Attribute, Whitespace, Assignment])
                    .next("value")
                    .into(),
                PatternSpec::new(";", Punctuation).into(),
                PatternSpec::new(r"\{", Punctuation).next("block").into(),
                PatternSpec::new(r"\}", Punctuation).next("#pop").into(),
                PatternSpec::new(r"[^\s{};:/]+", Entity).into(),
                PatternSpec::new("[:/]", Punctuation).into(),
            ],
        )
        .state(
            "value",
            vec![
                RuleSpec::include("whitespace"),
                RuleSpec::include("comment"),
                RuleSpec::include("string"),
                PatternSpec::new("#[0-9a-fA-F]+", Number).into(),
                PatternSpec::new(r"-?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:%|[a-zA-Z]+)?", Number).into(),
                PatternSpec::new(r"!\s*important", Constant).into(),
                PatternSpec::new(";", Punctuation).next("#pop").into(),
                PatternSpec::new(r"\}", Punctuation).next("#pop #pop").into(),
                PatternSpec::new(r"[\w-]+", Text).into(),
                PatternSpec::new(r"[(),/+*:=.%!]", Punctuation).into(),
            ],
        )
        .state(
            "string",
            vec![
                PatternSpec::new(r#""(?:\\.|[^"\\])*""#, String).into(),
                PatternSpec::new(r"'(?:\\.|[^'\\])*'", String).into(),
            ],
        )
        .state("whitespace", vec![PatternSpec::new(r"\s+", Whitespace).into()])
        .state(
            "comment",
            vec![PatternSpec::new(r"/\*", Comment).next("commentBody").into()],
        )
        .state(
            "commentBody",
            vec![
                PatternSpec::new(r"\*/", Comment).next("#pop").extend().into(),
                PatternSpec::new(r"[^*]+", Comment).extend().into(),
                PatternSpec::new(r"\*", Comment).extend().into(),
            ],
        )
}
