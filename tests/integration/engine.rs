//! Properties of the lexer engine, filter pipeline and registry.

use std::sync::Arc;

use proptest::prelude::*;

use hilite::filter::{self, MergeAdjacent};
use hilite::lexers::{css, html, http, json};
use hilite::pipeline::Outlet;
use hilite::{
    Completion, Error, Filters, LexerSpec, PatternSpec, Registry, RuleSpec, Stage, Token,
    TokenType, TokenizeOptions, Tokenizer,
};

fn text(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.value.as_str()).collect()
}

/// Run `tokenizer` over `input` through the streaming path.
fn stream(tokenizer: &Tokenizer, input: &str, chunk_size: usize) -> (Vec<Token>, Completion) {
    let options = TokenizeOptions {
        chunk_size,
        queue_capacity: 2,
    };
    let mut tokens = Vec::new();
    let completion = tokenizer
        .tokenize_with(&mut input.as_bytes(), &options, |t| {
            tokens.push(t);
            Ok(())
        })
        .unwrap();
    (tokens, completion)
}

proptest! {
    #[test]
    fn html_tokens_cover_the_input(input in "[<>a-z&;=\" /!\\-\n]{0,200}") {
        let tokenizer = Tokenizer::from_spec(&html::spec()).unwrap();
        let tokens = tokenizer.tokenize_str(&input).unwrap();
        prop_assert_eq!(text(&tokens), input);
        prop_assert!(tokens.iter().all(|t| !t.value.is_empty()));
    }

    #[test]
    fn css_tokens_cover_the_input(input in "[a-z#.:;{}()0-9 \n/*@!,\"-]{0,200}") {
        let tokenizer = Tokenizer::from_spec(&css::spec()).unwrap();
        let tokens = tokenizer.tokenize_str(&input).unwrap();
        prop_assert_eq!(text(&tokens), input);
    }

    #[test]
    fn json_tokens_cover_the_input(input in "[\\[\\]{}\",:0-9.eE+a-z \n-]{0,200}") {
        let lexer = json::spec().compile().unwrap();
        let tokens = lexer.tokenize_str(&input).unwrap();
        prop_assert_eq!(text(&tokens), input);
    }

    #[test]
    fn http_tokens_cover_the_input(
        head in "[A-Za-z0-9/:. -]{0,40}",
        rest in "[A-Za-z0-9/:;=. \r\n-]{0,160}",
    ) {
        let input = format!("HTTP/1.1 {head}\r\n{rest}");
        let tokenizer = Tokenizer::from_spec(&http::spec()).unwrap();
        let tokens = tokenizer.tokenize_str(&input).unwrap();
        prop_assert_eq!(text(&tokens), input);
    }

    #[test]
    fn json_numbers_survive_any_chunk_size(
        numbers in proptest::collection::vec("-?[0-9]{1,4}(\\.[0-9]{1,3})?([eE][+-]?[0-9]{1,2})?", 1..20),
        chunk_size in 1usize..12,
    ) {
        let input = format!("[{}]", numbers.join(","));
        let tokenizer = Tokenizer::from_spec(&json::spec()).unwrap();
        let (tokens, completion) = stream(&tokenizer, &input, chunk_size);
        prop_assert_eq!(completion, Completion::Exhausted);
        prop_assert_eq!(&tokens, &tokenizer.tokenize_str(&input).unwrap());
        let found: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenType::Number)
            .map(|t| t.value.as_str())
            .collect();
        prop_assert_eq!(found, numbers.iter().map(String::as_str).collect::<Vec<_>>());
        prop_assert!(tokens.iter().all(|t| t.kind != TokenType::Error));
    }

    #[test]
    fn chunk_size_never_loses_text(input in "[<>a-z& \n]{0,120}", chunk_size in 1usize..16) {
        let tokenizer = Tokenizer::from_spec(&html::spec()).unwrap();
        let (tokens, completion) = stream(&tokenizer, &input, chunk_size);
        prop_assert_eq!(completion, Completion::Exhausted);
        prop_assert_eq!(text(&tokens), input);
    }

    #[test]
    fn merged_tokens_never_repeat_a_type(kinds in proptest::collection::vec(0usize..3, 0..40)) {
        const KINDS: [TokenType; 3] = [TokenType::Text, TokenType::Number, TokenType::Whitespace];
        let tokens: Vec<Token> = kinds
            .iter()
            .enumerate()
            .map(|(i, &k)| Token::new(KINDS[k], if i % 5 == 4 { String::new() } else { i.to_string() }))
            .collect();
        let expected = text(&tokens);

        let filters: Filters = [Arc::new(MergeAdjacent) as Arc<dyn Stage<Token>>].into_iter().collect();
        let merged = filters.apply(tokens).unwrap();
        prop_assert_eq!(text(&merged), expected);
        prop_assert!(merged.windows(2).all(|w| w[0].kind != w[1].kind));
        prop_assert!(merged.iter().all(|t| !t.value.is_empty()));
    }

    #[test]
    fn merging_twice_equals_merging_once(kinds in proptest::collection::vec(0usize..3, 0..40)) {
        const KINDS: [TokenType; 3] = [TokenType::Text, TokenType::Number, TokenType::Whitespace];
        let tokens: Vec<Token> = kinds
            .iter()
            .enumerate()
            .map(|(i, &k)| Token::new(KINDS[k], if i % 4 == 3 { String::new() } else { i.to_string() }))
            .collect();
        let count = tokens.len();

        let merge = || Arc::new(MergeAdjacent) as Arc<dyn Stage<Token>>;
        let once: Filters = [merge()].into_iter().collect();
        let twice: Filters = [merge(), merge()].into_iter().collect();

        let merged_once = once.apply(tokens.clone()).unwrap();
        let merged_twice = twice.apply(tokens).unwrap();
        prop_assert!(merged_once.len() <= count);
        prop_assert_eq!(&merged_twice, &merged_once);
        prop_assert_eq!(once.apply(merged_once.clone()).unwrap(), merged_once);
    }
}

fn counting_lexer() -> LexerSpec {
    LexerSpec::new("count").state(
        "root",
        vec![
            PatternSpec::new("[0-9]", TokenType::Number).into(),
            PatternSpec::new(r"\s+", TokenType::Whitespace).into(),
        ],
    )
}

/// A stage that fails on its `k`-th token (0-based) and forwards the rest.
fn fail_at(k: usize) -> Arc<dyn Stage<Token>> {
    let seen = std::sync::atomic::AtomicUsize::new(0);
    filter::from_fn("fail-at", move |token: Token, out: &Outlet<Token>| {
        if seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == k {
            return Err(Error::Filter(format!("refusing token {k}")));
        }
        out.send(token)
    })
}

#[test]
fn failing_stage_stops_after_k_tokens() {
    for k in [0, 1, 5] {
        let tokenizer = Tokenizer::from_spec(&counting_lexer())
            .unwrap()
            .with_filter(fail_at(k));
        let mut delivered = Vec::new();
        let err = tokenizer
            .tokenize(&mut "1234567890".as_bytes(), |t| {
                delivered.push(t);
                Ok(())
            })
            .unwrap_err();

        match err {
            Error::FilterStage { stage, source } => {
                assert_eq!(stage, "fail-at");
                assert!(matches!(*source, Error::Filter(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(delivered.len(), k);
        assert_eq!(text(&delivered), "1234567890"[..k]);
    }
}

#[test]
fn downstream_stage_drains_after_upstream_failure() {
    let input: String = (0..5000).map(|i| format!("{} ", i % 10)).collect();
    let options = TokenizeOptions {
        chunk_size: 64,
        queue_capacity: 1,
    };
    for k in [0, 3, 500] {
        let tokenizer = Tokenizer::from_spec(&counting_lexer())
            .unwrap()
            .with_filter(fail_at(k))
            .with_filter(Arc::new(MergeAdjacent));
        let mut delivered = Vec::new();
        let err = tokenizer
            .tokenize_with(&mut input.as_bytes(), &options, |t| {
                delivered.push(t);
                Ok(())
            })
            .unwrap_err();

        assert!(
            matches!(&err, Error::FilterStage { stage, .. } if stage == "fail-at"),
            "unexpected error: {err}"
        );
        assert_eq!(delivered.len(), k);
        assert_eq!(text(&delivered), input[..k]);
    }
}

#[test]
fn failing_stage_is_silent_without_input() {
    let tokenizer = Tokenizer::from_spec(&counting_lexer())
        .unwrap()
        .with_filter(fail_at(0));
    let (tokens, completion) = stream(&tokenizer, "", 4);
    assert!(tokens.is_empty());
    assert_eq!(completion, Completion::Exhausted);
}

#[test]
fn sink_error_is_returned_as_is() {
    let tokenizer = Tokenizer::from_spec(&counting_lexer()).unwrap();
    let mut seen = 0;
    let err = tokenizer
        .tokenize(&mut "12345".as_bytes(), |_| {
            seen += 1;
            if seen == 2 {
                return Err(Error::Filter("stop".into()));
            }
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, Error::Filter(msg) if msg == "stop"));
    assert_eq!(seen, 2);
}

#[test]
fn mutually_recursive_includes_terminate() {
    let spec = LexerSpec::new("loop")
        .state("root", vec![RuleSpec::include("a")])
        .state(
            "a",
            vec![
                RuleSpec::include("b"),
                PatternSpec::new("[a-z]+", TokenType::Text).into(),
            ],
        )
        .state(
            "b",
            vec![
                RuleSpec::include("a"),
                PatternSpec::new("[0-9]+", TokenType::Number).into(),
            ],
        );
    let tokenizer = Tokenizer::from_spec(&spec).unwrap();
    let tokens = tokenizer.tokenize_str("ab12cd!").unwrap();
    let kinds: Vec<TokenType> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![TokenType::Text, TokenType::Number, TokenType::Text, TokenType::Error]
    );
    assert_eq!(text(&tokens), "ab12cd!");
}

#[test]
fn halted_lexer_hands_back_the_rest() {
    let spec = LexerSpec::new("head").state(
        "root",
        vec![PatternSpec::new("[A-Z]+\n", TokenType::Constant).next("#pop").into()],
    );
    let tokenizer = Tokenizer::from_spec(&spec).unwrap();

    let (tokens, completion) = stream(&tokenizer, "HEAD\nbody text\n", 2);
    assert_eq!(text(&tokens), "HEAD\n");
    assert!(matches!(completion, Completion::Halted { .. }));

    let all = tokenizer.tokenize_str("HEAD\nbody text\n").unwrap();
    assert_eq!(all.last().unwrap().kind, TokenType::Text);
    assert_eq!(text(&all), "HEAD\nbody text\n");
}

#[test]
fn registry_lookups() {
    let registry = Registry::with_builtins().unwrap();
    assert_eq!(
        registry.names().collect::<Vec<_>>(),
        vec!["http", "json", "html", "css"]
    );
    assert_eq!(registry.lookup_by_filename("site/main.css").unwrap().name(), "css");
    assert_eq!(registry.lookup_by_filename("docs/index.htm").unwrap().name(), "html");
    assert!(registry.lookup_by_filename("notes.txt").is_none());
    assert_eq!(
        registry
            .lookup_by_media_type("Application/XHTML+XML; charset=utf-8")
            .unwrap()
            .unwrap()
            .name(),
        "html"
    );
    assert!(registry.lookup_by_media_type("font/woff2").unwrap().is_none());
    assert!(matches!(
        registry.lookup_by_media_type("nonsense"),
        Err(Error::UnrecognizedMediaType(_))
    ));
}

#[test]
fn global_registry_installs_once() {
    let installed = hilite::registry::install(Registry::with_builtins().unwrap()).unwrap();
    assert_eq!(installed.len(), 4);
    assert!(hilite::registry::global().is_some());
    assert!(matches!(
        hilite::registry::install(Registry::new()),
        Err(Error::RegistryInstalled)
    ));
}
