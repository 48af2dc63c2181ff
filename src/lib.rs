//! `hilite`: tokenize HTTP messages, JSON, HTML and CSS for the terminal.
//!
//! A lexer is a set of named states, each an ordered list of regex rules.
//! Rules emit typed [`Token`]s and move between states. Input is read in
//! bounded chunks, so memory use is bounded by the longest line, not the
//! whole stream.
//! A [`Tokenizer`] pairs a lexer with a chain of filter stages that run
//! concurrently, and a [`Registry`] finds tokenizers by name, file name or
//! media type.
//!
//! # Example
//!
//! ```
//! use hilite::{Registry, TokenType};
//!
//! let registry = Registry::with_builtins().unwrap();
//! let json = registry.lookup_by_media_type("application/json").unwrap().unwrap();
//!
//! let tokens = json.tokenize_str(r#"{"port":8080}"#).unwrap();
//! let text: String = tokens.iter().map(|t| t.value.as_str()).collect();
//! assert_eq!(text, "{\n  \"port\": 8080\n}\n");
//! assert!(tokens.iter().any(|t| t.kind == TokenType::Number && t.value == "8080"));
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod glob;
pub mod lexer;
pub mod lexers;
pub mod message;
pub mod output;
pub mod pipeline;
pub mod registry;
pub mod rule;
pub mod state;
pub mod token;
pub mod tokenizer;

// Re-export primary API types for convenience.
pub use config::Config;
pub use error::{Error, Result};
pub use filter::{FilterSpec, Filters};
pub use lexer::{Completion, Lexer, LexerSpec};
pub use output::Theme;
pub use pipeline::{Pipeline, Stage};
pub use registry::Registry;
pub use rule::{PatternSpec, RuleSpec};
pub use token::{Token, TokenType};
pub use tokenizer::{TokenizeOptions, Tokenizer};
