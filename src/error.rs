//! Error types for `hilite`.
//!
//! Uses [`thiserror`] for ergonomic error derivation.
//!
//! Two situations are *not* errors: input no rule can match
//! (surfaced as [`TokenType::Error`](crate::TokenType::Error) tokens) and a
//! registry lookup that finds nothing (surfaced as `None`, meaning "pass the
//! content through verbatim").

use thiserror::Error;

/// Errors that can occur while compiling lexers or tokenizing input.
///
/// Maps to exit codes in the binary: registry and configuration errors → exit 1,
/// everything raised while tokenizing → exit 2.
#[derive(Debug, Error)]
pub enum Error {
    /// A filename glob registered by a lexer could not be compiled.
    #[error("malformed filename pattern '{pattern}' for lexer '{lexer}': {reason}")]
    MalformedGlobPattern {
        lexer: String,
        pattern: String,
        reason: String,
    },

    /// A media type passed to a lookup is not of the form `type/subtype`.
    #[error("unrecognized media type '{0}'")]
    UnrecognizedMediaType(String),

    /// A rule pattern is not a valid regular expression.
    #[error("invalid pattern in lexer '{lexer}' state '{state}': {source}")]
    InvalidPattern {
        lexer: String,
        state: String,
        #[source]
        source: regex::Error,
    },

    /// An include or transition names a state the lexer does not define.
    #[error("lexer '{lexer}' state '{state}' references unknown state '{target}'")]
    UnknownState {
        lexer: String,
        state: String,
        target: String,
    },

    /// Every lexer needs a `root` state to start from.
    #[error("lexer '{0}' has no 'root' state")]
    MissingRootState(String),

    /// A rule declares sub-types but their count differs from its capture groups.
    #[error(
        "lexer '{lexer}' state '{state}': pattern '{pattern}' has {groups} capture groups but {sub_types} sub-types"
    )]
    SubTypeMismatch {
        lexer: String,
        state: String,
        pattern: String,
        groups: usize,
        sub_types: usize,
    },

    /// A tokenizer with the same name is already registered.
    #[error("a tokenizer named '{0}' is already registered")]
    DuplicateTokenizer(String),

    /// The process-wide registry was installed twice.
    #[error("the global tokenizer registry is already installed")]
    RegistryInstalled,

    /// A filter stage failed; terminal for the whole tokenize call.
    #[error("filter stage '{stage}' failed: {source}")]
    FilterStage {
        stage: String,
        #[source]
        source: Box<Error>,
    },

    /// Raised by a filter stage implementation.
    #[error("{0}")]
    Filter(String),

    /// The downstream side of a pipeline hung up. Never reported as a failure.
    #[error("pipeline closed by downstream consumer")]
    Cancelled,

    /// Configuration error (invalid flag combination, unreadable config file).
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error during read or write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// True for the internal "downstream hung up" signal.
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
