//! A compiled lexer paired with its filter stages.

use std::io::BufRead;
use std::sync::Arc;

use crate::error::Result;
use crate::filter::{FilterStage, Filters};
use crate::lexer::{self, Completion, Lexer, LexerSpec};
use crate::pipeline::{self, Outlet, Pipeline};
use crate::token::Token;

/// Tuning knobs for a streaming tokenize call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizeOptions {
    /// Upper bound, in bytes, of a single read from the input.
    pub chunk_size: usize,
    /// Capacity of each queue between pipeline stages.
    pub queue_capacity: usize,
}

impl Default for TokenizeOptions {
    fn default() -> Self {
        Self {
            chunk_size: lexer::DEFAULT_CHUNK_SIZE,
            queue_capacity: pipeline::DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// A lexer plus the filters its output runs through.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    lexer: Arc<Lexer>,
    filters: Filters,
}

impl Tokenizer {
    pub fn new(lexer: Lexer, filters: Filters) -> Self {
        Self {
            lexer: Arc::new(lexer),
            filters,
        }
    }

    /// Compile a lexer definition and build the filters it names.
    pub fn from_spec(spec: &LexerSpec) -> Result<Self> {
        let lexer = spec.compile()?;
        let filters = spec.filters.iter().map(|filter| filter.build()).collect();
        Ok(Self::new(lexer, filters))
    }

    pub fn name(&self) -> &str {
        self.lexer.name()
    }

    pub fn lexer(&self) -> &Lexer {
        &self.lexer
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Append a filter stage after the existing ones.
    #[must_use]
    pub fn with_filter(mut self, stage: FilterStage) -> Self {
        self.filters.push(stage);
        self
    }

    /// Tokenize `reader` with default options, calling `sink` once per
    /// final token on the calling thread.
    pub fn tokenize<R, S>(&self, reader: &mut R, sink: S) -> Result<Completion>
    where
        R: BufRead + Send + ?Sized,
        S: FnMut(Token) -> Result<()>,
    {
        self.tokenize_with(reader, &TokenizeOptions::default(), sink)
    }

    /// Tokenize `reader`, running the lexer and every filter concurrently.
    ///
    /// Tokens already passed to `sink` stay delivered when a later stage
    /// fails; the failure is then the result. If `sink` returns an error the
    /// run winds down and that error is returned.
    pub fn tokenize_with<R, S>(
        &self,
        reader: &mut R,
        options: &TokenizeOptions,
        sink: S,
    ) -> Result<Completion>
    where
        R: BufRead + Send + ?Sized,
        S: FnMut(Token) -> Result<()>,
    {
        let lexer = &self.lexer;
        let chunk_size = options.chunk_size;
        Pipeline::new(self.filters.stages())
            .capacity(options.queue_capacity)
            .run(
                move |outlet: &Outlet<Token>| {
                    match lexer.tokenize_chunked(reader, chunk_size, |token| outlet.send(token)) {
                        Err(e) if e.is_cancelled() => Ok(Completion::Cancelled),
                        other => other,
                    }
                },
                sink,
            )
    }

    /// Tokenize a whole string into the final token list.
    pub fn tokenize_str(&self, text: &str) -> Result<Vec<Token>> {
        let tokens = self.lexer.tokenize_str(text)?;
        self.filters.apply(tokens)
    }
}
