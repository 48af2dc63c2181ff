//! The lexer: a declarative [`LexerSpec`] and the compiled [`Lexer`] that
//! drives a state stack over streamed input.
//!
//! Input is read in bounded chunks and tokenized a whole line at a time. Text
//! that no rule matches never aborts tokenizing: it is emitted as
//! [`TokenType::Error`] tokens and the lexer resynchronizes. Concatenating
//! the values of every emitted token reproduces the input.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Read};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::filter::FilterSpec;
use crate::glob::Glob;
use crate::registry;
use crate::rule::{RuleSpec, Transition};
use crate::state::{StateId, StateMap};
use crate::token::{Token, TokenType};

/// Default upper bound, in bytes, of a single read from the input.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// A lexer definition: pure data, loadable from TOML or JSON.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LexerSpec {
    pub name: String,
    /// Filename globs (`*.json`) this lexer accepts.
    #[serde(default)]
    pub filenames: Vec<String>,
    /// Media types (`application/json`) this lexer accepts.
    #[serde(default)]
    pub media_types: Vec<String>,
    /// Filter stages applied to the lexer's output, in order.
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
    pub states: BTreeMap<String, Vec<RuleSpec>>,
}

impl LexerSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn filenames(mut self, patterns: &[&str]) -> Self {
        self.filenames = patterns.iter().map(|p| (*p).to_owned()).collect();
        self
    }

    #[must_use]
    pub fn media_types(mut self, media_types: &[&str]) -> Self {
        self.media_types = media_types.iter().map(|m| (*m).to_owned()).collect();
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: FilterSpec) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn state(mut self, name: impl Into<String>, rules: Vec<RuleSpec>) -> Self {
        self.states.insert(name.into(), rules);
        self
    }

    /// Parse a definition written in TOML.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Parse a definition written in JSON.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a definition from disk. Files ending in `.json` are read as JSON,
    /// everything else as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "cannot read lexer definition {}: {e}",
                path.display()
            ))
        })?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Compile patterns, resolve state references and filename globs.
    pub fn compile(&self) -> Result<Lexer> {
        let states = StateMap::compile(&self.name, &self.states)?;
        let filenames = self
            .filenames
            .iter()
            .map(|pattern| {
                Glob::new(pattern).map_err(|reason| Error::MalformedGlobPattern {
                    lexer: self.name.clone(),
                    pattern: pattern.clone(),
                    reason,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let media_types = self
            .media_types
            .iter()
            .map(|media_type| registry::essence(media_type))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            lexer = %self.name,
            states = states.len(),
            filenames = filenames.len(),
            media_types = media_types.len(),
            "compiled lexer"
        );

        Ok(Lexer {
            name: self.name.clone(),
            states,
            filenames,
            media_types,
        })
    }
}

/// How a tokenize call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The input was consumed to the end.
    Exhausted,
    /// The state stack emptied. `remainder` holds the unconsumed rest of the
    /// current line; the reader is positioned at the start of the next one.
    Halted { remainder: String },
    /// The consumer stopped accepting tokens before the input ended.
    Cancelled,
}

/// A compiled lexer. Immutable, `Send + Sync`, and cheap to share.
#[derive(Debug, Clone)]
pub struct Lexer {
    name: String,
    states: StateMap,
    filenames: Vec<Glob>,
    media_types: Vec<String>,
}

impl Lexer {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn states(&self) -> &StateMap {
        &self.states
    }

    pub fn filenames(&self) -> &[Glob] {
        &self.filenames
    }

    /// Registered media types, lowercased and without parameters.
    pub fn media_types(&self) -> &[String] {
        &self.media_types
    }

    /// True if any registered glob matches `filename`.
    pub fn accepts_filename(&self, filename: &str) -> bool {
        self.filenames.iter().any(|glob| glob.is_match(filename))
    }

    /// True if `essence` (a media type already stripped of parameters and
    /// lowercased) is registered for this lexer.
    pub fn accepts_media_type(&self, essence: &str) -> bool {
        self.media_types.iter().any(|m| m == essence)
    }

    /// Tokenize everything `reader` yields, passing each token to `emit`.
    pub fn tokenize<R, F>(&self, reader: &mut R, emit: F) -> Result<Completion>
    where
        R: BufRead + ?Sized,
        F: FnMut(Token) -> Result<()>,
    {
        self.tokenize_chunked(reader, DEFAULT_CHUNK_SIZE, emit)
    }

    /// Like [`Self::tokenize`], reading at most `chunk_size` bytes at a time.
    ///
    /// An error returned by `emit` stops tokenizing and is returned as is.
    pub fn tokenize_chunked<R, F>(
        &self,
        reader: &mut R,
        chunk_size: usize,
        emit: F,
    ) -> Result<Completion>
    where
        R: BufRead + ?Sized,
        F: FnMut(Token) -> Result<()>,
    {
        let chunk_size = chunk_size.max(1);
        let root = self.states.root();
        let mut stack = StateStack::new(root);
        let mut out = Accumulator::new(emit);
        let mut raw = Vec::with_capacity(chunk_size);
        let mut subject = String::new();

        loop {
            let eof = read_chunk(reader, chunk_size, &mut raw)? == 0;
            decode_utf8(&mut raw, eof, &mut subject);
            // Only a whole line is tokenized: a shorter rule could otherwise
            // win against text that has not been read yet.
            if !eof && !subject.ends_with('\n') {
                continue;
            }

            let mut cursor = 0;
            while cursor < subject.len() {
                let Some(current) = stack.top() else { break };
                let state = self.states.name(current);
                let rest = &subject[cursor..];

                match self.states.resolve(current, rest) {
                    None => {
                        debug!(lexer = %self.name, %state, text = ?rest, "no rule matches, resetting to root");
                        out.push(error_token(rest, state), false)?;
                        cursor = subject.len();
                        stack.reset(root);
                    }
                    Some(found) if found.offset > 0 => {
                        let prefix = &rest[..found.offset];
                        debug!(lexer = %self.name, %state, text = ?prefix, "skipping unmatched text");
                        out.push(error_token(prefix, state), false)?;
                        cursor += found.offset;
                    }
                    Some(found) => {
                        let Some((consumed, pieces)) = found.rule.apply(rest) else {
                            // Find and apply disagree only for exotic patterns;
                            // step over one character so the loop always advances.
                            let step = rest.chars().next().map_or(rest.len(), char::len_utf8);
                            out.push(error_token(&rest[..step], state), false)?;
                            cursor += step;
                            continue;
                        };
                        for (kind, text) in pieces {
                            let token = Token {
                                value: text.to_owned(),
                                kind,
                                state: Arc::clone(state),
                            };
                            out.push(token, found.rule.extends())?;
                        }
                        cursor += consumed;
                        stack.apply(found.rule.transitions());

                        if stack.is_empty() {
                            out.flush()?;
                            debug!(lexer = %self.name, "state stack emptied, halting");
                            return Ok(Completion::Halted {
                                remainder: subject[cursor..].to_owned(),
                            });
                        }
                    }
                }
            }
            subject.drain(..cursor);

            if eof {
                break;
            }
        }

        out.flush()?;
        Ok(Completion::Exhausted)
    }

    /// Tokenize a whole string into a token list.
    ///
    /// If the lexer halts before the end, the unconsumed rest is appended as
    /// a single [`TokenType::Text`] token so no input is lost.
    pub fn tokenize_str(&self, text: &str) -> Result<Vec<Token>> {
        let mut reader = text.as_bytes();
        let mut tokens = Vec::new();
        let completion = self.tokenize(&mut reader, |token| {
            tokens.push(token);
            Ok(())
        })?;
        if let Completion::Halted { remainder } = completion
            && let Some(rest) = unconsumed(remainder, &mut reader)?
        {
            tokens.push(rest);
        }
        Ok(tokens)
    }
}

/// Collect what a halted lexer left behind (its remainder plus whatever the
/// reader still holds) into one passthrough token.
pub(crate) fn unconsumed<R: Read + ?Sized>(
    mut remainder: String,
    reader: &mut R,
) -> io::Result<Option<Token>> {
    let mut rest = Vec::new();
    reader.read_to_end(&mut rest)?;
    remainder.push_str(&String::from_utf8_lossy(&rest));
    Ok((!remainder.is_empty()).then(|| Token::new(TokenType::Text, remainder)))
}

fn error_token(text: &str, state: &Arc<str>) -> Token {
    Token {
        value: text.to_owned(),
        kind: TokenType::Error,
        state: Arc::clone(state),
    }
}

/// Per-call stack of active states.
#[derive(Debug)]
struct StateStack(Vec<StateId>);

impl StateStack {
    fn new(root: StateId) -> Self {
        Self(vec![root])
    }

    fn top(&self) -> Option<StateId> {
        self.0.last().copied()
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn reset(&mut self, root: StateId) {
        self.0.clear();
        self.0.push(root);
    }

    fn apply(&mut self, transitions: &[Transition]) {
        for transition in transitions {
            match transition {
                Transition::Pop => {
                    self.0.pop();
                }
                Transition::Push(id) => self.0.push(*id),
            }
        }
    }
}

/// Holds back the most recent token so `extend` rules can grow it.
struct Accumulator<F> {
    emit: F,
    pending: Option<Token>,
}

impl<F> Accumulator<F>
where
    F: FnMut(Token) -> Result<()>,
{
    const fn new(emit: F) -> Self {
        Self {
            emit,
            pending: None,
        }
    }

    fn push(&mut self, token: Token, extend: bool) -> Result<()> {
        if extend
            && let Some(pending) = self.pending.as_mut()
            && pending.kind == token.kind
        {
            pending.value.push_str(&token.value);
            return Ok(());
        }
        match self.pending.replace(token) {
            Some(previous) => self.send(previous),
            None => Ok(()),
        }
    }

    fn flush(&mut self) -> Result<()> {
        match self.pending.take() {
            Some(previous) => self.send(previous),
            None => Ok(()),
        }
    }

    fn send(&mut self, token: Token) -> Result<()> {
        trace!(state = %token.state, kind = %token.kind, value = ?token.value, "token");
        (self.emit)(token)
    }
}

/// Append up to `limit` bytes, stopping after the first newline, to `raw`.
/// Returns the number of bytes read; zero means end of input.
pub(crate) fn read_chunk<R: BufRead + ?Sized>(
    reader: &mut R,
    limit: usize,
    raw: &mut Vec<u8>,
) -> io::Result<usize> {
    let taken = loop {
        match reader.fill_buf() {
            Ok(available) => {
                let window = &available[..available.len().min(limit)];
                let taken = window
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(window.len(), |i| i + 1);
                raw.extend_from_slice(&window[..taken]);
                break taken;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    };
    reader.consume(taken);
    Ok(taken)
}

/// Move the decodable prefix of `raw` into `out`.
///
/// An incomplete UTF-8 sequence at the end stays in `raw` until more bytes
/// arrive; invalid sequences (and, at end of input, incomplete ones) become
/// U+FFFD.
pub(crate) fn decode_utf8(raw: &mut Vec<u8>, eof: bool, out: &mut String) {
    let mut start = 0;
    while start < raw.len() {
        match std::str::from_utf8(&raw[start..]) {
            Ok(valid) => {
                out.push_str(valid);
                start = raw.len();
            }
            Err(e) => {
                let valid_end = start + e.valid_up_to();
                out.push_str(&String::from_utf8_lossy(&raw[start..valid_end]));
                match e.error_len() {
                    Some(invalid) => {
                        out.push(char::REPLACEMENT_CHARACTER);
                        start = valid_end + invalid;
                    }
                    None if eof => {
                        out.push(char::REPLACEMENT_CHARACTER);
                        start = raw.len();
                    }
                    None => {
                        start = valid_end;
                        break;
                    }
                }
            }
        }
    }
    raw.drain(..start);
}
