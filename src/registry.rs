//! Tokenizer lookup by name, filename and media type.
//!
//! A [`Registry`] is filled once at startup and read-only afterwards. The
//! binary installs one process-wide with [`install`]; library users may
//! equally keep their own and pass it around.

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::error::{Error, Result};
use crate::lexer::LexerSpec;
use crate::lexers;
use crate::tokenizer::Tokenizer;

static GLOBAL: OnceCell<Registry> = OnceCell::new();

/// Registered tokenizers, searched in registration order.
#[derive(Debug, Default)]
pub struct Registry {
    tokenizers: Vec<Tokenizer>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in HTTP, JSON, HTML and CSS tokenizers.
    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::new();
        lexers::register_builtins(&mut registry)?;
        Ok(registry)
    }

    /// Add a tokenizer. Names must be unique.
    pub fn register(&mut self, tokenizer: Tokenizer) -> Result<()> {
        if self.lookup_by_name(tokenizer.name()).is_some() {
            return Err(Error::DuplicateTokenizer(tokenizer.name().to_owned()));
        }
        debug!(tokenizer = tokenizer.name(), "registered tokenizer");
        self.tokenizers.push(tokenizer);
        Ok(())
    }

    /// Compile a lexer definition and register the result.
    pub fn register_spec(&mut self, spec: &LexerSpec) -> Result<()> {
        self.register(Tokenizer::from_spec(spec)?)
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<&Tokenizer> {
        self.tokenizers.iter().find(|t| t.name() == name)
    }

    /// First tokenizer with a filename glob matching `filename`.
    pub fn lookup_by_filename(&self, filename: &str) -> Option<&Tokenizer> {
        self.tokenizers
            .iter()
            .find(|t| t.lexer().accepts_filename(filename))
    }

    /// First tokenizer registered for `media_type`.
    ///
    /// Parameters (`; charset=utf-8`) are ignored and the comparison is
    /// case-insensitive. A value that is not `type/subtype` is an error.
    pub fn lookup_by_media_type(&self, media_type: &str) -> Result<Option<&Tokenizer>> {
        let essence = essence(media_type)?;
        Ok(self
            .tokenizers
            .iter()
            .find(|t| t.lexer().accepts_media_type(&essence)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tokenizer> {
        self.tokenizers.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tokenizers.iter().map(Tokenizer::name)
    }

    pub fn len(&self) -> usize {
        self.tokenizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokenizers.is_empty()
    }
}

/// Install the process-wide registry. Fails if one is already installed.
pub fn install(registry: Registry) -> Result<&'static Registry> {
    GLOBAL
        .try_insert(registry)
        .map_err(|_| Error::RegistryInstalled)
}

/// The process-wide registry, if [`install`] has been called.
pub fn global() -> Option<&'static Registry> {
    GLOBAL.get()
}

/// Lowercased `type/subtype` of a media type, without parameters.
pub fn essence(media_type: &str) -> Result<String> {
    let unrecognized = || Error::UnrecognizedMediaType(media_type.to_owned());
    let base = media_type.split(';').next().unwrap_or_default().trim();
    let (kind, subtype) = base.split_once('/').ok_or_else(unrecognized)?;
    if !is_token(kind) || !is_token(subtype) {
        return Err(unrecognized());
    }
    Ok(base.to_ascii_lowercase())
}

/// RFC 7230 `token` characters.
fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}
