//! Configuration management with TOML file support.
//!
//! Merges settings from three sources (highest precedence first):
//! 1. CLI flags
//! 2. Config file (`~/.config/hilite/config.toml` or `$XDG_CONFIG_HOME/hilite/config.toml`)
//! 3. Built-in defaults

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::cli::{Cli, ColorMode};
use crate::error::{Error, Result};
use crate::lexer::{self, LexerSpec};
use crate::lexers::{self, json};
use crate::output::Theme;
use crate::pipeline;
use crate::registry::Registry;
use crate::tokenizer::TokenizeOptions;

/// Runtime configuration merged from defaults, config file, and CLI arguments.
///
/// Use [`Config::from_cli`] to build from parsed CLI arguments, or
/// [`Config::default`] for built-in defaults (useful in tests and benchmarks).
#[derive(Debug, Clone)]
pub struct Config {
    /// Color output mode (auto/always/never).
    pub color_mode: ColorMode,
    /// Upper bound, in bytes, of a single read from the input.
    pub chunk_size: usize,
    /// Capacity of each queue between filter stages.
    pub queue_capacity: usize,
    /// Per-level indent of the JSON formatter.
    pub indent: String,
    /// Style overrides keyed by token type name.
    pub colors: HashMap<String, String>,
    /// Extra lexer definitions (TOML or JSON) registered after the built-ins.
    pub lexers: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            color_mode: ColorMode::Auto,
            chunk_size: lexer::DEFAULT_CHUNK_SIZE,
            queue_capacity: pipeline::DEFAULT_QUEUE_CAPACITY,
            indent: json::DEFAULT_INDENT.to_string(),
            colors: HashMap::new(),
            lexers: Vec::new(),
        }
    }
}

impl Config {
    /// Build a [`Config`] from CLI arguments, loading the config file if present.
    ///
    /// Merge precedence: CLI flags > config file > defaults.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = Self::default();

        let config_path = cli.config.clone().unwrap_or_else(Self::default_config_path);
        if config_path.exists() {
            let file_config = FileConfig::load(&config_path)?;
            let base = config_path.parent().unwrap_or_else(|| Path::new("."));
            config.apply_file_config(file_config, base);
            debug!(path = %config_path.display(), "loaded config file");
        } else if cli.config.is_some() {
            return Err(Error::Config(format!(
                "config file {} does not exist",
                config_path.display()
            )));
        }

        if let Some(color) = cli.color {
            config.color_mode = color;
        }
        if let Some(chunk_size) = cli.chunk_size {
            config.chunk_size = chunk_size;
        }
        if let Some(queue_capacity) = cli.queue_capacity {
            config.queue_capacity = queue_capacity;
        }
        config.validate()?;

        Ok(config)
    }

    /// Default config file path: `$XDG_CONFIG_HOME/hilite/config.toml` or `~/.config/hilite/config.toml`.
    fn default_config_path() -> PathBuf {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(xdg).join("hilite").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("hilite")
                .join("config.toml")
        } else {
            PathBuf::from(".config/hilite/config.toml")
        }
    }

    /// Apply settings from a parsed config file. Relative lexer paths are
    /// resolved against `base`, the directory holding the config file.
    fn apply_file_config(&mut self, file: FileConfig, base: &Path) {
        if let Some(color) = file.color {
            self.color_mode = match color.as_str() {
                "always" => ColorMode::Always,
                "never" => ColorMode::Never,
                _ => ColorMode::Auto,
            };
        }
        if let Some(chunk_size) = file.chunk_size {
            self.chunk_size = chunk_size;
        }
        if let Some(queue_capacity) = file.queue_capacity {
            self.queue_capacity = queue_capacity;
        }
        if let Some(indent) = file.indent {
            self.indent = indent;
        }
        if let Some(colors) = file.colors {
            self.colors = colors;
        }
        if let Some(lexers) = file.lexers {
            self.lexers = lexers.into_iter().map(|path| base.join(path)).collect();
        }
    }

    fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Config("chunk_size must be at least 1".into()));
        }
        if self.queue_capacity == 0 {
            return Err(Error::Config("queue_capacity must be at least 1".into()));
        }
        Ok(())
    }

    pub const fn tokenize_options(&self) -> TokenizeOptions {
        TokenizeOptions {
            chunk_size: self.chunk_size,
            queue_capacity: self.queue_capacity,
        }
    }

    /// The built-in tokenizers followed by every configured lexer file.
    pub fn build_registry(&self) -> Result<Registry> {
        let mut registry = Registry::new();
        for spec in lexers::builtin_specs(&self.indent) {
            registry.register_spec(&spec)?;
        }
        for path in &self.lexers {
            let spec = LexerSpec::load(path)?;
            registry.register_spec(&spec)?;
            debug!(lexer = %spec.name, path = %path.display(), "loaded lexer definition");
        }
        Ok(registry)
    }

    /// The default theme with `[colors]` overrides applied.
    pub fn theme(&self) -> Theme {
        let mut theme = Theme::default();
        for name in theme.apply_overrides(&self.colors) {
            warn!(token_type = %name, "ignoring color for unknown token type");
        }
        theme
    }
}

/// Config file structure (TOML deserialization).
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    color: Option<String>,
    chunk_size: Option<usize>,
    queue_capacity: Option<usize>,
    indent: Option<String>,
    colors: Option<HashMap<String, String>>,
    lexers: Option<Vec<PathBuf>>,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}
