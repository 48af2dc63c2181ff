//! Command-line argument definitions for `hilite`.
//!
//! Uses [`clap`] derive macros for argument parsing.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

/// Colorize HTTP messages, JSON, HTML and CSS for the terminal.
///
/// Reads FILE (or stdin), picks a tokenizer from `--lexer`, `--content-type`
/// or the file name, and writes the colorized result to stdout. Input no
/// tokenizer claims is copied through unchanged.
#[derive(Debug, Parser)]
#[command(name = "hilite", version, about, long_about = None)]
pub struct Cli {
    /// File to read. Reads stdin when absent or `-`.
    pub file: Option<PathBuf>,

    /// Control color output.
    ///
    /// `auto` enables colors only when stdout is a TTY and `NO_COLOR` is unset.
    #[arg(short = 'c', long, value_enum)]
    pub color: Option<ColorMode>,

    /// Use the tokenizer with this name.
    #[arg(short = 'l', long, conflicts_with_all = ["content_type", "http"])]
    pub lexer: Option<String>,

    /// Pick the tokenizer registered for this media type.
    #[arg(short = 't', long, value_parser = parse_media_type_arg, conflicts_with = "http")]
    pub content_type: Option<String>,

    /// Treat the input as an HTTP message: headers, blank line, body.
    ///
    /// The body is tokenized according to its `Content-Type` header.
    #[arg(long)]
    pub http: bool,

    /// Print one line per token (state, type, value) instead of the text.
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// List the registered tokenizers and exit.
    #[arg(long)]
    pub list: bool,

    /// Path to configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Upper bound, in bytes, of a single read from the input.
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub chunk_size: Option<usize>,

    /// Capacity of each queue between filter stages.
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub queue_capacity: Option<usize>,

    /// Log more to stderr. Repeat for more detail (`-vv`, `-vvv`).
    ///
    /// `RUST_LOG` takes precedence when set.
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Enable colors only when stdout is a TTY.
    Auto,
    /// Always enable colors.
    Always,
    /// Never enable colors.
    Never,
}

/// Accept `type/subtype`, optionally followed by parameters.
fn parse_media_type_arg(s: &str) -> Result<String, String> {
    crate::registry::essence(s)
        .map(|_| s.trim().to_owned())
        .map_err(|_| format!("invalid media type '{s}': expected type/subtype, e.g. application/json"))
}
