//! Terminal rendering of token streams.
//!
//! A [`Theme`] assigns an [`owo_colors::Style`] to every [`TokenType`].
//! Tokens are written either colorized, as plain text, or as a debug dump
//! showing state, type and value of each token.

use std::collections::HashMap;
use std::io::{self, Write};

use owo_colors::{OwoColorize, Style};

use crate::token::{Token, TokenType};

/// Styles per token type.
#[derive(Debug, Clone)]
pub struct Theme {
    styles: HashMap<TokenType, Style>,
}

impl Default for Theme {
    fn default() -> Self {
        let styles = TokenType::ALL
            .into_iter()
            .map(|kind| (kind, Self::default_style(kind)))
            .collect();
        Self { styles }
    }
}

impl Theme {
    /// The built-in style for `kind`.
    pub fn default_style(kind: TokenType) -> Style {
        match kind {
            TokenType::Error => Style::new().red().bold(),
            TokenType::Comment => Style::new().white().dimmed(),
            TokenType::Text => Style::new().bright_white(),
            TokenType::Number => Style::new().bright_magenta(),
            TokenType::String => Style::new().bright_green(),
            TokenType::Attribute => Style::new().green().bold(),
            TokenType::Assignment => Style::new().yellow().dimmed(),
            TokenType::Operator => Style::new().green(),
            TokenType::Punctuation => Style::new().yellow(),
            TokenType::Constant => Style::new().blue().bold(),
            TokenType::Entity => Style::new().bright_yellow(),
            TokenType::Whitespace => Style::new().white(),
        }
    }

    pub fn style(&self, kind: TokenType) -> Style {
        self.styles
            .get(&kind)
            .copied()
            .unwrap_or_else(|| Self::default_style(kind))
    }

    pub fn set(&mut self, kind: TokenType, style: Style) {
        self.styles.insert(kind, style);
    }

    /// Apply `[colors]` overrides from the config file. Keys are token type
    /// names, values are style descriptions accepted by [`parse_style`].
    /// Unknown token types are returned so the caller can report them.
    pub fn apply_overrides<'a>(
        &mut self,
        overrides: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> Vec<String> {
        let mut unknown = Vec::new();
        for (name, description) in overrides {
            match TokenType::from_str_loose(name) {
                Some(kind) => self.set(kind, parse_style(description)),
                None => unknown.push(name.clone()),
            }
        }
        unknown
    }
}

/// Parse a style description such as `"green"`, `"bright_blue bold"` or
/// `"yellow dimmed underline"`.
///
/// Words are case-insensitive. The last color word wins; unknown words are
/// ignored.
pub fn parse_style(description: &str) -> Style {
    description
        .split_whitespace()
        .fold(Style::new(), |style, word| match word.to_lowercase().as_str() {
            "black" => style.black(),
            "red" => style.red(),
            "green" => style.green(),
            "yellow" => style.yellow(),
            "blue" => style.blue(),
            "magenta" | "purple" => style.magenta(),
            "cyan" => style.cyan(),
            "white" => style.white(),
            "bright_black" | "gray" | "grey" => style.bright_black(),
            "bright_red" => style.bright_red(),
            "bright_green" => style.bright_green(),
            "bright_yellow" => style.bright_yellow(),
            "bright_blue" => style.bright_blue(),
            "bright_magenta" => style.bright_magenta(),
            "bright_cyan" => style.bright_cyan(),
            "bright_white" => style.bright_white(),
            "bold" => style.bold(),
            "dimmed" | "dim" | "faint" => style.dimmed(),
            "italic" => style.italic(),
            "underline" => style.underline(),
            _ => style,
        })
}

/// Write one token, styled when `use_color` is set.
pub fn render_token<W: Write + ?Sized>(
    token: &Token,
    theme: &Theme,
    use_color: bool,
    out: &mut W,
) -> io::Result<()> {
    if use_color && !token.value.is_empty() {
        write!(out, "{}", token.value.style(theme.style(token.kind)))
    } else {
        out.write_all(token.value.as_bytes())
    }
}

/// Write one token as a `state  type  "value"` debug line.
pub fn render_debug<W: Write + ?Sized>(token: &Token, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "{:>24}\t{:>12}\t{:?}",
        token.state,
        token.kind.as_str(),
        token.value
    )
}
