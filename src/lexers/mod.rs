//! Built-in lexer definitions.
//!
//! Each submodule exposes a `spec()` returning plain [`LexerSpec`] data.
//! Nothing registers itself; [`register_builtins`] is called explicitly.

pub mod css;
pub mod html;
pub mod http;
pub mod json;

use crate::error::Result;
use crate::lexer::LexerSpec;
use crate::registry::Registry;

/// Every built-in definition, in registration order. `json_indent` is the
/// per-level indent of the JSON formatter.
pub fn builtin_specs(json_indent: &str) -> Vec<LexerSpec> {
    vec![
        http::spec(),
        json::spec_with_indent(json_indent),
        html::spec(),
        css::spec(),
    ]
}

/// Register the built-in tokenizers with default settings.
pub fn register_builtins(registry: &mut Registry) -> Result<()> {
    for spec in builtin_specs(json::DEFAULT_INDENT) {
        registry.register_spec(&spec)?;
    }
    Ok(())
}
