//! Token filters: pipeline stages that rewrite a token stream.
//!
//! Filters are built from [`FilterSpec`] entries in lexer definitions, or
//! supplied directly as [`Stage`] implementations.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::lexers::json::JsonFormatter;
use crate::pipeline::{Inlet, Outlet, Pipeline, Stage};
use crate::token::Token;

/// A shareable token filter.
pub type FilterStage = Arc<dyn Stage<Token>>;

/// An ordered list of filter stages.
#[derive(Clone, Default)]
pub struct Filters(Vec<FilterStage>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stage: FilterStage) {
        self.0.push(stage);
    }

    pub fn stages(&self) -> &[FilterStage] {
        &self.0
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|stage| stage.name())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Run a finished token list through every stage.
    pub fn apply(&self, tokens: Vec<Token>) -> Result<Vec<Token>> {
        let mut out = Vec::with_capacity(tokens.len());
        Pipeline::new(&self.0).run(
            move |outlet: &Outlet<Token>| {
                for token in tokens {
                    outlet.send(token)?;
                }
                Ok(())
            },
            |token| {
                out.push(token);
                Ok(())
            },
        )?;
        Ok(out)
    }
}

impl fmt::Debug for Filters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl FromIterator<FilterStage> for Filters {
    fn from_iter<I: IntoIterator<Item = FilterStage>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Drops tokens with an empty value.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropEmpty;

impl Stage<Token> for DropEmpty {
    fn name(&self) -> &str {
        "drop-empty"
    }

    fn process(&self, input: Inlet<Token>, output: &Outlet<Token>) -> Result<()> {
        for token in input.filter(|token| !token.is_empty()) {
            output.send(token)?;
        }
        Ok(())
    }
}

/// Joins consecutive tokens of the same type into one.
///
/// Empty tokens are skipped, so the result does not depend on whether
/// [`DropEmpty`] runs before or after.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeAdjacent;

impl Stage<Token> for MergeAdjacent {
    fn name(&self) -> &str {
        "merge-adjacent"
    }

    fn process(&self, input: Inlet<Token>, output: &Outlet<Token>) -> Result<()> {
        let mut pending: Option<Token> = None;
        for token in input {
            if token.is_empty() {
                continue;
            }
            if let Some(prev) = pending.as_mut()
                && prev.kind == token.kind
            {
                prev.value.push_str(&token.value);
                continue;
            }
            if let Some(prev) = pending.replace(token) {
                output.send(prev)?;
            }
        }
        if let Some(prev) = pending {
            output.send(prev)?;
        }
        Ok(())
    }
}

/// A stage built from a per-token closure.
///
/// The closure may emit any number of tokens through the outlet.
pub struct FnStage<F> {
    name: String,
    f: F,
}

impl<F> Stage<Token> for FnStage<F>
where
    F: Fn(Token, &Outlet<Token>) -> Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, input: Inlet<Token>, output: &Outlet<Token>) -> Result<()> {
        for token in input {
            (self.f)(token, output)?;
        }
        Ok(())
    }
}

/// Wrap a closure as a named filter stage.
pub fn from_fn<F>(name: impl Into<String>, f: F) -> FilterStage
where
    F: Fn(Token, &Outlet<Token>) -> Result<()> + Send + Sync + 'static,
{
    Arc::new(FnStage {
        name: name.into(),
        f,
    })
}

fn default_indent() -> String {
    "  ".to_owned()
}

/// A filter as named in a lexer definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "kebab-case")]
pub enum FilterSpec {
    DropEmpty,
    MergeAdjacent,
    /// Re-indent JSON punctuation; see [`JsonFormatter`].
    JsonFormat {
        #[serde(default = "default_indent")]
        indent: String,
    },
}

impl FilterSpec {
    pub fn build(&self) -> FilterStage {
        match self {
            Self::DropEmpty => Arc::new(DropEmpty),
            Self::MergeAdjacent => Arc::new(MergeAdjacent),
            Self::JsonFormat { indent } => Arc::new(JsonFormatter::new(indent.clone())),
        }
    }
}
