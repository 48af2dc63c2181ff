//! Tokenizing a whole HTTP message: the head with the `http` tokenizer, the
//! body with whichever tokenizer its `Content-Type` selects.

use std::io::{BufRead, Cursor, Read};

use tracing::{debug, warn};

use crate::error::Result;
use crate::lexer::{self, Completion};
use crate::registry::Registry;
use crate::token::{Token, TokenType};
use crate::tokenizer::{TokenizeOptions, Tokenizer};

/// Name of the tokenizer used for the message head.
pub const HEAD_TOKENIZER: &str = "http";

/// Tokenize an HTTP message read from `reader`, passing every token to `sink`.
///
/// A body whose media type has no registered tokenizer, whose
/// `Content-Type` is malformed, or that has no `Content-Type` at all is
/// passed through verbatim as [`TokenType::Text`] tokens. So is the whole
/// input when `registry` has no `http` tokenizer.
pub fn tokenize_message<R, S>(
    registry: &Registry,
    reader: &mut R,
    options: &TokenizeOptions,
    mut sink: S,
) -> Result<()>
where
    R: BufRead + Send + ?Sized,
    S: FnMut(Token) -> Result<()>,
{
    let Some(head) = registry.lookup_by_name(HEAD_TOKENIZER) else {
        warn!("no '{HEAD_TOKENIZER}' tokenizer registered, passing message through");
        return passthrough(reader, options.chunk_size, sink);
    };

    let mut scan = HeaderScan::default();
    let completion = head.tokenize_with(reader, options, |token| {
        scan.observe(&token);
        sink(token)
    })?;

    let Completion::Halted { remainder } = completion else {
        // No blank line after the headers, so there is no body.
        return Ok(());
    };
    let mut body = Cursor::new(remainder.into_bytes()).chain(&mut *reader);

    match body_tokenizer(registry, scan.content_type.as_deref()) {
        Some(tokenizer) => {
            debug!(tokenizer = tokenizer.name(), "tokenizing message body");
            tokenizer.tokenize_with(&mut body, options, sink)?;
            Ok(())
        }
        None => passthrough(&mut body, options.chunk_size, sink),
    }
}

fn body_tokenizer<'r>(registry: &'r Registry, content_type: Option<&str>) -> Option<&'r Tokenizer> {
    let content_type = content_type?;
    match registry.lookup_by_media_type(content_type) {
        Ok(found) => {
            if found.is_none() {
                debug!(content_type, "no tokenizer for media type, passing body through");
            }
            found
        }
        Err(e) => {
            warn!(error = %e, "passing body through");
            None
        }
    }
}

/// Emit the rest of `reader` as text, one token per chunk.
pub fn passthrough<R, S>(reader: &mut R, chunk_size: usize, mut sink: S) -> Result<()>
where
    R: BufRead + ?Sized,
    S: FnMut(Token) -> Result<()>,
{
    let chunk_size = chunk_size.max(1);
    let mut raw = Vec::with_capacity(chunk_size);
    let mut text = String::new();
    loop {
        let eof = lexer::read_chunk(reader, chunk_size, &mut raw)? == 0;
        lexer::decode_utf8(&mut raw, eof, &mut text);
        if !text.is_empty() {
            sink(Token::new(TokenType::Text, std::mem::take(&mut text)))?;
        }
        if eof {
            return Ok(());
        }
    }
}

/// Watches head tokens for the `Content-Type` field value.
#[derive(Debug, Default)]
struct HeaderScan {
    in_content_type: bool,
    value: String,
    content_type: Option<String>,
}

impl HeaderScan {
    fn observe(&mut self, token: &Token) {
        match token.kind {
            TokenType::Attribute => {
                self.in_content_type = token.value.trim().eq_ignore_ascii_case("content-type");
                self.value.clear();
            }
            TokenType::Text | TokenType::Punctuation if self.in_content_type => {
                self.value.push_str(&token.value);
            }
            TokenType::Whitespace if self.in_content_type && token.value.contains('\n') => {
                self.in_content_type = false;
                self.content_type = Some(self.value.trim().to_owned());
            }
            _ => {}
        }
    }
}
