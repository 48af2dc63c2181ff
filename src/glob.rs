//! Shell-style filename patterns, compiled to anchored regular expressions.
//!
//! Supported syntax: `*` (any run of characters except `/`), `?` (one
//! character except `/`), `[abc]`, `[a-z]`, negated `[!abc]` or `[^abc]`,
//! and `\` to escape the next character.

use std::fmt;

use regex::Regex;

/// A compiled filename glob.
#[derive(Clone)]
pub struct Glob {
    pattern: String,
    regex: Regex,
    /// Patterns without a `/` are matched against the last path component.
    basename_only: bool,
}

impl Glob {
    /// Compile `pattern`, returning a human-readable reason on failure.
    pub fn new(pattern: &str) -> Result<Self, String> {
        let translated = translate(pattern)?;
        let regex = Regex::new(&translated).map_err(|e| e.to_string())?;
        Ok(Self {
            pattern: pattern.to_owned(),
            regex,
            basename_only: !pattern.contains('/'),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, filename: &str) -> bool {
        let subject = if self.basename_only {
            filename.rsplit('/').next().unwrap_or(filename)
        } else {
            filename
        };
        self.regex.is_match(subject)
    }
}

impl fmt::Debug for Glob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Glob").field(&self.pattern).finish()
    }
}

impl fmt::Display for Glob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

fn translate(pattern: &str) -> Result<String, String> {
    let mut out = String::with_capacity(pattern.len() * 2 + 4);
    out.push_str("^(?s:");
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '\\' => {
                let escaped = chars
                    .next()
                    .ok_or_else(|| "trailing backslash".to_owned())?;
                push_literal(&mut out, escaped);
            }
            '[' => translate_class(&mut chars, &mut out)?,
            c => push_literal(&mut out, c),
        }
    }
    out.push_str(")$");
    Ok(out)
}

fn translate_class(chars: &mut std::str::Chars<'_>, out: &mut String) -> Result<(), String> {
    let mut class = String::new();
    let mut negated = false;
    let mut first = true;
    loop {
        let c = chars
            .next()
            .ok_or_else(|| "unterminated character class".to_owned())?;
        match c {
            '!' | '^' if first && !negated => {
                negated = true;
                continue;
            }
            ']' if class.is_empty() => return Err("empty character class".to_owned()),
            ']' => break,
            '\\' => {
                let escaped = chars
                    .next()
                    .ok_or_else(|| "trailing backslash".to_owned())?;
                push_class_literal(&mut class, escaped);
            }
            '-' if !class.is_empty() => class.push('-'),
            c => push_class_literal(&mut class, c),
        }
        first = false;
    }
    out.push('[');
    if negated {
        out.push('^');
    }
    out.push_str(&class);
    out.push(']');
    Ok(())
}

fn push_literal(out: &mut String, c: char) {
    let mut buf = [0; 4];
    out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

fn push_class_literal(class: &mut String, c: char) {
    if matches!(c, '[' | ']' | '\\' | '^' | '-' | '&' | '~') {
        class.push('\\');
    }
    class.push(c);
}
