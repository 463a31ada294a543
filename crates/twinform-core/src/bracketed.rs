//! Bracketed codec: compact `{}`/`[]` text, JSON-like.
//!
//! Rendering emits no whitespace: `{"Name":"Ada","Tags":["a","b"]}`.
//! Parsing dispatches on the first character and splits container interiors
//! into top-level tokens with a single-pass scanner that tracks string state
//! and bracket depth.
//!
//! Reference cycles cannot be expressed in this format, so serializing a
//! cyclic graph fails with [`Error::CyclicGraph`].
//!
//! # Example
//! ```
//! use twinform_core::bracketed;
//!
//! let text = bracketed::to_string(&vec!["one", "two"]).unwrap();
//! assert_eq!(text, r#"["one","two"]"#);
//! let back: Vec<String> = bracketed::from_str(&text).unwrap();
//! assert_eq!(back, ["one", "two"]);
//! ```

use crate::binder::{self, CyclePolicy, FromValue, ToValue};
use crate::dates::DateStyle;
use crate::error::{Error, Result};
use crate::escape::{find_closing_quote, parse_quoted, push_quoted};
use crate::value::{format_number, parse_number, Value, MAX_DEPTH};

const DATES: DateStyle = DateStyle::Compact;

/// Serialize a typed value into compact bracketed text.
pub fn to_string<T: ToValue + ?Sized>(value: &T) -> Result<String> {
    let tree = binder::to_value(value, DATES, CyclePolicy::Reject)?;
    let text = render(&tree);
    tracing::debug!(len = text.len(), "rendered bracketed text");
    Ok(text)
}

/// Parse bracketed text and bind it onto `T`.
pub fn from_str<T: FromValue>(text: &str) -> Result<T> {
    let tree = parse(text)?;
    binder::from_value(&tree, DATES)
}

/// Render a value tree without any whitespace.
pub fn render(value: &Value) -> String {
    let mut out = String::new();
    render_into(value, &mut out);
    out
}

fn render_into(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&format_number(*n)),
        Value::Str(s) => push_quoted(s, out),
        Value::Seq(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                render_into(item, out);
            }
            out.push(']');
        }
        Value::Map(entries) => {
            out.push('{');
            for (i, (key, item)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                push_quoted(key, out);
                out.push(':');
                render_into(item, out);
            }
            out.push('}');
        }
    }
}

/// Parse bracketed text into a value tree. Empty text is
/// [`Error::InvalidInput`]; syntax errors name the byte offset they occur at.
pub fn parse(text: &str) -> Result<Value> {
    tracing::trace!(len = text.len(), "parsing bracketed text");
    let token = Token::whole(text);
    if token.text.is_empty() {
        return Err(Error::InvalidInput("bracketed text is empty".to_string()));
    }
    parse_value(token, 0)
}

/// A slice of the input together with the byte offset it starts at.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Token<'a> {
    at: usize,
    text: &'a str,
}

impl<'a> Token<'a> {
    fn whole(text: &'a str) -> Self {
        Token { at: 0, text }.trimmed(0, text.len())
    }

    /// `text[start..end]` with surrounding whitespace removed.
    fn trimmed(self, start: usize, end: usize) -> Self {
        let raw = &self.text[start..end];
        let text = raw.trim_start();
        Token {
            at: self.at + start + (raw.len() - text.len()),
            text: text.trim_end(),
        }
    }

    fn error_at(self, offset: usize, message: &str) -> Error {
        Error::format(0, format!("{message} at byte {}", self.at + offset))
    }

    fn error(self, message: &str) -> Error {
        self.error_at(0, message)
    }
}

/// Dispatch on the first character of a trimmed token. `depth` counts the
/// containers already open around it.
fn parse_value(token: Token<'_>, depth: usize) -> Result<Value> {
    match token.text.as_bytes().first() {
        None => Err(token.error("expected a value, found nothing")),
        Some(b'{' | b'[') if depth == MAX_DEPTH => {
            Err(token.error(&format!("nesting deeper than {MAX_DEPTH} levels")))
        }
        Some(b'{') => parse_object(token, depth + 1),
        Some(b'[') => parse_array(token, depth + 1),
        Some(b'"') => parse_string(token).map(Value::Str),
        Some(_) => parse_literal(token),
    }
}

fn parse_literal(token: Token<'_>) -> Result<Value> {
    match token.text {
        "null" => Ok(Value::Null),
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        text => parse_number(text)
            .map(Value::Number)
            .ok_or_else(|| token.error(&format!("unexpected token '{text}'"))),
    }
}

fn parse_string(token: Token<'_>) -> Result<String> {
    match parse_quoted(token.text) {
        Ok(Some(s)) => Ok(s),
        Ok(None) => Err(token.error("expected a string")),
        Err(message) => Err(token.error(message)),
    }
}

fn parse_array(token: Token<'_>, depth: usize) -> Result<Value> {
    let interior = strip_brackets(token, ']')?;
    split_tokens(interior)?
        .into_iter()
        .map(|item| parse_value(item, depth))
        .collect::<Result<Vec<_>>>()
        .map(Value::Seq)
}

fn parse_object(token: Token<'_>, depth: usize) -> Result<Value> {
    let interior = strip_brackets(token, '}')?;
    let mut entries = Vec::new();
    for member in split_tokens(interior)? {
        let colon = find_member_colon(member.text)
            .ok_or_else(|| member.error("object member without ':'"))?;
        let key = parse_string(member.trimmed(0, colon))?;
        let value = parse_value(member.trimmed(colon + 1, member.text.len()), depth)?;
        entries.push((key, value));
    }
    Ok(Value::Map(entries))
}

/// Check the closing bracket and return the text between the brackets.
fn strip_brackets(token: Token<'_>, close: char) -> Result<Token<'_>> {
    let text = token.text;
    if text.len() < 2 || !text.ends_with(close) {
        return Err(token.error_at(text.len(), &format!("missing closing '{close}'")));
    }
    Ok(Token {
        at: token.at + 1,
        text: &text[1..text.len() - 1],
    })
}

/// Split a container interior at top-level commas, returning trimmed tokens.
///
/// A comma splits only outside strings and at depth 0. Unbalanced brackets,
/// unterminated strings and empty elements are errors; an all-whitespace
/// interior yields no tokens.
fn split_tokens(interior: Token<'_>) -> Result<Vec<Token<'_>>> {
    let text = interior.text;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut depth: usize = 0;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                i = find_closing_quote(text, i + 1)
                    .ok_or_else(|| interior.error_at(i, "unterminated string"))?;
            }
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    interior.error_at(i, &format!("unmatched '{}'", bytes[i] as char))
                })?;
            }
            b',' if depth == 0 => {
                tokens.push(non_empty(interior.trimmed(start, i))?);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if depth != 0 {
        return Err(interior.error_at(text.len(), "unclosed bracket"));
    }
    tokens.push(non_empty(interior.trimmed(start, text.len()))?);
    Ok(tokens)
}

fn non_empty(token: Token<'_>) -> Result<Token<'_>> {
    if token.text.is_empty() {
        return Err(token.error("empty element"));
    }
    Ok(token)
}

/// Position of the first `:` outside a string.
fn find_member_colon(member: &str) -> Option<usize> {
    let bytes = member.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => i = find_closing_quote(member, i + 1)?,
            b':' => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}
