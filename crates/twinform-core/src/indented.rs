//! Indentation codec: block text in the style of YAML.
//!
//! Mappings are written one `key: value` per line, sequences one `- item` per
//! line, and nested containers one level (two spaces) deeper than their
//! parent:
//!
//! ```text
//! Name: John Doe
//! Hobbies:
//!   - reading
//!   - gaming
//! Address:
//!   City: New York
//! ```
//!
//! # Key design decisions
//!
//! - **Cycle suppression**: serialization uses [`CyclePolicy::Suppress`], so a
//!   shared node reached a second time in the same call renders as `null`.
//!   The visited set lives in a context created per call.
//! - **Context-free quoting**: strings are quoted only when they would not
//!   read back as the same string (colons, quotes, control characters, edge
//!   whitespace, or text that looks like another scalar).
//! - **Strict structure**: a line that does not fit the block it appears in is
//!   a [`Error::Format`] carrying its 1-based line number. Nothing is dropped
//!   silently.
//! - **In-place item parsing**: the text after `- ` is re-read as a line of its
//!   own at its real column, so `- key: value` items and nested `- - x`
//!   sequences need no special cases.

use crate::binder::{self, CyclePolicy, FromValue, ToValue};
use crate::dates::DateStyle;
use crate::error::{Error, Result};
use crate::escape::{find_closing_quote, parse_quoted, push_quoted};
use crate::value::{format_number, parse_number, Value, MAX_DEPTH};

const DATES: DateStyle = DateStyle::RoundTrip;

/// Serialize a typed value into indented text. Repeated references to the
/// same shared node render as `null`.
pub fn to_string<T: ToValue + ?Sized>(value: &T) -> Result<String> {
    let tree = binder::to_value(value, DATES, CyclePolicy::Suppress)?;
    let text = render(&tree);
    tracing::debug!(len = text.len(), "rendered indented text");
    Ok(text)
}

/// Parse indented text and bind it onto `T`.
pub fn from_str<T: FromValue>(text: &str) -> Result<T> {
    let tree = parse(text)?;
    binder::from_value(&tree, DATES)
}

// ----------------------------------------------------------------------------
// Rendering
// ----------------------------------------------------------------------------

/// Render a value tree. The output has no trailing newline.
pub fn render(value: &Value) -> String {
    let mut out = String::new();
    match value {
        Value::Map(entries) if !entries.is_empty() => render_map(entries, 0, &mut out),
        Value::Seq(items) if !items.is_empty() => render_seq(items, 0, &mut out),
        leaf => push_leaf(leaf, &mut out),
    }
    if out.ends_with('\n') {
        out.pop();
    }
    out
}

fn render_map(entries: &[(String, Value)], depth: usize, out: &mut String) {
    for (key, value) in entries {
        out.push_str(&make_indent(depth));
        push_text(key, out);
        out.push(':');
        render_child(value, depth, out);
    }
}

fn render_seq(items: &[Value], depth: usize, out: &mut String) {
    for item in items {
        out.push_str(&make_indent(depth));
        out.push('-');
        render_child(item, depth, out);
    }
}

/// Finish a `key:` or `-` line: leaves stay on it, containers go one level
/// deeper on the following lines.
fn render_child(value: &Value, depth: usize, out: &mut String) {
    match value {
        Value::Map(entries) if !entries.is_empty() => {
            out.push('\n');
            render_map(entries, depth + 1, out);
        }
        Value::Seq(items) if !items.is_empty() => {
            out.push('\n');
            render_seq(items, depth + 1, out);
        }
        leaf => {
            out.push(' ');
            push_leaf(leaf, out);
            out.push('\n');
        }
    }
}

/// Emit a scalar or an empty container inline.
fn push_leaf(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&format_number(*n)),
        Value::Str(s) => push_text(s, out),
        Value::Seq(_) => out.push_str("[]"),
        Value::Map(_) => out.push_str("{}"),
    }
}

/// Emit a string or key, quoting only when needed.
fn push_text(s: &str, out: &mut String) {
    if needs_quoting(s) {
        push_quoted(s, out);
    } else {
        out.push_str(s);
    }
}

/// A string must be quoted if, written bare, it would:
/// - lose content (empty, edge whitespace, line breaks, tabs)
/// - be split as `key: value` (colon) or mistaken for a quoted string (`"`)
/// - be read as a list marker (`-`, `- x`)
/// - be read as another scalar (`true`, `false`, `null`, `~`, `[]`, `{}`, numbers)
fn needs_quoting(s: &str) -> bool {
    if s.is_empty() || s != s.trim() {
        return true;
    }
    if s.contains(['\n', '\r', '\t', ':', '"']) {
        return true;
    }
    if is_seq_item(s) {
        return true;
    }
    matches!(s, "true" | "false" | "null" | "~" | "[]" | "{}") || parse_number(s).is_some()
}

/// Two spaces per nesting level.
fn make_indent(depth: usize) -> String {
    "  ".repeat(depth)
}

// ----------------------------------------------------------------------------
// Parsing
// ----------------------------------------------------------------------------

/// A non-blank input line. `text` has its indentation and trailing
/// whitespace removed; `number` is 1-based for error messages.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    number: usize,
    indent: usize,
    text: &'a str,
}

/// Parse indented text into a value tree.
pub fn parse(text: &str) -> Result<Value> {
    tracing::trace!(len = text.len(), "parsing indented text");
    let lines: Vec<Line<'_>> = text
        .split('\n')
        .enumerate()
        .filter_map(|(i, raw)| {
            let raw = raw.trim_end();
            let text = raw.trim_start();
            (!text.is_empty()).then(|| Line {
                number: i + 1,
                indent: count_indent(raw),
                text,
            })
        })
        .collect();
    if lines.is_empty() {
        return Err(Error::InvalidInput("indented text is empty".to_string()));
    }

    let mut parser = Parser {
        lines,
        pos: 0,
        depth: 0,
    };
    let value = parser.parse_block()?;
    if let Some(extra) = parser.peek() {
        return Err(Error::format(
            extra.number,
            "unexpected content after the top-level value",
        ));
    }
    Ok(value)
}

struct Parser<'a> {
    lines: Vec<Line<'a>>,
    pos: usize,
    /// Containers currently open.
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Line<'a>> {
        self.lines.get(self.pos).copied()
    }

    /// Parse the block that starts at the current line. Callers guarantee
    /// there is a current line.
    fn parse_block(&mut self) -> Result<Value> {
        let Some(line) = self.peek() else {
            return Ok(Value::Null);
        };
        let is_sequence = is_seq_item(line.text);
        if !is_sequence && split_entry(line.text).is_none() {
            self.pos += 1;
            return parse_scalar(line.text, line.number);
        }
        if is_sequence {
            self.nested(line, |parser| parser.parse_sequence(line.indent))
        } else {
            self.nested(line, |parser| parser.parse_mapping(line.indent))
        }
    }

    /// Run `parse` for a container starting at `line`, one level deeper.
    fn nested(
        &mut self,
        line: Line<'a>,
        parse: impl FnOnce(&mut Self) -> Result<Value>,
    ) -> Result<Value> {
        if self.depth == MAX_DEPTH {
            return Err(Error::format(
                line.number,
                format!("nesting deeper than {MAX_DEPTH} levels"),
            ));
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    /// Collect `- item` lines at exactly `indent`.
    fn parse_sequence(&mut self, indent: usize) -> Result<Value> {
        let mut items = Vec::new();
        while let Some(line) = self.peek() {
            if line.indent < indent {
                break;
            }
            if line.indent > indent {
                return Err(Error::format(line.number, "unexpected indentation"));
            }
            if !is_seq_item(line.text) {
                break;
            }
            items.push(self.parse_item(line)?);
        }
        Ok(Value::Seq(items))
    }

    /// Parse one sequence item. A bare `-` takes the deeper block that
    /// follows; otherwise the remainder is re-read as a line at its column.
    fn parse_item(&mut self, line: Line<'a>) -> Result<Value> {
        let rest = &line.text[1..];
        let content = rest.trim_start();
        if content.is_empty() {
            self.pos += 1;
            return match self.peek() {
                Some(next) if next.indent > line.indent => self.parse_block(),
                _ => Ok(Value::Null),
            };
        }
        let column = line.indent + 1 + (rest.chars().count() - content.chars().count());
        self.lines[self.pos] = Line {
            number: line.number,
            indent: column,
            text: content,
        };
        self.parse_block()
    }

    /// Collect `key: value` lines at exactly `indent`.
    fn parse_mapping(&mut self, indent: usize) -> Result<Value> {
        let mut entries = Vec::new();
        while let Some(line) = self.peek() {
            if line.indent < indent {
                break;
            }
            if line.indent > indent {
                return Err(Error::format(line.number, "unexpected indentation"));
            }
            if is_seq_item(line.text) {
                return Err(Error::format(
                    line.number,
                    "sequence item where a mapping entry was expected",
                ));
            }
            let (raw_key, rest) = split_entry(line.text)
                .ok_or_else(|| Error::format(line.number, "expected 'key: value'"))?;
            let key = decode_key(raw_key, line.number)?;
            self.pos += 1;

            let value = if rest.is_empty() {
                match self.peek() {
                    Some(next) if next.indent > indent => self.parse_block()?,
                    // `key:` directly followed by `- item` lines at the same indent
                    Some(next) if next.indent == indent && is_seq_item(next.text) => {
                        self.nested(next, |parser| parser.parse_sequence(indent))?
                    }
                    _ => Value::Null,
                }
            } else {
                parse_scalar(rest, line.number)?
            };
            entries.push((key, value));
        }
        Ok(Value::Map(entries))
    }
}

/// Count leading whitespace characters.
fn count_indent(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// `-` alone or followed by whitespace marks a sequence item.
fn is_seq_item(text: &str) -> bool {
    text == "-" || text.starts_with("- ") || text.starts_with("-\t")
}

/// Split `key: rest` at the first colon outside quotes that is followed by
/// whitespace or the end of the line. Returns `None` for scalar lines.
fn split_entry(text: &str) -> Option<(&str, &str)> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => i = find_closing_quote(text, i + 1)?,
            b':' if bytes.get(i + 1).is_none_or(|b| b.is_ascii_whitespace()) => {
                return Some((text[..i].trim_end(), text[i + 1..].trim()));
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn decode_key(raw: &str, line: usize) -> Result<String> {
    if raw.is_empty() {
        return Err(Error::format(line, "empty key"));
    }
    match parse_quoted(raw) {
        Ok(Some(key)) => Ok(key),
        Ok(None) => Ok(raw.to_string()),
        Err(message) => Err(Error::format(line, message)),
    }
}

/// Type inference order: quoted string → null → bool → empty containers →
/// number → bare text.
fn parse_scalar(text: &str, line: usize) -> Result<Value> {
    let text = text.trim();
    match parse_quoted(text) {
        Ok(Some(s)) => return Ok(Value::Str(s)),
        Ok(None) => {}
        Err(message) => return Err(Error::format(line, message)),
    }
    Ok(match text {
        "null" | "~" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "[]" => Value::Seq(Vec::new()),
        "{}" => Value::Map(Vec::new()),
        _ => parse_number(text).map_or_else(|| Value::Str(text.to_string()), Value::Number),
    })
}
