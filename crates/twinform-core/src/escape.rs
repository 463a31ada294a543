//! String escaping shared by both codecs.
//!
//! Both formats use the same five escape sequences inside double quotes:
//! `\\`, `\"`, `\n`, `\r` and `\t`.

/// Append `s` to `out` as a double-quoted, escaped string.
pub(crate) fn push_quoted(s: &str, out: &mut String) {
    out.push('"');
    for ch in s.chars() {
        match escape_code(ch) {
            Some(code) => {
                out.push('\\');
                out.push(code);
            }
            None => out.push(ch),
        }
    }
    out.push('"');
}

/// The letter written after `\` for characters that must be escaped.
fn escape_code(ch: char) -> Option<char> {
    match ch {
        '\\' | '"' => Some(ch),
        '\n' => Some('n'),
        '\r' => Some('r'),
        '\t' => Some('t'),
        _ => None,
    }
}

/// Inverse of [`escape_code`].
fn unescape_code(code: char) -> Option<char> {
    match code {
        '\\' | '"' => Some(code),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        _ => None,
    }
}

/// Reverse [`push_quoted`] on the content between the quotes.
/// Unknown escape sequences are kept verbatim.
pub(crate) fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(slash) = rest.find('\\') {
        out.push_str(&rest[..slash]);
        let mut tail = rest[slash + 1..].chars();
        match tail.next() {
            Some(code) => match unescape_code(code) {
                Some(ch) => out.push(ch),
                None => {
                    out.push('\\');
                    out.push(code);
                }
            },
            None => out.push('\\'),
        }
        rest = tail.as_str();
    }
    out.push_str(rest);
    out
}

/// Byte position of the quote that ends a string whose content starts at
/// `start`. A backslash always consumes the byte after it.
pub(crate) fn find_closing_quote(s: &str, start: usize) -> Option<usize> {
    let mut escaped = false;
    for (offset, byte) in s.get(start..)?.bytes().enumerate() {
        match byte {
            _ if escaped => escaped = false,
            b'\\' => escaped = true,
            b'"' => return Some(start + offset),
            _ => {}
        }
    }
    None
}

/// If `s` is exactly one quoted string, return its unescaped content.
///
/// `Ok(None)` means `s` does not start with a quote. A string that is never
/// closed, or is followed by more text, is an error described by the message.
pub(crate) fn parse_quoted(s: &str) -> Result<Option<String>, &'static str> {
    if !s.starts_with('"') {
        return Ok(None);
    }
    match find_closing_quote(s, 1) {
        Some(end) if end == s.len() - 1 => Ok(Some(unescape(&s[1..end]))),
        Some(_) => Err("unexpected characters after closing quote"),
        None => Err("unterminated string"),
    }
}
