//! Bracket-aware walking over script text.
//!
//! The payload is never parsed. These helpers only know enough about the
//! language to step over string literals and comments, so that brackets,
//! separators and keywords inside them are not mistaken for structure.

use std::sync::LazyLock;

use regex::Regex;

static BARE_CALL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_$][\w$]*)\s*\(\s*\)$").unwrap());

static IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][\w$]*$").unwrap());

/// Visit every code byte of `text` outside string literals and comments.
///
/// `visit` receives the byte offset, the byte, and the bracket depth in
/// effect: an opening bracket is reported at the depth outside it, a closing
/// bracket at the depth after it closed. A closing bracket without a matching
/// opener is reported at depth `-1`. Returning `false` stops the walk.
pub fn walk_code(text: &str, mut visit: impl FnMut(usize, u8, isize) -> bool) {
    let bytes = text.as_bytes();
    let mut depth: isize = 0;
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];
        match byte {
            b'"' | b'\'' | b'`' => {
                i = skip_string(bytes, i).unwrap_or(bytes.len());
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = memchr(bytes, i, b'\n').unwrap_or(bytes.len());
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = find_subslice(bytes, i + 2, b"*/").map_or(bytes.len(), |end| end + 2);
                continue;
            }
            b'(' | b'[' | b'{' => {
                if !visit(i, byte, depth) {
                    return;
                }
                depth += 1;
            }
            b')' | b']' | b'}' => {
                depth -= 1;
                if !visit(i, byte, depth) {
                    return;
                }
            }
            _ => {
                if !visit(i, byte, depth) {
                    return;
                }
            }
        }
        i += 1;
    }
}

/// Offset just past the string literal starting at `start`, if it terminates.
fn skip_string(bytes: &[u8], start: usize) -> Option<usize> {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

fn memchr(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes[from..]
        .iter()
        .position(|&b| b == needle)
        .map(|p| from + p)
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| from + p)
}

/// Offset of the bracket closing the one at `open`.
pub fn find_closing(text: &str, open: usize) -> Option<usize> {
    let mut found = None;
    walk_code(&text[open..], |i, byte, depth| {
        if depth == 0 && matches!(byte, b')' | b']' | b'}') {
            found = Some(open + i);
            return false;
        }
        depth >= 0
    });
    found
}

/// Split `text` at every `separator` byte that sits at bracket depth zero.
///
/// Pieces are trimmed. A trailing empty piece (trailing comma) is dropped.
pub fn split_top_level(text: &str, separator: u8) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    walk_code(text, |i, byte, depth| {
        if byte == separator && depth == 0 {
            pieces.push(text[start..i].trim());
            start = i + 1;
        }
        true
    });
    let last = text[start..].trim();
    if !last.is_empty() || pieces.is_empty() {
        pieces.push(last);
    }
    pieces
}

/// Offset where the expression starting at `start` ends: the first `;` or `,`
/// at depth zero, or the first unmatched closing bracket.
pub fn expression_end(text: &str, start: usize) -> usize {
    let mut end = text.len();
    walk_code(&text[start..], |i, byte, depth| {
        if depth < 0 || (depth == 0 && matches!(byte, b';' | b',')) {
            end = start + i;
            return false;
        }
        true
    });
    end
}

/// Offset of the first occurrence of `keyword` as a whole word at depth zero.
pub fn find_top_level_keyword(text: &str, keyword: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut found = None;
    walk_code(text, |i, _, depth| {
        if depth == 0
            && bytes[i..].starts_with(keyword.as_bytes())
            && (i == 0 || !is_ident_byte(bytes[i - 1]))
            && bytes
                .get(i + keyword.len())
                .is_none_or(|&next| !is_ident_byte(next))
        {
            found = Some(i);
            return false;
        }
        depth >= 0
    });
    found
}

fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$'
}

pub fn is_identifier(text: &str) -> bool {
    IDENTIFIER_REGEX.is_match(text)
}

/// Name of the callee when `expr` is a bare zero-argument call like `f()`.
pub fn parse_bare_call(expr: &str) -> Option<&str> {
    BARE_CALL_REGEX
        .captures(expr.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Split a `+` concatenation into its operands.
pub fn split_concatenation(expr: &str) -> Vec<&str> {
    split_top_level(expr, b'+')
}

/// Callee names when `expr` is a concatenation of bare zero-argument calls
/// only. A single call is returned as a chain of one.
pub fn parse_call_chain(expr: &str) -> Option<Vec<&str>> {
    split_concatenation(expr)
        .into_iter()
        .map(parse_bare_call)
        .collect()
}

/// Decoded contents when `expr` is exactly one string literal.
///
/// Template literals are accepted only without substitutions.
pub fn parse_string_literal(expr: &str) -> Option<String> {
    let expr = expr.trim();
    let bytes = expr.as_bytes();
    let quote = *bytes.first()?;
    if !matches!(quote, b'"' | b'\'' | b'`') {
        return None;
    }
    if skip_string(bytes, 0)? != bytes.len() {
        return None;
    }
    let inner = &expr[1..expr.len() - 1];
    if quote == b'`' && inner.contains("${") {
        return None;
    }
    Some(unescape(inner))
}

/// Parse a decimal or `0x` hexadecimal integer literal.
pub fn parse_index_literal(expr: &str) -> Option<usize> {
    let expr = expr.trim();
    if let Some(hex) = expr
        .strip_prefix("0x")
        .or_else(|| expr.strip_prefix("0X"))
    {
        return usize::from_str_radix(hex, 16).ok();
    }
    if !expr.is_empty() && expr.bytes().all(|b| b.is_ascii_digit()) {
        return expr.parse().ok();
    }
    None
}

fn unescape(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('x') => {
                let code: String = chars.by_ref().take(2).collect();
                push_code_point(&mut out, &code, "\\x");
            }
            Some('u') => {
                let rest = chars.as_str();
                if let Some(braced) = rest.strip_prefix('{') {
                    let code: String = braced.chars().take_while(|&c| c != '}').collect();
                    // Skip the opening brace, the digits and the closing brace.
                    for _ in 0..code.chars().count() + 2 {
                        chars.next();
                    }
                    push_code_point(&mut out, &code, "\\u");
                } else {
                    let code: String = chars.by_ref().take(4).collect();
                    push_code_point(&mut out, &code, "\\u");
                }
            }
            // Line continuation.
            Some('\n') => {}
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}

fn push_code_point(out: &mut String, code: &str, prefix: &str) {
    match u32::from_str_radix(code, 16).ok().and_then(char::from_u32) {
        Some(c) => out.push(c),
        None => {
            out.push_str(prefix);
            out.push_str(code);
        }
    }
}
