//! Lexical scanner.
//!
//! Turns payload text into candidate sets: literal arrays (string fragments
//! or numeric indices) and zero-argument functions with their return
//! expression. Nothing is interpreted here; expressions stay opaque text and
//! absence of matches is simply an empty list.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::syntax::{
    expression_end, find_closing, find_top_level_keyword, parse_index_literal,
    parse_string_literal, split_top_level,
};

// Matches `name = [` as the head of an array declaration; the literal itself
// is walked with the bracket matcher so nested layout does not matter.
static ARRAY_DECL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z_$][\w$]*)\s*=\s*\[").unwrap());

// `function name() {`
static NAMED_FUNCTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bfunction\s+([A-Za-z_$][\w$]*)\s*\(\s*\)\s*\{").unwrap()
});

// `name = () =>`, `name: () =>`, `name = function() {`, `name: function() {`
static ASSIGNED_FUNCTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z_$][\w$]*)\s*[:=]\s*(?:function\s*\(\s*\)\s*\{|\(\s*\)\s*=>\s*)").unwrap()
});

// `N.map(` or `N["map"](`
static MAP_CALL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_$][\w$]*)\s*(?:\.\s*map|\[\s*["']map["']\s*\])\s*\("#).unwrap()
});

static INDEXED_IDENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z_$][\w$]*)\s*\[").unwrap());

// `if (x[3].fn()) { (() => {`, the anti-debug gate in front of the main body.
static GUARDED_IIFE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bif\s*\(\s*[\w$\[\]]+\.[\w$]+\(\s*\)\s*\)\s*\{\s*\(\s*\(\s*\)\s*=>\s*\{").unwrap()
});

static ARROW_IIFE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*\(\s*\)\s*=>\s*\{").unwrap());

// `var a, b, c;`
static VAR_LIST_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bvar\s+[A-Za-z_$][\w$]*(?:\s*,\s*[A-Za-z_$][\w$]*)+\s*;").unwrap()
});

/// Kind of literal an array candidate holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ArrayKind {
    String,
    Number,
}

/// Elements of a literal array, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayElements {
    Strings(Vec<String>),
    Numbers(Vec<usize>),
}

/// An `<identifier> = [ ... ]` declaration whose elements are all string
/// literals or all integer literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralArrayCandidate {
    pub name: String,
    pub elements: ArrayElements,
    /// Byte offset of the identifier in the source text.
    pub source_offset: usize,
}

impl LiteralArrayCandidate {
    pub fn strings(name: &str, elements: &[&str], source_offset: usize) -> Self {
        Self {
            name: name.to_string(),
            elements: ArrayElements::Strings(elements.iter().map(|s| s.to_string()).collect()),
            source_offset,
        }
    }

    pub fn numbers(name: &str, elements: &[usize], source_offset: usize) -> Self {
        Self {
            name: name.to_string(),
            elements: ArrayElements::Numbers(elements.to_vec()),
            source_offset,
        }
    }

    pub fn kind(&self) -> ArrayKind {
        match self.elements {
            ArrayElements::Strings(_) => ArrayKind::String,
            ArrayElements::Numbers(_) => ArrayKind::Number,
        }
    }

    pub fn len(&self) -> usize {
        match &self.elements {
            ArrayElements::Strings(v) => v.len(),
            ArrayElements::Numbers(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_strings(&self) -> Option<&[String]> {
        match &self.elements {
            ArrayElements::Strings(v) => Some(v),
            ArrayElements::Numbers(_) => None,
        }
    }

    pub fn as_numbers(&self) -> Option<&[usize]> {
        match &self.elements {
            ArrayElements::Numbers(v) => Some(v),
            ArrayElements::Strings(_) => None,
        }
    }

    /// True for string arrays made only of short hexadecimal tokens, the
    /// usual shape of key fragment tables.
    pub fn is_hex_like(&self) -> bool {
        self.as_strings().is_some_and(|fragments| {
            !fragments.is_empty()
                && fragments.iter().all(|f| {
                    (1..=4).contains(&f.len()) && f.bytes().all(|b| b.is_ascii_hexdigit())
                })
        })
    }
}

/// A zero-argument function and the raw text of what it returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDef {
    pub name: String,
    pub return_expression: String,
    /// Condition of the single `if` the return sits behind, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guard_expression: Option<String>,
    pub source_offset: usize,
}

/// Candidate sets found in one payload.
#[derive(Debug, Default)]
pub struct ScanOutput {
    pub string_arrays: Vec<LiteralArrayCandidate>,
    pub number_arrays: Vec<LiteralArrayCandidate>,
    pub functions: Vec<FunctionDef>,
    /// Byte range of the payload's main body, if one was recognized.
    pub main_body: Option<Range<usize>>,
}

/// A `N.map(...)` call whose callback indexes into other arrays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingSite {
    pub index_array: String,
    pub fragment_arrays: Vec<String>,
    pub source_offset: usize,
}

/// Array names of a `N.map(...).join(...)` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMapping {
    /// Receiver of `map`.
    pub index_array: String,
    /// Array the callback indexes into. `None` when the callback only
    /// transforms each element of the receiver.
    pub fragment_array: Option<String>,
}

pub fn scan(text: &str, min_array_len: usize) -> ScanOutput {
    let mut output = ScanOutput::default();

    for array in scan_arrays(text) {
        if array.len() <= min_array_len {
            continue;
        }
        match array.kind() {
            ArrayKind::String => output.string_arrays.push(array),
            ArrayKind::Number => output.number_arrays.push(array),
        }
    }
    output.functions = scan_functions(text);
    output.main_body = find_main_body(text);

    output
}

/// Body of the arrow IIFE that holds the key logic: the one gated by an
/// anti-debug `if (x[N].fn())` check, else the first one declaring a
/// `var a, b, ...;` list.
pub fn find_main_body(text: &str) -> Option<Range<usize>> {
    if let Some(whole) = GUARDED_IIFE_REGEX.find(text) {
        let open = whole.end() - 1;
        if let Some(close) = find_closing(text, open) {
            return Some(open + 1..close);
        }
    }

    ARROW_IIFE_REGEX.find_iter(text).find_map(|whole| {
        let open = whole.end() - 1;
        let close = find_closing(text, open)?;
        let invoked = text[close + 1..].trim_start().starts_with(')');
        (invoked && VAR_LIST_REGEX.is_match(&text[open + 1..close])).then_some(open + 1..close)
    })
}

/// Every literal array declaration, regardless of size.
pub fn scan_arrays(text: &str) -> Vec<LiteralArrayCandidate> {
    ARRAY_DECL_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            let open = whole.end() - 1;
            let close = find_closing(text, open)?;
            let elements = parse_literal_elements(&text[open + 1..close])?;
            Some(LiteralArrayCandidate {
                name: name.as_str().to_string(),
                elements,
                source_offset: name.start(),
            })
        })
        .collect()
}

fn parse_literal_elements(inner: &str) -> Option<ArrayElements> {
    let items = split_top_level(inner, b',');
    if items.iter().all(|item| item.is_empty()) {
        return None;
    }

    if let Some(strings) = items
        .iter()
        .map(|item| parse_string_literal(item))
        .collect::<Option<Vec<_>>>()
    {
        return Some(ArrayElements::Strings(strings));
    }

    items
        .iter()
        .map(|item| parse_index_literal(item))
        .collect::<Option<Vec<_>>>()
        .map(ArrayElements::Numbers)
}

/// Zero-argument functions in source order.
pub fn scan_functions(text: &str) -> Vec<FunctionDef> {
    let mut functions = Vec::new();

    for caps in NAMED_FUNCTION_REGEX.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if let Some(def) = block_function(text, name.as_str(), name.start(), whole.end() - 1) {
            functions.push(def);
        }
    }

    for caps in ASSIGNED_FUNCTION_REGEX.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let def = if whole.as_str().ends_with('{') {
            block_function(text, name.as_str(), name.start(), whole.end() - 1)
        } else if text[whole.end()..].starts_with('{') {
            block_function(text, name.as_str(), name.start(), whole.end())
        } else {
            expression_function(text, name.as_str(), name.start(), whole.end())
        };
        if let Some(def) = def {
            functions.push(def);
        }
    }

    functions.sort_by_key(|f| f.source_offset);
    functions
}

fn block_function(text: &str, name: &str, offset: usize, open: usize) -> Option<FunctionDef> {
    let close = find_closing(text, open)?;
    let (return_expression, guard_expression) = parse_body(&text[open + 1..close])?;
    Some(FunctionDef {
        name: name.to_string(),
        return_expression,
        guard_expression,
        source_offset: offset,
    })
}

fn expression_function(text: &str, name: &str, offset: usize, start: usize) -> Option<FunctionDef> {
    let expr = text[start..expression_end(text, start)].trim();
    if expr.is_empty() {
        return None;
    }
    Some(FunctionDef {
        name: name.to_string(),
        return_expression: expr.to_string(),
        guard_expression: None,
        source_offset: offset,
    })
}

/// Return expression of a function body, preferring a return behind a
/// leading `if` guard over the body's own top-level return. A body with
/// neither falls back to the first top-level `if` that returns.
fn parse_body(body: &str) -> Option<(String, Option<String>)> {
    if let Some(guarded) = parse_guarded_return(body.trim_start()) {
        return Some(guarded);
    }
    if let Some(at) = find_top_level_keyword(body, "return") {
        let expr = return_expression_at(body, at)?;
        return Some((expr.to_string(), None));
    }
    let at = find_top_level_keyword(body, "if")?;
    parse_guarded_return(&body[at..])
}

fn parse_guarded_return(body: &str) -> Option<(String, Option<String>)> {
    let rest = body.strip_prefix("if")?;
    let paren = rest.len() - rest.trim_start().len();
    if !rest[paren..].starts_with('(') {
        return None;
    }
    let close = find_closing(rest, paren)?;
    let condition = rest[paren + 1..close].trim();
    let branch = rest[close + 1..].trim_start();

    let expr = if branch.starts_with('{') {
        let branch_close = find_closing(branch, 0)?;
        let block = &branch[1..branch_close];
        let at = find_top_level_keyword(block, "return")?;
        return_expression_at(block, at)?
    } else {
        let at = find_top_level_keyword(branch, "return").filter(|&at| at == 0)?;
        return_expression_at(branch, at)?
    };

    Some((expr.to_string(), Some(condition.to_string())))
}

fn return_expression_at(text: &str, at: usize) -> Option<&str> {
    let start = at + "return".len();
    let expr = text[start..expression_end(text, start)].trim();
    (!expr.is_empty()).then_some(expr)
}

/// All `N.map(...)` sites whose callback indexes another array.
pub fn index_mapping_sites(text: &str) -> Vec<MappingSite> {
    MAP_CALL_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let index_array = caps.get(1)?.as_str();
            let open = whole.end() - 1;
            let close = find_closing(text, open)?;
            let fragment_arrays = indexed_identifiers(&text[open + 1..close], index_array);
            if fragment_arrays.is_empty() {
                return None;
            }
            Some(MappingSite {
                index_array: index_array.to_string(),
                fragment_arrays,
                source_offset: whole.start(),
            })
        })
        .collect()
}

fn indexed_identifiers(callback: &str, exclude: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in INDEXED_IDENT_REGEX.captures_iter(callback) {
        let Some(name) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if name != exclude && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Recognize `N.map(i => S[i]).join(...)` or `T.map(decode).join(...)` (and
/// the bracketed `["map"]` / `["join"]` spellings) as a whole expression.
pub fn parse_index_mapping(expr: &str) -> Option<IndexMapping> {
    let expr = expr.trim();
    let caps = MAP_CALL_REGEX.captures(expr)?;
    let whole = caps.get(0)?;
    if whole.start() != 0 {
        return None;
    }
    let index_array = caps.get(1)?.as_str();
    let open = whole.end() - 1;
    let close = find_closing(expr, open)?;
    if !expr[close..].contains("join") {
        return None;
    }
    let fragment_array = indexed_identifiers(&expr[open + 1..close], index_array)
        .into_iter()
        .next();
    Some(IndexMapping {
        index_array: index_array.to_string(),
        fragment_array,
    })
}
