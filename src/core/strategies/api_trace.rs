//! Trace from the source-listing route to the function that builds the key.
//!
//! The payload requests its sources from a fixed route and hands the
//! response to a handler stored on an object property. That handler in turn
//! stores the key producer on another property. Following those two
//! property assignments lands on the producer, which either concatenates
//! accessor calls or decodes a table of hexadecimal character codes.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use super::{Candidate, Strategy, StrategyKind, no_candidates};
use crate::core::call_graph::CallGraph;
use crate::core::cascade::Analysis;
use crate::core::composer::{ComposeMode, compose, compose_fragments};
use crate::core::error::Rejection;
use crate::core::pairing::{ArrayPair, PairOrigin, validate_mapping};
use crate::core::scanner::{ArrayKind, LiteralArrayCandidate, parse_index_mapping};
use crate::core::syntax::find_closing;

// `obj.prop = value` or `obj["prop"] = value`, where value is an identifier.
static PROPERTY_ASSIGNMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"[A-Za-z_$][\w$]*\s*(?:\.\s*[A-Za-z_$][\w$]*|\[\s*["'][^"']*["']\s*\])\s*=\s*([A-Za-z_$][\w$]*)"#,
    )
    .unwrap()
});

#[derive(Debug, Clone, Copy, Default)]
pub struct ApiTrace;

impl Strategy for ApiTrace {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ApiTrace
    }

    fn candidates(&self, analysis: &Analysis) -> Result<Vec<Candidate>, Rejection> {
        let text = analysis.text;
        let marker = analysis.config.route_marker.as_str();
        let markers: Vec<usize> = text.match_indices(marker).map(|(at, _)| at).collect();
        if markers.is_empty() {
            return Err(Rejection::not_found(format!("route marker `{}`", marker)));
        }

        let mut graph = analysis.call_graph();
        let mut candidates = Vec::new();
        let mut errors = Vec::new();

        for at in markers {
            match trace_producer(text, at + marker.len())
                .and_then(|(handler, producer)| {
                    resolve_producer(analysis, &mut graph, producer).map(|key| {
                        Candidate::new(
                            key,
                            format!("route marker -> {} -> {}()", handler, producer),
                        )
                    })
                }) {
                Ok(candidate) => candidates.push(candidate),
                Err(rejection) => {
                    trace!(offset = at, %rejection, "route trace failed");
                    errors.push(rejection);
                }
            }
        }

        if candidates.is_empty() {
            return Err(no_candidates(errors, "key producer behind the route marker"));
        }
        Ok(candidates)
    }
}

/// Follow the two property assignments from `from`. Returns the handler
/// and the producer names.
fn trace_producer(text: &str, from: usize) -> Result<(&str, &str), Rejection> {
    let handler = property_assignment_after(text, from)
        .ok_or_else(|| Rejection::not_found("property assignment after the route marker"))?;

    let body = definition_body(text, handler)
        .ok_or_else(|| Rejection::not_found(format!("definition of `{}`", handler)))?;
    let producer = property_assignment_after(body, 0).ok_or_else(|| {
        Rejection::not_found(format!("property assignment inside `{}`", handler))
    })?;

    Ok((handler, producer))
}

/// Identifier assigned by the first property assignment at or after `from`.
fn property_assignment_after(text: &str, from: usize) -> Option<&str> {
    PROPERTY_ASSIGNMENT_REGEX
        .captures_iter(&text[from..])
        .filter_map(|caps| caps.get(1))
        .find(|value| ends_expression(&text[from + value.end()..]))
        .map(|value| value.as_str())
}

// The identifier must be the whole right-hand side, not the head of a call
// or member access.
fn ends_expression(rest: &str) -> bool {
    rest.trim_start()
        .bytes()
        .next()
        .is_none_or(|b| matches!(b, b';' | b',' | b')' | b'}' | b']'))
}

/// Braced body of the function assigned to or declared as `name`.
fn definition_body<'t>(text: &'t str, name: &str) -> Option<&'t str> {
    let pattern = format!(
        r"(?:\bfunction\s+{name}\s*\([^)]*\)|(?:^|[^\w$.]){name}\s*[:=]\s*(?:async\s+)?(?:function\s*\([^)]*\)|\([^)]*\)\s*=>|[A-Za-z_$][\w$]*\s*=>))\s*\{{",
        name = regex::escape(name)
    );
    let regex = Regex::new(&pattern).ok()?;
    let head = regex.find(text)?;
    let open = head.end() - 1;
    let close = find_closing(text, open)?;
    Some(&text[open..=close])
}

fn resolve_producer(
    analysis: &Analysis,
    graph: &mut CallGraph,
    producer: &str,
) -> Result<String, Rejection> {
    if !graph.contains(producer) {
        return Err(Rejection::not_found(format!(
            "zero-argument function `{}`",
            producer
        )));
    }
    let graph_error = match graph.resolve_function(producer) {
        Ok(key) => return Ok(key),
        Err(rejection) => rejection,
    };

    let Some(definition) = analysis
        .scan
        .functions
        .iter()
        .find(|f| f.name == producer)
    else {
        return Err(graph_error);
    };
    let Some(mapping) = parse_index_mapping(&definition.return_expression) else {
        return Err(graph_error);
    };

    let near = definition.source_offset;
    match mapping.fragment_array {
        Some(fragment_name) => {
            let fragments = nearest_array(analysis, &fragment_name, ArrayKind::String, near)?;
            let indices = nearest_array(analysis, &mapping.index_array, ArrayKind::Number, near)?;
            require_hex_table(fragments)?;
            let pair = ArrayPair::new(fragments, indices, PairOrigin::Proximity)
                .ok_or_else(|| Rejection::not_found("index and fragment arrays"))?;
            validate_mapping(&pair)?;
            Ok(compose(&pair, ComposeMode::HexDecode))
        }
        None => {
            let table = nearest_array(analysis, &mapping.index_array, ArrayKind::String, near)?;
            require_hex_table(table)?;
            let fragments = table.as_strings().unwrap_or(&[]);
            Ok(compose_fragments(
                fragments,
                0..fragments.len(),
                ComposeMode::HexDecode,
            ))
        }
    }
}

/// The array named `name` declared closest to `near`.
fn nearest_array<'a>(
    analysis: &'a Analysis,
    name: &str,
    kind: ArrayKind,
    near: usize,
) -> Result<&'a LiteralArrayCandidate, Rejection> {
    let arrays = match kind {
        ArrayKind::String => &analysis.scan.string_arrays,
        ArrayKind::Number => &analysis.scan.number_arrays,
    };
    arrays
        .iter()
        .filter(|array| array.name == name)
        .min_by_key(|array| array.source_offset.abs_diff(near))
        .ok_or_else(|| Rejection::not_found(format!("literal array `{}`", name)))
}

fn require_hex_table(array: &LiteralArrayCandidate) -> Result<(), Rejection> {
    if array.is_hex_like() {
        Ok(())
    } else {
        Err(Rejection::not_found(format!(
            "hexadecimal character table in `{}`",
            array.name
        )))
    }
}
