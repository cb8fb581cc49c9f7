//! Trace the key argument of the payload's decrypt call.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use super::{Candidate, Strategy, StrategyKind, no_candidates};
use crate::core::call_graph::{CallGraph, abbreviate};
use crate::core::cascade::Analysis;
use crate::core::error::Rejection;
use crate::core::syntax::{
    expression_end, find_closing, is_identifier, parse_bare_call, parse_string_literal,
    split_concatenation, split_top_level,
};

// `AES.decrypt(` or `AES["decrypt"](`, usually reached as `CryptoJS.AES`.
static DECRYPT_CALL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bAES\s*(?:\.\s*decrypt|\[\s*["']decrypt["']\s*\])\s*\("#).unwrap()
});

#[derive(Debug, Clone, Copy, Default)]
pub struct CryptoTrace;

impl Strategy for CryptoTrace {
    fn kind(&self) -> StrategyKind {
        StrategyKind::CryptoTrace
    }

    fn candidates(&self, analysis: &Analysis) -> Result<Vec<Candidate>, Rejection> {
        let text = analysis.text;
        let calls: Vec<(usize, &str)> = DECRYPT_CALL_REGEX
            .find_iter(text)
            .filter_map(|call| {
                let open = call.end() - 1;
                let close = find_closing(text, open)?;
                let arguments = split_top_level(&text[open + 1..close], b',');
                arguments.get(1).map(|key| (call.start(), *key))
            })
            .collect();
        if calls.is_empty() {
            return Err(Rejection::not_found("decrypt call with a key argument"));
        }

        let mut tracer = KeyTracer {
            text,
            graph: analysis.call_graph(),
            max_depth: analysis.config.max_call_depth,
        };
        let mut candidates = Vec::new();
        let mut errors = Vec::new();
        for (at, argument) in calls {
            match tracer.resolve(argument, at, 0) {
                Ok(key) => candidates.push(Candidate::new(
                    key,
                    format!("decrypt key argument `{}`", abbreviate(argument)),
                )),
                Err(rejection) => {
                    trace!(offset = at, %rejection, "decrypt key unresolved");
                    errors.push(rejection);
                }
            }
        }

        if candidates.is_empty() {
            return Err(no_candidates(errors, "literal decrypt key"));
        }
        Ok(candidates)
    }
}

struct KeyTracer<'a> {
    text: &'a str,
    graph: CallGraph<'a>,
    max_depth: usize,
}

impl KeyTracer<'_> {
    /// Literal value of `expr` as seen at offset `before`.
    fn resolve(&mut self, expr: &str, before: usize, depth: usize) -> Result<String, Rejection> {
        let expr = expr.trim();
        if depth > self.max_depth {
            return Err(Rejection::RecursionLimitExceeded {
                function: abbreviate(expr),
                limit: self.max_depth,
            });
        }

        if let Some(literal) = parse_string_literal(expr) {
            return Ok(literal);
        }
        if let Some(callee) = parse_bare_call(expr) {
            return self.graph.resolve_function(callee);
        }
        if is_identifier(expr) {
            let (value, at) = last_assignment(self.text, expr, before)
                .ok_or_else(|| Rejection::not_found(format!("assignment to `{}`", expr)))?;
            return self.resolve(value, at, depth + 1);
        }

        let operands = split_concatenation(expr);
        if operands.len() > 1 {
            let mut value = String::new();
            for operand in operands {
                value.push_str(&self.resolve(operand, before, depth + 1)?);
            }
            return Ok(value);
        }

        Err(Rejection::not_found(format!(
            "literal value in `{}`",
            abbreviate(expr)
        )))
    }
}

/// Right-hand side and offset of the last `name = ...` before `before`.
fn last_assignment<'t>(text: &'t str, name: &str, before: usize) -> Option<(&'t str, usize)> {
    let pattern = format!(r"(?:^|[^\w$.])({})\s*=", regex::escape(name));
    let regex = Regex::new(&pattern).ok()?;

    regex
        .captures_iter(&text[..before])
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            // `==`, `===` and `=>` are not assignments.
            let next = text.as_bytes().get(whole.end()).copied();
            if matches!(next, Some(b'=') | Some(b'>')) {
                return None;
            }
            let end = expression_end(text, whole.end());
            Some((&text[whole.end()..end], name.start()))
        })
        .last()
}
