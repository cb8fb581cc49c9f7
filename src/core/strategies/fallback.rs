//! Last-resort shape match: a return of exactly N concatenated calls.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use super::{Candidate, Strategy, StrategyKind, no_candidates};
use crate::core::cascade::Analysis;
use crate::core::error::Rejection;
use crate::core::syntax::{expression_end, parse_call_chain};

// Either a `return` statement or an arrow function's expression body.
static RETURN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\breturn\b|=>)\s*").unwrap());

/// Matches any function in the payload, including ones with parameters or
/// nested in object literals, as long as its returned expression is exactly
/// `nine_call_arity` bare calls joined with `+`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fallback;

impl Strategy for Fallback {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Fallback
    }

    fn candidates(&self, analysis: &Analysis) -> Result<Vec<Candidate>, Rejection> {
        let text = analysis.text;
        let arity = analysis.config.nine_call_arity;

        let chains: Vec<(usize, Vec<&str>)> = RETURN_REGEX
            .find_iter(text)
            .filter_map(|found| {
                let expr = &text[found.end()..expression_end(text, found.end())];
                let calls = parse_call_chain(expr)?;
                (calls.len() == arity).then_some((found.start(), calls))
            })
            .collect();
        if chains.is_empty() {
            return Err(Rejection::not_found(format!(
                "return of exactly {} concatenated calls",
                arity
            )));
        }

        let mut graph = analysis.call_graph();
        let mut candidates = Vec::new();
        let mut errors = Vec::new();
        for (at, calls) in chains {
            match graph.resolve_chain(&calls) {
                Ok(key) => candidates.push(
                    Candidate::new(key, format!("{}-call return at offset {}", arity, at))
                        .low_confidence(),
                ),
                Err(rejection) => {
                    trace!(offset = at, %rejection, "unresolved call shape");
                    errors.push(rejection);
                }
            }
        }

        if candidates.is_empty() {
            return Err(no_candidates(errors, "resolvable call shape"));
        }
        Ok(candidates)
    }
}
