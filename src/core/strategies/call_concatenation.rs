use tracing::trace;

use super::{Candidate, Strategy, StrategyKind, no_candidates};
use crate::core::call_graph::abbreviate;
use crate::core::cascade::Analysis;
use crate::core::error::Rejection;

/// Functions whose return value is `f1() + f2() + ...`, each call resolving
/// to a literal.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallConcatenation;

impl Strategy for CallConcatenation {
    fn kind(&self) -> StrategyKind {
        StrategyKind::CallConcatenation
    }

    fn candidates(&self, analysis: &Analysis) -> Result<Vec<Candidate>, Rejection> {
        let mut graph = analysis.call_graph();
        let composers = graph.composers();
        if composers.is_empty() {
            return Err(Rejection::not_found("function concatenating zero-argument calls"));
        }

        let mut candidates = Vec::new();
        let mut errors = Vec::new();
        for composer in composers {
            match graph.resolve_chain(&composer.calls) {
                Ok(key) => candidates.push(Candidate::new(
                    key,
                    format!(
                        "{}() returns {}",
                        composer.function.name,
                        abbreviate(&composer.function.return_expression)
                    ),
                )),
                Err(rejection) => {
                    trace!(function = %composer.function.name, %rejection, "unresolved composer");
                    errors.push(rejection);
                }
            }
        }

        if candidates.is_empty() {
            return Err(no_candidates(errors, "resolvable call chain"));
        }
        Ok(candidates)
    }
}
