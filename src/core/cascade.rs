//! Strategy cascade.
//!
//! Runs the strategies in fixed priority order over one payload and returns
//! the first candidate key that passes validation, together with the trail
//! of every strategy tried before it.

use serde::Serialize;
use tracing::{debug, trace};

use super::call_graph::CallGraph;
use super::error::{ExtractError, Rejection};
use super::pairing::PairSummary;
use super::scanner::{MappingSite, ScanOutput, index_mapping_sites, scan};
use super::strategies::{AnyStrategy, Candidate, Strategy, StrategyKind};
use super::validator::{Advisory, Confidence, Verdict, validate};
use crate::config::Config;

/// Everything strategies may look at for one payload.
pub struct Analysis<'a> {
    pub text: &'a str,
    pub config: &'a Config,
    pub scan: ScanOutput,
    pub mapping_sites: Vec<MappingSite>,
}

impl<'a> Analysis<'a> {
    pub fn new(text: &'a str, config: &'a Config) -> Self {
        Self {
            text,
            config,
            scan: scan(text, config.min_array_len),
            mapping_sites: index_mapping_sites(text),
        }
    }

    /// A fresh resolver over the scanned functions.
    pub fn call_graph(&self) -> CallGraph<'_> {
        CallGraph::new(&self.scan.functions, self.config.max_call_depth)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status", content = "rejection")]
pub enum Outcome {
    Success,
    Rejected(Rejection),
    Disabled,
}

/// What happened to one strategy during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub strategy: StrategyKind,
    pub outcome: Outcome,
}

/// A validated key and how it was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub key: String,
    pub strategy: StrategyKind,
    pub confidence: Confidence,
    pub advisories: Vec<Advisory>,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pair: Option<PairSummary>,
    /// Strategies tried, in order, ending with the one that succeeded.
    pub diagnostics: Vec<Diagnostic>,
}

pub struct Cascade {
    config: Config,
}

impl Cascade {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn extract(&self, text: &str) -> Result<ExtractionResult, ExtractError> {
        let analysis = Analysis::new(text, &self.config);
        debug!(
            string_arrays = analysis.scan.string_arrays.len(),
            number_arrays = analysis.scan.number_arrays.len(),
            functions = analysis.scan.functions.len(),
            "scanned payload"
        );

        let mut diagnostics = Vec::with_capacity(StrategyKind::ALL.len());
        for kind in StrategyKind::ALL {
            if !kind.is_enabled(&self.config.strategies) {
                debug!(strategy = %kind, "skipping disabled strategy");
                diagnostics.push(Diagnostic {
                    strategy: kind,
                    outcome: Outcome::Disabled,
                });
                continue;
            }

            match self.attempt(kind.strategy(), &analysis) {
                Ok((candidate, verdict)) => {
                    debug!(strategy = %kind, detail = %candidate.detail, "key recovered");
                    diagnostics.push(Diagnostic {
                        strategy: kind,
                        outcome: Outcome::Success,
                    });
                    return Ok(ExtractionResult {
                        key: candidate.key,
                        strategy: kind,
                        confidence: verdict.confidence.min(candidate.ceiling),
                        advisories: verdict.advisories,
                        detail: candidate.detail,
                        pair: candidate.pair,
                        diagnostics,
                    });
                }
                Err(rejection) => {
                    debug!(strategy = %kind, %rejection, "strategy rejected");
                    diagnostics.push(Diagnostic {
                        strategy: kind,
                        outcome: Outcome::Rejected(rejection),
                    });
                }
            }
        }

        Err(ExtractError::AllStrategiesExhausted { diagnostics })
    }

    /// First candidate of `strategy` that passes validation.
    fn attempt(
        &self,
        strategy: AnyStrategy,
        analysis: &Analysis,
    ) -> Result<(Candidate, Verdict), Rejection> {
        let candidates = strategy.candidates(analysis)?;

        let mut first_reason = None;
        for candidate in candidates {
            let verdict = validate(&candidate.key, self.config.min_key_len);
            if verdict.accepted {
                return Ok((candidate, verdict));
            }
            trace!(
                strategy = %strategy.kind(),
                detail = %candidate.detail,
                reason = verdict.reason.as_deref().unwrap_or_default(),
                "candidate rejected"
            );
            if first_reason.is_none() {
                first_reason = verdict.reason;
            }
        }

        Err(Rejection::ValidationRejected {
            reason: first_reason.unwrap_or_else(|| "no candidate keys".to_string()),
        })
    }
}
