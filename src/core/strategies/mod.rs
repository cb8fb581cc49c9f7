//! Key-recovery heuristics, one type per strategy.
//!
//! Each strategy proposes ranked candidate keys from a scanned payload; the
//! cascade validates them. A strategy that finds nothing says why with a
//! [`Rejection`].

mod api_trace;
mod array_indirection;
mod call_concatenation;
mod crypto_trace;
mod fallback;

use std::fmt;

use enum_dispatch::enum_dispatch;
use serde::Serialize;

pub use api_trace::ApiTrace;
pub use array_indirection::ArrayIndirection;
pub use call_concatenation::CallConcatenation;
pub use crypto_trace::CryptoTrace;
pub use fallback::Fallback;

use super::cascade::Analysis;
use super::error::Rejection;
use super::pairing::PairSummary;
use super::validator::Confidence;
use crate::config::StrategyToggles;

/// Identifies a strategy in results and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum StrategyKind {
    CallConcatenation,
    ApiTrace,
    CryptoTrace,
    Fallback,
    ArrayIndirection,
}

impl StrategyKind {
    /// Every strategy, in cascade priority order.
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::CallConcatenation,
        StrategyKind::ApiTrace,
        StrategyKind::CryptoTrace,
        StrategyKind::Fallback,
        StrategyKind::ArrayIndirection,
    ];

    pub fn is_enabled(self, toggles: &StrategyToggles) -> bool {
        match self {
            StrategyKind::CallConcatenation => toggles.call_concatenation,
            StrategyKind::ApiTrace => toggles.api_trace,
            StrategyKind::CryptoTrace => toggles.crypto_trace,
            StrategyKind::Fallback => toggles.fallback,
            StrategyKind::ArrayIndirection => toggles.array_indirection,
        }
    }

    pub fn disable(self, toggles: &mut StrategyToggles) {
        let flag = match self {
            StrategyKind::CallConcatenation => &mut toggles.call_concatenation,
            StrategyKind::ApiTrace => &mut toggles.api_trace,
            StrategyKind::CryptoTrace => &mut toggles.crypto_trace,
            StrategyKind::Fallback => &mut toggles.fallback,
            StrategyKind::ArrayIndirection => &mut toggles.array_indirection,
        };
        *flag = false;
    }

    pub fn strategy(self) -> AnyStrategy {
        match self {
            StrategyKind::CallConcatenation => CallConcatenation.into(),
            StrategyKind::ApiTrace => ApiTrace.into(),
            StrategyKind::CryptoTrace => CryptoTrace.into(),
            StrategyKind::Fallback => Fallback.into(),
            StrategyKind::ArrayIndirection => ArrayIndirection.into(),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::CallConcatenation => write!(f, "call-concatenation"),
            StrategyKind::ApiTrace => write!(f, "api-trace"),
            StrategyKind::CryptoTrace => write!(f, "crypto-trace"),
            StrategyKind::Fallback => write!(f, "fallback"),
            StrategyKind::ArrayIndirection => write!(f, "array-indirection"),
        }
    }
}

/// A key proposed by a strategy, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub key: String,
    /// Highest confidence the strategy grants this candidate.
    pub ceiling: Confidence,
    /// Where the key came from, for the report.
    pub detail: String,
    /// Arrays the key was composed from, when it came from a pair.
    pub pair: Option<PairSummary>,
}

impl Candidate {
    pub fn new(key: String, detail: impl Into<String>) -> Self {
        Self {
            key,
            ceiling: Confidence::High,
            detail: detail.into(),
            pair: None,
        }
    }

    pub fn with_pair(mut self, pair: PairSummary) -> Self {
        self.pair = Some(pair);
        self
    }

    pub fn low_confidence(mut self) -> Self {
        self.ceiling = Confidence::Low;
        self
    }
}

#[enum_dispatch]
pub trait Strategy {
    fn kind(&self) -> StrategyKind;

    /// Candidate keys, best first. An empty list is never returned; a
    /// strategy with nothing to offer rejects instead.
    fn candidates(&self, analysis: &Analysis) -> Result<Vec<Candidate>, Rejection>;
}

#[enum_dispatch(Strategy)]
#[derive(Debug, Clone, Copy)]
pub enum AnyStrategy {
    CallConcatenation(CallConcatenation),
    ApiTrace(ApiTrace),
    CryptoTrace(CryptoTrace),
    Fallback(Fallback),
    ArrayIndirection(ArrayIndirection),
}

/// First error of a failed candidate search, or a generic not-found.
pub(crate) fn no_candidates(errors: Vec<Rejection>, what: &str) -> Rejection {
    errors
        .into_iter()
        .next()
        .unwrap_or_else(|| Rejection::not_found(what))
}
