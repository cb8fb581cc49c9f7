use serde::Serialize;
use thiserror::Error;

use super::cascade::Diagnostic;

/// Why a strategy (or one of its candidates) produced no key.
///
/// Every variant is an expected outcome on obfuscated input. Rejections are
/// recorded in the diagnostic trail and the cascade moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Rejection {
    #[error("no {what} found")]
    NotFound { what: String },

    #[error(
        "index {max_index} of `{index_array}` is out of bounds for `{fragment_array}` (length {fragment_len})"
    )]
    InvalidMapping {
        index_array: String,
        fragment_array: String,
        max_index: usize,
        fragment_len: usize,
    },

    #[error("call graph through `{function}` is cyclic or deeper than {limit}")]
    RecursionLimitExceeded { function: String, limit: usize },

    #[error("candidate key rejected: {reason}")]
    ValidationRejected { reason: String },
}

impl Rejection {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }
}

/// Overall failure of an extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("all strategies exhausted without a valid key")]
    AllStrategiesExhausted { diagnostics: Vec<Diagnostic> },
}

impl ExtractError {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            ExtractError::AllStrategiesExhausted { diagnostics } => diagnostics,
        }
    }
}
