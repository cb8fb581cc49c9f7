use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::{Config, StrategyToggles};

// ============================================================
// Config Types (get_config)
// ============================================================

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetConfigParams {
    /// Directory to start the `.keysiftrc.json` lookup from
    pub project_root_path: String,
}

/// Configuration DTO for MCP
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDto {
    /// True if config was loaded from a file, false if using defaults
    pub from_file: bool,
    pub config: ConfigValues,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigValues {
    pub ignores: Vec<String>,
    pub proximity_threshold: usize,
    pub min_array_len: usize,
    pub min_key_len: usize,
    pub max_call_depth: usize,
    pub nine_call_arity: usize,
    pub route_marker: String,
    pub strategies: StrategyValues,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StrategyValues {
    pub call_concatenation: bool,
    pub api_trace: bool,
    pub crypto_trace: bool,
    pub fallback: bool,
    pub array_indirection: bool,
}

impl From<StrategyToggles> for StrategyValues {
    fn from(t: StrategyToggles) -> Self {
        Self {
            call_concatenation: t.call_concatenation,
            api_trace: t.api_trace,
            crypto_trace: t.crypto_trace,
            fallback: t.fallback,
            array_indirection: t.array_indirection,
        }
    }
}

impl From<Config> for ConfigValues {
    fn from(c: Config) -> Self {
        Self {
            ignores: c.ignores,
            proximity_threshold: c.proximity_threshold,
            min_array_len: c.min_array_len,
            min_key_len: c.min_key_len,
            max_call_depth: c.max_call_depth,
            nine_call_arity: c.nine_call_arity,
            route_marker: c.route_marker,
            strategies: c.strategies.into(),
        }
    }
}

// ============================================================
// Extraction Types (extract_key)
// ============================================================

/// Exactly one of `source_path` and `source_text` must be set.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractKeyParams {
    /// Path of the payload file to analyze
    pub source_path: Option<String>,
    /// Payload text to analyze, instead of a file
    pub source_text: Option<String>,
    /// Directory to load `.keysiftrc.json` from (defaults to the payload's
    /// directory, or the working directory for inline text)
    pub project_root_path: Option<String>,
}
