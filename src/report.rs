//! JSON report of an extraction run.
//!
//! Shared by the `--json` / `--output` CLI flags and the MCP `extract_key`
//! tool, so both surfaces emit the same document.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::pairing::PairSummary;
use crate::core::{
    Advisory, Confidence, Diagnostic, ExtractError, ExtractionResult, StrategyKind,
};

/// Outcome for one payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadReport {
    pub source: String,
    /// When the extraction finished.
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategyKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub advisories: Vec<Advisory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Arrays the key was composed from, for array-based strategies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pair: Option<PairSummary>,
    pub diagnostics: Vec<Diagnostic>,
}

impl PayloadReport {
    pub fn new(source: impl Into<String>, result: &Result<ExtractionResult, ExtractError>) -> Self {
        Self::new_with_timestamp(source, result, Utc::now())
    }

    pub fn new_with_timestamp(
        source: impl Into<String>,
        result: &Result<ExtractionResult, ExtractError>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let source = source.into();
        match result {
            Ok(found) => Self {
                source,
                timestamp,
                success: true,
                key: Some(found.key.clone()),
                key_length: Some(found.key.chars().count()),
                strategy: Some(found.strategy),
                confidence: Some(found.confidence),
                advisories: found.advisories.clone(),
                detail: Some(found.detail.clone()),
                pair: found.pair.clone(),
                diagnostics: found.diagnostics.clone(),
            },
            Err(err) => Self {
                source,
                timestamp,
                success: false,
                key: None,
                key_length: None,
                strategy: None,
                confidence: None,
                advisories: Vec::new(),
                detail: None,
                pair: None,
                diagnostics: err.diagnostics().to_vec(),
            },
        }
    }
}

/// Every payload of one run, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionReport {
    pub version: String,
    pub payloads: Vec<PayloadReport>,
}

impl ExtractionReport {
    pub fn new(payloads: Vec<PayloadReport>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            payloads,
        }
    }

    pub fn failure_count(&self) -> usize {
        self.payloads.iter().filter(|p| !p.success).count()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize extraction report")
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()? + "\n")
            .with_context(|| format!("Failed to write report to {}", path.display()))
    }
}
