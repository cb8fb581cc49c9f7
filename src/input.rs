//! Payload discovery and loading.

use std::{
    collections::BTreeSet,
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use colored::Colorize;
use glob::Pattern;
use tracing::debug;
use walkdir::WalkDir;

/// Input name that stands for standard input.
pub const STDIN_INPUT: &str = "-";

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal directory paths.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// One payload to extract from.
#[derive(Debug, Clone)]
pub struct Payload {
    /// Path as given or discovered, or `-` for stdin.
    pub label: String,
    pub text: String,
}

/// Result of walking a directory.
pub struct WalkResult {
    /// Sorted, without duplicates.
    pub files: Vec<PathBuf>,
    pub skipped_count: usize,
}

/// Script files under `dir`, minus anything matching `ignore_patterns`.
pub fn walk_payload_files(dir: &Path, ignore_patterns: &[String], verbose: bool) -> WalkResult {
    let mut files: BTreeSet<PathBuf> = BTreeSet::new();
    let mut skipped_count = 0;

    let mut literal_ignore_paths: Vec<PathBuf> = Vec::new();
    let mut glob_patterns: Vec<Pattern> = Vec::new();
    for p in ignore_patterns {
        if is_glob_pattern(p) {
            match Pattern::new(p) {
                Ok(pattern) => glob_patterns.push(pattern),
                Err(e) => {
                    if verbose {
                        eprintln!(
                            "{} Invalid ignore pattern '{}': {}",
                            "warning:".bold().yellow(),
                            p,
                            e
                        );
                    }
                }
            }
        } else {
            literal_ignore_paths.push(dir.join(p));
        }
    }

    for entry in WalkDir::new(dir) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                skipped_count += 1;
                if verbose {
                    eprintln!("{} Cannot access path: {}", "warning:".bold().yellow(), e);
                }
                continue;
            }
        };
        let path = entry.path();

        if literal_ignore_paths
            .iter()
            .any(|ignore_path| path.starts_with(ignore_path))
        {
            continue;
        }
        if glob_patterns
            .iter()
            .any(|p| p.matches(&path.to_string_lossy()))
        {
            continue;
        }

        if path.is_file() && is_payload_file(path) {
            files.insert(path.to_path_buf());
        }
    }

    WalkResult {
        files: files.into_iter().collect(),
        skipped_count,
    }
}

fn is_payload_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("js" | "mjs" | "cjs")
    )
}

/// Load every input: files as is, directories walked, `-` from stdin.
///
/// Unreadable inputs are errors; a directory without payloads contributes
/// nothing.
pub fn load_payloads(
    inputs: &[PathBuf],
    ignore_patterns: &[String],
    verbose: bool,
) -> Result<Vec<Payload>> {
    let mut payloads = Vec::new();

    for input in inputs {
        if input.as_os_str() == STDIN_INPUT {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read payload from stdin")?;
            payloads.push(Payload {
                label: STDIN_INPUT.to_string(),
                text,
            });
        } else if input.is_dir() {
            let walked = walk_payload_files(input, ignore_patterns, verbose);
            debug!(
                dir = %input.display(),
                files = walked.files.len(),
                skipped = walked.skipped_count,
                "walked payload directory"
            );
            for file in walked.files {
                payloads.push(read_payload(&file)?);
            }
        } else {
            payloads.push(read_payload(input)?);
        }
    }

    Ok(payloads)
}

fn read_payload(path: &Path) -> Result<Payload> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(Payload {
        label: path.display().to_string(),
        text: String::from_utf8_lossy(&bytes).into_owned(),
    })
}
