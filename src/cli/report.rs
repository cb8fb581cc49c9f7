//! Human-readable output for the CLI.
//!
//! Separate from core logic to allow keysift to be used as a library.

use std::io::{self, Write};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use crate::core::{Advisory, Confidence, Diagnostic, Outcome, ScanOutput};
use crate::core::call_graph::Composer;
use crate::core::scanner::{ArrayElements, LiteralArrayCandidate, MappingSite};
use crate::report::{ExtractionReport, PayloadReport};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Elements shown per array in scan output.
const MAX_ELEMENTS_DISPLAY: usize = 6;

/// Print one block per payload, then a summary line.
pub fn report(report: &ExtractionReport, verbose: bool) {
    report_to(report, verbose, &mut io::stdout().lock());
}

/// Print the extraction report to a custom writer.
pub fn report_to<W: Write>(report: &ExtractionReport, verbose: bool, writer: &mut W) {
    for payload in &report.payloads {
        print_payload(payload, verbose, writer);
    }
    print_summary(report, writer);
}

fn print_payload<W: Write>(payload: &PayloadReport, verbose: bool, writer: &mut W) {
    match (&payload.key, payload.strategy, payload.confidence) {
        (Some(key), Some(strategy), Some(confidence)) => {
            let _ = writeln!(
                writer,
                "{} {}",
                SUCCESS_MARK.green(),
                payload.source.bold()
            );
            let _ = writeln!(writer, "  {} {}", "key:".dimmed(), key.cyan());
            let _ = writeln!(
                writer,
                "  {} {} ({} confidence)",
                "via:".dimmed(),
                strategy,
                confidence_label(confidence)
            );
            if let Some(detail) = &payload.detail {
                let _ = writeln!(writer, "  {} {}", "from:".dimmed(), detail);
            }
            for advisory in &payload.advisories {
                let _ = writeln!(
                    writer,
                    "  {} {}",
                    "note:".yellow(),
                    advisory_message(*advisory)
                );
            }
            if verbose {
                print_diagnostics(&payload.diagnostics, writer);
            }
        }
        _ => {
            let _ = writeln!(
                writer,
                "{} {}",
                FAILURE_MARK.red(),
                payload.source.bold()
            );
            print_diagnostics(&payload.diagnostics, writer);
        }
    }
}

fn print_diagnostics<W: Write>(diagnostics: &[Diagnostic], writer: &mut W) {
    let width = diagnostics
        .iter()
        .map(|d| d.strategy.to_string().width())
        .max()
        .unwrap_or(0);

    for diagnostic in diagnostics {
        let name = diagnostic.strategy.to_string();
        let padding = " ".repeat(width - name.width());
        let status = match &diagnostic.outcome {
            Outcome::Success => "ok".green().to_string(),
            Outcome::Disabled => "disabled".dimmed().to_string(),
            Outcome::Rejected(rejection) => rejection.to_string().red().to_string(),
        };
        let _ = writeln!(writer, "  {} {}{}  {}", "-".dimmed(), name, padding, status);
    }
}

fn print_summary<W: Write>(report: &ExtractionReport, writer: &mut W) {
    let total = report.payloads.len();
    let failed = report.failure_count();
    let noun = if total == 1 { "payload" } else { "payloads" };

    let _ = writeln!(writer);
    if failed == 0 {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Recovered keys from {} {}", total, noun).green()
        );
    } else {
        let _ = writeln!(
            writer,
            "{} {}",
            FAILURE_MARK.red(),
            format!("{} of {} {} yielded no key", failed, total, noun).red()
        );
    }
}

fn confidence_label(confidence: Confidence) -> colored::ColoredString {
    match confidence {
        Confidence::High => "high".green(),
        Confidence::Low => "low".yellow(),
    }
}

fn advisory_message(advisory: Advisory) -> &'static str {
    match advisory {
        Advisory::NoSpecialCharacters => "key has no special characters",
        Advisory::ControlCharacters => "key contains control characters",
    }
}

/// What the scanner found in one payload.
pub struct ScanView<'a> {
    pub scan: &'a ScanOutput,
    pub composers: &'a [Composer<'a>],
    pub mapping_sites: &'a [MappingSite],
}

pub fn print_scan(view: &ScanView, verbose: bool) {
    print_scan_to(view, verbose, &mut io::stdout().lock());
}

pub fn print_scan_to<W: Write>(view: &ScanView, verbose: bool, writer: &mut W) {
    let arrays: Vec<&LiteralArrayCandidate> = view
        .scan
        .string_arrays
        .iter()
        .chain(view.scan.number_arrays.iter())
        .collect();
    let name_width = arrays.iter().map(|a| a.name.width()).max().unwrap_or(0);

    let _ = writeln!(writer, "{} ({})", "arrays".bold(), arrays.len());
    for array in &arrays {
        let padding = " ".repeat(name_width - array.name.width());
        let kind = match array.elements {
            ArrayElements::Strings(_) if array.is_hex_like() => "hex strings",
            ArrayElements::Strings(_) => "strings",
            ArrayElements::Numbers(_) => "numbers",
        };
        let _ = writeln!(
            writer,
            "  {}{}  {} x{} @{}",
            array.name.cyan(),
            padding,
            kind,
            array.len(),
            array.source_offset
        );
        if verbose {
            let _ = writeln!(writer, "    {}", preview(array).dimmed());
        }
    }

    let _ = writeln!(
        writer,
        "{} ({})",
        "functions".bold(),
        view.scan.functions.len()
    );
    if verbose {
        for function in &view.scan.functions {
            let _ = writeln!(
                writer,
                "  {}() @{}  {}",
                function.name.cyan(),
                function.source_offset,
                function.return_expression.dimmed()
            );
        }
    }

    let _ = writeln!(writer, "{} ({})", "call chains".bold(), view.composers.len());
    for composer in view.composers {
        let _ = writeln!(
            writer,
            "  {}() = {}",
            composer.function.name.cyan(),
            composer
                .calls
                .iter()
                .map(|c| format!("{}()", c))
                .collect::<Vec<_>>()
                .join(" + ")
        );
    }

    let _ = writeln!(
        writer,
        "{} ({})",
        "mapping sites".bold(),
        view.mapping_sites.len()
    );
    for site in view.mapping_sites {
        let _ = writeln!(
            writer,
            "  {} -> {} @{}",
            site.index_array.cyan(),
            site.fragment_arrays.join(", "),
            site.source_offset
        );
    }

    match &view.scan.main_body {
        Some(body) => {
            let _ = writeln!(writer, "{} @{}..{}", "main body".bold(), body.start, body.end);
        }
        None => {
            let _ = writeln!(writer, "{} {}", "main body".bold(), "not found".dimmed());
        }
    }
}

fn preview(array: &LiteralArrayCandidate) -> String {
    let items: Vec<String> = match &array.elements {
        ArrayElements::Strings(values) => values
            .iter()
            .take(MAX_ELEMENTS_DISPLAY)
            .map(|v| format!("{:?}", v))
            .collect(),
        ArrayElements::Numbers(values) => values
            .iter()
            .take(MAX_ELEMENTS_DISPLAY)
            .map(|v| v.to_string())
            .collect(),
    };
    let more = if array.len() > MAX_ELEMENTS_DISPLAY { ", ..." } else { "" };
    format!("[{}{}]", items.join(", "), more)
}
