//! Output formatting for inspection results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::Serialize;
use std::io::{self, Write};

use crate::detect::{ComplexityAnalysis, Report};
use crate::scan::ScanOutcome;

// =============================================================================
// JSON Format
// =============================================================================

/// Top-level JSON document.
#[derive(Serialize)]
pub struct JsonReport<'a> {
    pub version: &'static str,
    pub path: &'a str,
    pub files_inspected: usize,
    pub files_skipped: Vec<JsonSkipped>,
    pub reports: &'a [Report],
}

/// A file left out of the reports.
#[derive(Serialize)]
pub struct JsonSkipped {
    pub file: String,
    pub reason: String,
}

impl<'a> JsonReport<'a> {
    pub fn new(path: &'a str, outcome: &'a ScanOutcome) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            path,
            files_inspected: outcome.files_inspected(),
            files_skipped: outcome
                .skipped
                .iter()
                .map(|s| JsonSkipped {
                    file: s.path.to_string_lossy().into_owned(),
                    reason: s.reason.clone(),
                })
                .collect(),
            reports: &outcome.reports,
        }
    }
}

/// Write results in JSON format.
pub fn write_json<W: Write>(out: &mut W, path: &str, outcome: &ScanOutcome) -> anyhow::Result<()> {
    let report = JsonReport::new(path, outcome);
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in human-readable colored format.
pub fn write_pretty<W: Write>(out: &mut W, path: &str, outcome: &ScanOutcome) -> io::Result<()> {
    // Header
    writeln!(out)?;
    writeln!(
        out,
        "  {} v{}",
        "pyinspect".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(out)?;
    writeln!(out, "  {}{}", "Inspecting: ".dimmed(), path)?;
    writeln!(out)?;

    for report in &outcome.reports {
        write_file_report(out, report)?;
        writeln!(out)?;
    }

    if !outcome.skipped.is_empty() {
        writeln!(out, "  {}", "Skipped".red().bold())?;
        for skipped in &outcome.skipped {
            writeln!(out, "    {}: {}", skipped.path.display(), skipped.reason)?;
        }
        writeln!(out)?;
    }

    write_summary(out, outcome)
}

/// Write the sections for one file.
pub fn write_file_report<W: Write>(out: &mut W, report: &Report) -> io::Result<()> {
    writeln!(out, "  {}", report.file.bold())?;

    writeln!(out, "    {}", "Complexity".cyan())?;
    match &report.complexity_analysis {
        ComplexityAnalysis::Failed { error } => {
            writeln!(out, "      {} {}", "error:".red(), error)?;
        }
        ComplexityAnalysis::Findings(findings) if findings.is_empty() => {
            writeln!(out, "      {}", "no functions".dimmed())?;
        }
        ComplexityAnalysis::Findings(findings) => {
            for finding in findings {
                writeln!(
                    out,
                    "      {:<32} {:>3}  (lines {})",
                    finding.qualified_name(),
                    finding.complexity,
                    finding.lines
                )?;
            }
        }
    }

    writeln!(out, "    {}", "Style".cyan())?;
    if report.style_issues.is_empty() {
        writeln!(out, "      {}", "none".dimmed())?;
    }
    for issue in &report.style_issues {
        writeln!(out, "      {} {}", "warning".yellow(), issue.message)?;
    }

    writeln!(out, "    {}", "Potential bugs".cyan())?;
    if report.potential_bugs.is_empty() {
        writeln!(out, "      {}", "none".dimmed())?;
    }
    for bug in &report.potential_bugs {
        writeln!(out, "      {} {}", "error".red(), bug.message)?;
    }

    Ok(())
}

fn write_summary<W: Write>(out: &mut W, outcome: &ScanOutcome) -> io::Result<()> {
    let style: usize = outcome.reports.iter().map(|r| r.style_issues.len()).sum();
    let bugs: usize = outcome.reports.iter().map(|r| r.potential_bugs.len()).sum();

    let status = if outcome.has_findings() {
        "ISSUES FOUND".red().bold()
    } else {
        "CLEAN".green().bold()
    };

    writeln!(
        out,
        "  {}  {} inspected, {} skipped, {} style issues, {} potential bugs",
        status,
        outcome.files_inspected(),
        outcome.skipped.len(),
        style,
        bugs
    )
}
