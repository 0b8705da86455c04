//! Directory scanning: file discovery and per-file inspection.

use globset::GlobSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::detect::{InspectError, Inspector, Report};
use crate::syntax::{PythonParser, SourceParser};

/// A file that could not be inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of a directory scan.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Reports for every file inspected successfully, sorted by path.
    pub reports: Vec<Report>,
    /// Files that failed, sorted by path.
    pub skipped: Vec<SkippedFile>,
}

impl ScanOutcome {
    pub fn files_inspected(&self) -> usize {
        self.reports.len()
    }

    /// Look up the report for `path`.
    pub fn report_for(&self, path: &str) -> Option<&Report> {
        self.reports.iter().find(|r| r.file == path)
    }

    /// True if any report carries a finding.
    pub fn has_findings(&self) -> bool {
        self.reports.iter().any(|r| !r.is_clean())
    }

    fn from_results(results: Vec<(PathBuf, Result<Report, InspectError>)>) -> Self {
        let mut outcome = ScanOutcome::default();
        for (path, result) in results {
            match result {
                Ok(report) => outcome.reports.push(report),
                Err(e) => {
                    log::error!("failed to inspect {}: {}", path.display(), e);
                    outcome.skipped.push(SkippedFile {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        outcome.reports.sort_by(|a, b| a.file.cmp(&b.file));
        outcome.skipped.sort_by(|a, b| a.path.cmp(&b.path));
        outcome
    }
}

/// Collect Python files under `root`, skipping paths matched by `exclusions`.
///
/// A root that is itself a file is returned as-is.
pub fn collect_files(root: &Path, exclusions: &GlobSet) -> anyhow::Result<Vec<PathBuf>> {
    let parser = PythonParser::new();

    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    if !root.is_dir() {
        anyhow::bail!("cannot access path {}", root.display());
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("skipping directory entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !parser.handles_extension(ext) {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        if exclusions.is_match(relative) || exclusions.is_match(path) {
            log::debug!("excluded {}", path.display());
            continue;
        }

        files.push(path.to_path_buf());
    }

    log::info!("found {} python files under {}", files.len(), root.display());
    Ok(files)
}

/// Inspects many files with one engine.
pub struct Scanner {
    inspector: Inspector,
    parser: PythonParser,
}

impl Scanner {
    pub fn new(inspector: Inspector) -> Self {
        Self {
            inspector,
            parser: PythonParser::new(),
        }
    }

    /// Inspect files one at a time.
    ///
    /// A file that fails is logged and left out of the reports.
    pub fn scan(&self, files: &[PathBuf]) -> ScanOutcome {
        let results = files
            .iter()
            .map(|path| (path.clone(), self.inspector.inspect_file(path, &self.parser)))
            .collect();
        ScanOutcome::from_results(results)
    }

    /// Inspect files in parallel. Output is identical to [`Scanner::scan`].
    pub fn scan_parallel(&self, files: &[PathBuf]) -> ScanOutcome {
        use rayon::prelude::*;

        let results = files
            .par_iter()
            .map(|path| (path.clone(), self.inspector.inspect_file(path, &self.parser)))
            .collect();
        ScanOutcome::from_results(results)
    }
}
