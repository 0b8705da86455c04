//! Inspection engine that runs all checks against one source unit.

use std::path::Path;

use crate::config::{Checks, InspectorConfig};
use crate::syntax::{SourceParser, SourceUnit};

use super::{
    analyze_complexity, check_resources, check_style, ComplexityAnalysis, InspectError, Report,
    ResourceRules, StyleRules,
};

/// Runs the complexity, style and resource checks for a file.
///
/// The three analyses never read each other's output. Complexity scoring
/// recovers from its own failures; style and resource failures abort the
/// file with an `InspectError`.
#[derive(Debug, Clone)]
pub struct Inspector {
    style: StyleRules,
    resources: ResourceRules,
    checks: Checks,
}

impl Inspector {
    /// Build an inspector from configuration.
    ///
    /// Fails if the configured naming pattern is not a valid regex.
    pub fn new(config: &InspectorConfig) -> Result<Self, InspectError> {
        Ok(Self {
            style: StyleRules::new(config.max_line_length, &config.naming_pattern)?,
            resources: ResourceRules::new(config.resource_functions.iter().cloned()),
            checks: config.checks,
        })
    }

    /// Inspect an already parsed source unit.
    pub fn inspect(&self, unit: &SourceUnit) -> Result<Report, InspectError> {
        let complexity_analysis = if self.checks.complexity {
            analyze_complexity(unit.tree())
        } else {
            ComplexityAnalysis::Findings(Vec::new())
        };

        let style_issues = if self.checks.style {
            check_style(unit, &self.style)?
        } else {
            Vec::new()
        };

        let potential_bugs = if self.checks.resources {
            check_resources(unit.tree(), &self.resources)?
        } else {
            Vec::new()
        };

        log::debug!(
            "{}: {} scored, {} style issues, {} potential bugs",
            unit.path(),
            complexity_analysis.findings().len(),
            style_issues.len(),
            potential_bugs.len()
        );

        Ok(Report {
            file: unit.path().to_string(),
            complexity_analysis,
            style_issues,
            potential_bugs,
        })
    }

    /// Parse `text` and inspect it.
    pub fn inspect_source(
        &self,
        path: &str,
        text: &str,
        parser: &dyn SourceParser,
    ) -> Result<Report, InspectError> {
        let unit = SourceUnit::parse(path, text, parser)?;
        self.inspect(&unit)
    }

    /// Read, parse and inspect a file.
    pub fn inspect_file(&self, path: &Path, parser: &dyn SourceParser) -> Result<Report, InspectError> {
        log::debug!("inspecting {}", path.display());
        let text = std::fs::read_to_string(path)?;
        self.inspect_source(&path.to_string_lossy(), &text, parser)
    }
}
