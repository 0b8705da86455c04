//! Core types for inspection results.

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::syntax::ParseError;

/// Errors that abort the inspection of a single file.
#[derive(Error, Debug)]
pub enum InspectError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("invalid naming pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("malformed syntax tree at line {line}: {reason}")]
    MalformedTree { line: usize, reason: &'static str },
}

/// Kind of construct that receives a complexity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstructKind {
    Function,
    Method,
    Class,
}

impl std::fmt::Display for ConstructKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstructKind::Function => write!(f, "function"),
            ConstructKind::Method => write!(f, "method"),
            ConstructKind::Class => write!(f, "class"),
        }
    }
}

/// Inclusive, 1-indexed line range. Serialized as `"start-end"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl std::fmt::Display for LineRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl Serialize for LineRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Complexity score for one function, method or class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplexityFinding {
    #[serde(rename = "function")]
    pub name: String,
    pub kind: ConstructKind,
    /// Enclosing class path for methods and nested classes (e.g. "Outer.Inner").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    pub complexity: u32,
    pub lines: LineRange,
}

impl ComplexityFinding {
    /// Get the qualified name (Class.method for methods, Outer.Inner for
    /// nested classes).
    pub fn qualified_name(&self) -> String {
        match &self.class_name {
            Some(class) => format!("{}.{}", class, self.name),
            None => self.name.clone(),
        }
    }
}

/// Outcome of complexity scoring for one file.
///
/// Either the findings in source order, or a single error marker when
/// scoring failed. The two never mix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplexityAnalysis {
    Findings(Vec<ComplexityFinding>),
    Failed { error: String },
}

impl ComplexityAnalysis {
    pub fn findings(&self) -> &[ComplexityFinding] {
        match self {
            ComplexityAnalysis::Findings(findings) => findings,
            ComplexityAnalysis::Failed { .. } => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ComplexityAnalysis::Findings(_) => None,
            ComplexityAnalysis::Failed { error } => Some(error.as_str()),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ComplexityAnalysis::Failed { .. })
    }
}

#[derive(Serialize)]
struct ErrorMarker<'a> {
    error: &'a str,
}

impl Serialize for ComplexityAnalysis {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ComplexityAnalysis::Findings(findings) => findings.serialize(serializer),
            ComplexityAnalysis::Failed { error } => {
                let mut seq = serializer.serialize_seq(Some(1))?;
                seq.serialize_element(&ErrorMarker {
                    error: error.as_str(),
                })?;
                seq.end()
            }
        }
    }
}

/// Style rule families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleRule {
    #[serde(rename = "line_length")]
    LineLength,
    #[serde(rename = "naming")]
    Naming,
}

impl StyleRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleRule::LineLength => "line_length",
            StyleRule::Naming => "naming",
        }
    }
}

impl std::fmt::Display for StyleRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single style violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleIssue {
    pub rule: StyleRule,
    pub line: usize,
    pub message: String,
}

/// A resource acquired outside of a `with` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceFinding {
    /// The acquisition function that was called (e.g. "open").
    pub call: String,
    pub line: usize,
    pub message: String,
}

/// Inspection report for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub file: String,
    pub complexity_analysis: ComplexityAnalysis,
    pub style_issues: Vec<StyleIssue>,
    pub potential_bugs: Vec<ResourceFinding>,
}

impl Report {
    /// Number of style issues and resource findings.
    pub fn issue_count(&self) -> usize {
        self.style_issues.len() + self.potential_bugs.len()
    }

    /// True when no issue was found and complexity scoring succeeded.
    pub fn is_clean(&self) -> bool {
        self.issue_count() == 0 && !self.complexity_analysis.is_failed()
    }
}
