//! pyinspect - static inspection of Python source.
//!
//! Each file is parsed once with tree-sitter into an arena-backed syntax
//! tree, then three independent analyses run over it:
//!
//! - cyclomatic complexity per function and method
//! - PEP 8 style: line length and variable naming
//! - resource safety: `open()` calls outside a `with` block
//!
//! # Architecture
//!
//! - `syntax`: parser adapter and the arena syntax tree
//! - `detect`: the three analyses and the per-file engine
//! - `scan`: file discovery and sequential/parallel directory runs
//! - `config`: YAML configuration
//! - `report`: output formatting (text, JSON)
//! - `cli`: command-line glue

pub mod cli;
pub mod config;
pub mod detect;
pub mod report;
pub mod scan;
pub mod syntax;

pub use config::InspectorConfig;
pub use detect::{
    ComplexityAnalysis, ComplexityFinding, InspectError, Inspector, Report, ResourceFinding,
    StyleIssue,
};
pub use scan::{collect_files, ScanOutcome, Scanner};
pub use syntax::{ParseError, PythonParser, SourceParser, SourceUnit, SyntaxTree};
