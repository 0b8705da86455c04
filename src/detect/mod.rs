//! Inspection checks and the engine that combines them into a report.

mod complexity;
mod engine;
mod resources;
mod style;
mod types;

pub use complexity::{analyze_complexity, cyclomatic_complexity, ComplexityError};
pub use engine::Inspector;
pub use resources::{check_resources, ResourceRules, DEFAULT_RESOURCE_FUNCTIONS};
pub use style::{
    check_line_length, check_naming, check_style, StyleRules, DEFAULT_MAX_LINE_LENGTH,
    DEFAULT_NAMING_PATTERN,
};
pub use types::{
    ComplexityAnalysis, ComplexityFinding, ConstructKind, InspectError, LineRange, Report,
    ResourceFinding, StyleIssue, StyleRule,
};
