//! Style checks: line length on the raw text, naming on name references.

use regex::Regex;

use crate::syntax::{NodeKind, SourceUnit, SyntaxTree};

use super::{InspectError, StyleIssue, StyleRule};

/// Default maximum line length (PEP 8).
pub const DEFAULT_MAX_LINE_LENGTH: usize = 79;

/// Default pattern for variable names: lower snake case.
pub const DEFAULT_NAMING_PATTERN: &str = r"^[a-z_][a-z0-9_]*$";

/// Compiled style rules.
#[derive(Debug, Clone)]
pub struct StyleRules {
    max_line_length: usize,
    naming: Regex,
}

impl StyleRules {
    pub fn new(max_line_length: usize, naming_pattern: &str) -> Result<Self, InspectError> {
        let naming = Regex::new(naming_pattern).map_err(|source| InspectError::InvalidPattern {
            pattern: naming_pattern.to_string(),
            source,
        })?;
        Ok(Self {
            max_line_length,
            naming,
        })
    }

    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }
}

/// Run both rule families. Line-length issues come first, in line order,
/// then naming issues in source order.
pub fn check_style(unit: &SourceUnit, rules: &StyleRules) -> Result<Vec<StyleIssue>, InspectError> {
    let mut issues = check_line_length(unit.text(), rules.max_line_length);
    issues.extend(check_naming(unit.tree(), &rules.naming)?);
    Ok(issues)
}

/// Flag every line longer than `max` characters.
///
/// Works on the literal text, so lines inside strings and comments count.
/// A `\r\n` terminator is not part of the line.
pub fn check_line_length(text: &str, max: usize) -> Vec<StyleIssue> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| line.chars().count() > max)
        .map(|(i, _)| {
            let line = i + 1;
            StyleIssue {
                rule: StyleRule::LineLength,
                line,
                message: format!(
                    "Line {}: exceeds the recommended line length (>{} characters)",
                    line, max
                ),
            }
        })
        .collect()
}

/// Flag every name reference that does not match `pattern`, once per
/// occurrence.
pub fn check_naming(tree: &SyntaxTree, pattern: &Regex) -> Result<Vec<StyleIssue>, InspectError> {
    let mut issues = Vec::new();

    for id in tree.preorder() {
        let node = tree.node(id);
        let NodeKind::NameReference { name } = &node.kind else {
            continue;
        };
        if name.is_empty() {
            return Err(InspectError::MalformedTree {
                line: node.span.start_line,
                reason: "name reference without an identifier",
            });
        }
        if !pattern.is_match(name) {
            issues.push(StyleIssue {
                rule: StyleRule::Naming,
                line: node.span.start_line,
                message: format!("Variable name '{}' does not follow PEP 8", name),
            });
        }
    }

    Ok(issues)
}
