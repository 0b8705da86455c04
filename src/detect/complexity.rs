//! Cyclomatic complexity scoring for functions, methods and classes.
//!
//! Cyclomatic complexity is calculated as:
//! - Start at 1
//! - Add 1 for each: if, elif, ternary, comprehension `if`, for, while,
//!   comprehension `for`, `and`, `or`, except clause
//! - Add 1 for each `case` arm beyond the first
//!
//! Nested functions and lambdas fold into the enclosing function's score.
//! Classes get their own finding, scored from their methods.
//! Scoring is best-effort: a failure turns into an error marker instead of
//! aborting the inspection.

use std::collections::HashMap;

use thiserror::Error;

use crate::syntax::{NodeId, NodeKind, SyntaxTree};

use super::{ComplexityAnalysis, ComplexityFinding, ConstructKind, LineRange};

/// Failures while extracting scored constructs.
#[derive(Error, Debug)]
pub enum ComplexityError {
    #[error("function definition at line {0} has no name")]
    UnnamedFunction(usize),
    #[error("class definition at line {0} has no name")]
    UnnamedClass(usize),
}

/// Score every function and method in the tree.
///
/// Never fails: extraction errors degrade to `ComplexityAnalysis::Failed`.
pub fn analyze_complexity(tree: &SyntaxTree) -> ComplexityAnalysis {
    match extract_complexities(tree) {
        Ok(findings) => ComplexityAnalysis::Findings(findings),
        Err(e) => {
            log::debug!("complexity scoring failed: {}", e);
            ComplexityAnalysis::Failed {
                error: e.to_string(),
            }
        }
    }
}

/// A class finding waiting for its methods to be scored.
struct PendingClass {
    finding: usize,
    body_decisions: u32,
    method_scores: Vec<u32>,
}

/// Collect one finding per class and per function not nested inside
/// another function, ordered by first line.
fn extract_complexities(tree: &SyntaxTree) -> Result<Vec<ComplexityFinding>, ComplexityError> {
    let mut findings = Vec::new();
    let mut classes: HashMap<NodeId, PendingClass> = HashMap::new();
    // (node, enclosing class path, enclosing class node)
    let mut stack: Vec<(NodeId, Option<String>, Option<NodeId>)> = vec![(tree.root(), None, None)];

    while let Some((id, class_path, class_id)) = stack.pop() {
        let node = tree.node(id);
        let lines = LineRange {
            start: node.span.start_line,
            end: node.span.end_line,
        };
        let (child_path, child_class) = match &node.kind {
            NodeKind::FunctionDefinition { name } => {
                let name = name
                    .clone()
                    .ok_or(ComplexityError::UnnamedFunction(node.span.start_line))?;
                let complexity = cyclomatic_complexity(tree, id);
                if let Some(pending) = class_id.as_ref().and_then(|c| classes.get_mut(c)) {
                    pending.method_scores.push(complexity);
                }
                findings.push(ComplexityFinding {
                    name,
                    kind: if class_path.is_some() {
                        ConstructKind::Method
                    } else {
                        ConstructKind::Function
                    },
                    class_name: class_path,
                    complexity,
                    lines,
                });
                continue;
            }
            NodeKind::ClassDefinition { name } => {
                let name = name
                    .as_deref()
                    .ok_or(ComplexityError::UnnamedClass(node.span.start_line))?;
                classes.insert(
                    id,
                    PendingClass {
                        finding: findings.len(),
                        body_decisions: class_body_decisions(tree, id),
                        method_scores: Vec::new(),
                    },
                );
                findings.push(ComplexityFinding {
                    name: name.to_string(),
                    kind: ConstructKind::Class,
                    class_name: class_path.clone(),
                    complexity: 1,
                    lines,
                });
                let path = match &class_path {
                    Some(outer) => format!("{}.{}", outer, name),
                    None => name.to_string(),
                };
                (Some(path), Some(id))
            }
            _ => (class_path, class_id),
        };

        for &child in tree.children(id).iter().rev() {
            stack.push((child, child_path.clone(), child_class));
        }
    }

    for pending in classes.into_values() {
        findings[pending.finding].complexity = class_complexity(&pending);
    }

    findings.sort_by_key(|f| f.lines.start);
    Ok(findings)
}

/// Score of a class block.
///
/// The raw score is 1 + the decision points of every method (each method's
/// score minus one) + decision points in the class body itself. With
/// methods present it is averaged per method, plus one when there is more
/// than one method.
fn class_complexity(pending: &PendingClass) -> u32 {
    let methods = pending.method_scores.len() as u32;
    let raw = 1
        + pending.body_decisions
        + pending
            .method_scores
            .iter()
            .map(|score| score - 1)
            .sum::<u32>();
    if methods == 0 {
        raw
    } else {
        raw / methods + u32::from(methods > 1)
    }
}

/// Decision points in a class body outside its methods and nested classes.
fn class_body_decisions(tree: &SyntaxTree, class_id: NodeId) -> u32 {
    let mut total = 0;
    let mut stack: Vec<NodeId> = tree.children(class_id).to_vec();
    while let Some(id) = stack.pop() {
        if matches!(
            tree.node(id).kind,
            NodeKind::FunctionDefinition { .. } | NodeKind::ClassDefinition { .. }
        ) {
            continue;
        }
        total += decision_points(tree, id);
        stack.extend_from_slice(tree.children(id));
    }
    total
}

/// 1 + the decision points anywhere below `id`.
pub fn cyclomatic_complexity(tree: &SyntaxTree, id: NodeId) -> u32 {
    let decisions: u32 = tree
        .descendants(id)
        .skip(1)
        .map(|node| decision_points(tree, node))
        .sum();
    1 + decisions
}

fn decision_points(tree: &SyntaxTree, id: NodeId) -> u32 {
    match tree.node(id).kind {
        NodeKind::If
        | NodeKind::Elif
        | NodeKind::ConditionalExpression
        | NodeKind::ComprehensionIf
        | NodeKind::For
        | NodeKind::While
        | NodeKind::ComprehensionFor
        | NodeKind::BooleanOperator(_)
        | NodeKind::ExceptClause => 1,
        NodeKind::Match => match_arms(tree, id).saturating_sub(1),
        _ => 0,
    }
}

/// Count the `case` arms of a match statement. Arms sit either directly
/// under the statement or under its body block.
fn match_arms(tree: &SyntaxTree, id: NodeId) -> u32 {
    let mut arms = 0;
    for &child in tree.children(id) {
        match tree.node(child).kind {
            NodeKind::CaseClause => arms += 1,
            NodeKind::Other("block") => {
                arms += tree
                    .children(child)
                    .iter()
                    .filter(|&&c| tree.node(c).kind == NodeKind::CaseClause)
                    .count() as u32;
            }
            _ => {}
        }
    }
    arms
}
