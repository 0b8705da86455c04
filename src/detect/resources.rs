//! Detection of resources acquired outside a `with` block.
//!
//! The check is syntactic: a call to an acquisition function is safe only
//! when some ancestor is a `with` statement. Releasing the resource any
//! other way (`try/finally`, `contextlib.closing`, `ExitStack`) is not
//! recognized and is still reported.

use crate::syntax::{NodeId, NodeKind, ParentIndex, SyntaxTree};

use super::{InspectError, ResourceFinding};

/// Default acquisition functions.
pub const DEFAULT_RESOURCE_FUNCTIONS: &[&str] = &["open"];

/// Names of the functions that acquire a resource.
#[derive(Debug, Clone)]
pub struct ResourceRules {
    functions: Vec<String>,
}

impl ResourceRules {
    pub fn new<I, S>(functions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            functions: functions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_acquisition(&self, callee: &str) -> bool {
        self.functions.iter().any(|f| f == callee)
    }
}

impl Default for ResourceRules {
    fn default() -> Self {
        Self::new(DEFAULT_RESOURCE_FUNCTIONS.iter().copied())
    }
}

/// Report every acquisition call with no enclosing `with` block.
pub fn check_resources(
    tree: &SyntaxTree,
    rules: &ResourceRules,
) -> Result<Vec<ResourceFinding>, InspectError> {
    let parents = ParentIndex::build(tree);
    let mut findings = Vec::new();

    for id in tree.preorder() {
        let node = tree.node(id);
        let NodeKind::Call {
            callee: Some(callee),
        } = &node.kind
        else {
            continue;
        };
        if !rules.is_acquisition(callee) {
            continue;
        }
        if !is_scoped(&parents, id)? {
            findings.push(ResourceFinding {
                call: callee.clone(),
                line: node.span.start_line,
                message: format!(
                    "Line {}: file opened without a context manager (with)",
                    node.span.start_line
                ),
            });
        }
    }

    Ok(findings)
}

/// Walk from `id` toward the root looking for a `with` statement.
fn is_scoped(parents: &ParentIndex, id: NodeId) -> Result<bool, InspectError> {
    let tree = parents.tree();
    let mut current = id;
    loop {
        match parents.parent(current) {
            Some(parent) => {
                if tree.node(parent).kind == NodeKind::ScopedAcquisition {
                    return Ok(true);
                }
                current = parent;
            }
            None if current == tree.root() => return Ok(false),
            None => {
                return Err(InspectError::MalformedTree {
                    line: tree.node(current).span.start_line,
                    reason: "node is detached from the root",
                })
            }
        }
    }
}
