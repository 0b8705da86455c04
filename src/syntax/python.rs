//! Python parser adapter using tree-sitter.

use tree_sitter::{Language, Node, Parser};

use super::{BoolOp, NodeId, NodeKind, ParseError, SourceParser, Span, SyntaxNode, SyntaxTree};

pub struct PythonParser {
    language: Language,
}

impl PythonParser {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_python::LANGUAGE.into(),
        }
    }

    fn create_parser(&self) -> Result<Parser, ParseError> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }
}

impl Default for PythonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceParser for PythonParser {
    fn language_id(&self) -> &'static str {
        "python"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    fn parse(&self, source: &str) -> Result<SyntaxTree, ParseError> {
        let mut parser = self.create_parser()?;
        let tree = parser.parse(source, None).ok_or(ParseError::NoTree)?;
        let root = tree.root_node();

        if root.has_error() {
            let node = first_error(root).unwrap_or(root);
            let position = node.start_position();
            let detail = if node.is_missing() {
                format!("missing {}", node.kind())
            } else {
                "unexpected input".to_string()
            };
            return Err(ParseError::InvalidSyntax {
                line: position.row + 1,
                column: position.column + 1,
                detail,
            });
        }

        reject_legacy_statements(root)?;
        check_indentation(root, source)?;

        Ok(build_tree(root, source.as_bytes()))
    }
}

fn invalid_at(node: Node, detail: impl Into<String>) -> ParseError {
    let position = node.start_position();
    ParseError::InvalidSyntax {
        line: position.row + 1,
        column: position.column + 1,
        detail: detail.into(),
    }
}

/// The grammar still accepts the Python 2 `print` and `exec` statements.
fn reject_legacy_statements(root: Node) -> Result<(), ParseError> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        match node.kind() {
            "print_statement" => return Err(invalid_at(node, "print statement is Python 2 syntax")),
            "exec_statement" => return Err(invalid_at(node, "exec statement is Python 2 syntax")),
            _ => {}
        }
        let mut cursor = node.walk();
        stack.extend(node.named_children(&mut cursor));
    }
    Ok(())
}

const TAB_SIZE: usize = 8;

/// Indentation of a line measured twice: with 8-column tabs and with
/// 1-column tabs. The two must order lines the same way.
fn indent_widths(line: &str) -> (usize, usize) {
    let mut col = 0;
    let mut alt = 0;
    for ch in line.chars() {
        match ch {
            ' ' => {
                col += 1;
                alt += 1;
            }
            '\t' => {
                col = (col / TAB_SIZE + 1) * TAB_SIZE;
                alt += 1;
            }
            '\x0c' => {
                col = 0;
                alt = 0;
            }
            _ => break,
        }
    }
    (col, alt)
}

fn leading_whitespace(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t', '\x0c']).len()
}

/// Rows that begin a logical line: statements, clauses and decorators that
/// are the first token on their row.
fn logical_line_rows(root: Node, lines: &[&str]) -> Vec<usize> {
    let mut rows = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.is_extra() {
                continue;
            }
            stack.push(child);

            let opens_line = matches!(node.kind(), "module" | "block" | "decorated_definition")
                || matches!(
                    child.kind(),
                    "elif_clause"
                        | "else_clause"
                        | "except_clause"
                        | "except_group_clause"
                        | "finally_clause"
                        | "case_clause"
                );
            if !opens_line {
                continue;
            }
            let position = child.start_position();
            let line = lines.get(position.row).copied().unwrap_or("");
            if leading_whitespace(line) == position.column {
                rows.push(position.row);
            }
        }
    }
    rows.sort_unstable();
    rows.dedup();
    rows
}

/// Reject indentation whose meaning depends on the tab size.
fn check_indentation(root: Node, source: &str) -> Result<(), ParseError> {
    let lines: Vec<&str> = source.split('\n').collect();
    let mut levels: Vec<(usize, usize)> = vec![(0, 0)];

    for row in logical_line_rows(root, &lines) {
        let (col, alt) = indent_widths(lines.get(row).copied().unwrap_or(""));
        let (top_col, top_alt) = levels.last().copied().unwrap_or((0, 0));

        let detail = if col == top_col {
            (alt != top_alt).then_some("inconsistent use of tabs and spaces in indentation")
        } else if col > top_col {
            levels.push((col, alt));
            (alt <= top_alt).then_some("inconsistent use of tabs and spaces in indentation")
        } else {
            while levels.len() > 1 && levels.last().is_some_and(|&(c, _)| col < c) {
                levels.pop();
            }
            match levels.last() {
                Some(&(c, _)) if c != col => {
                    Some("unindent does not match any outer indentation level")
                }
                Some(&(_, a)) if a != alt => {
                    Some("inconsistent use of tabs and spaces in indentation")
                }
                _ => None,
            }
        };

        if let Some(detail) = detail {
            return Err(ParseError::InvalidSyntax {
                line: row + 1,
                column: 1,
                detail: detail.to_string(),
            });
        }
    }
    Ok(())
}

/// Find the first ERROR or MISSING node in document order.
fn first_error(root: Node) -> Option<Node> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if !node.has_error() {
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    None
}

/// Convert the tree-sitter tree into the arena representation.
///
/// Only named nodes are kept; keywords and punctuation carry no facts the
/// analyses need. Nodes are appended in pre-order.
fn build_tree(root: Node, source: &[u8]) -> SyntaxTree {
    let mut nodes: Vec<SyntaxNode> = Vec::new();
    let mut stack: Vec<(Node, Option<&'static str>, Option<NodeId>)> = vec![(root, None, None)];

    while let Some((node, field, parent)) = stack.pop() {
        let id = NodeId(nodes.len());
        nodes.push(SyntaxNode {
            kind: classify(node, field, source),
            span: Span::from_node(node),
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            nodes[parent.0].children.push(id);
        }

        let mut pending = Vec::new();
        let mut cursor = node.walk();
        if cursor.goto_first_child() {
            loop {
                let child = cursor.node();
                if child.is_named() {
                    pending.push((child, cursor.field_name(), Some(id)));
                }
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }
        stack.extend(pending.into_iter().rev());
    }

    SyntaxTree::from_nodes(nodes)
}

fn node_text(node: Node, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or("").to_string()
}

fn field_text(node: Node, field: &str, source: &[u8]) -> Option<String> {
    node.child_by_field_name(field)
        .map(|n| node_text(n, source))
        .filter(|s| !s.is_empty())
}

fn classify(node: Node, field: Option<&str>, source: &[u8]) -> NodeKind {
    match node.kind() {
        "module" => NodeKind::Module,
        "function_definition" => NodeKind::FunctionDefinition {
            name: field_text(node, "name", source),
        },
        "class_definition" => NodeKind::ClassDefinition {
            name: field_text(node, "name", source),
        },
        "lambda" => NodeKind::Lambda,
        "identifier" if is_name_reference(node, field) => NodeKind::NameReference {
            name: node_text(node, source),
        },
        "call" => NodeKind::Call {
            callee: node
                .child_by_field_name("function")
                .filter(|f| f.kind() == "identifier")
                .map(|f| node_text(f, source)),
        },
        "with_statement" => NodeKind::ScopedAcquisition,
        "if_statement" => NodeKind::If,
        "elif_clause" => NodeKind::Elif,
        "conditional_expression" => NodeKind::ConditionalExpression,
        "for_statement" => NodeKind::For,
        "while_statement" => NodeKind::While,
        "for_in_clause" => NodeKind::ComprehensionFor,
        "if_clause" => NodeKind::ComprehensionIf,
        "boolean_operator" => match node.child_by_field_name("operator").map(|op| op.kind()) {
            Some("and") => NodeKind::BooleanOperator(BoolOp::And),
            Some("or") => NodeKind::BooleanOperator(BoolOp::Or),
            _ => NodeKind::Other("boolean_operator"),
        },
        "except_clause" | "except_group_clause" => NodeKind::ExceptClause,
        "match_statement" => NodeKind::Match,
        "case_clause" => NodeKind::CaseClause,
        other => NodeKind::Other(other),
    }
}

fn is_parameter_list(kind: &str) -> bool {
    matches!(
        kind,
        "parameters" | "lambda_parameters" | "typed_parameter" | "typed_default_parameter"
    )
}

fn is_except_clause(kind: &str) -> bool {
    matches!(kind, "except_clause" | "except_group_clause")
}

/// Decide whether an identifier is a value/target use of a name.
///
/// Definition names, attribute names, keyword-argument names, parameters,
/// import paths, `global`/`nonlocal` lists, `except ... as` aliases and
/// match-pattern captures are bindings or labels, not name references.
fn is_name_reference(node: Node, field: Option<&str>) -> bool {
    if inside_case_pattern(node) {
        return is_pattern_reference(node);
    }

    let Some(parent) = node.parent() else {
        return true;
    };

    let declared = match (parent.kind(), field) {
        ("function_definition" | "class_definition", Some("name")) => true,
        ("attribute", Some("attribute")) => true,
        ("keyword_argument", Some("name")) => true,
        ("default_parameter" | "typed_default_parameter", Some("name")) => true,
        ("parameters" | "lambda_parameters" | "typed_parameter", _) => true,
        ("list_splat_pattern" | "dictionary_splat_pattern", _) => parent
            .parent()
            .is_some_and(|grandparent| is_parameter_list(grandparent.kind())),
        ("dotted_name" | "aliased_import" | "global_statement" | "nonlocal_statement", _) => true,
        (kind, _) if is_except_clause(kind) => node
            .prev_sibling()
            .is_some_and(|sibling| sibling.kind() == "as"),
        ("as_pattern_target", _) => parent
            .parent()
            .and_then(|pattern| pattern.parent())
            .is_some_and(|clause| is_except_clause(clause.kind())),
        _ => false,
    };

    !declared
}

/// Inside a `case` pattern only the class of a class pattern and the head
/// of a dotted value pattern (`Color.RED`) are loads. Every other
/// identifier is a capture or a keyword label.
fn is_pattern_reference(node: Node) -> bool {
    if node.prev_named_sibling().is_some() {
        return false;
    }
    let Some(parent) = node.parent() else {
        return false;
    };
    match parent.kind() {
        "class_pattern" => true,
        "dotted_name" => {
            parent.named_child_count() > 1
                || (parent.prev_named_sibling().is_none()
                    && parent
                        .parent()
                        .is_some_and(|pattern| pattern.kind() == "class_pattern"))
        }
        _ => false,
    }
}

fn inside_case_pattern(node: Node) -> bool {
    let mut current = node.parent();
    while let Some(n) = current {
        match n.kind() {
            "case_pattern" => return true,
            "case_clause" | "block" | "module" => return false,
            _ => current = n.parent(),
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> SyntaxTree {
        PythonParser::new().parse(source).unwrap()
    }

    fn names(tree: &SyntaxTree) -> Vec<String> {
        tree.preorder()
            .filter_map(|id| match &tree.node(id).kind {
                NodeKind::NameReference { name } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_parse_function_and_class() {
        let tree = parse(
            r#"
def hello():
    pass

class Greeter:
    async def greet(self):
        pass
"#,
        );

        let defs: Vec<_> = tree
            .preorder()
            .filter_map(|id| match &tree.node(id).kind {
                NodeKind::FunctionDefinition { name } => name.clone(),
                NodeKind::ClassDefinition { name } => name.clone(),
                _ => None,
            })
            .collect();
        assert_eq!(defs, vec!["hello", "Greeter", "greet"]);
        assert_eq!(tree.node(tree.root()).kind, NodeKind::Module);
    }

    #[test]
    fn test_invalid_syntax_is_rejected() {
        let err = PythonParser::new()
            .parse("def broken(:\n    pass\n")
            .unwrap_err();
        match err {
            ParseError::InvalidSyntax { line, .. } => assert_eq!(line, 1),
            other => panic!("unexpected error: {}", other),
        }
    }

    fn syntax_error(source: &str) -> (usize, String) {
        match PythonParser::new().parse(source) {
            Err(ParseError::InvalidSyntax { line, detail, .. }) => (line, detail),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected {:?} to be rejected", source),
        }
    }

    #[test]
    fn test_python2_statements_are_rejected() {
        let (line, detail) = syntax_error("x = 1\nprint \"hello\"\n");
        assert_eq!(line, 2);
        assert!(detail.contains("print"));

        let (line, detail) = syntax_error("exec \"x = 1\"\n");
        assert_eq!(line, 1);
        assert!(detail.contains("exec"));

        assert!(PythonParser::new().parse("print(\"hello\")\n").is_ok());
    }

    #[test]
    fn test_mixed_tabs_and_spaces_are_rejected() {
        let (line, detail) = syntax_error("if x:\n\ty = 1\n        z = 2\n");
        assert_eq!(line, 3);
        assert_eq!(detail, "inconsistent use of tabs and spaces in indentation");
    }

    #[test]
    fn test_consistent_indentation_is_accepted() {
        let parser = PythonParser::new();
        assert!(parser
            .parse("def f(x):\n\tif x:\n\t\treturn 1\n\treturn 0\n")
            .is_ok());
        assert!(parser
            .parse("def f(x):\n    if x:  # note\n        return 1\n    else:\n        return 0\n")
            .is_ok());
        assert!(parser
            .parse("class A:\n    @staticmethod\n    def go():\n        pass\n")
            .is_ok());
    }

    #[test]
    fn test_name_references_skip_bindings() {
        let tree = parse(
            r#"
import os.path as osp
from typing import List

def compute(value, *args, scale=2, **kwargs):
    global Counter
    result = helper(value, key=scale)
    return result.attr
"#,
        );

        assert_eq!(
            names(&tree),
            vec!["result", "helper", "value", "scale", "result"]
        );
    }

    #[test]
    fn test_with_target_and_loop_variable_are_references() {
        let tree = parse(
            r#"
with open(path) as Handle:
    for Item in Handle:
        process(Item)
"#,
        );

        assert_eq!(
            names(&tree),
            vec!["open", "path", "Handle", "Item", "Handle", "process", "Item"]
        );
    }

    #[test]
    fn test_case_patterns_keep_class_and_value_names() {
        let tree = parse(
            r#"
match shape:
    case Point(x=0, y=Y):
        pass
    case Color.RED:
        pass
    case [first, *Rest] if first:
        pass
    case Other:
        pass
"#,
        );

        assert_eq!(names(&tree), vec!["shape", "Point", "Color", "first"]);
    }

    #[test]
    fn test_call_callee() {
        let tree = parse("data = open('x').read()\nos.open('y')\n");
        let callees: Vec<Option<String>> = tree
            .preorder()
            .filter_map(|id| match &tree.node(id).kind {
                NodeKind::Call { callee } => Some(callee.clone()),
                _ => None,
            })
            .collect();

        // `open('x').read()` is the outer call; its callee is an attribute.
        assert_eq!(callees, vec![None, Some("open".to_string()), None]);
    }

    #[test]
    fn test_boolean_operators() {
        let tree = parse("ok = a and b or c\n");
        let ops: Vec<_> = tree
            .preorder()
            .filter_map(|id| match tree.node(id).kind {
                NodeKind::BooleanOperator(op) => Some(op),
                _ => None,
            })
            .collect();
        assert_eq!(ops, vec![BoolOp::Or, BoolOp::And]);
    }

    #[test]
    fn test_spans_are_one_indexed() {
        let tree = parse("x = 1\n\ndef f():\n    return x\n");
        let func = tree
            .preorder()
            .find(|&id| matches!(tree.node(id).kind, NodeKind::FunctionDefinition { .. }))
            .unwrap();
        let span = tree.node(func).span;
        assert_eq!(span.start_line, 3);
        assert_eq!(span.end_line, 4);
    }
}
