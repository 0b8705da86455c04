//! Syntax model for one source unit.
//!
//! A `SourceParser` turns raw text into an owned `SyntaxTree`: an arena of
//! nodes with downward links only. Upward queries go through a
//! `ParentIndex`, built per tree on demand and dropped with it.
//!
//! ```text
//! ┌────────────┐  parse   ┌────────────┐  build   ┌─────────────┐
//! │ source text│─────────▶│ SyntaxTree │─────────▶│ ParentIndex │
//! └────────────┘          └────────────┘          └─────────────┘
//! ```

mod python;
mod tree;

pub use python::PythonParser;
pub use tree::{
    Ancestors, BoolOp, NodeId, NodeKind, ParentIndex, Preorder, Span, SyntaxNode, SyntaxTree,
};

use thiserror::Error;

/// Errors produced while parsing a source unit.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("invalid syntax at line {line}, column {column}: {detail}")]
    InvalidSyntax {
        line: usize,
        column: usize,
        detail: String,
    },
    #[error("failed to load grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),
    #[error("parser returned no tree")]
    NoTree,
}

/// Language parser: text in, syntax tree out.
pub trait SourceParser: Send + Sync {
    /// Returns the language identifier (e.g., "python").
    fn language_id(&self) -> &'static str;

    /// Returns file extensions this parser handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Parse source text into a syntax tree.
    ///
    /// Fails when the text is not syntactically valid in the target grammar.
    fn parse(&self, source: &str) -> Result<SyntaxTree, ParseError>;

    /// Check if this parser handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}

/// One file under inspection: its path, raw text and parsed tree.
#[derive(Debug)]
pub struct SourceUnit {
    path: String,
    text: String,
    tree: SyntaxTree,
}

impl SourceUnit {
    /// Parse `text` and bundle it with its path.
    pub fn parse(
        path: impl Into<String>,
        text: impl Into<String>,
        parser: &dyn SourceParser,
    ) -> Result<Self, ParseError> {
        let text = text.into();
        let tree = parser.parse(&text)?;
        Ok(Self {
            path: path.into(),
            text,
            tree,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_unit_keeps_text_and_path() {
        let unit = SourceUnit::parse("pkg/mod.py", "x = 1\n", &PythonParser::new()).unwrap();
        assert_eq!(unit.path(), "pkg/mod.py");
        assert_eq!(unit.text(), "x = 1\n");
        assert!(!unit.tree().is_empty());
    }

    #[test]
    fn test_handles_extension() {
        let parser = PythonParser::new();
        assert_eq!(parser.language_id(), "python");
        assert!(parser.handles_extension("py"));
        assert!(!parser.handles_extension("rs"));
    }

    #[test]
    fn test_parse_error_propagates() {
        let err = SourceUnit::parse("bad.py", "if x\n", &PythonParser::new()).unwrap_err();
        assert!(err.to_string().starts_with("invalid syntax at line"));
    }
}
