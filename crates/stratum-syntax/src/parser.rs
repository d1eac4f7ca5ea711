//! Tree-sitter parsing wrapper for component sources.
//!
//! Tree-sitter never refuses input: broken source still yields a tree with
//! ERROR and MISSING nodes. The scanner needs a yes/no answer, so
//! [`ParseResult::check`] turns the first such node into a
//! [`SyntaxError::InvalidSource`].

use std::ops::Range;

use crate::error::SyntaxError;
use crate::language::SupportedLanguage;
use crate::position::point_to_one_based;

const CONTEXT_LIMIT: usize = 48;

/// Result of parsing one component's source text.
#[derive(Debug)]
pub struct ParseResult {
    tree: tree_sitter::Tree,
    source: String,
    language: SupportedLanguage,
}

impl ParseResult {
    /// Returns the parsed syntax tree.
    #[must_use]
    pub const fn tree(&self) -> &tree_sitter::Tree {
        &self.tree
    }

    /// Returns the source code that was parsed.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the language of the parsed code.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Returns the root node of the syntax tree.
    #[must_use]
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Returns whether the tree contains any ERROR or MISSING node.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Collects every syntax error in document order.
    #[must_use]
    pub fn errors(&self) -> Vec<SyntaxErrorInfo> {
        let mut errors = Vec::new();
        collect_error_nodes(self.tree.root_node(), &self.source, &mut errors);
        errors
    }

    /// Returns the first syntax error, if any.
    #[must_use]
    pub fn first_error(&self) -> Option<SyntaxErrorInfo> {
        self.errors().into_iter().next()
    }

    /// Rejects trees that contain syntax errors.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::InvalidSource`] located at the first error node.
    pub fn check(self) -> Result<Self, SyntaxError> {
        match self.first_error() {
            Some(info) => Err(SyntaxError::invalid_source(
                self.language,
                info.line,
                info.column,
                info.message,
            )),
            None => Ok(self),
        }
    }

    /// Returns the source text covered by `node`.
    #[must_use]
    pub fn text_of(&self, node: tree_sitter::Node<'_>) -> &str {
        self.source.get(node.byte_range()).unwrap_or_default()
    }
}

/// Information about a syntax error found during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxErrorInfo {
    /// Byte range of the error in the source.
    pub byte_range: Range<usize>,
    /// Line number (one-based) where the error starts.
    pub line: u32,
    /// Column number (one-based) where the error starts.
    pub column: u32,
    /// A snippet of the problematic source text.
    pub context: String,
    /// Human-readable description of the error.
    pub message: String,
}

impl SyntaxErrorInfo {
    fn from_node(node: tree_sitter::Node<'_>, source: &str) -> Self {
        let byte_range = node.byte_range();
        let context = source
            .get(byte_range.clone())
            .map(|text| {
                if text.chars().count() > CONTEXT_LIMIT {
                    let truncated: String = text.chars().take(CONTEXT_LIMIT).collect();
                    format!("{truncated}...")
                } else {
                    text.to_owned()
                }
            })
            .unwrap_or_default();

        let message = if node.is_missing() {
            format!("missing {}", node.kind())
        } else {
            "unexpected syntax".to_owned()
        };

        let (line, column) = point_to_one_based(node.start_position());

        Self {
            byte_range,
            line,
            column,
            context,
            message,
        }
    }
}

/// Tree-sitter parser wrapper for a specific language.
pub struct Parser {
    inner: tree_sitter::Parser,
    language: SupportedLanguage,
}

impl Parser {
    /// Creates a new parser for the given language.
    ///
    /// # Errors
    ///
    /// Returns an error if the Tree-sitter parser cannot be initialised
    /// with the language grammar.
    pub fn new(language: SupportedLanguage) -> Result<Self, SyntaxError> {
        let mut inner = tree_sitter::Parser::new();
        inner
            .set_language(&language.tree_sitter_language())
            .map_err(|e| SyntaxError::parser_init(language, e.to_string()))?;

        Ok(Self { inner, language })
    }

    /// Returns the language this parser is configured for.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Parses source code and returns the (possibly erroneous) tree.
    ///
    /// # Errors
    ///
    /// Returns an error if Tree-sitter fails to produce a tree at all.
    pub fn parse(&mut self, source: &str) -> Result<ParseResult, SyntaxError> {
        let tree = self
            .inner
            .parse(source, None)
            .ok_or_else(|| SyntaxError::parse(self.language, "parser produced no tree"))?;

        Ok(ParseResult {
            tree,
            source: source.to_owned(),
            language: self.language,
        })
    }
}

fn collect_error_nodes(
    node: tree_sitter::Node<'_>,
    source: &str,
    errors: &mut Vec<SyntaxErrorInfo>,
) {
    if node.is_error() || node.is_missing() {
        errors.push(SyntaxErrorInfo::from_node(node, source));
    }
    if !node.has_error() {
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_error_nodes(child, source, errors);
    }
}
