//! Extraction of statically visible module references.
//!
//! A reference is either an import-style statement or a side-effect marker:
//! a call such as `requires("schema")` whose callee name appears in the
//! configured [`MarkerSet`]. References are returned unresolved, as dotted
//! path segments; mapping them onto component identities is the resolver's
//! job because only it knows which components exist in a run.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::language::SupportedLanguage;
use crate::parser::ParseResult;
use crate::position::point_to_one_based;

/// Marker name recognised when no other set is configured.
pub const DEFAULT_MARKER: &str = "requires";

const RUST_PATH_ANCHORS: &[&str] = &["crate", "self", "super", "$crate"];

/// How a reference was expressed in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// An `import` / `use` style statement.
    Import,
    /// A registration call naming something that must already be present.
    Marker,
}

/// A dotted module path mentioned by a component.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub struct ModuleReference {
    segments: Vec<String>,
    kind: ReferenceKind,
    line: u32,
}

impl ModuleReference {
    /// Creates a reference from its path segments.
    #[must_use]
    pub fn new(
        segments: impl IntoIterator<Item = impl Into<String>>,
        kind: ReferenceKind,
        line: u32,
    ) -> Self {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            kind,
            line,
        }
    }

    /// Returns the path segments, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns how the reference was expressed.
    #[must_use]
    pub const fn kind(&self) -> ReferenceKind {
        self.kind
    }

    /// Returns the one-based line the reference starts on.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Returns the segments joined with `.`.
    #[must_use]
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }
}

/// Callee names treated as side-effect dependency markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSet {
    names: BTreeSet<String>,
}

impl MarkerSet {
    /// Creates a marker set from callee names.
    #[must_use]
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a marker set that recognises nothing.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            names: BTreeSet::new(),
        }
    }

    /// Returns whether `name` is a marker.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Iterates over the marker names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl Default for MarkerSet {
    fn default() -> Self {
        Self::new([DEFAULT_MARKER])
    }
}

/// Walks a parsed component and returns its references in source order.
#[must_use]
pub fn extract_references(parsed: &ParseResult, markers: &MarkerSet) -> Vec<ModuleReference> {
    let mut walker = Walker {
        parsed,
        markers,
        found: Vec::new(),
    };
    walker.walk(parsed.root_node());
    walker.found
}

struct Walker<'a> {
    parsed: &'a ParseResult,
    markers: &'a MarkerSet,
    found: Vec<ModuleReference>,
}

impl Walker<'_> {
    fn text(&self, node: tree_sitter::Node<'_>) -> &str {
        self.parsed.text_of(node)
    }

    fn push(&mut self, segments: Vec<String>, kind: ReferenceKind, node: tree_sitter::Node<'_>) {
        if segments.is_empty() {
            return;
        }
        let (line, _) = point_to_one_based(node.start_position());
        self.found.push(ModuleReference {
            segments,
            kind,
            line,
        });
    }

    /// Pre-order walk driven by a tree cursor, so nesting depth never grows
    /// the call stack. Each visit reports whether to descend into the node.
    fn walk(&mut self, root: tree_sitter::Node<'_>) {
        let visit: fn(&mut Self, tree_sitter::Node<'_>) -> bool = match self.parsed.language() {
            SupportedLanguage::Python => Self::python,
            SupportedLanguage::Rust => Self::rust,
        };
        let mut cursor = root.walk();
        loop {
            let descend = visit(self, cursor.node());
            if descend && cursor.goto_first_child() {
                continue;
            }
            while !cursor.goto_next_sibling() {
                if !cursor.goto_parent() {
                    return;
                }
            }
        }
    }

    fn python(&mut self, node: tree_sitter::Node<'_>) -> bool {
        match node.kind() {
            "import_statement" => {
                self.python_import(node);
                false
            }
            "import_from_statement" => {
                self.python_import_from(node);
                false
            }
            "call" => {
                self.python_marker(node);
                true
            }
            _ => true,
        }
    }

    fn python_import(&mut self, node: tree_sitter::Node<'_>) {
        let mut cursor = node.walk();
        let names: Vec<_> = node.children_by_field_name("name", &mut cursor).collect();
        for name in names {
            let dotted = unalias(name);
            let segments = split_dotted(self.text(dotted));
            self.push(segments, ReferenceKind::Import, name);
        }
    }

    fn python_import_from(&mut self, node: tree_sitter::Node<'_>) {
        let Some(module) = node.child_by_field_name("module_name") else {
            return;
        };

        let module_path = if module.kind() == "relative_import" {
            first_named_child_of_kind(module, "dotted_name")
        } else {
            Some(module)
        };

        let head = module_path
            .map(|path| split_dotted(self.text(path)))
            .unwrap_or_default();

        let mut cursor = node.walk();
        let names: Vec<_> = node.children_by_field_name("name", &mut cursor).collect();
        if names.is_empty() {
            // `from pkg import *`
            self.push(head, ReferenceKind::Import, node);
            return;
        }

        // Each imported name may itself be a submodule, so the candidate is
        // `module.name`; resolution falls back to the module prefix.
        for name in names {
            let mut segments = head.clone();
            segments.extend(split_dotted(self.text(unalias(name))));
            self.push(segments, ReferenceKind::Import, name);
        }
    }

    fn python_marker(&mut self, call: tree_sitter::Node<'_>) {
        let Some(function) = call.child_by_field_name("function") else {
            return;
        };
        let callee = match function.kind() {
            "identifier" => Some(function),
            "attribute" => function.child_by_field_name("attribute"),
            _ => None,
        };
        let is_marker = callee.is_some_and(|name| self.markers.contains(self.text(name)));
        if !is_marker {
            return;
        }
        let Some(arguments) = call.child_by_field_name("arguments") else {
            return;
        };

        let mut cursor = arguments.walk();
        let strings: Vec<_> = arguments
            .named_children(&mut cursor)
            .filter(|arg| arg.kind() == "string")
            .collect();
        for literal in strings {
            let segments = split_dotted(strip_string_literal(self.text(literal)));
            self.push(segments, ReferenceKind::Marker, literal);
        }
    }

    fn rust(&mut self, node: tree_sitter::Node<'_>) -> bool {
        match node.kind() {
            "use_declaration" => {
                if let Some(argument) = node.child_by_field_name("argument") {
                    let mut paths = Vec::new();
                    self.rust_use_paths(argument, &[], &mut paths);
                    for path in paths {
                        self.push(strip_anchors(path), ReferenceKind::Import, node);
                    }
                }
                false
            }
            "extern_crate_declaration" => {
                if let Some(name) = node.child_by_field_name("name") {
                    let segments = vec![self.text(name).to_owned()];
                    self.push(segments, ReferenceKind::Import, node);
                }
                false
            }
            "macro_invocation" => {
                self.rust_macro_marker(node);
                true
            }
            "call_expression" => {
                self.rust_call_marker(node);
                true
            }
            _ => true,
        }
    }

    fn rust_use_paths(
        &self,
        node: tree_sitter::Node<'_>,
        prefix: &[String],
        paths: &mut Vec<Vec<String>>,
    ) {
        let extend = |tail: Vec<String>| {
            let mut path = prefix.to_vec();
            path.extend(tail);
            path
        };

        match node.kind() {
            "identifier" | "crate" | "self" | "super" | "metavariable" | "scoped_identifier" => {
                paths.push(extend(split_rust_path(self.text(node))));
            }
            "use_as_clause" => {
                if let Some(path) = node.child_by_field_name("path") {
                    self.rust_use_paths(path, prefix, paths);
                }
            }
            "use_wildcard" => {
                let mut cursor = node.walk();
                let inner = node.named_children(&mut cursor).next();
                if let Some(path) = inner {
                    self.rust_use_paths(path, prefix, paths);
                }
            }
            "scoped_use_list" => {
                let head = node
                    .child_by_field_name("path")
                    .map(|path| split_rust_path(self.text(path)))
                    .unwrap_or_default();
                let nested = extend(head);
                if let Some(list) = node.child_by_field_name("list") {
                    self.rust_use_list(list, &nested, paths);
                }
            }
            "use_list" => self.rust_use_list(node, prefix, paths),
            _ => {}
        }
    }

    fn rust_use_list(
        &self,
        list: tree_sitter::Node<'_>,
        prefix: &[String],
        paths: &mut Vec<Vec<String>>,
    ) {
        let mut cursor = list.walk();
        for item in list.named_children(&mut cursor) {
            self.rust_use_paths(item, prefix, paths);
        }
    }

    fn rust_macro_marker(&mut self, node: tree_sitter::Node<'_>) {
        let Some(name) = node.child_by_field_name("macro") else {
            return;
        };
        if !self.markers.contains(last_rust_segment(self.text(name))) {
            return;
        }
        let mut literals = Vec::new();
        collect_rust_strings(node, &mut literals);
        for literal in literals {
            let segments = split_dotted(strip_string_literal(self.text(literal)));
            self.push(segments, ReferenceKind::Marker, literal);
        }
    }

    fn rust_call_marker(&mut self, node: tree_sitter::Node<'_>) {
        let Some(function) = node.child_by_field_name("function") else {
            return;
        };
        let callee = match function.kind() {
            "field_expression" => function
                .child_by_field_name("field")
                .map(|field| self.text(field)),
            _ => Some(last_rust_segment(self.text(function))),
        };
        if !callee.is_some_and(|name| self.markers.contains(name)) {
            return;
        }
        let Some(arguments) = node.child_by_field_name("arguments") else {
            return;
        };
        let mut cursor = arguments.walk();
        let literals: Vec<_> = arguments
            .named_children(&mut cursor)
            .filter(|arg| arg.kind() == "string_literal")
            .collect();
        for literal in literals {
            let segments = split_dotted(strip_string_literal(self.text(literal)));
            self.push(segments, ReferenceKind::Marker, literal);
        }
    }
}

fn unalias(node: tree_sitter::Node<'_>) -> tree_sitter::Node<'_> {
    if node.kind() == "aliased_import" {
        node.child_by_field_name("name").unwrap_or(node)
    } else {
        node
    }
}

fn first_named_child_of_kind<'tree>(
    node: tree_sitter::Node<'tree>,
    kind: &str,
) -> Option<tree_sitter::Node<'tree>> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|child| child.kind() == kind);
    found
}

fn collect_rust_strings<'tree>(
    node: tree_sitter::Node<'tree>,
    literals: &mut Vec<tree_sitter::Node<'tree>>,
) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "string_literal" {
            literals.push(child);
        } else if child.kind() == "token_tree" {
            collect_rust_strings(child, literals);
        }
    }
}

fn split_dotted(text: &str) -> Vec<String> {
    text.split('.')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect()
}

fn split_rust_path(text: &str) -> Vec<String> {
    text.split("::")
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect()
}

fn last_rust_segment(text: &str) -> &str {
    text.rsplit("::").next().unwrap_or(text).trim()
}

fn strip_anchors(path: Vec<String>) -> Vec<String> {
    path.into_iter()
        .skip_while(|segment| RUST_PATH_ANCHORS.contains(&segment.as_str()))
        .collect()
}

fn strip_string_literal(text: &str) -> &str {
    text.trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '#')
}
