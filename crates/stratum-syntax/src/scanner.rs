//! Parse-and-extract entry point reused across a whole run.

use std::collections::HashMap;

use crate::error::SyntaxError;
use crate::language::SupportedLanguage;
use crate::parser::Parser;
use crate::references::{MarkerSet, ModuleReference, extract_references};

/// Scans component sources for module references.
///
/// Parsers are created lazily, one per language, and reused for every
/// subsequent source of that language.
pub struct SourceScanner {
    markers: MarkerSet,
    parsers: HashMap<SupportedLanguage, Parser>,
}

impl SourceScanner {
    /// Creates a scanner recognising the given marker callees.
    #[must_use]
    pub fn new(markers: MarkerSet) -> Self {
        Self {
            markers,
            parsers: HashMap::new(),
        }
    }

    /// Returns the marker set in use.
    #[must_use]
    pub const fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    /// Parses `source` and returns its references in source order.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::InvalidSource`] when the source does not parse
    /// cleanly, or a parser error when the grammar cannot be loaded.
    pub fn scan(
        &mut self,
        language: SupportedLanguage,
        source: &str,
    ) -> Result<Vec<ModuleReference>, SyntaxError> {
        let parser = match self.parsers.entry(language) {
            std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(Parser::new(language)?)
            }
        };
        let parsed = parser.parse(source)?.check()?;
        Ok(extract_references(&parsed, &self.markers))
    }
}

impl Default for SourceScanner {
    fn default() -> Self {
        Self::new(MarkerSet::default())
    }
}
