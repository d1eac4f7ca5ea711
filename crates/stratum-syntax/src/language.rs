//! Language detection and Tree-sitter grammar selection.
//!
//! A component's language is either stated on its input record or inferred
//! from the extension of the file it was read from.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Languages the scanner can extract references from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportedLanguage {
    /// Python source files (`.py`, `.pyi`).
    #[default]
    Python,
    /// Rust source files (`.rs`).
    Rust,
}

impl SupportedLanguage {
    const ALL: [Self; 2] = [Self::Python, Self::Rust];

    /// File extensions, without the dot, that hold components in this language.
    #[must_use]
    pub const fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Python => &["py", "pyi"],
            Self::Rust => &["rs"],
        }
    }

    /// Looks up the language owning `ext`, ignoring ASCII case.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|language| {
            language
                .extensions()
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
    }

    /// Detects the language of a component file from its extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()?.to_str().and_then(Self::from_extension)
    }

    /// Grammar used to parse component source.
    #[must_use]
    pub fn tree_sitter_language(self) -> tree_sitter::Language {
        match self {
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            Self::Rust => tree_sitter_rust::LANGUAGE.into(),
        }
    }

    /// Returns the lower-case identifier used in cache digests and events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Rust => "rust",
        }
    }
}

impl fmt::Display for SupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing a language identifier fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported language: '{0}'")]
pub struct LanguageParseError(String);

impl LanguageParseError {
    /// Returns the input that failed to parse.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.0
    }
}

impl FromStr for SupportedLanguage {
    type Err = LanguageParseError;

    /// Accepts a language name or one of its extensions.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        Self::ALL
            .into_iter()
            .find(|language| language.as_str().eq_ignore_ascii_case(trimmed))
            .or_else(|| Self::from_extension(trimmed))
            .ok_or_else(|| LanguageParseError(trimmed.to_ascii_lowercase()))
    }
}
