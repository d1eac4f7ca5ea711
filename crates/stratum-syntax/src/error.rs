//! Error types for source scanning operations.
//!
//! This module provides structured error types for the operations in the
//! `stratum-syntax` crate: parser set-up, parsing, and reference extraction.

use std::path::PathBuf;

use thiserror::Error;

use crate::language::SupportedLanguage;

/// Errors from syntactic analysis operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyntaxError {
    /// Failed to initialise the Tree-sitter parser for a language.
    #[error("failed to initialise parser for {language}: {message}")]
    ParserInitError {
        /// The language that failed to initialise.
        language: SupportedLanguage,
        /// Description of the failure.
        message: String,
    },

    /// Failed to determine language from file path.
    #[error("could not determine language for path: {}", path.display())]
    UnknownLanguage {
        /// The path that could not be mapped to a language.
        path: PathBuf,
    },

    /// Failed to parse source code.
    #[error("failed to parse {language}: {message}")]
    ParseError {
        /// The language that failed to parse.
        language: SupportedLanguage,
        /// Description of the failure.
        message: String,
    },

    /// The source parsed into a tree containing syntax errors.
    #[error("syntax error in {language} source at {line}:{column}: {message}")]
    InvalidSource {
        /// The language of the rejected source.
        language: SupportedLanguage,
        /// One-based line of the first error.
        line: u32,
        /// One-based column of the first error.
        column: u32,
        /// Description of the first error.
        message: String,
    },
}

impl SyntaxError {
    /// Creates a parser initialisation error.
    #[must_use]
    pub fn parser_init(language: SupportedLanguage, message: impl Into<String>) -> Self {
        Self::ParserInitError {
            language,
            message: message.into(),
        }
    }

    /// Creates an unknown language error.
    #[must_use]
    pub const fn unknown_language(path: PathBuf) -> Self {
        Self::UnknownLanguage { path }
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(language: SupportedLanguage, message: impl Into<String>) -> Self {
        Self::ParseError {
            language,
            message: message.into(),
        }
    }

    /// Creates an invalid source error located at the given position.
    #[must_use]
    pub fn invalid_source(
        language: SupportedLanguage,
        line: u32,
        column: u32,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidSource {
            language,
            line,
            column,
            message: message.into(),
        }
    }

    /// Returns the one-based `(line, column)` of the error, when known.
    #[must_use]
    pub const fn location(&self) -> Option<(u32, u32)> {
        match self {
            Self::InvalidSource { line, column, .. } => Some((*line, *column)),
            _ => None,
        }
    }
}
