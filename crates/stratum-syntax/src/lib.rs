//! Tree-sitter powered reference scanning for the Stratum resolver.
//!
//! This crate turns a component's source text into the list of module
//! references it statically mentions:
//!
//! - **Imports** such as `import infra`, `from addon import ui_panel`,
//!   `use crate::infra::Widget;` or `extern crate infra;`
//! - **Markers**, calls like `requires("ui_panel")` or `requires!("infra")`
//!   whose callee name is in the configured [`MarkerSet`]
//!
//! Sources containing syntax errors are rejected with
//! [`SyntaxError::InvalidSource`] instead of being scanned partially.
//!
//! # Supported Languages
//!
//! - Rust (`.rs`)
//! - Python (`.py`, `.pyi`)
//!
//! # Example
//!
//! ```
//! use stratum_syntax::{ReferenceKind, SourceScanner, SupportedLanguage};
//!
//! let mut scanner = SourceScanner::default();
//! let refs = scanner.scan(SupportedLanguage::Python, "import infra\nrequires('ui_panel')\n")?;
//!
//! assert_eq!(refs.len(), 2);
//! assert_eq!(refs[1].kind(), ReferenceKind::Marker);
//! # Ok::<(), stratum_syntax::SyntaxError>(())
//! ```

mod error;
mod language;
mod parser;
mod position;
mod references;
mod scanner;

pub use error::SyntaxError;
pub use language::{LanguageParseError, SupportedLanguage};
pub use parser::{ParseResult, Parser, SyntaxErrorInfo};
pub use references::{
    DEFAULT_MARKER, MarkerSet, ModuleReference, ReferenceKind, extract_references,
};
pub use scanner::SourceScanner;
