//! Errors returned by catalog loading, lookup and serialization.

use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::ValidationReport;
use crate::config::{
    ConfigError,
    MatcherError,
};

#[derive(Error, Debug)]
pub enum CatalogError {
    /// Error when failing to read or write a translation file
    #[error("Failed to access translation file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The document is not a well-formed `.ts` document
    #[error("Malformed translation document at byte {position}: {message}")]
    Malformed { position: u64, message: String },
    /// The catalog could not be written back as XML
    #[error("Failed to serialize translation document: {0}")]
    Serialize(String),
    /// Same (context, source, comment) seen twice under the `reject` merge strategy
    #[error("Duplicate message '{source_text}' in context '{context}'")]
    DuplicateMessage { context: String, source_text: String },
    /// Numerus form requested past the last form with `strict_plural` set
    #[error(
        "Plural category {category} is out of range for '{source_text}' in context '{context}' ({count} forms)"
    )]
    PluralCategoryOutOfRange { context: String, source_text: String, category: usize, count: usize },
    /// `reject_incomplete` refused a catalog with incomplete localization
    #[error("Translation catalog is incomplete: {} issue(s)", .0.issues.len())]
    Incomplete(ValidationReport),
    #[error("No translation file named '{name}' found in '{}'", .dir.display())]
    NotFound { dir: PathBuf, name: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Translation file globs could not be compiled
    #[error(transparent)]
    Pattern(#[from] MatcherError),
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
