//! Unified error types for tsvgrid.
//!
//! This module provides a single [`GridError`] enum that covers every failure
//! the pipeline can report. The variants map onto three recoverable classes:
//!
//! - **Load failures** ([`GridError::is_load_failure`]) - network errors,
//!   non-success responses, unreadable files, documents without headers
//! - **Validation failures** ([`GridError::is_validation`]) - malformed user
//!   input such as an export lower bound that is not a date
//! - **Configuration failures** - column letters or facets that don't resolve
//!
//! An export that matches zero rows is not an error; see
//! [`ExportOutcome::Empty`](crate::core::export::ExportOutcome::Empty).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized [`Result`] type for tsvgrid operations.
///
/// # Example
///
/// ```rust
/// use tsvgrid::error::Result;
/// use tsvgrid::core::Table;
///
/// fn load() -> Result<Table> {
///     tsvgrid::parsing::parse_tsv("Name\tAge\nAna\t10").non_empty()
/// }
/// # assert_eq!(load().unwrap().rows().len(), 1);
/// ```
pub type Result<T> = std::result::Result<T, GridError>;

/// The error type for all tsvgrid operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GridError {
    /// An I/O error occurred while reading a source file or writing an export.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A source file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    ReadSource {
        /// The file that was requested
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The document parsed to an empty table with no header row.
    ///
    /// This is the load-failure signal for blank or whitespace-only input.
    #[error("Document has no header row (empty or invalid TSV)")]
    EmptyDocument,

    /// The HTTP request for the source document failed.
    #[cfg(feature = "fetch")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} while fetching {url}")]
    HttpStatus {
        /// Numeric status code
        status: u16,
        /// The URL that was requested (including the cache buster)
        url: String,
    },

    /// Neither an input argument nor a configured source URL was given.
    #[error("No source given: pass a file path or URL, or set `source_url` in the config")]
    NoSource,

    /// A URL source was requested from a build without the `fetch` feature.
    #[error("Cannot fetch {url}: built without the 'fetch' feature")]
    FetchDisabled {
        /// The URL that was requested
        url: String,
    },

    /// An action needs a loaded document and none is loaded yet.
    #[error("No document loaded yet")]
    NotLoaded,

    /// Invalid date supplied as an export lower bound.
    #[error("Invalid date '{input}'. Expected format: {expected}")]
    InvalidDate {
        /// The invalid date string that was provided
        input: String,
        /// Expected format description
        expected: &'static str,
    },

    /// A column letter contained no `A`-`Z` characters or addressed past `ZZZ`.
    #[error("Invalid column letter '{input}'")]
    InvalidColumn {
        /// The rejected input
        input: String,
    },

    /// A facet operation named a column that isn't configured as a facet.
    #[error("Column {letter} is not a facet column")]
    UnknownFacet {
        /// The requested column letter
        letter: String,
    },

    /// CSV serialization error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration file could not be decoded.
    #[error("Config error: {0}")]
    Json(#[from] serde_json::Error),

    /// Exported bytes were not valid UTF-8.
    #[error("UTF-8 encoding error in {context}: {source}")]
    Utf8 {
        /// Description of where the error occurred
        context: String,
        /// The underlying UTF-8 error
        #[source]
        source: std::string::FromUtf8Error,
    },
}

impl From<std::string::FromUtf8Error> for GridError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        GridError::Utf8 {
            context: "CSV output".to_string(),
            source: err,
        }
    }
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl GridError {
    /// Creates an invalid date error.
    pub fn invalid_date(input: impl Into<String>) -> Self {
        GridError::InvalidDate {
            input: input.into(),
            expected: "YYYY-MM-DD",
        }
    }

    /// Creates an invalid column error.
    pub fn invalid_column(input: impl Into<String>) -> Self {
        GridError::InvalidColumn {
            input: input.into(),
        }
    }

    /// Creates an unknown facet error.
    pub fn unknown_facet(letter: impl Into<String>) -> Self {
        GridError::UnknownFacet {
            letter: letter.into(),
        }
    }

    /// Returns `true` if this error means the document could not be loaded.
    ///
    /// After a load failure the previously loaded table stays in place.
    pub fn is_load_failure(&self) -> bool {
        #[cfg(feature = "fetch")]
        if matches!(self, GridError::Http(_)) {
            return true;
        }
        matches!(
            self,
            GridError::Io(_)
                | GridError::ReadSource { .. }
                | GridError::EmptyDocument
                | GridError::HttpStatus { .. }
                | GridError::NoSource
                | GridError::FetchDisabled { .. }
        )
    }

    /// Returns `true` if this error rejects user input before any work was done.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            GridError::InvalidDate { .. } | GridError::UnknownFacet { .. }
        )
    }

    /// Returns `true` if this is a date-related error.
    pub fn is_invalid_date(&self) -> bool {
        matches!(self, GridError::InvalidDate { .. })
    }
}
