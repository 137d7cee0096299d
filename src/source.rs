//! Where the TSV document comes from.
//!
//! A [`Source`] is either a local file or a published-document URL. URL
//! loads are a single unauthenticated GET with a `_ts` cache-buster query
//! parameter so intermediaries never serve a stale copy.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::core::Table;
use crate::error::{GridError, Result};
use crate::parsing::parse_tsv;

/// A TSV document location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    File(PathBuf),
}

impl Source {
    /// Treats `http://` and `https://` input as a URL, anything else as a path.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tsvgrid::source::Source;
    ///
    /// assert!(matches!(Source::from_input("https://example.com/doc"), Source::Url(_)));
    /// assert!(matches!(Source::from_input("export.tsv"), Source::File(_)));
    /// ```
    pub fn from_input(input: &str) -> Self {
        let trimmed = input.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Url(trimmed.to_string())
        } else {
            Source::File(PathBuf::from(trimmed))
        }
    }

    /// Reads the raw document text.
    pub fn read_text(&self) -> Result<String> {
        match self {
            Source::File(path) => fs::read_to_string(path).map_err(|source| GridError::ReadSource {
                path: path.clone(),
                source,
            }),
            Source::Url(url) => fetch_text(url),
        }
    }

    /// Reads and parses the document.
    ///
    /// # Errors
    ///
    /// Any read failure, or [`GridError::EmptyDocument`] when the text has no
    /// header row.
    pub fn load(&self) -> Result<Table> {
        let result = self.read_text().and_then(|text| parse_tsv(&text).non_empty());
        match &result {
            Ok(table) => info!(
                source = %self,
                rows = table.rows().len(),
                columns = table.width(),
                "loaded document"
            ),
            Err(e) => warn!(source = %self, error = %e, "failed to load document"),
        }
        result
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => f.write_str(url),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Sets the `_ts` query parameter to `timestamp_ms`, replacing an existing one.
///
/// Input that doesn't parse as a URL gets `_ts` appended textually.
#[cfg(feature = "fetch")]
pub fn with_cache_buster(url: &str, timestamp_ms: i64) -> String {
    let Ok(mut parsed) = reqwest::Url::parse(url) else {
        let sep = if url.contains('?') { '&' } else { '?' };
        return format!("{url}{sep}_ts={timestamp_ms}");
    };

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| key != "_ts")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    parsed
        .query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("_ts", &timestamp_ms.to_string());

    parsed.to_string()
}

#[cfg(feature = "fetch")]
fn fetch_text(url: &str) -> Result<String> {
    use reqwest::header::CACHE_CONTROL;

    let url = with_cache_buster(url, chrono::Utc::now().timestamp_millis());
    let response = reqwest::blocking::Client::new()
        .get(&url)
        .header(CACHE_CONTROL, "no-store")
        .send()?;

    let status = response.status();
    if !status.is_success() {
        return Err(GridError::HttpStatus {
            status: status.as_u16(),
            url,
        });
    }

    Ok(response.text()?)
}

#[cfg(not(feature = "fetch"))]
fn fetch_text(url: &str) -> Result<String> {
    Err(GridError::FetchDisabled {
        url: url.to_string(),
    })
}
