//! Table and row models produced by the TSV parser.
//!
//! A [`Table`] is rectangular: every row has exactly as many cells as there
//! are headers. Column 0 is the synthetic sheet-order column; columns `1..`
//! hold the spreadsheet cells, so column letter `A` lives at index 1.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::filter::normalize;
use crate::error::{GridError, Result};

/// Header label of the synthetic sheet-order column.
pub const SHEET_ORDER_HEADER: &str = "__sheet_order__";

/// One data row: its sheet order plus the full-width cell vector.
///
/// `cells[0]` is the sheet order rendered as text, `cells[1..]` are the
/// trimmed spreadsheet values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    order: usize,
    cells: Vec<String>,
    search_text: String,
}

impl Row {
    /// Builds a row from its sheet order and the spreadsheet cells (without
    /// the sheet-order slot).
    pub fn new(order: usize, values: Vec<String>) -> Self {
        let search_text = values
            .iter()
            .map(|v| normalize(v))
            .collect::<Vec<_>>()
            .join("\n");

        let mut cells = Vec::with_capacity(values.len() + 1);
        cells.push(order.to_string());
        cells.extend(values);

        Self {
            order,
            cells,
            search_text,
        }
    }

    /// Position among the surviving data rows of the source document.
    pub fn order(&self) -> usize {
        self.order
    }

    /// All cells, sheet order first.
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Cell at a table column index; empty when the index is past the width.
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }

    /// Normalized spreadsheet values joined one per line, used by free-text search.
    pub(crate) fn search_text(&self) -> &str {
        &self.search_text
    }
}

/// A parsed document: header labels plus rows in sheet order.
///
/// Tables are immutable. A reload builds a new one and swaps it in whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub(crate) fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self { headers, rows }
    }

    /// Header labels, [`SHEET_ORDER_HEADER`] first. Empty for a blank document.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of columns including the sheet-order column.
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Returns `true` for the result of parsing blank input.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Turns a headerless table into [`GridError::EmptyDocument`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use tsvgrid::parsing::parse_tsv;
    ///
    /// assert!(parse_tsv("  \n \n").non_empty().is_err());
    /// assert!(parse_tsv("Name").non_empty().is_ok());
    /// ```
    pub fn non_empty(self) -> Result<Self> {
        if self.is_empty() {
            Err(GridError::EmptyDocument)
        } else {
            Ok(self)
        }
    }

    /// Header label for a column, or `Col{index}` past the table width.
    pub fn header(&self, index: usize) -> Cow<'_, str> {
        match self.headers.get(index) {
            Some(label) => Cow::Borrowed(label.as_str()),
            None => Cow::Owned(format!("Col{index}")),
        }
    }

    /// Returns `true` if the column is empty in every row.
    ///
    /// A table without rows reports every column as blank.
    pub fn is_blank_column(&self, index: usize) -> bool {
        self.rows.iter().all(|row| row.cell(index).trim().is_empty())
    }
}

/// Direction of the sheet-order toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// Sorts rows by their sheet order in this direction.
    pub fn apply(self, rows: &mut [&Row]) {
        match self {
            SortOrder::Ascending => rows.sort_by_key(|row| row.order()),
            SortOrder::Descending => rows.sort_by_key(|row| std::cmp::Reverse(row.order())),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Ascending => write!(f, "asc"),
            SortOrder::Descending => write!(f, "desc"),
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            _ => Err(format!("Unknown order: '{}'. Expected asc or desc", s)),
        }
    }
}
