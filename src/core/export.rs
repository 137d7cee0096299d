//! Date-bounded CSV export of the visible rows.
//!
//! # Pipeline
//! 1. Keep rows whose date column is on or after the lower bound (if any);
//!    rows without a parseable date never pass a bound
//! 2. Sort by the date column, newest first; undated rows go last
//! 3. Project each row onto the configured columns, trimming values
//! 4. Serialize as comma-separated CSV with `\n` line endings
//!
//! # Format
//! - Delimiter: `,`
//! - Fields containing `,`, `"`, `\r` or `\n` are quoted, quotes doubled
//! - Every record, the last one included, ends with `\n`
//! - Other fields are bare, except a record holding one empty field, which
//!   is written as `""` so it does not read back as a blank line
//! - Encoding: UTF-8

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::columns::{Column, letter_to_index};
use crate::core::{Row, Table};
use crate::error::{GridError, Result};
use crate::parsing::parse_cell_date;

/// Which columns an export emits: one identity column followed by a
/// contiguous letter range, minus any skipped letters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportProjection {
    pub identity: String,
    pub range_start: String,
    pub range_end: String,
    #[serde(default)]
    pub skip: Vec<String>,
}

impl Default for ExportProjection {
    fn default() -> Self {
        Self {
            identity: "A".to_string(),
            range_start: "C".to_string(),
            range_end: "Z".to_string(),
            skip: Vec::new(),
        }
    }
}

impl ExportProjection {
    /// Resolves the projection to columns, in output order.
    ///
    /// The identity column is never repeated even if it falls in the range.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tsvgrid::core::export::ExportProjection;
    ///
    /// let columns = ExportProjection::default().columns().unwrap();
    /// let letters: Vec<&str> = columns.iter().map(|c| c.letter()).collect();
    /// assert_eq!(letters.len(), 25);
    /// assert_eq!(&letters[..3], ["A", "C", "D"]);
    /// assert_eq!(letters[24], "Z");
    /// ```
    pub fn columns(&self) -> Result<Vec<Column>> {
        let identity = Column::parse(&self.identity)?;
        let start = Column::parse(&self.range_start)?.index();
        let end = Column::parse(&self.range_end)?.index();
        let skipped: Vec<usize> = self.skip.iter().map(|s| letter_to_index(s)).collect();

        let mut columns = vec![identity.clone()];
        columns.extend(
            (start..=end)
                .filter(|i| *i != identity.index() && !skipped.contains(i))
                .map(Column::from_index),
        );
        Ok(columns)
    }
}

/// One export action: lower bound, projection and sort column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    /// Inclusive lower bound on the date column
    pub min_date: Option<NaiveDateTime>,
    /// Emitted columns in order
    pub columns: Vec<Column>,
    /// Column used for the lower bound and the descending sort
    pub date_column: Column,
}

impl ExportRequest {
    pub fn new(columns: Vec<Column>, date_column: Column) -> Self {
        Self {
            min_date: None,
            columns,
            date_column,
        }
    }

    #[must_use]
    pub fn with_min_date(mut self, min_date: Option<NaiveDateTime>) -> Self {
        self.min_date = min_date;
        self
    }
}

/// A serialized export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub csv: String,
    /// Data rows written, header excluded
    pub rows: usize,
}

/// Result of an export: either a CSV payload or nothing to export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Csv(CsvExport),
    /// No visible row passed the lower bound. Not an error.
    Empty,
}

impl ExportOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, ExportOutcome::Empty)
    }
}

/// Builds the CSV for the given visible rows.
///
/// `rows` should be the currently visible rows, in any order; ties on the
/// date column keep that order.
///
/// # Example
///
/// ```rust
/// use tsvgrid::core::Column;
/// use tsvgrid::core::export::{ExportOutcome, ExportRequest, build_csv};
/// use tsvgrid::parsing::{parse_lower_bound, parse_tsv};
///
/// # fn main() -> tsvgrid::Result<()> {
/// let table = parse_tsv("Name\tDate\nAna\t2026-01-10\nLuis\t2026-02-01\nEva\t");
/// let rows: Vec<_> = table.rows().iter().collect();
/// let request = ExportRequest::new(vec![Column::parse("A")?], Column::parse("B")?)
///     .with_min_date(parse_lower_bound("2026-01-15")?);
///
/// match build_csv(&table, &rows, &request)? {
///     ExportOutcome::Csv(export) => assert_eq!(export.csv, "Name\nLuis\n"),
///     ExportOutcome::Empty => unreachable!(),
/// }
/// # Ok(())
/// # }
/// ```
pub fn build_csv(table: &Table, rows: &[&Row], request: &ExportRequest) -> Result<ExportOutcome> {
    let date_index = request.date_column.index();

    let mut dated: Vec<(Option<NaiveDateTime>, &Row)> = rows
        .iter()
        .map(|row| (parse_cell_date(row.cell(date_index)), *row))
        .filter(|(date, _)| match request.min_date {
            Some(min) => date.is_some_and(|d| d >= min),
            None => true,
        })
        .collect();

    if dated.is_empty() {
        info!(min_date = ?request.min_date, "export matched no rows");
        return Ok(ExportOutcome::Empty);
    }

    // Stable: equal dates keep their incoming order. `None` sorts lowest.
    dated.sort_by(|(a, _), (b, _)| b.cmp(a));

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(request.columns.iter().map(|c| table.header(c.index()).into_owned()))?;
    for (_, row) in &dated {
        writer.write_record(request.columns.iter().map(|c| row.cell(c.index()).trim()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| GridError::Io(e.into_error()))?;
    let csv = String::from_utf8(bytes)?;

    info!(rows = dated.len(), columns = request.columns.len(), "built CSV export");

    Ok(ExportOutcome::Csv(CsvExport {
        csv,
        rows: dated.len(),
    }))
}

static UNSAFE_FILE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\-]+").expect("valid file-part pattern"));

/// Replaces runs of characters outside `[A-Za-z0-9_-]` with `_` and keeps at
/// most 40 characters.
pub fn sanitize_file_part(s: &str) -> String {
    UNSAFE_FILE_CHARS
        .replace_all(s.trim(), "_")
        .chars()
        .take(40)
        .collect()
}

/// Builds `{prefix}_{today}_from_{bound}.csv`, with `all` standing in for a
/// missing lower bound.
///
/// # Example
///
/// ```rust
/// use chrono::NaiveDate;
/// use tsvgrid::core::export::export_filename;
///
/// let today = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
/// assert_eq!(
///     export_filename("Inscritos", today, Some("2026-01-15")),
///     "Inscritos_2026-03-09_from_2026-01-15.csv"
/// );
/// assert_eq!(
///     export_filename("Inscritos", today, None),
///     "Inscritos_2026-03-09_from_all.csv"
/// );
/// ```
pub fn export_filename(prefix: &str, today: NaiveDate, lower_bound: Option<&str>) -> String {
    let bound = lower_bound
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("all");
    format!(
        "{}_{}_from_{}.csv",
        prefix,
        today.format("%Y-%m-%d"),
        sanitize_file_part(bound)
    )
}
