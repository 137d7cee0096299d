//! Tab-separated document parser.
//!
//! # Format
//! - Lines end with `\n` or `\r\n`
//! - Cells are separated by `\t`; there is no quoting
//! - The first non-blank line is the header row
//!
//! Every line is normalized to the widest line's cell count. Data lines whose
//! cells are all blank are dropped before rows are numbered.

use tracing::debug;

use crate::core::table::SHEET_ORDER_HEADER;
use crate::core::{Row, Table};

/// Parses TSV text into a rectangular [`Table`].
///
/// Returns an empty table (no headers) for blank input; callers treat that as
/// a load failure, see [`Table::non_empty`].
///
/// # Example
///
/// ```rust
/// use tsvgrid::parsing::parse_tsv;
///
/// let table = parse_tsv("Name\tAge\r\nAna\t10\n\t\nLuis\n");
/// assert_eq!(table.headers(), ["__sheet_order__", "Name", "Age"]);
/// assert_eq!(table.rows().len(), 2);
/// assert_eq!(table.rows()[1].cells(), ["1", "Luis", ""]);
/// ```
pub fn parse_tsv(text: &str) -> Table {
    let lines: Vec<&str> = text.lines().collect();

    let Some(first) = lines.iter().position(|l| !l.trim().is_empty()) else {
        return Table::default();
    };
    let last = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .unwrap_or(first);

    let raw: Vec<Vec<&str>> = lines[first..=last]
        .iter()
        .map(|line| line.split('\t').collect())
        .collect();

    let max_cols = raw.iter().map(Vec::len).max().unwrap_or(0);

    let mut records = raw.into_iter().map(|cells| normalize_width(&cells, max_cols));

    let mut headers = Vec::with_capacity(max_cols + 1);
    headers.push(SHEET_ORDER_HEADER.to_string());
    if let Some(header) = records.next() {
        headers.extend(header);
    }

    let mut skipped = 0usize;
    let rows: Vec<Row> = records
        .filter(|cells| {
            let keep = cells.iter().any(|c| !c.is_empty());
            if !keep {
                skipped += 1;
            }
            keep
        })
        .enumerate()
        .map(|(order, cells)| Row::new(order, cells))
        .collect();

    debug!(
        columns = max_cols,
        rows = rows.len(),
        blank_lines = skipped,
        "parsed TSV document"
    );

    Table::new(headers, rows)
}

/// Trims every cell and pads or truncates to exactly `width` cells.
fn normalize_width(cells: &[&str], width: usize) -> Vec<String> {
    let mut out: Vec<String> = cells
        .iter()
        .take(width)
        .map(|c| c.trim().to_string())
        .collect();
    out.resize(width, String::new());
    out
}
