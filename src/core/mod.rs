//! Core processing logic for tsvgrid.
//!
//! This module contains:
//! - [`table`] - Table and row models, sheet-order sorting
//! - [`columns`] - Column letters and header-synonym lookup
//! - [`filter`] - Free-text search, facet filters and facet options
//! - [`export`] - Date-bounded, sorted, projected CSV export
//! - [`debounce`] - Coalescing of rapid query updates
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use tsvgrid::core::{Column, ExportOutcome, ExportRequest, FacetSpec, FilterEngine, build_csv};
//! use tsvgrid::parsing::parse_tsv;
//!
//! # fn main() -> tsvgrid::Result<()> {
//! let table = Arc::new(parse_tsv("Name\tStatus\tDate\nAna\tA\t2026-01-02\nLuis\tB\t2026-01-03"));
//! let mut engine = FilterEngine::new(table.clone(), &[FacetSpec::new("B", "Status")])?;
//! engine.set_facet("B", "A")?;
//!
//! let request = ExportRequest::new(vec![Column::parse("A")?], Column::parse("C")?);
//! let outcome = build_csv(&table, &engine.visible_rows(), &request)?;
//! assert!(matches!(outcome, ExportOutcome::Csv(ref e) if e.rows == 1));
//! # Ok(())
//! # }
//! ```

pub mod columns;
pub mod debounce;
pub mod export;
pub mod filter;
pub mod table;

// Re-export main types for convenience
pub use columns::{
    Column, FieldResolver, FieldSpec, MAX_COLUMN_INDEX, letter_to_index, phone_digits,
    whatsapp_link,
};
pub use debounce::Debouncer;
pub use export::{CsvExport, ExportOutcome, ExportProjection, ExportRequest, build_csv};
pub use filter::{FacetOptions, FacetSpec, FilterEngine, FilterState, normalize};
pub use table::{Row, SortOrder, Table};
