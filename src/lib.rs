//! # tsvgrid
//!
//! Load a published spreadsheet export (tab-separated), filter it like a grid,
//! and export a dated CSV subset.
//!
//! ## Overview
//!
//! The pipeline runs in four stages:
//! - **Parse** — raw TSV text becomes a rectangular [`Table`](core::Table);
//!   every row keeps its original sheet order in column 0
//! - **Address** — spreadsheet letters (`A`, `Z`, `AC`) resolve to table
//!   indices
//! - **Filter** — accent-insensitive free-text search plus exact-match facets,
//!   with facet option lists derived from the visible rows
//! - **Export** — visible rows, an optional date lower bound and a column
//!   projection produce a CSV payload sorted by date, newest first
//!
//! ## Quick Start
//!
//! ```rust
//! use tsvgrid::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let tsv = "Id\tStatus\tName\tDate\n\
//!                1\tActivo\tAna\t2026-01-10\n\
//!                2\tActivo\tBea\t2026-02-01\n\
//!                3\tRetirado\tCris\t";
//!
//!     let config = GridConfig::new()
//!         .with_facets(vec![FacetSpec::new("B", "Status")])
//!         .with_date_column("D");
//!     let mut session = Session::new(config)?;
//!     session.load_table(parse_tsv(tsv))?;
//!
//!     session.dispatch(Action::SetFacet { letter: "B".into(), value: "activo".into() })?;
//!     assert_eq!(session.visible_rows().len(), 2);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`parsing`] — TSV and cell-date parsers
//! - [`core`] — Table model, column addressing, filter engine, export pipeline
//! - [`session`] — Explicit pipeline state with typed actions and effects
//! - [`source`] — File and URL document sources
//! - [`config`] — Per-deployment configuration ([`GridConfig`](config::GridConfig))
//! - [`error`] — Unified error types ([`GridError`], [`Result`])
//! - [`cli`] — Command-line arguments (`cli` feature)
//! - [`prelude`] — Convenient re-exports

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod parsing;
pub mod session;
pub mod source;

// Re-export the main types at the crate root for convenience
pub use error::{GridError, Result};

/// Convenient re-exports for common usage.
///
/// ```rust
/// use tsvgrid::prelude::*;
/// ```
pub mod prelude {
    // Error types
    pub use crate::error::{GridError, Result};

    // Configuration
    pub use crate::config::GridConfig;

    // Table model and filtering
    pub use crate::core::{
        Column, FacetOptions, FacetSpec, FieldSpec, FilterEngine, FilterState, Row, SortOrder,
        Table, letter_to_index, normalize,
    };

    // Export
    pub use crate::core::{ExportOutcome, ExportProjection, ExportRequest, build_csv};

    // Parsing
    pub use crate::parsing::{parse_cell_date, parse_lower_bound, parse_tsv};

    // Session and sources
    pub use crate::session::{Action, Detail, Effect, LoadOutcome, NamedField, Session};
    pub use crate::source::Source;
}
