//! Text parsing: the TSV document and date values found in its cells.
//!
//! Both parsers are pure and never fail on malformed input: the TSV parser
//! pads or truncates ragged lines, and the date parser reports `None` for
//! values it doesn't recognize.

pub mod date;
pub mod tsv;

pub use date::{parse_cell_date, parse_lower_bound};
pub use tsv::parse_tsv;
