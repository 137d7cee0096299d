//! Free-text search and exact-match facet filters over a loaded table.
//!
//! This module provides [`FilterEngine`], which holds the current table and
//! filter state and computes the visible row subset on demand.
//!
//! # Filter Types
//!
//! | Filter | Method | Match |
//! |--------|--------|-------|
//! | Free text | [`set_query`](FilterEngine::set_query) | Substring of any data cell |
//! | Facet | [`set_facet`](FilterEngine::set_facet) | Whole cell equals the value |
//!
//! Both sides of every comparison go through [`normalize`], so matching is
//! case- and accent-insensitive.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tsvgrid::core::filter::{FacetSpec, FilterEngine};
//! use tsvgrid::parsing::parse_tsv;
//!
//! # fn main() -> tsvgrid::Result<()> {
//! let table = parse_tsv("Name\tStatus\nAna\tActivo\nLuis\tActivo extra\nEva\tRetirado");
//! let mut engine = FilterEngine::new(Arc::new(table), &[FacetSpec::new("B", "Status")])?;
//!
//! engine.set_facet("B", "activo")?;
//! assert_eq!(engine.visible_rows().len(), 1);
//!
//! engine.clear_all();
//! engine.set_query("ACTIVO");
//! assert_eq!(engine.visible_rows().len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! # Behavior Notes
//!
//! - The sheet-order column is not searched
//! - Facet option lists only offer values present in rows that pass the
//!   search and every *other* facet, so a selection can always be widened
//! - Multiple filters are combined with AND logic
//! - Options are ordered like a root-locale collator would order them:
//!   punctuation before digits before letters, accents and `ß`-style
//!   ligatures folded at the first level, then accents, then lowercase
//!   before uppercase. This is an approximation, not full UCA

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use crate::core::columns::Column;
use crate::core::{Row, Table};
use crate::error::{GridError, Result};

/// Returns `true` for the combining diacritical marks block (U+0300-U+036F).
pub(crate) fn is_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Normalizes text for comparison.
///
/// Lowercases, decomposes (NFD) and drops diacritical marks, collapses
/// whitespace runs to one space and trims.
///
/// # Example
///
/// ```
/// use tsvgrid::core::filter::normalize;
///
/// assert_eq!(normalize("  María   José "), "maria jose");
/// assert_eq!(normalize("Á"), normalize("á"));
/// ```
pub fn normalize(s: &str) -> String {
    let folded: String = s
        .to_lowercase()
        .nfd()
        .filter(|c| !is_diacritic(*c))
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Sort key for option lists. Fields compare in order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct CollationKey {
    base: Vec<(u8, char)>,
    accents: String,
    uppercase: Vec<bool>,
    raw: String,
}

fn collation_key(value: &str) -> CollationKey {
    let base = normalize(value)
        .chars()
        .flat_map(|c| match c {
            'ß' => vec!['s', 's'],
            'æ' => vec!['a', 'e'],
            'œ' => vec!['o', 'e'],
            'ø' => vec!['o'],
            'ł' => vec!['l'],
            'đ' => vec!['d'],
            other => vec![other],
        })
        .map(|c| {
            let class = if c.is_whitespace() {
                0
            } else if c.is_numeric() {
                2
            } else if c.is_alphabetic() {
                3
            } else {
                1
            };
            (class, c)
        })
        .collect();

    CollationKey {
        base,
        accents: value.to_lowercase().nfd().collect(),
        uppercase: value
            .nfd()
            .filter(|c| !is_diacritic(*c))
            .map(char::is_uppercase)
            .collect(),
        raw: value.to_string(),
    }
}

/// A column offered as an exact-match facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetSpec {
    /// Column letter, e.g. `"B"`
    pub letter: String,
    /// Display label, e.g. `"Status"`
    pub label: String,
}

impl FacetSpec {
    pub fn new(letter: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            letter: letter.into(),
            label: label.into(),
        }
    }
}

/// Serializable snapshot of the search text and facet selections.
///
/// Keys of `facets` are column letters; only active selections are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Normalized free-text query
    pub query: String,
    /// Selected value per facet letter
    pub facets: BTreeMap<String, String>,
}

impl FilterState {
    /// Returns `true` if no filter is active.
    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.facets.is_empty()
    }
}

#[derive(Debug, Clone)]
struct Selection {
    raw: String,
    normalized: String,
}

#[derive(Debug, Clone)]
struct FacetSlot {
    column: Column,
    label: String,
    selected: Option<Selection>,
}

/// Options currently offered for one facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetOptions {
    pub letter: String,
    pub label: String,
    /// Distinct raw values in collation order
    pub options: Vec<String>,
    /// The offered value the selection matched, if it survived the refresh
    pub selected: Option<String>,
}

/// Holds a table plus the filter state and computes visible rows.
#[derive(Debug, Clone)]
pub struct FilterEngine {
    table: Arc<Table>,
    query: String,
    facets: Vec<FacetSlot>,
}

impl FilterEngine {
    /// Creates an engine with no active filters.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidColumn`] if a facet letter addresses no column.
    pub fn new(table: Arc<Table>, facets: &[FacetSpec]) -> Result<Self> {
        let facets = facets
            .iter()
            .map(|spec| {
                Ok(FacetSlot {
                    column: Column::parse(&spec.letter)?,
                    label: spec.label.clone(),
                    selected: None,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            table,
            query: String::new(),
            facets,
        })
    }

    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// The stored (normalized) query.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Stores the normalized query. Nothing is recomputed until rows or
    /// options are requested.
    pub fn set_query(&mut self, query: &str) {
        self.query = normalize(query);
    }

    pub fn clear_query(&mut self) {
        self.query.clear();
    }

    /// Sets or clears (empty `value`) the exact-match constraint on a facet.
    pub fn set_facet(&mut self, letter: &str, value: &str) -> Result<()> {
        let slot = self.slot_mut(letter)?;
        let normalized = normalize(value);
        slot.selected = if normalized.is_empty() {
            None
        } else {
            Some(Selection {
                raw: value.trim().to_string(),
                normalized,
            })
        };
        Ok(())
    }

    /// The active selection on a facet, if any.
    pub fn facet_value(&self, letter: &str) -> Option<&str> {
        let index = Column::parse(letter).ok()?.index();
        self.facets
            .iter()
            .find(|slot| slot.column.index() == index)
            .and_then(|slot| slot.selected.as_ref())
            .map(|s| s.raw.as_str())
    }

    /// Configured facet columns with their labels.
    pub fn facet_columns(&self) -> impl Iterator<Item = (&Column, &str)> {
        self.facets.iter().map(|slot| (&slot.column, slot.label.as_str()))
    }

    /// Resets the query and every facet in one step.
    pub fn clear_all(&mut self) {
        self.query.clear();
        for slot in &mut self.facets {
            slot.selected = None;
        }
    }

    /// Rows passing the query and every facet constraint, in sheet order.
    pub fn visible_rows(&self) -> Vec<&Row> {
        self.table
            .rows()
            .iter()
            .filter(|row| self.row_matches(row, None))
            .collect()
    }

    /// Returns `true` if any filter is active.
    pub fn is_active(&self) -> bool {
        !self.query.is_empty() || self.facets.iter().any(|s| s.selected.is_some())
    }

    /// Distinct non-empty values of a facet column among rows that pass the
    /// query and all other facets.
    pub fn facet_options(&self, letter: &str) -> Result<Vec<String>> {
        let position = self.slot_position(letter)?;
        Ok(self.options_for(position))
    }

    /// Recomputes every facet's options and drops selections that are no
    /// longer offered. A surviving selection takes the spelling of the
    /// option it matched, preferring an exact match.
    ///
    /// Facets are checked in configuration order against the state left by
    /// the previous check. Dropping a selection widens the visible set, which
    /// can change the other facets' options, so the pass repeats until
    /// nothing else is dropped.
    pub fn refresh_options(&mut self) -> Vec<FacetOptions> {
        loop {
            let mut dropped = false;
            for position in 0..self.facets.len() {
                let options = self.options_for(position);
                let slot = &mut self.facets[position];
                let Some(sel) = slot.selected.as_mut() else {
                    continue;
                };
                let matched = options
                    .iter()
                    .find(|opt| **opt == sel.raw)
                    .or_else(|| options.iter().find(|opt| normalize(opt) == sel.normalized));
                if let Some(option) = matched {
                    sel.raw.clone_from(option);
                } else {
                    debug!(
                        column = %slot.column,
                        value = %sel.raw,
                        "clearing facet selection no longer offered"
                    );
                    slot.selected = None;
                    dropped = true;
                }
            }
            if !dropped {
                break;
            }
        }

        (0..self.facets.len())
            .map(|position| {
                let slot = &self.facets[position];
                FacetOptions {
                    letter: slot.column.letter().to_string(),
                    label: slot.label.clone(),
                    options: self.options_for(position),
                    selected: slot.selected.as_ref().map(|s| s.raw.clone()),
                }
            })
            .collect()
    }

    /// Snapshot of the current filters.
    pub fn state(&self) -> FilterState {
        FilterState {
            query: self.query.clone(),
            facets: self
                .facets
                .iter()
                .filter_map(|slot| {
                    slot.selected
                        .as_ref()
                        .map(|s| (slot.column.letter().to_string(), s.raw.clone()))
                })
                .collect(),
        }
    }

    /// Replaces the filters with a snapshot. Letters that are not facets of
    /// this engine are ignored.
    pub fn restore(&mut self, state: &FilterState) {
        self.clear_all();
        self.set_query(&state.query);
        for (letter, value) in &state.facets {
            if self.set_facet(letter, value).is_err() {
                debug!(letter = %letter, "ignoring saved selection for unknown facet");
            }
        }
    }

    fn options_for(&self, position: usize) -> Vec<String> {
        let index = self.facets[position].column.index();
        let distinct: BTreeSet<&str> = self
            .table
            .rows()
            .iter()
            .filter(|row| self.row_matches(row, Some(position)))
            .map(|row| row.cell(index).trim())
            .filter(|value| !value.is_empty())
            .collect();

        let mut options: Vec<String> = distinct.into_iter().map(str::to_string).collect();
        options.sort_by_cached_key(|value| collation_key(value));
        options
    }

    fn row_matches(&self, row: &Row, skip_facet: Option<usize>) -> bool {
        if !self.query.is_empty() && !row.search_text().contains(&self.query) {
            return false;
        }

        self.facets.iter().enumerate().all(|(i, slot)| {
            if Some(i) == skip_facet {
                return true;
            }
            match &slot.selected {
                Some(sel) => normalize(row.cell(slot.column.index())) == sel.normalized,
                None => true,
            }
        })
    }

    fn slot_position(&self, letter: &str) -> Result<usize> {
        let index = Column::parse(letter)
            .map_err(|_| GridError::unknown_facet(letter))?
            .index();
        self.facets
            .iter()
            .position(|slot| slot.column.index() == index)
            .ok_or_else(|| GridError::unknown_facet(letter.trim().to_ascii_uppercase()))
    }

    fn slot_mut(&mut self, letter: &str) -> Result<&mut FacetSlot> {
        let position = self.slot_position(letter)?;
        Ok(&mut self.facets[position])
    }
}
