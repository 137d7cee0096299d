//! The explicit pipeline context: loaded table, filters, view order.
//!
//! A [`Session`] owns everything that would otherwise be process-wide state.
//! User interactions go through [`Session::dispatch`], which takes a typed
//! [`Action`] and returns an [`Effect`] for the front end to carry out.
//!
//! # Reloads
//!
//! Loads are ticketed. [`Session::begin_load`] issues a ticket and
//! [`Session::finish_load`] only applies a result whose ticket is the latest
//! one issued, so a slow response can never overwrite a newer table. A failed
//! load leaves the current table in place; a successful one swaps in a new
//! table whole.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use tsvgrid::config::GridConfig;
//! use tsvgrid::core::{ExportProjection, FacetSpec};
//! use tsvgrid::parsing::parse_tsv;
//! use tsvgrid::session::{Action, Effect, Session};
//!
//! # fn main() -> tsvgrid::Result<()> {
//! let config = GridConfig::new()
//!     .with_facets(vec![FacetSpec::new("B", "Status")])
//!     .with_export(ExportProjection {
//!         identity: "A".into(),
//!         range_start: "B".into(),
//!         range_end: "B".into(),
//!         skip: vec![],
//!     })
//!     .with_date_column("C");
//! let mut session = Session::new(config)?;
//! session.load_table(parse_tsv("Name\tStatus\tDate\nAna\tA\t2026-01-02\nLuis\tB\t2026-01-03"))?;
//!
//! session.dispatch(Action::SetFacet { letter: "B".into(), value: "B".into() })?;
//! let today = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
//! match session.dispatch(Action::Export { since: String::new(), today })? {
//!     Effect::Download { csv, rows, .. } => {
//!         assert_eq!(rows, 1);
//!         assert_eq!(csv, "Name,Status\nLuis,B\n");
//!     }
//!     other => panic!("unexpected {other:?}"),
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::config::GridConfig;
use crate::core::export::export_filename;
use crate::core::{
    ExportOutcome, ExportRequest, FacetOptions, FieldResolver, FilterEngine, Row, SortOrder,
    Table, build_csv, phone_digits, whatsapp_link,
};
use crate::error::{GridError, Result};
use crate::parsing::parse_lower_bound;

/// Proof of a started load. Only the most recent ticket can complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// What happened to a finished load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The table was swapped in
    Loaded { rows: usize, columns: usize },
    /// A newer load was started meanwhile; the result was dropped
    Stale,
}

/// A user interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Search(String),
    ClearSearch,
    SetFacet { letter: String, value: String },
    /// Clears the search and every facet at once
    ClearFilters,
    Order(SortOrder),
    /// `since` is the raw lower-bound input; blank means everything
    Export { since: String, today: NaiveDate },
}

/// What the front end should do after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Re-render the visible rows and the facet option lists
    Redraw {
        visible: usize,
        facets: Vec<FacetOptions>,
        status: Option<String>,
    },
    /// Save `csv` under `filename`
    Download {
        filename: String,
        csv: String,
        rows: usize,
    },
    /// Benign message; nothing changed
    Info(String),
}

/// Fields shown for one row in the detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detail {
    /// Resolved `name` field, or `"Record {order}"`
    pub title: String,
    /// Logical fields that resolved, in configuration order
    pub named: Vec<NamedField>,
    /// Every labelled column; blank values shown as `—`
    pub fields: Vec<(String, String)>,
}

/// A configured logical field as found in one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedField {
    pub name: String,
    /// Trimmed cell value, possibly empty
    pub value: String,
    /// Digits of a phone field with a usable number
    pub phone: Option<String>,
}

impl NamedField {
    /// WhatsApp chat link for a usable phone number.
    pub fn whatsapp(&self) -> Option<String> {
        self.phone.as_deref().map(whatsapp_link)
    }
}

/// Pipeline state for one user.
#[derive(Debug)]
pub struct Session {
    config: GridConfig,
    engine: Option<FilterEngine>,
    fields: FieldResolver,
    order: SortOrder,
    latest_ticket: u64,
}

impl Session {
    /// Creates an empty session.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidColumn`] if the config names a bad letter.
    pub fn new(config: GridConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            engine: None,
            fields: FieldResolver::default(),
            order: SortOrder::default(),
            latest_ticket: 0,
        })
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Starts a load; any earlier unfinished load becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_ticket += 1;
        LoadTicket(self.latest_ticket)
    }

    /// Applies a finished load.
    ///
    /// Filters reset unless `preserve_filters` is set, in which case the old
    /// selections are carried over and any no longer offered are dropped.
    ///
    /// # Errors
    ///
    /// The load's own error (or [`GridError::EmptyDocument`]); the current
    /// table is kept. Stale results are dropped without error.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Table>,
        preserve_filters: bool,
    ) -> Result<LoadOutcome> {
        if ticket.0 != self.latest_ticket {
            info!(
                ticket = ticket.0,
                latest = self.latest_ticket,
                "discarding stale load"
            );
            return Ok(LoadOutcome::Stale);
        }

        let table = match result.and_then(Table::non_empty) {
            Ok(table) => table,
            Err(e) => {
                warn!(error = %e, "load failed; keeping current table");
                return Err(e);
            }
        };

        let saved = if preserve_filters {
            self.engine.as_ref().map(FilterEngine::state)
        } else {
            None
        };

        let mut engine = FilterEngine::new(Arc::new(table), &self.config.facets)?;
        if let Some(state) = &saved {
            engine.restore(state);
        }
        engine.refresh_options();

        let rows = engine.table().rows().len();
        let columns = engine.table().width();
        self.fields = FieldResolver::resolve(&self.config.detail_fields, engine.table().headers());
        self.engine = Some(engine);

        info!(rows, columns, preserved = saved.is_some(), "table swapped in");
        Ok(LoadOutcome::Loaded { rows, columns })
    }

    /// Loads an already parsed table, resetting filters.
    pub fn load_table(&mut self, table: Table) -> Result<LoadOutcome> {
        let ticket = self.begin_load();
        self.finish_load(ticket, Ok(table), false)
    }

    pub fn table(&self) -> Option<&Arc<Table>> {
        self.engine.as_ref().map(FilterEngine::table)
    }

    pub fn engine(&self) -> Option<&FilterEngine> {
        self.engine.as_ref()
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// Visible rows in the current sheet-order direction.
    pub fn visible_rows(&self) -> Vec<&Row> {
        let Some(engine) = &self.engine else {
            return Vec::new();
        };
        let mut rows = engine.visible_rows();
        self.order.apply(&mut rows);
        rows
    }

    /// Data columns to display. Column `A` is hidden when it is blank in
    /// every row.
    pub fn display_columns(&self) -> Vec<usize> {
        let Some(table) = self.table() else {
            return Vec::new();
        };
        (1..table.width())
            .filter(|&i| !(i == 1 && table.is_blank_column(1)))
            .collect()
    }

    /// Recomputes facet options, dropping selections that are no longer offered.
    pub fn facet_options(&mut self) -> Vec<FacetOptions> {
        self.engine
            .as_mut()
            .map(FilterEngine::refresh_options)
            .unwrap_or_default()
    }

    /// Detail view for the row with the given sheet order.
    pub fn detail(&self, order: usize) -> Option<Detail> {
        let table = self.table()?;
        let row = table.rows().iter().find(|r| r.order() == order)?;

        let named: Vec<NamedField> = self
            .fields
            .iter()
            .filter_map(|(name, index)| {
                let value = row.cell(index?).trim();
                let phone = if self.fields.is_phone(name) {
                    phone_digits(value)
                } else {
                    None
                };
                Some(NamedField {
                    name: name.to_string(),
                    value: value.to_string(),
                    phone,
                })
            })
            .collect();

        let title = self
            .fields
            .value("name", row)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Record {order}"));

        let fields = table
            .headers()
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, label)| !label.trim().is_empty())
            .map(|(i, label)| {
                let value = row.cell(i).trim();
                let shown = if value.is_empty() { "—" } else { value };
                (label.trim().to_string(), shown.to_string())
            })
            .collect();

        Some(Detail {
            title,
            named,
            fields,
        })
    }

    /// Applies one user action.
    ///
    /// # Errors
    ///
    /// [`GridError::NotLoaded`] before the first load, validation errors for
    /// bad facet letters or export dates. Nothing changes when an error is
    /// returned.
    pub fn dispatch(&mut self, action: Action) -> Result<Effect> {
        debug!(?action, "dispatch");
        match action {
            Action::Search(query) => {
                self.engine_mut()?.set_query(&query);
                Ok(self.redraw(None))
            }
            Action::ClearSearch => {
                self.engine_mut()?.clear_query();
                Ok(self.redraw(Some("Search cleared")))
            }
            Action::SetFacet { letter, value } => {
                self.engine_mut()?.set_facet(&letter, &value)?;
                Ok(self.redraw(None))
            }
            Action::ClearFilters => {
                self.engine_mut()?.clear_all();
                Ok(self.redraw(Some("Filters cleared")))
            }
            Action::Order(order) => {
                self.engine_mut()?;
                self.order = order;
                Ok(self.redraw(None))
            }
            Action::Export { since, today } => self.export(&since, today),
        }
    }

    /// Exports the visible rows dated on or after `since` (blank: all).
    ///
    /// Returns [`Effect::Download`], or [`Effect::Info`] when nothing matched.
    pub fn export(&self, since: &str, today: NaiveDate) -> Result<Effect> {
        let min_date = parse_lower_bound(since)?;
        let table = self.table().ok_or(GridError::NotLoaded)?;

        let request = ExportRequest::new(self.config.export.columns()?, self.config.date_column()?)
            .with_min_date(min_date);

        match build_csv(table, &self.visible_rows(), &request)? {
            ExportOutcome::Csv(export) => Ok(Effect::Download {
                filename: export_filename(&self.config.file_prefix, today, Some(since)),
                csv: export.csv,
                rows: export.rows,
            }),
            ExportOutcome::Empty => Ok(Effect::Info(if min_date.is_some() {
                format!("No records since {}", since.trim())
            } else {
                "No records to export".to_string()
            })),
        }
    }

    fn engine_mut(&mut self) -> Result<&mut FilterEngine> {
        self.engine.as_mut().ok_or(GridError::NotLoaded)
    }

    fn redraw(&mut self, status: Option<&str>) -> Effect {
        let facets = self.facet_options();
        Effect::Redraw {
            visible: self.visible_rows().len(),
            facets,
            status: status.map(str::to_string),
        }
    }
}
