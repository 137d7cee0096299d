//! Deployment configuration.
//!
//! Which columns are facets, which columns an export emits, which column holds
//! the date, and how detail-view fields are found all differ per spreadsheet,
//! so they live in [`GridConfig`] rather than in code. The defaults describe
//! the enrollment sheet this tool was first written for.
//!
//! # Example
//!
//! ```rust
//! use tsvgrid::config::GridConfig;
//! use tsvgrid::core::FacetSpec;
//!
//! let config = GridConfig::new()
//!     .with_facets(vec![FacetSpec::new("D", "Course")])
//!     .with_date_column("AB")
//!     .with_file_prefix("Students");
//! assert_eq!(config.date_column, "AB");
//! ```
//!
//! Configs can also be read from JSON; missing keys take their defaults:
//!
//! ```rust
//! use tsvgrid::config::GridConfig;
//!
//! let config: GridConfig = serde_json::from_str(r#"{"date_column": "AD"}"#).unwrap();
//! assert_eq!(config.date_column, "AD");
//! assert_eq!(config.facets.len(), 2);
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{Column, ExportProjection, FacetSpec, FieldSpec};
use crate::error::{GridError, Result};

/// Everything that varies between deployments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Published TSV URL used when no input is given
    pub source_url: Option<String>,

    /// Exact-match filter columns (default: `B` status, `E` age)
    pub facets: Vec<FacetSpec>,

    /// Columns emitted by an export (default: `A`, then `C` through `Z`)
    pub export: ExportProjection,

    /// Column holding the date used by exports (default: `AC`)
    pub date_column: String,

    /// Logical detail fields and their header synonyms
    pub detail_fields: Vec<FieldSpec>,

    /// Export filename prefix (default: `Inscritos`)
    pub file_prefix: String,

    /// Quiet period before a typed query is applied (default: 120ms)
    pub search_debounce_ms: u64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            source_url: None,
            facets: vec![FacetSpec::new("B", "Status"), FacetSpec::new("E", "Age")],
            export: ExportProjection::default(),
            date_column: "AC".to_string(),
            detail_fields: vec![
                FieldSpec::new(
                    "name",
                    ["nombre del estudiante", "nombre completo", "nombre", "estudiante"],
                ),
                FieldSpec::new("phone", ["telefono", "celular", "whatsapp"]).phone(),
                FieldSpec::new("guardian", ["acudiente", "responsable"]),
                FieldSpec::new(
                    "guardian_phone",
                    ["telefono acudiente", "celular acudiente", "telefono del acudiente"],
                )
                .phone(),
            ],
            file_prefix: "Inscritos".to_string(),
            search_debounce_ms: 120,
        }
    }
}

impl GridConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| GridError::ReadSource {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Checks that every configured column letter resolves.
    pub fn validate(&self) -> Result<()> {
        for facet in &self.facets {
            Column::parse(&facet.letter)?;
        }
        self.export.columns()?;
        self.date_column()?;
        Ok(())
    }

    pub fn date_column(&self) -> Result<Column> {
        Column::parse(&self.date_column)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    #[must_use]
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_facets(mut self, facets: Vec<FacetSpec>) -> Self {
        self.facets = facets;
        self
    }

    #[must_use]
    pub fn with_export(mut self, export: ExportProjection) -> Self {
        self.export = export;
        self
    }

    #[must_use]
    pub fn with_date_column(mut self, letter: impl Into<String>) -> Self {
        self.date_column = letter.into();
        self
    }

    #[must_use]
    pub fn with_detail_fields(mut self, fields: Vec<FieldSpec>) -> Self {
        self.detail_fields = fields;
        self
    }

    #[must_use]
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_search_debounce_ms(mut self, ms: u64) -> Self {
        self.search_debounce_ms = ms;
        self
    }
}
