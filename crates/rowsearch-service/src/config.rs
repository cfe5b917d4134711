//! Index definition.
//!
//! An index is defined by one JSON document:
//!
//! ```json
//! {
//!     "column": "lucene",
//!     "schema": { "fields": { "price": { "type": "float", "boost": 2.0 } } },
//!     "settings": { "path": "/var/lib/rowsearch/users", "auto_commit": true }
//! }
//! ```
//!
//! Every section is optional; missing keys take their defaults.

use rowsearch_core::Result;
use rowsearch_index::IndexSettings;
use rowsearch_mapping::Schema;
use serde::{Deserialize, Serialize};

/// Definition of one row index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Name of the column the relevance score is injected into.
    #[serde(default = "default_column")]
    pub column: String,

    /// Column mappers.
    #[serde(default)]
    pub schema: Schema,

    /// Search engine settings.
    #[serde(default)]
    pub settings: IndexSettings,
}

fn default_column() -> String {
    "score".to_string()
}

impl IndexConfig {
    /// Definition with the given schema and default settings.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            ..Default::default()
        }
    }

    /// Parse a definition from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the score column.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    /// Set the engine settings.
    pub fn with_settings(mut self, settings: IndexSettings) -> Self {
        self.settings = settings;
        self
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            column: default_column(),
            schema: Schema::default(),
            settings: IndexSettings::default(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
