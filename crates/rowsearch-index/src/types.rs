//! Engine settings.
//!
//! These types are used by all backends and are always available regardless
//! of feature flags.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Search engine settings.
///
/// Missing keys take their defaults when decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSettings {
    /// Backend type: "tantivy" or "memory".
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Directory of an on-disk index. In memory when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Writer memory budget in megabytes.
    #[serde(default = "default_ram_buffer_mb")]
    pub ram_buffer_mb: usize,

    /// Commit and refresh after every upsert or delete.
    #[serde(default = "default_true")]
    pub auto_commit: bool,
}

fn default_backend() -> String {
    "tantivy".to_string()
}

fn default_ram_buffer_mb() -> usize {
    64
}

fn default_true() -> bool {
    true
}

impl IndexSettings {
    /// Writer memory budget in bytes.
    pub fn ram_buffer_bytes(&self) -> usize {
        self.ram_buffer_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: None,
            ram_buffer_mb: default_ram_buffer_mb(),
            auto_commit: default_true(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
