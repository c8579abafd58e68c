//! Template and last-used persistence.
//!
//! Templates are named snapshots of a [`WatermarkConfig`] kept in one flat
//! JSON file. The last-used record is the same config shape plus a
//! timestamp, written at shutdown and reloaded at startup. Both stores
//! degrade to empty/default on missing or corrupt files; persistence is
//! never allowed to take down an interactive session.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{ModelError, WatermarkConfig};

/// A flat name → configuration mapping persisted as one JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateStore {
    templates: BTreeMap<String, WatermarkConfig>,
}

impl TemplateStore {
    /// Load the store. A missing or corrupt file yields an empty store.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(store) => store,
                Err(e) => {
                    tracing::warn!("Corrupt template store at {:?}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read template store at {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Write the store, creating parent directories first.
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ModelError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| ModelError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| ModelError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Insert a template. Saving an existing name overwrites it.
    pub fn insert(&mut self, name: impl Into<String>, config: WatermarkConfig) {
        self.templates.insert(name.into(), config);
    }

    pub fn get(&self, name: &str) -> Option<&WatermarkConfig> {
        self.templates.get(name)
    }

    /// Remove a template. Returns the removed config if the name existed.
    pub fn remove(&mut self, name: &str) -> Option<WatermarkConfig> {
        self.templates.remove(name)
    }

    /// Template names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// The last-used watermark configuration, reloaded at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastUsed {
    pub config: WatermarkConfig,

    /// ISO 8601 timestamp of the save.
    pub saved_at: String,
}

impl LastUsed {
    pub fn now(config: WatermarkConfig) -> Self {
        Self {
            config,
            saved_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Load the record. Missing file is silently `None`; a corrupt file is
    /// `None` with a diagnostic.
    pub fn load(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Corrupt last-used record at {:?}: {}", path, e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read last-used record at {:?}: {}", path, e);
                None
            }
        }
    }

    /// Write the record, creating parent directories first.
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ModelError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| ModelError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| ModelError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
