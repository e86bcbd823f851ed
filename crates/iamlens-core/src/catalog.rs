//! Catalog index - service name to definition document
//!
//! The catalog is a flat JSON array of `{"service": .., "url": ..}` objects.
//! Lookups are case-insensitive; when a name appears twice the first entry wins.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{LensError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "service")]
    pub service_name: String,
    #[serde(rename = "url")]
    pub definition_url: String,
}

/// In-memory catalog built from one fetched document
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    entries: Vec<CatalogEntry>,
    by_name: HashMap<String, usize>,
}

impl CatalogIndex {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let mut by_name = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            by_name
                .entry(entry.service_name.to_lowercase())
                .or_insert(i);
        }
        Self { entries, by_name }
    }

    /// Parse a catalog document fetched from `url`
    pub fn from_slice(bytes: &[u8], url: &str) -> Result<Self> {
        let entries: Vec<CatalogEntry> =
            serde_json::from_slice(bytes).map_err(|source| LensError::Decode {
                url: url.to_string(),
                source,
            })?;
        Ok(Self::new(entries))
    }

    /// Find the entry for `service`, ignoring case
    pub fn resolve(&self, service: &str) -> Result<&CatalogEntry> {
        self.by_name
            .get(&service.to_lowercase())
            .map(|&i| &self.entries[i])
            .ok_or_else(|| LensError::ServiceNotFound(service.to_string()))
    }

    /// Service names in catalog order
    pub fn service_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.service_name.as_str()).collect()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
