//! Document source seam
//!
//! The session only needs "give me the bytes at this URL". The HTTP
//! implementation lives in `iamlens-fetch`; tests use an in-memory map.

use async_trait::async_trait;

use crate::catalog::CatalogIndex;
use crate::definition::ServiceDefinition;
use crate::error::Result;

/// Fetches raw documents. No caching, no retries.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Fetch and index the service catalog
pub async fn load_catalog(source: &dyn DocumentSource, url: &str) -> Result<CatalogIndex> {
    tracing::debug!(url, "fetching catalog");
    let bytes = source.fetch(url).await?;
    let index = CatalogIndex::from_slice(&bytes, url)?;
    tracing::debug!(services = index.len(), "catalog loaded");
    Ok(index)
}

/// Fetch and parse one service definition
pub async fn load_definition(source: &dyn DocumentSource, url: &str) -> Result<ServiceDefinition> {
    tracing::debug!(url, "fetching service definition");
    let bytes = source.fetch(url).await?;
    let definition = ServiceDefinition::from_slice(&bytes, url)?;
    tracing::debug!(
        name = definition.name.as_deref().unwrap_or("-"),
        version = definition.version.as_deref().unwrap_or("-"),
        actions = definition.actions.len(),
        resources = definition.resources.len(),
        condition_keys = definition.condition_keys.len(),
        "service definition loaded"
    );
    Ok(definition)
}
