//! Read-only network registry.
//!
//! The registry is a JSON object keyed by network identifier. Key order is
//! preserved because fleet deployments walk networks in registry order.

pub mod schema;

use std::path::Path;

use anyhow::Context;
use url::Url;

use crate::error::ConfigError;
use crate::target::parse_endpoint;
use crate::types::NetworkId;

pub use schema::{NetworkEntry, SubgraphConfig};

/// Default registry file name, resolved against the project root.
pub const DEFAULT_REGISTRY_FILE: &str = "networks.json";

/// Ordered mapping from network identifier to network record.
#[derive(Debug, Clone, Default)]
pub struct NetworkRegistry {
    entries: Vec<(NetworkId, NetworkEntry)>,
}

impl NetworkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from entries in the given order.
    ///
    /// A repeated identifier replaces the earlier record but keeps its position.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, NetworkEntry)>,
        K: Into<NetworkId>,
    {
        let mut registry = Self::new();
        for (id, entry) in entries {
            registry.insert(id.into(), entry);
        }
        registry
    }

    pub fn insert(&mut self, id: NetworkId, entry: NetworkEntry) {
        if let Some(existing) = self.entries.iter_mut().find(|(k, _)| *k == id) {
            existing.1 = entry;
        } else {
            self.entries.push((id, entry));
        }
    }

    /// Load the registry from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read network registry: {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Failed to parse network registry: {}", path.display()))
    }

    /// Parse registry JSON.
    ///
    /// Records that are not objects, or whose fields have unexpected types, are
    /// kept as empty entries so that looking them up reports a missing endpoint.
    pub fn from_json_str(content: &str) -> anyhow::Result<Self> {
        let root: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(content).context("Network registry must be a JSON object")?;

        let mut registry = Self::new();
        for (key, value) in root {
            let entry = match serde_json::from_value::<NetworkEntry>(value) {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(network = %key, error = %err, "Ignoring unreadable registry record");
                    NetworkEntry::default()
                }
            };
            registry.insert(NetworkId::new(key), entry);
        }
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &NetworkId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: &NetworkId) -> Option<&NetworkEntry> {
        self.entries.iter().find(|(k, _)| k == id).map(|(_, v)| v)
    }

    /// Network identifiers in registry order.
    pub fn network_ids(&self) -> impl Iterator<Item = &NetworkId> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Look up the record for a network.
    pub fn entry(&self, id: &NetworkId) -> Result<&NetworkEntry, ConfigError> {
        self.get(id)
            .ok_or_else(|| ConfigError::MissingNetwork(id.clone()))
    }

    /// Resolve a network's subgraph endpoint URL.
    pub fn lookup_endpoint(&self, id: &NetworkId) -> Result<Url, ConfigError> {
        let raw = self
            .entry(id)?
            .endpoint()
            .ok_or_else(|| ConfigError::MissingEndpoint(id.clone()))?;

        parse_endpoint(raw)
    }

    /// Name passed to the build toolchain for a network.
    ///
    /// Uses the registry's `subgraph.networkName` and falls back to the
    /// network identifier itself.
    pub fn build_target(&self, id: &NetworkId) -> Result<String, ConfigError> {
        let entry = self.entry(id)?;
        Ok(entry
            .network_name()
            .map_or_else(|| id.to_string(), str::to_string))
    }
}
