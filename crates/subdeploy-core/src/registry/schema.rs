//! Network registry schema
//!
//! Mirrors the shape of a published networks package: one record per network
//! keyed by network identifier, each with an optional `subgraph` section.

use serde::{Deserialize, Serialize};

/// A single network record.
///
/// Only the fields needed for deployment are modeled; everything else in the
/// record is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkEntry {
    /// Human-readable network name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Subgraph deployment information
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subgraph: Option<SubgraphConfig>,
}

/// The `subgraph` section of a network record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubgraphConfig {
    /// Query endpoint the subgraph is served from
    #[serde(
        rename = "endpointV2",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub endpoint_v2: Option<String>,

    /// Network name understood by the build toolchain (e.g. `matic` for polygon)
    #[serde(
        rename = "networkName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub network_name: Option<String>,
}

impl NetworkEntry {
    /// Entry with only an endpoint set.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            name: None,
            subgraph: Some(SubgraphConfig {
                endpoint_v2: Some(endpoint.into()),
                network_name: None,
            }),
        }
    }

    /// Set the build-target network name.
    pub fn with_network_name(mut self, network_name: impl Into<String>) -> Self {
        let subgraph = self.subgraph.get_or_insert_with(SubgraphConfig::default);
        subgraph.network_name = Some(network_name.into());
        self
    }

    /// Endpoint URL string, if present and not blank.
    pub fn endpoint(&self) -> Option<&str> {
        self.subgraph
            .as_ref()
            .and_then(|s| s.endpoint_v2.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Build-target network name, if present and not blank.
    pub fn network_name(&self) -> Option<&str> {
        self.subgraph
            .as_ref()
            .and_then(|s| s.network_name.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
