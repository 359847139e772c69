//! Network selection for fleet-wide deployment.

use serde::Serialize;

use crate::config::FleetConfig;
use crate::registry::NetworkRegistry;
use crate::types::NetworkId;

/// Policy for determining which networks a fleet deployment covers.
#[derive(Debug, Clone, Default)]
pub struct FleetPolicy {
    /// Never deployed, regardless of the other lists
    excluded: Vec<String>,
    /// Whitelist: only deploy these networks (if Some)
    only: Option<Vec<String>>,
    /// Blacklist: additionally skip these networks
    skip: Vec<String>,
}

impl FleetPolicy {
    pub fn new(excluded: Vec<String>) -> Self {
        Self {
            excluded,
            only: None,
            skip: Vec::new(),
        }
    }

    pub fn from_config(config: &FleetConfig) -> Self {
        Self::new(config.exclude.clone())
    }

    pub fn with_only(mut self, only: Option<Vec<String>>) -> Self {
        self.only = only;
        self
    }

    pub fn with_skip(mut self, skip: Vec<String>) -> Self {
        self.skip = skip;
        self
    }

    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    /// Check if a fleet deployment should include the given network.
    pub fn should_deploy_to(&self, network: &str) -> bool {
        if self.excluded.iter().any(|n| n == network) {
            return false;
        }
        if let Some(ref whitelist) = self.only {
            return whitelist.iter().any(|n| n == network);
        }
        !self.skip.iter().any(|n| n == network)
    }
}

/// Ordered list of networks one invocation will process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentPlan {
    networks: Vec<NetworkId>,
}

impl DeploymentPlan {
    pub fn single(network: NetworkId) -> Self {
        Self {
            networks: vec![network],
        }
    }

    /// Every registry network the policy allows, in registry order.
    pub fn fleet(registry: &NetworkRegistry, policy: &FleetPolicy) -> Self {
        let networks = registry
            .network_ids()
            .filter(|id| policy.should_deploy_to(id.as_str()))
            .cloned()
            .collect();
        Self { networks }
    }

    pub fn networks(&self) -> &[NetworkId] {
        &self.networks
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

impl IntoIterator for DeploymentPlan {
    type Item = NetworkId;
    type IntoIter = std::vec::IntoIter<NetworkId>;

    fn into_iter(self) -> Self::IntoIter {
        self.networks.into_iter()
    }
}
