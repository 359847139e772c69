//! Reports returned by orchestrator operations.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::target::DeploymentTarget;
use crate::types::NetworkId;

/// Outcome of one external command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandRecord {
    /// Redacted command line
    pub command: String,
    pub succeeded: bool,
}

/// Commands issued by a codegen or build operation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StepReport {
    pub commands: Vec<CommandRecord>,
    pub warnings: Vec<String>,
}

impl StepReport {
    /// True when every command issued by the step succeeded.
    pub fn succeeded(&self) -> bool {
        self.commands.iter().all(|c| c.succeeded)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub network: NetworkId,
    /// Name handed to the build toolchain
    pub build_target: String,
    #[serde(flatten)]
    pub step: StepReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeployReport {
    pub network: NetworkId,
    pub target: DeploymentTarget,
    /// Label passed to the deploy command, if any
    pub version_label: Option<String>,
    #[serde(flatten)]
    pub step: StepReport,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl DeployReport {
    pub(crate) fn new(network: NetworkId, target: DeploymentTarget) -> Self {
        let now = Utc::now();
        Self {
            network,
            target,
            version_label: None,
            step: StepReport::default(),
            started_at: now,
            finished_at: now,
        }
    }
}

/// Codegen, build and deploy for a single network.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkReport {
    pub network: NetworkId,
    pub codegen: StepReport,
    pub build: BuildReport,
    pub deploy: DeployReport,
}

/// Result of a completed fleet deployment.
#[derive(Debug, Clone, Serialize)]
pub struct FleetReport {
    pub networks: Vec<NetworkReport>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl FleetReport {
    pub fn deployed(&self) -> impl Iterator<Item = &NetworkId> {
        self.networks.iter().map(|n| &n.network)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.networks.iter().flat_map(|n| {
            n.codegen
                .warnings
                .iter()
                .chain(&n.build.step.warnings)
                .chain(&n.deploy.step.warnings)
                .map(String::as_str)
        })
    }
}
