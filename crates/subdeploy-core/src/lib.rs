//! Subdeploy Core Library
//!
//! Resolves where each network's subgraph is deployed (hosted service or
//! subgraph studio) from a read-only network registry, and sequences the
//! codegen, build and deploy commands for one network or the whole fleet.

pub mod config;
pub mod context;
pub mod credentials;
pub mod deploy;
pub mod error;
pub mod registry;
pub mod runner;
pub mod target;
pub mod types;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{CommandFailurePolicy, ConfigStore, DeployConfig};
    pub use crate::context::AppContext;
    pub use crate::credentials::{Credentials, Secret};

    // Errors
    pub use crate::error::{AuthError, CommandError, ConfigError, DeployError};

    // Registry and targets
    pub use crate::registry::{NetworkEntry, NetworkRegistry};
    pub use crate::target::{DeploymentTarget, StudioVersion, VersionLabel, classify, next_version};
    pub use crate::types::NetworkId;

    // Execution
    pub use crate::deploy::{
        DeployReport, DeploymentPlan, FleetPolicy, FleetReport, Orchestrator, StepReport,
    };
    pub use crate::runner::{CommandRunner, CommandSpec, DryRunRunner, ShellRunner};
}
