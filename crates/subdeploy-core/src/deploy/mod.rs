//! Deployment coordination: network selection, sequencing and reporting.

pub mod orchestrator;
pub mod plan;
pub mod report;

pub use orchestrator::Orchestrator;
pub use plan::{DeploymentPlan, FleetPolicy};
pub use report::{
    BuildReport, CommandRecord, DeployReport, FleetReport, NetworkReport, StepReport,
};
