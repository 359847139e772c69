//! Codegen, build and deploy sequencing.
//!
//! Every operation runs its commands one at a time and stops at the first
//! error. Configuration and credential problems are detected before any
//! command for the affected step is issued. A failed external command either
//! stops the operation or is logged and skipped, depending on
//! [`CommandFailurePolicy`].
//!
//! Per-network deploy states:
//!
//! ```text
//! Start -> ConfigResolved -> HostedDeployed ------------------> Done
//!                         \-> StudioAuthed -> StudioDeployed -> Done
//! ```

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::config::{CommandFailurePolicy, DeployConfig};
use crate::credentials::Credentials;
use crate::error::{ConfigError, DeployError};
use crate::registry::NetworkRegistry;
use crate::runner::{CommandRunner, CommandSpec};
use crate::target::{DeploymentTarget, classify, next_version};
use crate::types::NetworkId;

use super::plan::{DeploymentPlan, FleetPolicy};
use super::report::{
    BuildReport, CommandRecord, DeployReport, FleetReport, NetworkReport, StepReport,
};

#[derive(Debug)]
pub struct Orchestrator<R> {
    registry: NetworkRegistry,
    config: DeployConfig,
    credentials: Credentials,
    runner: R,
}

impl<R: CommandRunner> Orchestrator<R> {
    pub fn new(
        registry: NetworkRegistry,
        config: DeployConfig,
        credentials: Credentials,
        runner: R,
    ) -> Self {
        Self {
            registry,
            config,
            credentials,
            runner,
        }
    }

    /// Override the configured command failure policy.
    pub fn with_failure_policy(mut self, policy: CommandFailurePolicy) -> Self {
        self.config.execution.on_command_failure = policy;
        self
    }

    pub fn registry(&self) -> &NetworkRegistry {
        &self.registry
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn failure_policy(&self) -> CommandFailurePolicy {
        self.config.execution.on_command_failure
    }

    /// Resolve a network's endpoint into a deployment target.
    pub fn resolve_target(&self, network: &NetworkId) -> Result<DeploymentTarget, ConfigError> {
        let url = self.registry.lookup_endpoint(network)?;
        classify(&url)
    }

    /// Run code generation.
    pub fn run_codegen(&self) -> Result<StepReport, DeployError> {
        let command = Self::template("codegen", &self.config.commands.codegen, &[])?;
        let mut report = StepReport::default();
        self.execute("codegen", &command, &mut report)?;
        Ok(report)
    }

    /// Run the prepare step, then build for the network's build target.
    pub fn run_build(&self, network: &NetworkId) -> Result<BuildReport, DeployError> {
        let build_target = self.registry.build_target(network)?;
        let prepare = Self::template("prepare", &self.config.commands.prepare, &[])?;
        let build = Self::template(
            "build",
            &self.config.commands.build,
            &[("network", build_target.as_str())],
        )?;

        let mut step = StepReport::default();
        self.execute("prepare", &prepare, &mut step)?;
        info!(network = %network, build_target = %build_target, "Building subgraph");
        self.execute("build", &build, &mut step)?;

        Ok(BuildReport {
            network: network.clone(),
            build_target,
            step,
        })
    }

    /// Deploy a network's subgraph to its resolved target.
    ///
    /// `label` is used as the hosted-service version label. Studio targets are
    /// always auto-versioned; a supplied label is reported as ignored.
    pub fn run_deploy(
        &self,
        network: &NetworkId,
        label: Option<&str>,
    ) -> Result<DeployReport, DeployError> {
        let target = self.resolve_target(network)?;
        info!(network = %network, target = %target, "Resolved deployment target");

        let label = label.map(str::trim).filter(|l| !l.is_empty());
        let mut report = DeployReport::new(network.clone(), target.clone());

        match &target {
            DeploymentTarget::Hosted { subgraph_name } => {
                let token = self.credentials.hosted()?;
                let mut command = self
                    .graph()?
                    .arg("deploy")
                    .arg("--product")
                    .arg("hosted-service")
                    .arg("--access-token")
                    .secret_arg(token)
                    .arg("--node")
                    .arg(self.config.hosted.node_url.as_str())
                    .arg("--ipfs")
                    .arg(self.config.hosted.ipfs_url.as_str())
                    .arg(subgraph_name.as_str());
                if let Some(label) = label {
                    command = command.arg(format!("--version-label={label}"));
                    report.version_label = Some(label.to_string());
                }

                self.execute("deploy", &command, &mut report.step)?;
                debug!(network = %network, "HostedDeployed");
            }
            DeploymentTarget::Studio {
                subgraph_name,
                current_version,
            } => {
                let key = self.credentials.studio()?;
                let version = next_version(*current_version);
                if let Some(label) = label {
                    let message = format!(
                        "label '{label}' ignored for studio network '{network}', deploying auto-incremented version {version}"
                    );
                    warn!("{}", message);
                    report.step.warnings.push(message);
                }

                let auth = self.graph()?.arg("auth").arg("--studio").secret_arg(key);
                let deploy = self
                    .graph()?
                    .arg("deploy")
                    .arg("--product")
                    .arg("subgraph-studio")
                    .arg(subgraph_name.as_str())
                    .arg(format!("--version-label={version}"));

                self.execute("auth", &auth, &mut report.step)?;
                debug!(network = %network, "StudioAuthed");
                self.execute("deploy", &deploy, &mut report.step)?;
                debug!(network = %network, version = %version, "StudioDeployed");
                report.version_label = Some(version.to_string());
            }
        }

        report.finished_at = Utc::now();
        Ok(report)
    }

    /// Codegen, build and deploy one network.
    pub fn run_network(
        &self,
        network: &NetworkId,
        label: Option<&str>,
    ) -> Result<NetworkReport, DeployError> {
        let codegen = self.run_codegen()?;
        let build = self.run_build(network)?;
        let deploy = self.run_deploy(network, label)?;
        Ok(NetworkReport {
            network: network.clone(),
            codegen,
            build,
            deploy,
        })
    }

    /// Networks a fleet deployment covers under the configured exclusions.
    pub fn fleet_plan(&self) -> DeploymentPlan {
        DeploymentPlan::fleet(&self.registry, &FleetPolicy::from_config(&self.config.fleet))
    }

    /// Deploy every configured network except the excluded ones.
    pub fn run_fleet_deploy(&self, label: Option<&str>) -> Result<FleetReport, DeployError> {
        self.run_plan(self.fleet_plan(), label)
    }

    /// Deploy the networks selected by `policy`.
    pub fn run_fleet_deploy_with(
        &self,
        policy: &FleetPolicy,
        label: Option<&str>,
    ) -> Result<FleetReport, DeployError> {
        self.run_plan(DeploymentPlan::fleet(&self.registry, policy), label)
    }

    /// Process each planned network in order, stopping at the first failure.
    ///
    /// Networks deployed before the failure stay deployed.
    fn run_plan(
        &self,
        plan: DeploymentPlan,
        label: Option<&str>,
    ) -> Result<FleetReport, DeployError> {
        let started_at = Utc::now();
        info!(
            count = plan.len(),
            networks = ?plan.networks().iter().map(NetworkId::as_str).collect::<Vec<_>>(),
            "Starting fleet deployment"
        );

        let total = plan.len();
        let mut reports: Vec<NetworkReport> = Vec::with_capacity(total);
        for (index, network) in plan.into_iter().enumerate() {
            info!(network = %network, "Deploying network {}/{}", index + 1, total);
            match self.run_network(&network, label) {
                Ok(report) => reports.push(report),
                Err(source) => {
                    error!(network = %network, error = %source, "Fleet deployment aborted");
                    return Err(DeployError::FleetAborted {
                        network,
                        completed: reports.into_iter().map(|r| r.network).collect(),
                        source: Box::new(source),
                    });
                }
            }
        }

        Ok(FleetReport {
            networks: reports,
            started_at,
            finished_at: Utc::now(),
        })
    }

    fn graph(&self) -> Result<CommandSpec, DeployError> {
        Self::template("graph", &self.config.commands.graph, &[])
    }

    fn template(
        name: &'static str,
        template: &str,
        vars: &[(&str, &str)],
    ) -> Result<CommandSpec, DeployError> {
        CommandSpec::from_template(template, vars).ok_or_else(|| DeployError::InvalidCommand {
            name,
            template: template.to_string(),
        })
    }

    fn execute(
        &self,
        step: &'static str,
        command: &CommandSpec,
        report: &mut StepReport,
    ) -> Result<(), DeployError> {
        match self.runner.run(command) {
            Ok(_) => {
                report.commands.push(CommandRecord {
                    command: command.redacted(),
                    succeeded: true,
                });
                Ok(())
            }
            Err(err) => {
                report.commands.push(CommandRecord {
                    command: command.redacted(),
                    succeeded: false,
                });
                error!(step, error = %err, "Command failed");

                match self.failure_policy() {
                    CommandFailurePolicy::Abort => Err(DeployError::Command { step, source: err }),
                    CommandFailurePolicy::Continue => {
                        warn!(step, "Continuing past failed command (on_command_failure = continue)");
                        report
                            .warnings
                            .push(format!("{step} command failed and was ignored: {err}"));
                        Ok(())
                    }
                }
            }
        }
    }
}
