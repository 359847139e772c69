//! Error taxonomy for target resolution and deployment.
//!
//! - [`ConfigError`]: the registry does not describe a deployable network.
//! - [`AuthError`]: a required deploy credential is absent.
//! - [`CommandError`]: an external command could not be started or exited unsuccessfully.
//! - [`DeployError`]: everything an orchestrator operation can fail with.

use thiserror::Error;

use crate::types::NetworkId;

/// Registry/configuration problems. Fatal for the network being processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("network '{0}' is not present in the network registry")]
    MissingNetwork(NetworkId),
    #[error("network '{0}' has no subgraph.endpointV2 in the network registry")]
    MissingEndpoint(NetworkId),
    #[error("unrecognized subgraph endpoint '{url}': {reason}")]
    UnrecognizedEndpoint { url: String, reason: String },
}

/// Missing deploy credentials. The message tells the user where to get one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error(
        "missing hosted-service deploy key: set {env_var} to the access token shown at https://thegraph.com/hosted-service/dashboard"
    )]
    MissingHostedCredential { env_var: String },
    #[error(
        "missing subgraph studio deploy key: set {env_var} to the deploy key shown at https://thegraph.com/studio/"
    )]
    MissingStudioCredential { env_var: String },
}

/// Failure of a single external command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` failed ({})", describe_status(.code, .signal))]
    Exit {
        command: String,
        code: Option<i32>,
        signal: Option<i32>,
        stderr: String,
    },
}

impl CommandError {
    /// Redacted command line of the failed invocation.
    pub fn command(&self) -> &str {
        match self {
            CommandError::Spawn { command, .. } | CommandError::Exit { command, .. } => command,
        }
    }
}

fn describe_status(code: &Option<i32>, signal: &Option<i32>) -> String {
    match (*code, *signal) {
        (Some(code), _) => format!("exit code {code}"),
        (None, Some(signal)) => format!("killed by signal {signal}"),
        (None, None) => "unknown exit status".to_string(),
    }
}

/// Errors surfaced by the deployment orchestrator.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("{step} step failed: {source}")]
    Command {
        step: &'static str,
        #[source]
        source: CommandError,
    },
    #[error("invalid {name} command template '{template}'")]
    InvalidCommand { name: &'static str, template: String },
    #[error(
        "deploy-all aborted at network '{network}' (already deployed: {})",
        format_completed(.completed)
    )]
    FleetAborted {
        network: NetworkId,
        completed: Vec<NetworkId>,
        #[source]
        source: Box<DeployError>,
    },
}

impl DeployError {
    /// The innermost error, looking through fleet aborts.
    pub fn root(&self) -> &DeployError {
        match self {
            DeployError::FleetAborted { source, .. } => source.root(),
            other => other,
        }
    }
}

fn format_completed(completed: &[NetworkId]) -> String {
    if completed.is_empty() {
        return "none".to_string();
    }
    completed
        .iter()
        .map(NetworkId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
