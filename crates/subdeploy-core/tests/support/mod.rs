#![allow(dead_code)]

use std::cell::RefCell;

use subdeploy_core::config::DeployConfig;
use subdeploy_core::credentials::{Credentials, Secret};
use subdeploy_core::deploy::Orchestrator;
use subdeploy_core::error::CommandError;
use subdeploy_core::registry::{NetworkEntry, NetworkRegistry};
use subdeploy_core::runner::{CommandOutput, CommandRunner, CommandSpec};

pub const HOSTED_KEY: &str = "hosted-secret-key";
pub const STUDIO_KEY: &str = "studio-secret-key";

pub const MAINNET_ENDPOINT: &str = "https://api.thegraph.com/subgraphs/name/unlock-protocol/unlock";
pub const POLYGON_ENDPOINT: &str =
    "https://api.studio.thegraph.com/query/44190/unlock-protocol-polygon/0.3.1";

/// Records every command and optionally fails the ones containing a pattern.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    commands: RefCell<Vec<String>>,
    exposed: RefCell<Vec<String>>,
    fail_on: Option<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(pattern: &str) -> Self {
        Self {
            fail_on: Some(pattern.to_string()),
            ..Self::default()
        }
    }

    /// Redacted command lines.
    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }

    /// Command lines as the process would see them.
    pub fn exposed(&self) -> Vec<String> {
        self.exposed.borrow().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput, CommandError> {
        let line = command.redacted();
        let exposed = std::iter::once(command.program())
            .chain(command.exposed_args())
            .collect::<Vec<_>>()
            .join(" ");
        self.commands.borrow_mut().push(line.clone());
        self.exposed.borrow_mut().push(exposed);

        if let Some(pattern) = &self.fail_on
            && line.contains(pattern.as_str())
        {
            return Err(CommandError::Exit {
                command: line,
                code: Some(1),
                signal: None,
                stderr: "simulated failure".to_string(),
            });
        }
        Ok(CommandOutput::default())
    }
}

pub fn unlock_registry() -> NetworkRegistry {
    NetworkRegistry::from_entries([
        (
            "mainnet",
            NetworkEntry::with_endpoint(MAINNET_ENDPOINT).with_network_name("mainnet"),
        ),
        (
            "polygon",
            NetworkEntry::with_endpoint(POLYGON_ENDPOINT).with_network_name("matic"),
        ),
    ])
}

pub fn credentials() -> Credentials {
    Credentials::new(Some(Secret::new(HOSTED_KEY)), Some(Secret::new(STUDIO_KEY)))
}

pub fn orchestrator(
    registry: NetworkRegistry,
    runner: RecordingRunner,
) -> Orchestrator<RecordingRunner> {
    Orchestrator::new(registry, DeployConfig::default(), credentials(), runner)
}
