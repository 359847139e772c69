//! Records commands instead of running them.

use std::sync::Mutex;

use super::{CommandOutput, CommandRunner, CommandSpec};
use crate::error::CommandError;

/// Logs each command and returns empty output.
///
/// The redacted command lines are kept so callers can print what would have run.
#[derive(Debug, Default)]
pub struct DryRunRunner {
    commands: Mutex<Vec<String>>,
}

impl DryRunRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Redacted command lines, in the order they were requested.
    pub fn commands(&self) -> Vec<String> {
        self.commands
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

impl CommandRunner for DryRunRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput, CommandError> {
        let line = command.redacted();
        tracing::info!(command = %line, "Dry run, not executing");
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(line);
        }
        Ok(CommandOutput::default())
    }
}
