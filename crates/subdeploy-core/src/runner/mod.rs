//! External command execution.
//!
//! Commands are built as a program plus arguments. Arguments carrying
//! credentials are marked secret so every displayed or logged form of the
//! command is redacted; only the runner sees the raw value.

mod dry_run;
mod shell;

use std::fmt;

use crate::credentials::Secret;
use crate::error::CommandError;

pub use dry_run::DryRunRunner;
pub use shell::ShellRunner;

/// One command-line argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandArg {
    Plain(String),
    Secret(Secret),
}

impl CommandArg {
    fn display(&self) -> &str {
        match self {
            CommandArg::Plain(value) => value,
            CommandArg::Secret(_) => "***",
        }
    }

    fn expose(&self) -> &str {
        match self {
            CommandArg::Plain(value) => value,
            CommandArg::Secret(secret) => secret.expose(),
        }
    }
}

/// A fully resolved external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<CommandArg>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Split a whitespace-separated command line, replacing `{key}`
    /// placeholders in each word. Returns `None` for a blank line.
    pub fn from_template(template: &str, vars: &[(&str, &str)]) -> Option<Self> {
        let mut words = template.split_whitespace().map(|word| {
            vars.iter().fold(word.to_string(), |acc, (key, value)| {
                acc.replace(&format!("{{{key}}}"), value)
            })
        });
        let program = words.next()?;
        let mut spec = Self::new(program);
        for word in words {
            spec = spec.arg(word);
        }
        Some(spec)
    }

    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(CommandArg::Plain(value.into()));
        self
    }

    pub fn secret_arg(mut self, value: &Secret) -> Self {
        self.args.push(CommandArg::Secret(value.clone()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[CommandArg] {
        &self.args
    }

    /// Arguments with secrets revealed. Only for handing to a process.
    pub fn exposed_args(&self) -> impl Iterator<Item = &str> {
        self.args.iter().map(CommandArg::expose)
    }

    /// Command line with secrets replaced by `***`.
    pub fn redacted(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(CommandArg::display))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

/// Captured output of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs external commands to completion.
///
/// Implementations block until the command exits and report a non-zero exit
/// status as [`CommandError::Exit`].
pub trait CommandRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput, CommandError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput, CommandError> {
        (**self).run(command)
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for Box<R> {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput, CommandError> {
        (**self).run(command)
    }
}
