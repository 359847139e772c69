//! Runs commands as child processes.

use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use super::{CommandOutput, CommandRunner, CommandSpec};
use crate::error::CommandError;

/// Executes commands with `std::process::Command`, capturing stdout and stderr.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    working_dir: Option<PathBuf>,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every command from this directory.
    pub fn in_dir(working_dir: PathBuf) -> Self {
        Self {
            working_dir: Some(working_dir),
        }
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput, CommandError> {
        let line = command.redacted();
        tracing::info!(command = %line, "Running");

        let mut process = Command::new(command.program());
        process.args(command.exposed_args());
        if let Some(dir) = &self.working_dir {
            process.current_dir(dir);
        }

        let output = process.output().map_err(|source| CommandError::Spawn {
            command: line.clone(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !stdout.trim().is_empty() {
            tracing::info!("{}", stdout.trim_end());
        }
        if !stderr.trim().is_empty() {
            tracing::warn!(command = %line, "stderr: {}", stderr.trim_end());
        }

        if !output.status.success() {
            return Err(CommandError::Exit {
                command: line,
                code: output.status.code(),
                signal: exit_signal(output.status),
                stderr,
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

#[cfg(unix)]
fn exit_signal(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: ExitStatus) -> Option<i32> {
    None
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout() {
        let runner = ShellRunner::new();
        let output = runner
            .run(&CommandSpec::new("sh").arg("-c").arg("echo hello"))
            .unwrap();
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[test]
    fn non_zero_exit_is_error_with_code() {
        let runner = ShellRunner::new();
        let err = runner
            .run(&CommandSpec::new("sh").arg("-c").arg("echo oops >&2; exit 3"))
            .unwrap_err();
        match err {
            CommandError::Exit { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr.trim(), "oops");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn failure_reports_redacted_command_line() {
        let runner = ShellRunner::new();
        let command = CommandSpec::new("sh")
            .arg("-c")
            .arg("exit 1")
            .secret_arg(&crate::credentials::Secret::new("deploy-key"));
        let err = runner.run(&command).unwrap_err();
        assert_eq!(err.command(), "sh -c exit 1 ***");
        assert!(!err.to_string().contains("deploy-key"));
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let runner = ShellRunner::new();
        let err = runner
            .run(&CommandSpec::new("subdeploy-definitely-not-a-program"))
            .unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }

    #[test]
    fn runs_in_working_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        let runner = ShellRunner::in_dir(temp.path().to_path_buf());
        let output = runner.run(&CommandSpec::new("pwd")).unwrap();
        let reported = std::path::PathBuf::from(output.stdout.trim());
        assert_eq!(
            reported.canonicalize().unwrap(),
            temp.path().canonicalize().unwrap()
        );
    }
}
