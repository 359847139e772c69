//! Configuration schema for subdeploy.toml

use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_HOSTED_TOKEN_ENV: &str = "SUBGRAPH_DEPLOY_KEY";
pub const DEFAULT_STUDIO_TOKEN_ENV: &str = "SUBGRAPH_STUDIO_DEPLOY_KEY";

/// Registry keys that are never deployed by `deploy-all`.
///
/// `networks` and `default` are not networks; `palm` is not supported by the
/// deployment backend.
pub const DEFAULT_EXCLUDED_NETWORKS: [&str; 3] = ["networks", "default", "palm"];

/// Placeholder substituted with the build-target name in the build command.
pub const NETWORK_PLACEHOLDER: &str = "{network}";

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub commands: CommandsConfig,
    pub hosted: HostedConfig,
    pub studio: StudioConfig,
    pub fleet: FleetConfig,
    pub execution: ExecutionConfig,
}

/// External toolchain commands
///
/// Each command is split on whitespace into a program and its arguments; no
/// shell is involved and quoting is not supported. Wrap anything that needs a
/// shell in a script or package.json entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    /// Code generation
    pub codegen: String,
    /// Run before every build
    pub prepare: String,
    /// Build, with `{network}` replaced by the build-target name
    pub build: String,
    /// Graph CLI prefix used for `auth` and `deploy`
    pub graph: String,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            codegen: "yarn codegen".to_string(),
            prepare: "yarn prepare".to_string(),
            build: "yarn build {network}".to_string(),
            graph: "yarn graph".to_string(),
        }
    }
}

/// Hosted-service backend settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostedConfig {
    /// Graph node deploy endpoint
    pub node_url: Url,
    /// IPFS endpoint for uploading build artifacts
    pub ipfs_url: Url,
    /// Environment variable holding the access token
    pub token_env: String,
}

impl Default for HostedConfig {
    fn default() -> Self {
        Self {
            node_url: Url::parse("https://api.thegraph.com/deploy/")
                .expect("static hosted node URL is valid"),
            ipfs_url: Url::parse("https://api.thegraph.com/ipfs/")
                .expect("static hosted IPFS URL is valid"),
            token_env: DEFAULT_HOSTED_TOKEN_ENV.to_string(),
        }
    }
}

/// Subgraph studio backend settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Environment variable holding the studio deploy key
    pub token_env: String,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            token_env: DEFAULT_STUDIO_TOKEN_ENV.to_string(),
        }
    }
}

/// Fleet-wide deployment settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Registry keys skipped by `deploy-all`
    pub exclude: Vec<String>,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            exclude: DEFAULT_EXCLUDED_NETWORKS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

/// What to do when an external command fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandFailurePolicy {
    /// Stop the current operation with an error
    #[default]
    Abort,
    /// Log the failure and carry on with the next step
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    pub on_command_failure: CommandFailurePolicy,
}

impl DeployConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration after parsing
    pub fn validate(&self) -> anyhow::Result<()> {
        let commands = [
            ("codegen", &self.commands.codegen),
            ("prepare", &self.commands.prepare),
            ("build", &self.commands.build),
            ("graph", &self.commands.graph),
        ];
        for (name, command) in commands {
            if command.trim().is_empty() {
                anyhow::bail!("commands.{} must not be empty", name);
            }
            if command.contains(['"', '\'', '\\']) {
                anyhow::bail!(
                    "commands.{} must not contain quotes or backslashes; commands are split on whitespace without a shell",
                    name
                );
            }
        }
        if !self.commands.build.contains(NETWORK_PLACEHOLDER) {
            anyhow::bail!(
                "commands.build must contain the {} placeholder",
                NETWORK_PLACEHOLDER
            );
        }

        for (name, url) in [
            ("hosted.node_url", &self.hosted.node_url),
            ("hosted.ipfs_url", &self.hosted.ipfs_url),
        ] {
            if !matches!(url.scheme(), "http" | "https") {
                anyhow::bail!("{} must be an http(s) URL, got '{}'", name, url);
            }
        }

        for (name, var) in [
            ("hosted.token_env", &self.hosted.token_env),
            ("studio.token_env", &self.studio.token_env),
        ] {
            if var.trim().is_empty() || var.contains('=') {
                anyhow::bail!("{} must name an environment variable", name);
            }
        }

        if self.fleet.exclude.iter().any(|n| n.trim().is_empty()) {
            anyhow::bail!("fleet.exclude must not contain empty network names");
        }
        Ok(())
    }
}
