//! Deployment configuration (`subdeploy.toml`)
//!
//! Every section is optional; a missing file behaves like an empty one.
//! The file is looked up in this order:
//! - an explicit `--config` path
//! - `./subdeploy.toml` in the project root
//! - `<config dir>/subdeploy/subdeploy.toml`

pub mod parser;
pub mod schema;
pub mod store;

pub use parser::{parse_config, parse_config_str, to_toml};
pub use schema::{
    CommandFailurePolicy, CommandsConfig, DEFAULT_EXCLUDED_NETWORKS, DEFAULT_HOSTED_TOKEN_ENV,
    DEFAULT_STUDIO_TOKEN_ENV, DeployConfig, ExecutionConfig, FleetConfig, HostedConfig,
    StudioConfig,
};
pub use store::{CONFIG_FILE_NAME, ConfigStore};
