//! Locate and load subdeploy.toml.

use std::path::{Path, PathBuf};

use super::{DeployConfig, parser};

pub const CONFIG_FILE_NAME: &str = "subdeploy.toml";

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: Option<PathBuf>,
    explicit: bool,
}

impl ConfigStore {
    /// Use exactly this file; it must exist.
    pub fn explicit(path: PathBuf) -> Self {
        Self {
            config_path: Some(path),
            explicit: true,
        }
    }

    /// Search the project root, then the user config directory.
    pub fn discover(project_root: &Path) -> Self {
        let global_dir = dirs::config_dir().map(|p| p.join("subdeploy"));
        Self::discover_in(project_root, global_dir.as_deref())
    }

    /// Search with an explicit global directory (for testing).
    pub fn discover_in(project_root: &Path, global_dir: Option<&Path>) -> Self {
        let mut candidates = std::iter::once(project_root.join(CONFIG_FILE_NAME))
            .chain(global_dir.map(|dir| dir.join(CONFIG_FILE_NAME)));

        let config_path = candidates.find(|p| p.is_file());
        Self {
            config_path,
            explicit: false,
        }
    }

    /// The file that will be loaded, if any was found.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn load(&self) -> anyhow::Result<DeployConfig> {
        match &self.config_path {
            Some(path) if self.explicit || path.exists() => {
                tracing::debug!(path = %path.display(), "Loading deploy configuration");
                parser::parse_config(path)
            }
            _ => {
                tracing::debug!("No subdeploy.toml found, using defaults");
                Ok(DeployConfig::new())
            }
        }
    }
}
