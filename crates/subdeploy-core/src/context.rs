//! Application context for unified dependency injection.

use std::path::{Path, PathBuf};

use crate::config::{ConfigStore, DeployConfig};
use crate::credentials::Credentials;
use crate::deploy::Orchestrator;
use crate::registry::{DEFAULT_REGISTRY_FILE, NetworkRegistry};
use crate::runner::CommandRunner;

/// Paths and loaders shared by every frontend command.
///
/// The CLI creates this once, loads configuration and the network registry
/// through it, and receives a ready [`Orchestrator`].
#[derive(Debug, Clone)]
pub struct AppContext {
    project_root: PathBuf,
    registry_path: PathBuf,
    config_store: ConfigStore,
}

impl AppContext {
    /// Context rooted at `project_root` with the default registry and config lookup.
    pub fn new(project_root: PathBuf) -> Self {
        let registry_path = project_root.join(DEFAULT_REGISTRY_FILE);
        let config_store = ConfigStore::discover(&project_root);
        Self {
            project_root,
            registry_path,
            config_store,
        }
    }

    /// Context for the current working directory.
    pub fn with_defaults() -> anyhow::Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    /// Override the network registry file.
    pub fn with_registry_path(mut self, path: PathBuf) -> Self {
        self.registry_path = self.resolve(path);
        self
    }

    /// Use exactly this configuration file.
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_store = ConfigStore::explicit(self.resolve(path));
        self
    }

    /// Replace config discovery (for testing).
    pub fn with_config_store(mut self, store: ConfigStore) -> Self {
        self.config_store = store;
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn registry_path(&self) -> &Path {
        &self.registry_path
    }

    pub fn config_store(&self) -> &ConfigStore {
        &self.config_store
    }

    pub fn load_config(&self) -> anyhow::Result<DeployConfig> {
        self.config_store.load()
    }

    pub fn load_registry(&self) -> anyhow::Result<NetworkRegistry> {
        NetworkRegistry::load(&self.registry_path)
    }

    /// Load everything and build an orchestrator, reading credentials from
    /// the environment variables named in the configuration.
    pub fn orchestrator<R: CommandRunner>(&self, runner: R) -> anyhow::Result<Orchestrator<R>> {
        let registry = self.load_registry()?;
        tracing::debug!(
            registry = %self.registry_path.display(),
            networks = registry.len(),
            "Loaded network registry"
        );
        self.orchestrator_with(registry, runner)
    }

    /// Build an orchestrator with an empty registry.
    ///
    /// Codegen never looks at networks, so it works in projects that have no
    /// registry file.
    pub fn codegen_orchestrator<R: CommandRunner>(
        &self,
        runner: R,
    ) -> anyhow::Result<Orchestrator<R>> {
        self.orchestrator_with(NetworkRegistry::new(), runner)
    }

    fn orchestrator_with<R: CommandRunner>(
        &self,
        registry: NetworkRegistry,
        runner: R,
    ) -> anyhow::Result<Orchestrator<R>> {
        let config = self.load_config()?;
        let credentials = Credentials::from_env(&config);
        Ok(Orchestrator::new(registry, config, credentials, runner))
    }

    fn resolve(&self, path: PathBuf) -> PathBuf {
        if path.is_absolute() {
            path
        } else {
            self.project_root.join(path)
        }
    }
}
