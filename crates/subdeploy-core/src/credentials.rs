//! Deploy credentials, read once at the process boundary.

use std::fmt;

use crate::config::DeployConfig;
use crate::error::AuthError;

/// A secret value that never appears in `Debug` or `Display` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw value, for handing to a subprocess.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Deploy keys for both backends. Either may be absent; absence only matters
/// when a network actually deploys to that backend.
#[derive(Debug, Clone)]
pub struct Credentials {
    hosted: Option<Secret>,
    hosted_env: String,
    studio: Option<Secret>,
    studio_env: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl Credentials {
    pub fn new(hosted: Option<Secret>, studio: Option<Secret>) -> Self {
        Self {
            hosted,
            hosted_env: crate::config::DEFAULT_HOSTED_TOKEN_ENV.to_string(),
            studio,
            studio_env: crate::config::DEFAULT_STUDIO_TOKEN_ENV.to_string(),
        }
    }

    /// Read both keys from the environment variables named in the config.
    ///
    /// Blank values count as absent.
    pub fn from_env(config: &DeployConfig) -> Self {
        let read = |name: &str| {
            std::env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(Secret::new)
        };
        Self {
            hosted: read(&config.hosted.token_env),
            hosted_env: config.hosted.token_env.clone(),
            studio: read(&config.studio.token_env),
            studio_env: config.studio.token_env.clone(),
        }
    }

    pub fn hosted(&self) -> Result<&Secret, AuthError> {
        self.hosted
            .as_ref()
            .ok_or_else(|| AuthError::MissingHostedCredential {
                env_var: self.hosted_env.clone(),
            })
    }

    pub fn studio(&self) -> Result<&Secret, AuthError> {
        self.studio
            .as_ref()
            .ok_or_else(|| AuthError::MissingStudioCredential {
                env_var: self.studio_env.clone(),
            })
    }
}
