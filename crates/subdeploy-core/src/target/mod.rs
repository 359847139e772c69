//! Deployment target classification.
//!
//! A network's endpoint URL decides where its subgraph is deployed. Two URL
//! grammars are recognized and tried in order:
//!
//! | Target  | Endpoint                                                        |
//! |---------|-----------------------------------------------------------------|
//! | Hosted  | `https://api.thegraph.com/subgraphs/name/<name>`                |
//! | Studio  | `https://api.studio.thegraph.com/query/44190/<name>/<version>`  |
//!
//! Anything else is a configuration error.

pub mod version;

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

pub use version::{StudioVersion, VersionLabel, next_version};

/// Host serving hosted-service subgraph queries.
pub const HOSTED_HOST: &str = "api.thegraph.com";
/// Host serving subgraph studio queries.
pub const STUDIO_HOST: &str = "api.studio.thegraph.com";
/// Studio account that owns the deployed subgraphs.
pub const STUDIO_ACCOUNT_ID: &str = "44190";

/// Where a network's subgraph is deployed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DeploymentTarget {
    /// Hosted service, addressed by `<account>/<subgraph>` slug
    Hosted { subgraph_name: String },
    /// Subgraph studio, auto-versioned
    Studio {
        subgraph_name: String,
        current_version: StudioVersion,
    },
}

impl DeploymentTarget {
    pub fn subgraph_name(&self) -> &str {
        match self {
            DeploymentTarget::Hosted { subgraph_name }
            | DeploymentTarget::Studio { subgraph_name, .. } => subgraph_name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DeploymentTarget::Hosted { .. } => "hosted-service",
            DeploymentTarget::Studio { .. } => "studio",
        }
    }
}

impl fmt::Display for DeploymentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentTarget::Hosted { subgraph_name } => {
                write!(f, "hosted-service {subgraph_name}")
            }
            DeploymentTarget::Studio {
                subgraph_name,
                current_version,
            } => write!(f, "studio {subgraph_name}@{current_version}"),
        }
    }
}

/// Classify an endpoint URL into a deployment target.
///
/// The hosted grammar is attempted first; studio is only tried when it does
/// not match.
pub fn classify(url: &Url) -> Result<DeploymentTarget, ConfigError> {
    if let Some(target) = parse_hosted(url) {
        return Ok(target);
    }
    if let Some(target) = parse_studio(url)? {
        return Ok(target);
    }
    Err(unrecognized(
        url,
        "expected a hosted-service or subgraph studio query URL",
    ))
}

/// Parse and classify a raw endpoint string.
pub fn classify_str(endpoint: &str) -> Result<DeploymentTarget, ConfigError> {
    classify(&parse_endpoint(endpoint)?)
}

/// Parse an endpoint URL exactly as written.
///
/// URL parsing resolves `.`/`..` segments, percent-encodes and lowercases
/// parts of the input. An endpoint whose parsed form differs from the raw text
/// is rejected, so the captured subgraph name is always the one in the registry.
pub fn parse_endpoint(endpoint: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(endpoint).map_err(|err| ConfigError::UnrecognizedEndpoint {
        url: endpoint.to_string(),
        reason: format!("not a valid URL ({err})"),
    })?;
    if url.as_str() != endpoint {
        return Err(ConfigError::UnrecognizedEndpoint {
            url: endpoint.to_string(),
            reason: format!("endpoint is not in canonical form (parses as '{url}')"),
        });
    }
    Ok(url)
}

fn parse_hosted(url: &Url) -> Option<DeploymentTarget> {
    let segments = endpoint_segments(url, HOSTED_HOST)?;
    let [first, second, name @ ..] = segments.as_slice() else {
        return None;
    };
    if *first != "subgraphs" || *second != "name" || name.is_empty() {
        return None;
    }
    Some(DeploymentTarget::Hosted {
        subgraph_name: name.join("/"),
    })
}

/// `Ok(None)` means the URL is not a studio URL at all; a studio URL with a
/// malformed version is an error.
fn parse_studio(url: &Url) -> Result<Option<DeploymentTarget>, ConfigError> {
    let Some(segments) = endpoint_segments(url, STUDIO_HOST) else {
        return Ok(None);
    };
    let ["query", account, name, version] = segments.as_slice() else {
        return Ok(None);
    };
    if *account != STUDIO_ACCOUNT_ID {
        return Ok(None);
    }
    let current_version = version
        .parse::<StudioVersion>()
        .map_err(|reason| unrecognized(url, &reason))?;

    Ok(Some(DeploymentTarget::Studio {
        subgraph_name: (*name).to_string(),
        current_version,
    }))
}

/// Non-empty path segments of an `https://<host>/...` URL with no port,
/// credentials, query or fragment.
fn endpoint_segments<'a>(url: &'a Url, host: &str) -> Option<Vec<&'a str>> {
    if url.scheme() != "https"
        || url.host_str() != Some(host)
        || url.port().is_some()
        || !url.username().is_empty()
        || url.password().is_some()
        || url.query().is_some()
        || url.fragment().is_some()
    {
        return None;
    }
    let segments: Vec<&str> = url.path_segments()?.collect();
    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    Some(segments)
}

fn unrecognized(url: &Url, reason: &str) -> ConfigError {
    ConfigError::UnrecognizedEndpoint {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}
