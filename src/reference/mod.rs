//! Registry host extraction for image references
//!
//! Splits an image reference into its registry host, deferring to a
//! [`DefaultRegistryResolver`] when the reference names no registry.

use crate::constants::registry::{DOCKER_HUB_ALIASES, INDEX_SERVER, LOCALHOST};
use crate::error::{PullSecretError, Result};
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, warn};


/// Registry host resolved from an image reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryHost {
    /// Bare hostname, or the full default registry address
    pub address: String,
    /// Whether the address is the default registry
    pub is_default: bool,
}

/// Resolves the registry used when an image reference has no host
pub trait DefaultRegistryResolver {
    /// Best-effort lookup; implementations fall back to a static address.
    fn resolve_default_registry_address(&self) -> String;
}

/// Default registry pinned to a fixed address
#[derive(Debug, Clone)]
pub struct StaticDefaultRegistry(pub String);

impl Default for StaticDefaultRegistry {
    fn default() -> Self {
        Self(INDEX_SERVER.to_string())
    }
}

impl DefaultRegistryResolver for StaticDefaultRegistry {
    fn resolve_default_registry_address(&self) -> String {
        self.0.clone()
    }
}

/// Default registry reported by the docker daemon's info endpoint
pub struct DockerInfo {
    docker: Option<PathBuf>,
}

impl DockerInfo {
    /// Use the `docker` binary found on PATH
    pub fn new() -> Self {
        Self {
            docker: which::which("docker").ok(),
        }
    }

    pub fn with_binary(docker: impl Into<PathBuf>) -> Self {
        Self {
            docker: Some(docker.into()),
        }
    }

    fn query(&self) -> Option<String> {
        let Some(docker) = &self.docker else {
            debug!("docker not found on PATH, using {}", INDEX_SERVER);
            return None;
        };

        let output = Command::new(docker)
            .args(["info", "--format", "{{.IndexServerAddress}}"])
            .output();

        match output {
            Ok(output) if output.status.success() => {
                let address = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if address.is_empty() {
                    warn!("Empty registry endpoint from daemon, using {}", INDEX_SERVER);
                    None
                } else {
                    Some(address)
                }
            }
            Ok(output) => {
                debug!(
                    "Failed to get default registry endpoint from daemon: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                );
                None
            }
            Err(e) => {
                debug!("Failed to run docker info: {}", e);
                None
            }
        }
    }
}

impl Default for DockerInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultRegistryResolver for DockerInfo {
    fn resolve_default_registry_address(&self) -> String {
        self.query().unwrap_or_else(|| INDEX_SERVER.to_string())
    }
}

/// Extract the registry host from an image reference
///
/// - `ghcr.io/org/img:tag` -> `ghcr.io`
/// - `localhost:5000/img` -> `localhost:5000`
/// - `org/img`, `nginx`, `docker.io/library/nginx` -> default registry
pub fn extract_registry_host(
    image_ref: &str,
    default_registry: &dyn DefaultRegistryResolver,
) -> Result<RegistryHost> {
    let explicit = explicit_registry(image_ref)?;

    match explicit {
        Some(registry) if !is_docker_hub(registry) => Ok(RegistryHost {
            address: convert_to_hostname(registry),
            is_default: false,
        }),
        _ => {
            let address = default_registry.resolve_default_registry_address();
            debug!("Using default registry {} for {}", address, image_ref);
            Ok(RegistryHost {
                address,
                is_default: true,
            })
        }
    }
}

/// Leading registry segment of a reference, if it names one
fn explicit_registry(image_ref: &str) -> Result<Option<&str>> {
    if image_ref.trim().is_empty() {
        return Err(PullSecretError::invalid_reference(image_ref, "empty reference"));
    }
    if image_ref.chars().any(char::is_whitespace) {
        return Err(PullSecretError::invalid_reference(
            image_ref,
            "reference contains whitespace",
        ));
    }
    if image_ref.split('/').any(str::is_empty) {
        return Err(PullSecretError::invalid_reference(
            image_ref,
            "reference contains an empty path segment",
        ));
    }

    let Some((first, _)) = image_ref.split_once('/') else {
        return Ok(None);
    };

    if first.contains('.') || first.contains(':') || first == LOCALHOST {
        Ok(Some(first))
    } else {
        Ok(None)
    }
}

fn is_docker_hub(registry: &str) -> bool {
    DOCKER_HUB_ALIASES.contains(&registry)
}

/// Reduce a registry address to its bare hostname
pub fn convert_to_hostname(address: &str) -> String {
    let stripped = address
        .strip_prefix("http://")
        .or_else(|| address.strip_prefix("https://"))
        .unwrap_or(address);

    stripped.split('/').next().unwrap_or(stripped).to_string()
}
