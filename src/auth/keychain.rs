//! Docker config file and credential helper backed credential source

use super::{normalize_registry, CredentialSource, DockerConfig, StoredCredentials};
use crate::error::{PullSecretError, Result};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

/// Reads credentials from the local Docker configuration.
///
/// The config is re-read on every lookup so a `docker login` between two
/// calls is picked up.
pub struct DockerConfigSource {
    paths: Vec<PathBuf>,
}

impl DockerConfigSource {
    /// Search the standard Docker config locations
    pub fn new() -> Self {
        Self {
            paths: Self::config_paths(),
        }
    }

    /// Search only the given config files, in order
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    /// Get paths to check for Docker config
    fn config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(docker_config) = std::env::var("DOCKER_CONFIG") {
            paths.push(PathBuf::from(docker_config).join("config.json"));
        }

        if let Ok(auth_file) = std::env::var("REGISTRY_AUTH_FILE") {
            paths.push(PathBuf::from(auth_file));
        }

        if let Ok(xdg_runtime) = std::env::var("XDG_RUNTIME_DIR") {
            paths.push(PathBuf::from(xdg_runtime).join("containers/auth.json"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".docker/config.json"));
        }

        paths
    }

    /// Load the first Docker config that exists
    fn load_config(&self, server: &str) -> Result<Option<DockerConfig>> {
        let Some(path) = self.paths.iter().find(|p| p.exists()) else {
            debug!("No Docker config found");
            return Ok(None);
        };

        debug!("Loading Docker config from: {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| {
            PullSecretError::lookup_failed(server, format!("read {}: {}", path.display(), e))
        })?;

        let config = serde_json::from_str::<DockerConfig>(&content).map_err(|e| {
            PullSecretError::lookup_failed(server, format!("parse {}: {}", path.display(), e))
        })?;

        Ok(Some(config))
    }

    /// Helper configured for this registry under any of its spellings
    fn registry_helper<'c>(config: &'c DockerConfig, registry: &str) -> Option<&'c str> {
        normalize_registry(registry)
            .iter()
            .find_map(|variant| config.cred_helpers.get(variant))
            .map(String::as_str)
            .filter(|h| !h.is_empty())
    }

    /// Helper configured for the registry, falling back to the default store
    fn credential_helper<'c>(config: &'c DockerConfig, registry: &str) -> Option<&'c str> {
        Self::registry_helper(config, registry).or_else(|| {
            config
                .creds_store
                .as_deref()
                .filter(|h| !h.is_empty())
        })
    }

    fn lookup_auths(config: &DockerConfig, registry: &str) -> Result<Option<StoredCredentials>> {
        for variant in normalize_registry(registry) {
            if let Some(entry) = config.auths.get(&variant) {
                debug!("Found auth entry {} for {}", variant, registry);
                if let Some(found) = entry.to_stored_credentials(registry)? {
                    return Ok(Some(found));
                }
            }
        }
        Ok(None)
    }

    /// Execute a `docker-credential-<helper> get` for the registry
    fn execute_credential_helper(
        &self,
        helper: &str,
        registry: &str,
    ) -> Result<Option<StoredCredentials>> {
        let helper_name = format!("docker-credential-{}", helper);

        debug!(
            "Executing credential helper: {} for {}",
            helper_name, registry
        );

        let mut child = Command::new(&helper_name)
            .arg("get")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                PullSecretError::lookup_failed(
                    registry,
                    format!("failed to spawn credential helper {}: {}", helper_name, e),
                )
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(registry.as_bytes())
                .and_then(|_| stdin.write_all(b"\n"))
                .map_err(|e| PullSecretError::lookup_failed(registry, e))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| PullSecretError::lookup_failed(registry, e))?;

        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stdout.contains("credentials not found") || stderr.contains("credentials not found")
            {
                debug!("{} has no credentials for {}", helper_name, registry);
                return Ok(None);
            }
            return Err(PullSecretError::lookup_failed(
                registry,
                format!("credential helper {} failed: {}{}", helper_name, stdout, stderr),
            ));
        }

        #[derive(serde::Deserialize)]
        struct HelperResponse {
            #[serde(rename = "Username", default)]
            username: String,
            #[serde(rename = "Secret", default)]
            secret: String,
        }

        let response: HelperResponse = serde_json::from_slice(&output.stdout).map_err(|e| {
            PullSecretError::lookup_failed(
                registry,
                format!("failed to parse {} response: {}", helper_name, e),
            )
        })?;

        if response.username.is_empty() || response.secret.is_empty() {
            return Ok(None);
        }

        Ok(Some(StoredCredentials {
            username: response.username,
            secret: response.secret,
            email: None,
        }))
    }
}

impl Default for DockerConfigSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialSource for DockerConfigSource {
    fn lookup_credentials(&self, server: &str) -> Result<Option<StoredCredentials>> {
        let Some(config) = self.load_config(server)? else {
            return Ok(None);
        };

        if let Some(helper) = Self::credential_helper(&config, server) {
            if let Some(found) = self.execute_credential_helper(helper, server)? {
                return Ok(Some(found));
            }
            if Self::registry_helper(&config, server).is_some() {
                debug!("Credential helper {} has nothing for {}", helper, server);
                return Ok(None);
            }
        }

        Self::lookup_auths(&config, server)
    }
}
