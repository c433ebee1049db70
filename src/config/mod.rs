use crate::auth::DockerAuthEntry;
use crate::constants::secret::DEFAULT_EMAIL;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Email written into pull secret payloads
    #[serde(default = "default_email")]
    pub email: String,

    /// Namespace to manage secrets in, defaults to the kubeconfig's
    pub namespace: Option<String>,

    /// kubeconfig context to use
    pub context: Option<String>,

    /// Path to a kubeconfig file
    pub kubeconfig: Option<PathBuf>,

    /// Path to the kubectl binary, looked up on PATH when unset
    pub kubectl: Option<PathBuf>,

    /// Default registry address; asks the docker daemon when unset
    pub default_registry: Option<String>,

    /// Registry credentials that take precedence over the Docker config
    #[serde(default)]
    pub registries: HashMap<String, RegistryAuth>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryAuth {
    pub username: Option<String>,
    pub password: Option<String>,
    pub auth: Option<String>,
    pub email: Option<String>,
}

impl From<&RegistryAuth> for DockerAuthEntry {
    fn from(auth: &RegistryAuth) -> Self {
        DockerAuthEntry {
            auth: auth.auth.clone(),
            username: auth.username.clone(),
            password: auth.password.clone(),
            email: auth.email.clone(),
            identity_token: None,
        }
    }
}

fn default_email() -> String {
    DEFAULT_EMAIL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            email: default_email(),
            namespace: None,
            context: None,
            kubeconfig: None,
            kubectl: None,
            default_registry: None,
            registries: HashMap::new(),
        }
    }
}

impl Config {
    /// Load `pullsecret/config.toml` from the user config dir, if present
    pub fn load() -> anyhow::Result<Self> {
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("pullsecret").join("config.toml");
            if config_path.exists() {
                return Self::load_from(&config_path);
            }
        }
        Ok(Config::default())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Registry entries in the shape of Docker config auths
    pub fn registry_entries(&self) -> HashMap<String, DockerAuthEntry> {
        self.registries
            .iter()
            .map(|(host, auth)| (host.clone(), DockerAuthEntry::from(auth)))
            .collect()
    }
}
