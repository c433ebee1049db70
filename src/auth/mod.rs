//! Registry credential resolution
//!
//! Credentials come from a [`CredentialSource`]: Docker config files and
//! credential helpers ([`DockerConfigSource`]), static entries from the
//! pullsecret config file ([`StaticCredentialSource`]), or a chain of both.

use crate::constants::registry::{DOCKER_HUB_ALIASES, INDEX_SERVER};
use crate::constants::secret::DEFAULT_EMAIL;
use crate::error::{PullSecretError, Result};
use crate::reference::{convert_to_hostname, RegistryHost};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

mod keychain;

pub use keychain::DockerConfigSource;

/// Credentials for a registry, as written into a pull secret
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryCredentials {
    pub username: String,
    pub secret: String,
    pub server_url: String,
    pub email: String,
}

impl RegistryCredentials {
    /// base64 of `username:secret`, the value compared against stored secrets
    pub fn auth_token(&self) -> String {
        base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", self.username, self.secret))
    }

    /// No usable credentials are known for the registry
    pub fn is_empty(&self) -> bool {
        self.username.is_empty() || self.secret.is_empty()
    }
}

/// Credentials found in a credential source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub username: String,
    pub secret: String,
    pub email: Option<String>,
}

/// Trait for local credential stores
pub trait CredentialSource {
    /// Look up credentials for a server address.
    ///
    /// `Ok(None)` means the source has nothing for the server. Errors are
    /// reserved for unreadable or corrupt configuration.
    fn lookup_credentials(&self, server: &str) -> Result<Option<StoredCredentials>>;
}

/// Resolves the credentials to write into a pull secret for a registry host
pub struct CredentialResolver<'a> {
    source: &'a dyn CredentialSource,
    default_email: String,
}

impl<'a> CredentialResolver<'a> {
    pub fn new(source: &'a dyn CredentialSource) -> Self {
        Self {
            source,
            default_email: DEFAULT_EMAIL.to_string(),
        }
    }

    pub fn with_default_email(mut self, email: impl Into<String>) -> Self {
        self.default_email = email.into();
        self
    }

    /// Resolve credentials for a host.
    ///
    /// Unknown registries yield empty username and secret with `server_url`
    /// set, which callers treat as "nothing to do".
    pub fn resolve(&self, host: &RegistryHost, check_store: bool) -> Result<RegistryCredentials> {
        let server_url = if host.is_default {
            host.address.clone()
        } else {
            convert_to_hostname(&host.address)
        };

        let mut credentials = RegistryCredentials {
            server_url,
            email: self.default_email.clone(),
            ..Default::default()
        };

        if !check_store {
            return Ok(credentials);
        }

        match self.source.lookup_credentials(&credentials.server_url)? {
            Some(stored) => {
                debug!("Found credentials for {}", credentials.server_url);
                credentials.username = stored.username;
                credentials.secret = stored.secret;
                if let Some(email) = stored.email.filter(|e| !e.is_empty()) {
                    credentials.email = email;
                }
            }
            None => debug!("No credentials stored for {}", credentials.server_url),
        }

        Ok(credentials)
    }
}

/// Docker config file structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DockerConfig {
    #[serde(default)]
    pub auths: HashMap<String, DockerAuthEntry>,
    #[serde(rename = "credHelpers", default)]
    pub cred_helpers: HashMap<String, String>,
    #[serde(rename = "credsStore", skip_serializing_if = "Option::is_none")]
    pub creds_store: Option<String>,
}

/// Entry in the Docker config auths section
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DockerAuthEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "identitytoken", skip_serializing_if = "Option::is_none")]
    pub identity_token: Option<String>,
}

impl DockerAuthEntry {
    /// Map the entry to username and secret.
    ///
    /// Explicit username/password wins over `auth`, which wins over an
    /// identity token. An `auth` value that isn't base64 `user:pass` is an
    /// error since the config file is corrupt.
    pub fn to_stored_credentials(&self, server: &str) -> Result<Option<StoredCredentials>> {
        let email = self.email.clone();
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());

        if let (Some(username), Some(secret)) = (non_empty(&self.username), non_empty(&self.password))
        {
            return Ok(Some(StoredCredentials {
                username,
                secret,
                email,
            }));
        }

        if let Some(auth) = non_empty(&self.auth) {
            let (username, secret) = decode_auth(server, &auth)?;
            return Ok(Some(StoredCredentials {
                username,
                secret,
                email,
            }));
        }

        if let Some(token) = non_empty(&self.identity_token) {
            return Ok(Some(StoredCredentials {
                username: "<token>".to_string(),
                secret: token,
                email,
            }));
        }

        Ok(None)
    }
}

fn decode_auth(server: &str, auth: &str) -> Result<(String, String)> {
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(auth.trim())
        .map_err(|e| PullSecretError::lookup_failed(server, format!("invalid auth value: {}", e)))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| PullSecretError::lookup_failed(server, "auth value is not UTF-8"))?;

    decoded
        .split_once(':')
        .map(|(user, pass)| (user.to_string(), pass.to_string()))
        .ok_or_else(|| PullSecretError::lookup_failed(server, "auth value is not user:password"))
}

/// Spellings a registry may be keyed by in credential configuration.
///
/// The address itself comes first. Docker Hub addresses expand to every Hub
/// alias; other registries add the bare hostname and its URL forms.
pub(crate) fn normalize_registry(registry: &str) -> Vec<String> {
    let mut variants = vec![registry.to_string()];
    let mut push = |variant: String| {
        if !variants.contains(&variant) {
            variants.push(variant);
        }
    };

    let hostname = convert_to_hostname(registry);
    if registry == INDEX_SERVER || DOCKER_HUB_ALIASES.contains(&hostname.as_str()) {
        for alias in [INDEX_SERVER, "https://index.docker.io/v2/"]
            .into_iter()
            .chain(DOCKER_HUB_ALIASES.iter().copied())
        {
            push(alias.to_string());
        }
    } else {
        push(format!("https://{}", hostname));
        push(format!("http://{}", hostname));
        push(format!("https://{}/v1/", hostname));
        push(format!("https://{}/v2/", hostname));
        push(hostname);
    }

    variants
}

/// Credentials configured statically, keyed by registry host
pub struct StaticCredentialSource {
    entries: HashMap<String, DockerAuthEntry>,
}

impl StaticCredentialSource {
    pub fn new(entries: HashMap<String, DockerAuthEntry>) -> Self {
        Self { entries }
    }
}

impl CredentialSource for StaticCredentialSource {
    fn lookup_credentials(&self, server: &str) -> Result<Option<StoredCredentials>> {
        let entry = normalize_registry(server)
            .iter()
            .find_map(|variant| self.entries.get(variant));

        match entry {
            Some(entry) => entry.to_stored_credentials(server),
            None => Ok(None),
        }
    }
}

/// Tries multiple credential sources in order
pub struct ChainedCredentialSource {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl ChainedCredentialSource {
    pub fn new(sources: Vec<Box<dyn CredentialSource>>) -> Self {
        Self { sources }
    }
}

impl CredentialSource for ChainedCredentialSource {
    fn lookup_credentials(&self, server: &str) -> Result<Option<StoredCredentials>> {
        for source in &self.sources {
            if let Some(found) = source.lookup_credentials(server)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }
}
