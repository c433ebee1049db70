//! Pull secret reconciliation
//!
//! A secret is in one of three states, inferred from the store on every call:
//! absent, present but stale, or present and fresh. Stale secrets are deleted
//! and created again; there is no in-place update. If the create fails after
//! the delete succeeded the secret is left absent, and calling
//! [`SecretReconciler::ensure_pull_secret`] again recreates it.

use crate::auth::{CredentialResolver, CredentialSource, RegistryCredentials};
use crate::constants::secret::{DEFAULT_EMAIL, DOCKER_CONFIG_JSON_TYPE};
use crate::error::{PullSecretError, Result};
use crate::reference::{extract_registry_host, DefaultRegistryResolver};
use tracing::{debug, info, warn};

pub mod codec;
pub mod store;

pub use store::{KubectlSecretStore, SecretStore};


/// What `ensure_pull_secret` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretAction {
    /// No credentials are known for the registry
    Skipped,
    /// The stored secret already matches the credentials
    Unchanged,
    Created,
    /// A stale secret was deleted and created again
    Replaced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileResult {
    pub changed: bool,
    pub action: SecretAction,
    /// Registry address the secret was reconciled for
    pub host: String,
}

impl ReconcileResult {
    fn new(action: SecretAction, host: &str) -> Self {
        Self {
            changed: matches!(action, SecretAction::Created | SecretAction::Replaced),
            action,
            host: host.to_string(),
        }
    }
}

/// Keeps pull secrets in a [`SecretStore`] in line with local credentials
pub struct SecretReconciler<'a> {
    store: &'a dyn SecretStore,
    credentials: &'a dyn CredentialSource,
    default_registry: &'a dyn DefaultRegistryResolver,
    email: String,
}

impl<'a> SecretReconciler<'a> {
    pub fn new(
        store: &'a dyn SecretStore,
        credentials: &'a dyn CredentialSource,
        default_registry: &'a dyn DefaultRegistryResolver,
    ) -> Self {
        Self {
            store,
            credentials,
            default_registry,
            email: DEFAULT_EMAIL.to_string(),
        }
    }

    /// Email written into payloads when the credential source has none
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Make sure `name` holds a pull secret for the registry of `image`.
    ///
    /// Returns `changed: false` when no credentials are known for the
    /// registry, or when the existing secret already carries the same token.
    pub fn ensure_pull_secret(&self, name: &str, image: &str) -> Result<ReconcileResult> {
        debug!("Ensure pull secret {} for {}", name, image);

        let host = extract_registry_host(image, self.default_registry)?;
        let credentials = CredentialResolver::new(self.credentials)
            .with_default_email(self.email.clone())
            .resolve(&host, true)?;

        if credentials.is_empty() {
            debug!(
                "Couldn't retrieve credentials for registry: {}",
                credentials.server_url
            );
            return Ok(ReconcileResult::new(
                SecretAction::Skipped,
                &credentials.server_url,
            ));
        }

        let replacing = self.store.exists(name);
        if replacing {
            if !self.is_stale(name, &credentials) {
                debug!("Pull secret '{}' already exists and is up to date", name);
                return Ok(ReconcileResult::new(
                    SecretAction::Unchanged,
                    &credentials.server_url,
                ));
            }

            debug!(
                "Pull secret '{}' already exists, but is outdated. Recreating...",
                name
            );
            self.store.delete(name)?;
        }

        self.create_pull_secret(name, &credentials)?;

        if replacing {
            info!("Pull secret '{}' replaced", name);
            Ok(ReconcileResult::new(
                SecretAction::Replaced,
                &credentials.server_url,
            ))
        } else {
            info!("Pull secret '{}' created", name);
            Ok(ReconcileResult::new(
                SecretAction::Created,
                &credentials.server_url,
            ))
        }
    }

    /// Delete the pull secret if it exists
    pub fn delete_pull_secret(&self, name: &str) -> Result<()> {
        if !self.store.exists(name) {
            debug!("Pull secret '{}' does not exist", name);
            return Ok(());
        }

        self.store.delete(name)?;
        info!("Pull secret '{}' deleted", name);
        Ok(())
    }

    /// Auth token stored in secret `name` for registry `host`
    pub fn read_secret_token(&self, name: &str, host: &str) -> Result<String> {
        let document = self
            .store
            .get(name)?
            .ok_or_else(|| PullSecretError::MalformedSecret(format!("secret {} not found", name)))?;

        codec::decode(&document, host)
    }

    fn is_stale(&self, name: &str, credentials: &RegistryCredentials) -> bool {
        match self.read_secret_token(name, &credentials.server_url) {
            Ok(token) => token != credentials.auth_token(),
            Err(e) if e.is_stale_secret() => {
                debug!("Pull secret '{}' can't be compared: {}", name, e);
                true
            }
            Err(e) => {
                warn!("Failed to read pull secret '{}', recreating it: {}", name, e);
                true
            }
        }
    }

    fn create_pull_secret(&self, name: &str, credentials: &RegistryCredentials) -> Result<()> {
        let literal = codec::encode(
            &credentials.server_url,
            &credentials.auth_token(),
            &credentials.email,
        )?;

        self.store.create(name, DOCKER_CONFIG_JSON_TYPE, &literal)
    }
}
