//! Pull secret service
//!
//! Builds the kubectl store, credential chain and default registry resolver
//! from [`Config`] and runs reconciler operations against them.

use anyhow::{Context, Result};
use tracing::debug;

use crate::{
    auth::{ChainedCredentialSource, DockerConfigSource, StaticCredentialSource},
    config::Config,
    reference::{
        extract_registry_host, DefaultRegistryResolver, DockerInfo, RegistryHost,
        StaticDefaultRegistry,
    },
    secret::{KubectlSecretStore, ReconcileResult, SecretReconciler},
};

/// Service for managing pull secrets in a cluster
pub struct PullSecretService {
    store: KubectlSecretStore,
    credentials: ChainedCredentialSource,
    default_registry: Box<dyn DefaultRegistryResolver>,
    email: String,
}

impl PullSecretService {
    pub fn from_config(config: &Config) -> Self {
        let store = match &config.kubectl {
            Some(kubectl) => KubectlSecretStore::new(kubectl),
            None => KubectlSecretStore::from_path().unwrap_or_else(|e| {
                debug!("{}", e);
                KubectlSecretStore::new("kubectl")
            }),
        }
        .with_namespace(config.namespace.clone())
        .with_context(config.context.clone())
        .with_kubeconfig(config.kubeconfig.clone());

        let credentials = ChainedCredentialSource::new(vec![
            Box::new(StaticCredentialSource::new(config.registry_entries())),
            Box::new(DockerConfigSource::new()),
        ]);

        let default_registry: Box<dyn DefaultRegistryResolver> = match &config.default_registry {
            Some(address) => {
                debug!("Using configured default registry {}", address);
                Box::new(StaticDefaultRegistry(address.clone()))
            }
            None => Box::new(DockerInfo::new()),
        };

        Self {
            store,
            credentials,
            default_registry,
            email: config.email.clone(),
        }
    }

    fn reconciler(&self) -> SecretReconciler<'_> {
        SecretReconciler::new(&self.store, &self.credentials, self.default_registry.as_ref())
            .with_email(self.email.clone())
    }

    /// Create or replace pull secret `name` for the registry of `image`
    pub fn ensure(&self, name: &str, image: &str) -> Result<ReconcileResult> {
        self.reconciler()
            .ensure_pull_secret(name, image)
            .with_context(|| format!("Failed to ensure pull secret {}", name))
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        self.reconciler()
            .delete_pull_secret(name)
            .with_context(|| format!("Failed to delete pull secret {}", name))
    }

    /// Registry host an image would be pulled from
    pub fn host(&self, image: &str) -> Result<RegistryHost> {
        Ok(extract_registry_host(image, self.default_registry.as_ref())?)
    }
}
