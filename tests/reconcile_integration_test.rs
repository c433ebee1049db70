//! Reconciler properties against the public API, with credentials read from a
//! Docker config file

mod common;

use anyhow::Result;
use base64::Engine;
use pullsecret::auth::DockerConfigSource;
use pullsecret::reference::{extract_registry_host, StaticDefaultRegistry};
use pullsecret::secret::{codec, SecretReconciler, SecretStore};
use pullsecret::PullSecretError;
use std::cell::RefCell;
use std::collections::BTreeMap;
use tempfile::TempDir;

/// Store that behaves like a cluster, counting mutations
#[derive(Default)]
struct MemoryStore {
    secrets: RefCell<BTreeMap<String, String>>,
    mutations: RefCell<Vec<String>>,
}

impl SecretStore for MemoryStore {
    fn exists(&self, name: &str) -> bool {
        self.secrets.borrow().contains_key(name)
    }

    fn get(&self, name: &str) -> pullsecret::Result<Option<String>> {
        Ok(self.secrets.borrow().get(name).cloned())
    }

    fn create(&self, name: &str, _secret_type: &str, literal: &str) -> pullsecret::Result<()> {
        self.mutations.borrow_mut().push(format!("create {}", name));
        let value = codec::literal_value(literal).unwrap_or_default();
        let data = base64::engine::general_purpose::STANDARD.encode(value);
        self.secrets.borrow_mut().insert(
            name.to_string(),
            format!(r#"{{"data":{{".dockerconfigjson":"{}"}}}}"#, data),
        );
        Ok(())
    }

    fn delete(&self, name: &str) -> pullsecret::Result<()> {
        self.mutations.borrow_mut().push(format!("delete {}", name));
        self.secrets.borrow_mut().remove(name);
        Ok(())
    }
}

const CONFIG: &str = r#"{
    "auths": {
        "ghcr.io": {"auth": "dGVzdDp0ZXN0MTIz"},
        "https://index.docker.io/v1/": {"username": "testuser", "password": "testpass"}
    }
}"#;

#[test]
fn test_ensure_from_docker_config() -> Result<()> {
    let tmp_dir = TempDir::new()?;
    let config_path = common::docker_config(tmp_dir.path(), CONFIG);
    let source = DockerConfigSource::with_paths(vec![config_path]);
    let registry = StaticDefaultRegistry::default();
    let store = MemoryStore::default();
    let reconciler = SecretReconciler::new(&store, &source, &registry);

    let first = reconciler.ensure_pull_secret("ghcr", "ghcr.io/user/image:tag")?;
    let second = reconciler.ensure_pull_secret("ghcr", "ghcr.io/user/image:tag")?;
    assert!(first.changed);
    assert!(!second.changed);

    assert_eq!(
        reconciler.read_secret_token("ghcr", "ghcr.io")?,
        "dGVzdDp0ZXN0MTIz"
    );

    Ok(())
}

#[test]
fn test_docker_hub_references_share_a_secret() -> Result<()> {
    let tmp_dir = TempDir::new()?;
    let config_path = common::docker_config(tmp_dir.path(), CONFIG);
    let source = DockerConfigSource::with_paths(vec![config_path]);
    let registry = StaticDefaultRegistry::default();
    let store = MemoryStore::default();
    let reconciler = SecretReconciler::new(&store, &source, &registry);

    assert_eq!(
        extract_registry_host("nginx", &registry)?,
        extract_registry_host("docker.io/library/nginx", &registry)?
    );

    assert!(reconciler.ensure_pull_secret("hub", "nginx")?.changed);
    assert!(!reconciler.ensure_pull_secret("hub", "docker.io/library/nginx")?.changed);
    assert_eq!(store.mutations.borrow().as_slice(), ["create hub"]);

    Ok(())
}

#[test]
fn test_unknown_registry_is_skipped() -> Result<()> {
    let tmp_dir = TempDir::new()?;
    let config_path = common::docker_config(tmp_dir.path(), CONFIG);
    let source = DockerConfigSource::with_paths(vec![config_path]);
    let registry = StaticDefaultRegistry::default();
    let store = MemoryStore::default();
    let reconciler = SecretReconciler::new(&store, &source, &registry);

    let result = reconciler.ensure_pull_secret("quay", "quay.io/org/app")?;
    assert!(!result.changed);
    assert!(store.mutations.borrow().is_empty());

    Ok(())
}

#[test]
fn test_docker_login_between_calls_replaces_secret() -> Result<()> {
    let tmp_dir = TempDir::new()?;
    let config_path = common::docker_config(tmp_dir.path(), CONFIG);
    let source = DockerConfigSource::with_paths(vec![config_path]);
    let registry = StaticDefaultRegistry::default();
    let store = MemoryStore::default();
    let reconciler = SecretReconciler::new(&store, &source, &registry);

    reconciler.ensure_pull_secret("ghcr", "ghcr.io/user/image")?;

    common::docker_config(
        tmp_dir.path(),
        r#"{"auths": {"ghcr.io": {"username": "test", "password": "new-token"}}}"#,
    );

    assert!(reconciler.ensure_pull_secret("ghcr", "ghcr.io/user/image")?.changed);
    assert_eq!(
        store.mutations.borrow().as_slice(),
        ["create ghcr", "delete ghcr", "create ghcr"]
    );

    Ok(())
}

#[test]
fn test_corrupt_docker_config_fails() -> Result<()> {
    let tmp_dir = TempDir::new()?;
    let config_path = common::docker_config(tmp_dir.path(), "{\"auths\": ");
    let source = DockerConfigSource::with_paths(vec![config_path]);
    let registry = StaticDefaultRegistry::default();
    let store = MemoryStore::default();
    let reconciler = SecretReconciler::new(&store, &source, &registry);

    let err = reconciler
        .ensure_pull_secret("ghcr", "ghcr.io/user/image")
        .unwrap_err();
    assert!(matches!(err, PullSecretError::CredentialLookupFailed { .. }));
    assert!(store.mutations.borrow().is_empty());

    Ok(())
}
