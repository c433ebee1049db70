//! Secret store backed by the `kubectl` binary

use crate::error::{PullSecretError, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

/// Trait for the cluster-side store of pull secrets
pub trait SecretStore {
    /// Whether a secret with this name exists
    fn exists(&self, name: &str) -> bool;

    /// Raw secret document, or `None` if there is no such secret
    fn get(&self, name: &str) -> Result<Option<String>>;

    /// Create a secret of the given type from a `key=value` literal
    fn create(&self, name: &str, secret_type: &str, literal: &str) -> Result<()>;

    fn delete(&self, name: &str) -> Result<()>;
}

/// Runs `kubectl` for every store operation
#[derive(Debug, Clone)]
pub struct KubectlSecretStore {
    kubectl: PathBuf,
    namespace: Option<String>,
    context: Option<String>,
    kubeconfig: Option<PathBuf>,
}

impl KubectlSecretStore {
    pub fn new(kubectl: impl AsRef<Path>) -> Self {
        Self {
            kubectl: kubectl.as_ref().to_path_buf(),
            namespace: None,
            context: None,
            kubeconfig: None,
        }
    }

    /// Use the `kubectl` found on PATH
    pub fn from_path() -> anyhow::Result<Self> {
        let kubectl = which::which("kubectl")
            .map_err(|e| anyhow::anyhow!("kubectl not found on PATH: {}", e))?;
        Ok(Self::new(kubectl))
    }

    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }

    pub fn with_kubeconfig(mut self, kubeconfig: Option<PathBuf>) -> Self {
        self.kubeconfig = kubeconfig;
        self
    }

    fn build_cmd(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.kubectl);
        cmd.args(args);

        if let Some(namespace) = &self.namespace {
            cmd.arg("--namespace").arg(namespace);
        }
        if let Some(context) = &self.context {
            cmd.arg("--context").arg(context);
        }
        if let Some(kubeconfig) = &self.kubeconfig {
            cmd.arg("--kubeconfig").arg(kubeconfig);
        }

        cmd
    }

    /// Run kubectl, turning spawn errors and non-zero exits into
    /// `CommandExecutionFailed` with the combined output attached.
    fn run(&self, action: &str, args: &[&str]) -> Result<Output> {
        let mut cmd = self.build_cmd(args);
        debug!("Running command: {:?}", cmd);

        let output = cmd
            .output()
            .map_err(|e| PullSecretError::CommandExecutionFailed {
                command: action.to_string(),
                output: e.to_string(),
            })?;

        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PullSecretError::CommandExecutionFailed {
                command: action.to_string(),
                output: format!("{}{}", stdout, stderr).trim().to_string(),
            });
        }

        Ok(output)
    }
}

impl SecretStore for KubectlSecretStore {
    fn exists(&self, name: &str) -> bool {
        match self.run(
            "get pull secret",
            &["get", "secret", name, "--ignore-not-found", "-o", "name"],
        ) {
            Ok(output) => !String::from_utf8_lossy(&output.stdout).trim().is_empty(),
            Err(e) => {
                debug!("Treating secret {} as absent: {}", name, e);
                false
            }
        }
    }

    fn get(&self, name: &str) -> Result<Option<String>> {
        let output = self.run(
            "read pull secret",
            &["get", "secret", name, "--ignore-not-found", "-o", "json"],
        )?;

        let document = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if document.is_empty() {
            Ok(None)
        } else {
            Ok(Some(document))
        }
    }

    fn create(&self, name: &str, secret_type: &str, literal: &str) -> Result<()> {
        self.run(
            "create pull secret",
            &[
                "create",
                "secret",
                "generic",
                name,
                "--type",
                secret_type,
                "--from-literal",
                literal,
            ],
        )?;
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        self.run("delete pull secret", &["delete", "secret", name])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_build_cmd_scoping_flags() {
        let store = KubectlSecretStore::new("kubectl")
            .with_namespace(Some("dev".to_string()))
            .with_context(Some("kind-dev".to_string()))
            .with_kubeconfig(Some(PathBuf::from("/tmp/kubeconfig")));

        let cmd = store.build_cmd(&["delete", "secret", "regcred"]);
        assert_eq!(
            args(&cmd),
            vec![
                "delete",
                "secret",
                "regcred",
                "--namespace",
                "dev",
                "--context",
                "kind-dev",
                "--kubeconfig",
                "/tmp/kubeconfig"
            ]
        );
    }

    #[test]
    fn test_build_cmd_without_scope() {
        let store = KubectlSecretStore::new("kubectl");
        let cmd = store.build_cmd(&["get", "secret", "regcred"]);
        assert_eq!(args(&cmd), vec!["get", "secret", "regcred"]);
    }

    #[test]
    fn test_missing_binary() {
        let store = KubectlSecretStore::new("/nonexistent/kubectl");
        assert!(!store.exists("regcred"));

        let err = store.delete("regcred").unwrap_err();
        assert!(matches!(err, PullSecretError::CommandExecutionFailed { .. }));
    }
}
