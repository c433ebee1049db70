//! Registry naming conventions for end-to-end tests
//!
//! Each supported registry backend stores its test images under a different
//! prefix. [`RegistryIdentity`] picks the backend from the server address and
//! builds the public and private test image names for it.

use crate::constants::image::{GITHUB_TEST_REPOSITORY, PRIVATE_TEST_IMAGE, PUBLIC_TEST_IMAGE};
use crate::error::{PullSecretError, Result};
use anyhow::Context;
use std::io::Write;
use std::process::{Command, Stdio};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryBackend {
    /// Amazon ECR
    Aws,
    /// GitHub Container Registry
    GitHub,
    DockerHub,
}

impl RegistryBackend {
    /// Pick the backend serving `server`
    pub fn for_server(server: &str) -> Result<Self> {
        if server.contains("amazonaws.com") {
            Ok(Self::Aws)
        } else if server.contains("ghcr.io") {
            Ok(Self::GitHub)
        } else if server.is_empty() || server == "docker.io" {
            Ok(Self::DockerHub)
        } else {
            Err(PullSecretError::UnsupportedRegistry(server.to_string()))
        }
    }
}

/// Account on a registry used by the end-to-end tests
#[derive(Debug, Clone)]
pub struct RegistryIdentity {
    pub backend: RegistryBackend,
    pub username: String,
    pub password: String,
    pub server: String,
}

impl RegistryIdentity {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        server: impl Into<String>,
    ) -> Result<Self> {
        let server = server.into();
        Ok(Self {
            backend: RegistryBackend::for_server(&server)?,
            username: username.into(),
            password: password.into(),
            server,
        })
    }

    /// Read `DOCKER_USERNAME`, `DOCKER_PASSWORD` and `CONTAINER_REGISTRY`
    pub fn from_env() -> anyhow::Result<Self> {
        let username = std::env::var("DOCKER_USERNAME").unwrap_or_default();
        let password = std::env::var("DOCKER_PASSWORD").unwrap_or_default();
        let server = std::env::var("CONTAINER_REGISTRY").unwrap_or_default();

        if username.is_empty() || password.is_empty() {
            anyhow::bail!("DOCKER_USERNAME and/or DOCKER_PASSWORD are not set");
        }

        Ok(Self::new(username, password, server)?)
    }

    pub fn public_image_name(&self) -> String {
        self.image_name(PUBLIC_TEST_IMAGE)
    }

    pub fn private_image_name(&self) -> String {
        self.image_name(PRIVATE_TEST_IMAGE)
    }

    fn image_name(&self, basename: &str) -> String {
        match self.backend {
            RegistryBackend::Aws => join(&self.server, basename),
            RegistryBackend::GitHub => join(GITHUB_TEST_REPOSITORY, basename),
            RegistryBackend::DockerHub => join(&self.username, basename),
        }
    }

    /// `docker login` with the password passed on stdin
    pub fn login(&self) -> anyhow::Result<()> {
        let mut cmd = Command::new("docker");
        cmd.arg("login");
        if !self.server.is_empty() {
            cmd.arg(&self.server);
        }
        let mut child = cmd
            .args(["--username", self.username.as_str(), "--password-stdin"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn docker login")?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(self.password.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            anyhow::bail!(
                "failed to login to Docker: {}{}",
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        Ok(())
    }

    pub fn logout(&self) -> anyhow::Result<()> {
        let mut cmd = Command::new("docker");
        cmd.arg("logout");
        if !self.server.is_empty() {
            cmd.arg(&self.server);
        }
        let output = cmd.output().context("Failed to run docker logout")?;
        if !output.status.success() {
            anyhow::bail!(
                "failed to logout of Docker: {}",
                String::from_utf8_lossy(&output.stderr)
            );
        }
        Ok(())
    }
}

/// Join path segments without doubling separators
fn join(prefix: &str, basename: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        basename.to_string()
    } else {
        format!("{}/{}", prefix, basename)
    }
}
