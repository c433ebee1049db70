//! Error types for pull secret reconciliation

use thiserror::Error;

/// Errors produced while reconciling a pull secret.
///
/// `HostNotFound` and `MalformedSecret` describe an existing secret that can't
/// be compared against fresh credentials. The reconciler treats both as a
/// stale secret and never returns them from `ensure_pull_secret`.
#[derive(Debug, Error)]
pub enum PullSecretError {
    /// The image reference has no usable repository segment.
    #[error("invalid image reference {reference:?}: {reason}")]
    InvalidReference {
        reference: String,
        reason: &'static str,
    },

    /// Local credential configuration could not be read or mapped.
    #[error("failed to look up credentials for {server}: {message}")]
    CredentialLookupFailed { server: String, message: String },

    /// The stored pull secret has no entry for the registry host.
    #[error("registry {0} not found in pull secret")]
    HostNotFound(String),

    /// The stored pull secret could not be parsed.
    #[error("malformed pull secret: {0}")]
    MalformedSecret(String),

    /// A pull secret payload could not be serialized.
    #[error("failed to encode pull secret payload: {0}")]
    PayloadEncoding(#[from] serde_json::Error),

    /// An external command (kubectl, docker) failed.
    #[error("{command} failed: {output}")]
    CommandExecutionFailed { command: String, output: String },

    /// No naming scheme matches the registry server.
    #[error("unsupported registry: {0}")]
    UnsupportedRegistry(String),
}

impl PullSecretError {
    pub(crate) fn invalid_reference(reference: &str, reason: &'static str) -> Self {
        Self::InvalidReference {
            reference: reference.to_string(),
            reason,
        }
    }

    pub(crate) fn lookup_failed(server: &str, message: impl ToString) -> Self {
        Self::CredentialLookupFailed {
            server: server.to_string(),
            message: message.to_string(),
        }
    }

    /// Returns true for errors the reconciler folds into a staleness decision.
    pub fn is_stale_secret(&self) -> bool {
        matches!(self, Self::HostNotFound(_) | Self::MalformedSecret(_))
    }
}

pub type Result<T, E = PullSecretError> = std::result::Result<T, E>;
