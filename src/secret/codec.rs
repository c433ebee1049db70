//! Encoding and decoding of `kubernetes.io/dockerconfigjson` secrets

use crate::constants::secret::DOCKER_CONFIG_JSON_KEY;
use crate::error::{PullSecretError, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The docker config json document stored in a pull secret
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullSecretPayload {
    #[serde(default)]
    pub auths: BTreeMap<String, PullSecretAuth>,
}

/// Per-registry entry of a [`PullSecretPayload`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullSecretAuth {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
    #[serde(default)]
    pub email: String,
}

/// Subset of a Kubernetes Secret object as printed by `kubectl get -o json`
#[derive(Debug, Deserialize)]
struct SecretDocument {
    #[serde(default)]
    data: BTreeMap<String, String>,
}

/// Build the docker config json document for a single registry
pub fn payload(server_url: &str, auth_token: &str, email: &str) -> Result<String> {
    let mut auths = BTreeMap::new();
    auths.insert(
        server_url.to_string(),
        PullSecretAuth {
            auth: Some(auth_token.to_string()),
            email: email.to_string(),
        },
    );

    Ok(serde_json::to_string(&PullSecretPayload { auths })?)
}

/// Build the `--from-literal` value for `kubectl create secret generic`
pub fn encode(server_url: &str, auth_token: &str, email: &str) -> Result<String> {
    Ok(format!(
        "{}={}",
        DOCKER_CONFIG_JSON_KEY,
        payload(server_url, auth_token, email)?
    ))
}

/// Value half of a literal produced by [`encode`]
pub fn literal_value(literal: &str) -> Option<&str> {
    literal
        .strip_prefix(DOCKER_CONFIG_JSON_KEY)
        .and_then(|rest| rest.strip_prefix('='))
}

/// Read the auth token for `host` out of a stored secret document
pub fn decode(raw_secret: &str, host: &str) -> Result<String> {
    let secret: SecretDocument = serde_json::from_str(raw_secret)
        .map_err(|e| PullSecretError::MalformedSecret(format!("secret is not JSON: {}", e)))?;

    let encoded = secret.data.get(DOCKER_CONFIG_JSON_KEY).ok_or_else(|| {
        PullSecretError::MalformedSecret(format!("secret has no {} key", DOCKER_CONFIG_JSON_KEY))
    })?;

    let document = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| PullSecretError::MalformedSecret(format!("invalid base64: {}", e)))?;

    decode_payload(&document, host)
}

/// Read the auth token for `host` out of a raw docker config json document
pub fn decode_payload(document: &[u8], host: &str) -> Result<String> {
    let payload: PullSecretPayload = serde_json::from_slice(document)
        .map_err(|e| PullSecretError::MalformedSecret(format!("invalid docker config: {}", e)))?;

    let entry = payload
        .auths
        .get(host)
        .ok_or_else(|| PullSecretError::HostNotFound(host.to_string()))?;

    entry
        .auth
        .clone()
        .ok_or_else(|| PullSecretError::MalformedSecret(format!("no auth for {}", host)))
}
