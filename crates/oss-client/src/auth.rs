//! Authentication support for outgoing API requests.
//!
//! Exactly one mode is active at a time, selected by configuration and
//! never inferred from the descriptor. A selected mode whose credential
//! is absent or empty degrades to sending the request unauthenticated;
//! callers must not rely on auth actually being applied.

use oss_core::{AuthType, BridgeConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Header name used for API-key authentication.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Authentication configuration for API requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// No authentication
    None,

    /// API key sent in the `x-api-key` header
    ApiKey { key: Option<String> },

    /// Bearer token authentication (`Authorization: Bearer <token>`)
    Bearer { token: Option<String> },
}

impl AuthConfig {
    /// Create API key authentication.
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::ApiKey {
            key: Some(key.into()),
        }
    }

    /// Create bearer token authentication.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: Some(token.into()),
        }
    }
}

/// Applies the configured credential to outgoing request headers.
#[derive(Debug, Clone)]
pub struct AuthProvider {
    config: AuthConfig,
}

impl AuthProvider {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Select the auth mode and credential from the bridge configuration.
    pub fn from_config(config: &BridgeConfig) -> Self {
        let auth = match config.auth_type {
            AuthType::None => AuthConfig::None,
            AuthType::ApiKey => AuthConfig::ApiKey {
                key: config.api_key.clone(),
            },
            AuthType::Bearer => AuthConfig::Bearer {
                token: config.bearer_token.clone(),
            },
        };
        Self::new(auth)
    }

    /// Add the configured credential to `headers`.
    ///
    /// A missing or empty credential is a no-op, not an error; the
    /// request simply goes out unauthenticated.
    pub fn apply(&self, headers: &mut BTreeMap<String, String>) {
        match &self.config {
            AuthConfig::None => {}
            AuthConfig::ApiKey { key } => {
                if let Some(key) = key.as_deref().filter(|k| !k.is_empty()) {
                    headers.insert(API_KEY_HEADER.to_string(), key.to_string());
                }
            }
            AuthConfig::Bearer { token } => {
                if let Some(token) = token.as_deref().filter(|t| !t.is_empty()) {
                    headers.insert("Authorization".to_string(), format!("Bearer {token}"));
                }
            }
        }
    }
}
