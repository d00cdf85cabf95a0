//! Bridge configuration
//!
//! Configuration is read once at startup from the host's settings store
//! and passed by reference into the runtime components. There is no
//! process-wide config singleton; a settings change means the caller
//! rebuilds the affected components from a fresh `BridgeConfig`.

use crate::traits::SettingsSource;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Public descriptor endpoint used when no `swaggerUrl` setting is present.
pub const DEFAULT_SWAGGER_URL: &str = "https://publicapi.oss.no/swagger/v1.0/swagger.json";

/// Bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// URL of the API descriptor (Swagger/OpenAPI document)
    #[serde(default = "default_swagger_url")]
    pub swagger_url: String,

    /// Authentication mode for outgoing requests
    #[serde(default)]
    pub auth_type: AuthType,

    /// API key, used when `auth_type` is `apiKey`
    pub api_key: Option<String>,

    /// Bearer token, used when `auth_type` is `bearer`
    pub bearer_token: Option<String>,

    /// Upper bound on descriptor fetches and per-call transport waits
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Authentication mode, selected by configuration rather than inferred
/// from the descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthType {
    #[default]
    None,
    ApiKey,
    Bearer,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            swagger_url: default_swagger_url(),
            auth_type: AuthType::None,
            api_key: None,
            bearer_token: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl BridgeConfig {
    /// Build a configuration from the host's persisted settings.
    ///
    /// Missing keys fall back to defaults. An unrecognized `authType`
    /// value is logged and treated as `none` rather than failing app
    /// startup.
    pub async fn from_settings(settings: &dyn SettingsSource) -> Self {
        let swagger_url = settings
            .get("swaggerUrl")
            .await
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_swagger_url);

        let auth_type = match settings.get("authType").await.as_deref() {
            None | Some("") | Some("none") => AuthType::None,
            Some("apiKey") => AuthType::ApiKey,
            Some("bearer") => AuthType::Bearer,
            Some(other) => {
                warn!("Unknown authType setting '{}', falling back to none", other);
                AuthType::None
            }
        };

        Self {
            swagger_url,
            auth_type,
            api_key: settings.get("apiKey").await,
            bearer_token: settings.get("bearerToken").await,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_swagger_url() -> String {
    DEFAULT_SWAGGER_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MemorySettings;

    #[tokio::test]
    async fn test_defaults_when_settings_empty() {
        let settings = MemorySettings::new();
        let config = BridgeConfig::from_settings(&settings).await;

        assert_eq!(config.swagger_url, DEFAULT_SWAGGER_URL);
        assert_eq!(config.auth_type, AuthType::None);
        assert!(config.api_key.is_none());
        assert!(config.bearer_token.is_none());
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[tokio::test]
    async fn test_settings_override_defaults() {
        let settings = MemorySettings::new()
            .with("swaggerUrl", "https://example.com/spec.json")
            .with("authType", "apiKey")
            .with("apiKey", "k1");
        let config = BridgeConfig::from_settings(&settings).await;

        assert_eq!(config.swagger_url, "https://example.com/spec.json");
        assert_eq!(config.auth_type, AuthType::ApiKey);
        assert_eq!(config.api_key.as_deref(), Some("k1"));
    }

    #[tokio::test]
    async fn test_unknown_auth_type_falls_back_to_none() {
        let settings = MemorySettings::new().with("authType", "oauth2");
        let config = BridgeConfig::from_settings(&settings).await;
        assert_eq!(config.auth_type, AuthType::None);
    }
}
