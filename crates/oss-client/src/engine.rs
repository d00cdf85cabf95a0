//! Invocation engine: descriptor store + auth + resolver + transport.

use crate::auth::AuthProvider;
use crate::descriptor::ApiDescriptor;
use crate::error::{ClientError, Result};
use crate::resolver::{self, LogicalCall, ResolvedRequest};
use crate::store::DescriptorStore;
use async_trait::async_trait;
use oss_core::{BridgeConfig, Initable};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// Executes logical calls against the configured API.
///
/// One transport attempt per invocation, no retry and no backoff:
/// invocations are triggered synchronously from user automation and
/// must resolve promptly either way.
pub struct InvocationEngine {
    config: BridgeConfig,
    store: Arc<DescriptorStore>,
    auth: AuthProvider,
    client: reqwest::Client,
}

impl InvocationEngine {
    /// Build an engine from a bridge configuration.
    ///
    /// One HTTP client, bounded by `request_timeout_secs`, is shared
    /// between descriptor fetches and API calls.
    pub fn from_config(config: BridgeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ClientError::ClientNotReady(format!("HTTP client setup failed: {e}")))?;

        let store = Arc::new(DescriptorStore::new(client.clone()));
        let auth = AuthProvider::from_config(&config);

        Ok(Self {
            config,
            store,
            auth,
            client,
        })
    }

    /// Execute one logical call.
    ///
    /// Lazily loads the descriptor on first use; a failing load surfaces
    /// as [`ClientError::ClientNotReady`]. On success returns the
    /// response payload, structured if decodable and raw text otherwise.
    #[instrument(skip(self, call), fields(path = %call.path))]
    pub async fn invoke(&self, call: &LogicalCall) -> Result<Value> {
        let descriptor = self.descriptor().await?;
        let request = resolver::resolve(&descriptor, &self.auth, call)?;
        self.execute(&request).await
    }

    /// Drop the cached descriptor and load it afresh.
    ///
    /// Used when the descriptor URL or auth settings change.
    pub async fn reload(&self) -> Result<Arc<ApiDescriptor>> {
        self.store.invalidate().await;
        self.store.load(&self.config.swagger_url).await
    }

    async fn descriptor(&self) -> Result<Arc<ApiDescriptor>> {
        self.store
            .load(&self.config.swagger_url)
            .await
            .map_err(|e| ClientError::ClientNotReady(e.to_string()))
    }

    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn execute(&self, request: &ResolvedRequest) -> Result<Value> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes()).map_err(|_| {
            ClientError::Invocation {
                status: None,
                message: format!("invalid HTTP method '{}'", request.method),
            }
        })?;

        let mut builder = self.client.request(method, &request.url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| ClientError::Invocation {
            status: None,
            message: e.to_string(),
        })?;

        let status = response.status();
        debug!("Response status: {}", status);

        let bytes = response.bytes().await.map_err(|e| ClientError::Invocation {
            status: Some(status.as_u16()),
            message: e.to_string(),
        })?;

        if status.is_success() {
            match serde_json::from_slice::<Value>(&bytes) {
                Ok(json) => Ok(json),
                Err(_) => Ok(Value::String(String::from_utf8_lossy(&bytes).into_owned())),
            }
        } else {
            let body = String::from_utf8_lossy(&bytes);
            error!(
                "API request failed: {} {} - status {}: {}",
                request.method, request.url, status, body
            );
            Err(ClientError::Invocation {
                status: Some(status.as_u16()),
                message: format!("status {}: {}", status.as_u16(), body),
            })
        }
    }
}

#[async_trait]
impl Initable for InvocationEngine {
    /// Eagerly load the descriptor so the first automation-triggered
    /// call does not pay the fetch.
    async fn init(&self) -> oss_core::Result<()> {
        self.descriptor().await.map_err(anyhow::Error::new)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn swagger_for(server: &mockito::Server) -> String {
        json!({
            "swagger": "2.0",
            "schemes": ["http"],
            "host": server.host_with_port(),
            "basePath": "/api",
            "definitions": {}
        })
        .to_string()
    }

    async fn engine_for(server: &mut mockito::Server) -> InvocationEngine {
        let payload = swagger_for(server);
        server
            .mock("GET", "/swagger.json")
            .with_body(payload)
            .create_async()
            .await;

        let config = BridgeConfig {
            swagger_url: format!("{}/swagger.json", server.url()),
            ..BridgeConfig::default()
        };
        InvocationEngine::from_config(config).unwrap()
    }

    #[tokio::test]
    async fn test_invoke_returns_structured_payload() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/devices")
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id": 1}]"#)
            .create_async()
            .await;

        let engine = engine_for(&mut server).await;
        let result = engine.invoke(&LogicalCall::new("devices")).await.unwrap();
        assert_eq!(result, json!([{"id": 1}]));
    }

    #[tokio::test]
    async fn test_invoke_returns_raw_text_when_not_json() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/ping")
            .with_body("pong")
            .create_async()
            .await;

        let engine = engine_for(&mut server).await;
        let result = engine.invoke(&LogicalCall::new("ping")).await.unwrap();
        assert_eq!(result, Value::String("pong".to_string()));
    }

    #[tokio::test]
    async fn test_invoke_posts_body_and_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/devices")
            .match_query(mockito::Matcher::UrlEncoded(
                "limit".to_string(),
                "5".to_string(),
            ))
            .match_body(mockito::Matcher::Json(json!({"a": 1})))
            .with_body("{}")
            .create_async()
            .await;

        let engine = engine_for(&mut server).await;
        engine
            .invoke(
                &LogicalCall::new("devices")
                    .method("post")
                    .query("limit", "5")
                    .body_text(r#"{"a":1}"#),
            )
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_failure_carries_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/devices")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let engine = engine_for(&mut server).await;
        let err = engine.invoke(&LogicalCall::new("devices")).await.unwrap_err();
        match err {
            ClientError::Invocation { status, message } => {
                assert_eq!(status, Some(500));
                assert!(message.contains("boom"));
            }
            other => panic!("expected Invocation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_lazy_load_is_client_not_ready() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/swagger.json")
            .with_status(404)
            .create_async()
            .await;

        let config = BridgeConfig {
            swagger_url: format!("{}/swagger.json", server.url()),
            ..BridgeConfig::default()
        };
        let engine = InvocationEngine::from_config(config).unwrap();

        let err = engine.invoke(&LogicalCall::new("devices")).await.unwrap_err();
        assert!(matches!(err, ClientError::ClientNotReady(_)));
    }

    #[tokio::test]
    async fn test_reload_refetches_descriptor() {
        let mut server = mockito::Server::new_async().await;
        let payload = swagger_for(&server);
        let mock = server
            .mock("GET", "/swagger.json")
            .with_body(payload)
            .expect(2)
            .create_async()
            .await;

        let config = BridgeConfig {
            swagger_url: format!("{}/swagger.json", server.url()),
            ..BridgeConfig::default()
        };
        let engine = InvocationEngine::from_config(config).unwrap();

        engine.init().await.unwrap();
        engine.reload().await.unwrap();

        mock.assert_async().await;
    }
}
