//! The `invoke_api` flow action.
//!
//! Adapts the invocation engine to the host's automation registry: one
//! generic action that lets user-authored flows call any endpoint of
//! the configured API.

use crate::resolver::{CallBody, LogicalCall};
use crate::InvocationEngine;
use async_trait::async_trait;
use oss_core::FlowAction;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

const RESULT_PREVIEW_CHARS: usize = 400;

/// Arguments supplied by the automation layer.
#[derive(Debug, Deserialize)]
struct InvokeArgs {
    method: Option<String>,
    path: String,
    /// JSON-encoded request body
    body: Option<String>,
    #[serde(default)]
    query: BTreeMap<String, String>,
}

/// Generic "invoke arbitrary endpoint" automation action.
pub struct InvokeApiAction {
    engine: Arc<InvocationEngine>,
}

impl InvokeApiAction {
    pub fn new(engine: Arc<InvocationEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl FlowAction for InvokeApiAction {
    fn name(&self) -> &str {
        "invoke_api"
    }

    async fn run(&self, args: Value) -> oss_core::Result<Value> {
        let args: InvokeArgs = serde_json::from_value(args)?;

        let call = LogicalCall {
            method: args.method,
            path: args.path,
            query: args.query,
            body: args.body.map(CallBody::Text),
        };

        let result = self
            .engine
            .invoke(&call)
            .await
            .map_err(|e| oss_core::Error::ActionFailed {
                action: self.name().to_string(),
                source: anyhow::Error::new(e),
            })?;

        let preview: String = result.to_string().chars().take(RESULT_PREVIEW_CHARS).collect();
        debug!("invoke_api result: {}", preview);

        Ok(result)
    }
}
