//! Host-boundary traits.
//!
//! The surrounding plugin host (app lifecycle, settings storage, flow
//! registry) implements these; the core never subclasses host types
//! and only calls through these interfaces.

use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// Key-value read access to the host's persisted settings.
#[async_trait]
pub trait SettingsSource: Send + Sync {
    /// Returns the stored value for `key`, or `None` when unset.
    async fn get(&self, key: &str) -> Option<String>;
}

/// Explicit init/teardown lifecycle, driven by the host layer.
#[async_trait]
pub trait Initable: Send + Sync {
    async fn init(&self) -> Result<()>;

    async fn teardown(&self) -> Result<()> {
        Ok(())
    }
}

/// A flow-automation action exposed to the host's automation registry.
#[async_trait]
pub trait FlowAction: Send + Sync {
    /// Returns the action identifier used by the flow registry.
    fn name(&self) -> &str;

    /// Runs the action with the arguments supplied by the automation
    /// layer. On failure the error's message is surfaced to the user.
    async fn run(&self, args: Value) -> Result<Value>;
}

/// In-memory settings, for tests and host-less tooling.
#[derive(Debug, Default, Clone)]
pub struct MemorySettings {
    values: HashMap<String, String>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

#[async_trait]
impl SettingsSource for MemorySettings {
    async fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
