//! # OSS Core
//!
//! Shared types for the OSS bridge: configuration, the host-boundary
//! traits (`SettingsSource`, `Initable`, `FlowAction`), and the
//! workspace-level error type.

mod config;
mod error;
mod traits;

pub use config::{AuthType, BridgeConfig, DEFAULT_SWAGGER_URL};
pub use error::{Error, Result};
pub use traits::{FlowAction, Initable, MemorySettings, SettingsSource};
