//! # OSS Client
//!
//! Runtime API client driven by a remote Swagger/OpenAPI descriptor.
//!
//! The descriptor is fetched lazily and cached by [`DescriptorStore`];
//! [`resolver::resolve`] turns a [`LogicalCall`] into a concrete
//! request using the descriptor's base URL plus the configured
//! [`AuthProvider`]; [`InvocationEngine`] ties the pieces to the HTTP
//! transport. [`InvokeApiAction`] exposes the engine to the host's
//! flow-automation registry.
//!
//! ## Example
//!
//! ```no_run
//! use oss_client::{InvocationEngine, LogicalCall};
//! use oss_core::BridgeConfig;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let engine = InvocationEngine::from_config(BridgeConfig::default())?;
//! let result = engine.invoke(&LogicalCall::new("devices")).await?;
//! println!("{result}");
//! # Ok(())
//! # }
//! ```

mod action;
mod auth;
mod descriptor;
mod engine;
mod error;
pub mod resolver;
mod store;

pub use action::InvokeApiAction;
pub use auth::{AuthConfig, AuthProvider, API_KEY_HEADER};
pub use descriptor::{ApiDescriptor, PrimitiveKind, SchemaNode};
pub use engine::InvocationEngine;
pub use error::{ClientError, Result};
pub use resolver::{CallBody, LogicalCall, ResolvedRequest};
pub use store::DescriptorStore;
