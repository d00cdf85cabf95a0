//! # OSS Capability Generator
//!
//! Offline tool that flattens an API descriptor's named schemas into
//! device-capability declarations for the plugin packaging. Shares the
//! descriptor data model with the runtime client but fetches its own
//! copy of the descriptor; it never touches the runtime cache.
//!
//! The output is best-effort scaffolding reviewed by a human: one
//! malformed schema is logged and skipped rather than aborting the
//! run, and existing capability files are never overwritten.

mod emit;
mod error;
mod walker;

pub use emit::{write_artifacts, EmitSummary};
pub use error::{GenError, Result};
pub use walker::{
    capability_id, walk_schemas, CapabilityDescriptor, CapabilityKind, CapabilityTitle,
    GeneratedCapabilities,
};
