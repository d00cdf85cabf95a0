//! Recursive schema flattening.
//!
//! Walks every named schema in a descriptor depth-first and turns each
//! scalar leaf into a capability declaration. Reference edges can form
//! cycles (schema A → B → A), so the walker keeps the stack of schema
//! names active on the current path and refuses to re-enter one; the
//! same schema can still appear under unrelated paths.

use oss_client::{PrimitiveKind, SchemaNode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Nesting bound for pathological (non-cyclic but very deep) inputs;
/// descriptors are untrusted and must not be able to blow the stack.
const MAX_DEPTH: usize = 64;

/// Value kind a capability exposes to the automation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityKind {
    Number,
    Boolean,
    String,
}

impl From<PrimitiveKind> for CapabilityKind {
    fn from(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Number | PrimitiveKind::Integer => CapabilityKind::Number,
            PrimitiveKind::Boolean => CapabilityKind::Boolean,
            PrimitiveKind::String => CapabilityKind::String,
        }
    }
}

/// A generated capability declaration, serialized as one file per id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: CapabilityKind,
    pub title: CapabilityTitle,
}

/// Localized display title; only English is generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityTitle {
    pub en: String,
}

/// Output of one generation run.
#[derive(Debug, Default)]
pub struct GeneratedCapabilities {
    /// Capability declarations keyed by id
    pub capabilities: BTreeMap<String, CapabilityDescriptor>,
    /// Flattened-path (and bare property name) → capability id
    pub mapping: BTreeMap<String, String>,
}

#[derive(Error, Debug)]
enum WalkError {
    #[error("nesting depth limit exceeded at '{0}'")]
    DepthExceeded(String),
}

/// Flatten every named schema into capability declarations.
///
/// A failure inside one top-level schema is logged and skipped; the
/// output is best-effort scaffolding reviewed by a human, so one
/// malformed schema must not abort the rest of the run.
pub fn walk_schemas(schemas: &BTreeMap<String, SchemaNode>) -> GeneratedCapabilities {
    let mut walker = SchemaWalker {
        schemas,
        out: GeneratedCapabilities::default(),
    };

    for (name, node) in schemas {
        let SchemaNode::ObjectOf(properties) = node else {
            debug!("Skipping non-object top-level schema '{}'", name);
            continue;
        };
        let mut stack = vec![name.clone()];
        if let Err(e) = walker.walk_properties(properties, name, &mut stack) {
            warn!("Error processing schema '{}': {}", name, e);
        }
    }

    walker.out
}

struct SchemaWalker<'a> {
    schemas: &'a BTreeMap<String, SchemaNode>,
    out: GeneratedCapabilities,
}

impl SchemaWalker<'_> {
    fn walk_properties(
        &mut self,
        properties: &BTreeMap<String, SchemaNode>,
        prefix: &str,
        stack: &mut Vec<String>,
    ) -> Result<(), WalkError> {
        for (name, node) in properties {
            let path = format!("{prefix}.{name}");
            if path.matches('.').count() > MAX_DEPTH {
                return Err(WalkError::DepthExceeded(path));
            }

            match node {
                SchemaNode::Primitive(kind) => self.record_leaf(&path, name, *kind),
                // An array of scalars becomes one capability carrying
                // the element kind; anything else recurses into the
                // element schema under the same path.
                SchemaNode::ArrayOf(items) => match items.as_ref() {
                    SchemaNode::Primitive(kind) => self.record_leaf(&path, name, *kind),
                    other => self.walk_nested(other, &path, stack)?,
                },
                SchemaNode::ObjectOf(nested) => self.walk_properties(nested, &path, stack)?,
                SchemaNode::Reference(target) => self.walk_reference(target, &path, stack)?,
                SchemaNode::Opaque => debug!("Ignoring untyped property '{}'", path),
            }
        }
        Ok(())
    }

    fn walk_nested(
        &mut self,
        node: &SchemaNode,
        path: &str,
        stack: &mut Vec<String>,
    ) -> Result<(), WalkError> {
        match node {
            SchemaNode::ObjectOf(properties) => self.walk_properties(properties, path, stack),
            SchemaNode::Reference(target) => self.walk_reference(target, path, stack),
            _ => Ok(()),
        }
    }

    fn walk_reference(
        &mut self,
        target: &str,
        path: &str,
        stack: &mut Vec<String>,
    ) -> Result<(), WalkError> {
        if stack.iter().any(|name| name == target) {
            debug!(
                "Cycle detected: schema '{}' already active at '{}', not re-entering",
                target, path
            );
            return Ok(());
        }
        let Some(resolved) = self.schemas.get(target) else {
            warn!("Unresolved schema reference '{}' at '{}'", target, path);
            return Ok(());
        };

        stack.push(target.to_string());
        let result = self.walk_nested(resolved, path, stack);
        stack.pop();
        result
    }

    fn record_leaf(&mut self, path: &str, name: &str, kind: PrimitiveKind) {
        let id = capability_id(path);

        self.out
            .capabilities
            .entry(id.clone())
            .or_insert_with(|| CapabilityDescriptor {
                id: id.clone(),
                kind: kind.into(),
                title: CapabilityTitle {
                    en: path.to_string(),
                },
            });

        self.out.mapping.insert(path.to_string(), id.clone());
        // The bare property name maps to whichever leaf claimed it first.
        self.out
            .mapping
            .entry(name.to_string())
            .or_insert_with(|| id.clone());
    }
}

/// Derive the capability id for a flattened schema path.
///
/// Deterministic: lowercase, every run of non-alphanumerics collapsed
/// to a single `_`, leading and trailing separators trimmed.
pub fn capability_id(path: &str) -> String {
    format!("oss_{}", sanitize(path))
}

fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_sep = false;
    for c in input.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            out.push(c);
            pending_sep = false;
        } else {
            pending_sep = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use oss_client::ApiDescriptor;
    use serde_json::json;

    fn schemas_from(value: serde_json::Value) -> BTreeMap<String, SchemaNode> {
        let payload = json!({
            "swagger": "2.0",
            "host": "api.example.com",
            "definitions": value
        })
        .to_string();
        ApiDescriptor::parse(&payload, "test").unwrap().schemas
    }

    #[test]
    fn test_sanitize_collapses_and_trims() {
        assert_eq!(sanitize("Device.name"), "device_name");
        assert_eq!(sanitize("A..B--C"), "a_b_c");
        assert_eq!(sanitize("..leading.trailing.."), "leading_trailing");
        assert_eq!(capability_id("Device.readings.temp"), "oss_device_readings_temp");
    }

    #[test]
    fn test_nested_leaves_and_bare_name_mapping() {
        let schemas = schemas_from(json!({
            "Device": {
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "readings": {
                        "type": "object",
                        "properties": {
                            "temp": {"type": "number"}
                        }
                    }
                }
            }
        }));

        let generated = walk_schemas(&schemas);

        let name_id = &generated.mapping["Device.name"];
        let temp_id = &generated.mapping["Device.readings.temp"];
        assert_eq!(generated.capabilities[name_id].kind, CapabilityKind::String);
        assert_eq!(generated.capabilities[temp_id].kind, CapabilityKind::Number);

        // Bare names map to the same ids as the full paths.
        assert_eq!(&generated.mapping["name"], name_id);
        assert_eq!(&generated.mapping["temp"], temp_id);
    }

    #[test]
    fn test_integer_maps_to_number_kind() {
        let schemas = schemas_from(json!({
            "Meter": {
                "type": "object",
                "properties": {"count": {"type": "integer"}}
            }
        }));

        let generated = walk_schemas(&schemas);
        let id = &generated.mapping["Meter.count"];
        assert_eq!(generated.capabilities[id].kind, CapabilityKind::Number);
    }

    #[test]
    fn test_scalar_array_is_one_leaf_and_object_array_recurses() {
        let schemas = schemas_from(json!({
            "Log": {
                "type": "object",
                "properties": {
                    "tags": {"type": "array", "items": {"type": "string"}},
                    "entries": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {"level": {"type": "string"}}
                        }
                    }
                }
            }
        }));

        let generated = walk_schemas(&schemas);
        assert!(generated.mapping.contains_key("Log.tags"));
        assert!(generated.mapping.contains_key("Log.entries.level"));
        assert!(!generated.mapping.contains_key("Log.entries"));
    }

    #[test]
    fn test_reference_resolution_extends_path() {
        let schemas = schemas_from(json!({
            "Device": {
                "type": "object",
                "properties": {
                    "location": {"$ref": "#/definitions/Location"}
                }
            },
            "Location": {
                "type": "object",
                "properties": {"lat": {"type": "number"}}
            }
        }));

        let generated = walk_schemas(&schemas);
        assert!(generated.mapping.contains_key("Device.location.lat"));
        // Location is also walked as its own top-level schema.
        assert!(generated.mapping.contains_key("Location.lat"));
    }

    #[test]
    fn test_cyclic_references_terminate() {
        let schemas = schemas_from(json!({
            "A": {
                "type": "object",
                "properties": {
                    "id": {"type": "string"},
                    "child": {"$ref": "#/definitions/B"}
                }
            },
            "B": {
                "type": "object",
                "properties": {
                    "label": {"type": "string"},
                    "parent": {"$ref": "#/definitions/A"}
                }
            }
        }));

        let generated = walk_schemas(&schemas);

        // Each side reaches one level into the other before the cycle
        // is refused.
        assert!(generated.mapping.contains_key("A.id"));
        assert!(generated.mapping.contains_key("A.child.label"));
        assert!(!generated.mapping.contains_key("A.child.parent.id"));
        assert!(generated.mapping.contains_key("B.label"));
        assert!(generated.mapping.contains_key("B.parent.id"));
    }

    #[test]
    fn test_bare_name_first_writer_wins() {
        let schemas = schemas_from(json!({
            "Alpha": {
                "type": "object",
                "properties": {"value": {"type": "string"}}
            },
            "Beta": {
                "type": "object",
                "properties": {"value": {"type": "number"}}
            }
        }));

        let generated = walk_schemas(&schemas);
        // Schemas walk in name order; Alpha claims the bare name.
        assert_eq!(generated.mapping["value"], capability_id("Alpha.value"));
        assert_eq!(generated.mapping["Beta.value"], capability_id("Beta.value"));
    }

    #[test]
    fn test_unresolved_reference_is_skipped() {
        let schemas = schemas_from(json!({
            "Device": {
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "ghost": {"$ref": "#/definitions/Missing"}
                }
            }
        }));

        let generated = walk_schemas(&schemas);
        assert!(generated.mapping.contains_key("Device.name"));
        assert_eq!(generated.capabilities.len(), 1);
    }

    #[test]
    fn test_runs_are_deterministic() {
        let schemas = schemas_from(json!({
            "Device": {
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "online": {"type": "boolean"}
                }
            }
        }));

        let first = walk_schemas(&schemas);
        let second = walk_schemas(&schemas);
        assert_eq!(first.capabilities, second.capabilities);
        assert_eq!(first.mapping, second.mapping);
    }
}
