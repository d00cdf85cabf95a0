//! Typed API descriptor model and parsing.
//!
//! The descriptor is parsed once into a tagged-variant model; all later
//! branching on "what kind of thing is this schema node" is a pattern
//! match rather than runtime shape-probing of raw JSON.

use crate::error::{ClientError, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};
use url::Url;

/// A parsed API descriptor: where the API lives and what shapes it speaks.
///
/// Immutable once loaded. Reloading replaces the whole value; nothing
/// mutates a descriptor in place.
#[derive(Debug, Clone)]
pub struct ApiDescriptor {
    /// URL scheme of the API host (e.g. "https")
    pub scheme: String,
    /// Host (and optional port) of the API
    pub host: String,
    /// Base path prefixed to every relative call path
    pub base_path: String,
    /// URL the descriptor itself was fetched from
    pub source_url: String,
    /// Named schema definitions
    pub schemas: BTreeMap<String, SchemaNode>,
}

/// A node in the descriptor's schema graph.
///
/// `Reference` edges point back into [`ApiDescriptor::schemas`] by name
/// and may form cycles; consumers that follow them must track the
/// active recursion stack.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// Scalar leaf
    Primitive(PrimitiveKind),
    /// Homogeneous array of an element schema
    ArrayOf(Box<SchemaNode>),
    /// Object with named properties
    ObjectOf(BTreeMap<String, SchemaNode>),
    /// Named reference to another schema definition
    Reference(String),
    /// Untyped or unrecognized node; a dead end for traversal
    Opaque,
}

/// Scalar kinds a schema property can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    String,
    Number,
    Integer,
    Boolean,
}

impl ApiDescriptor {
    /// Parse a descriptor payload fetched from `source_url`.
    ///
    /// The payload is tried as JSON first, then YAML. Both Swagger 2.0
    /// (`schemes`/`host`/`basePath`/`definitions`) and OpenAPI 3
    /// (`servers`/`components.schemas`) documents are accepted; anything
    /// else fails with [`ClientError::DescriptorParse`].
    pub fn parse(payload: &str, source_url: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(payload)
            .or_else(|_| serde_yaml::from_str(payload))
            .map_err(|e: serde_yaml::Error| {
                ClientError::DescriptorParse(format!("not valid JSON or YAML: {e}"))
            })?;

        let root = value.as_object().ok_or_else(|| {
            ClientError::DescriptorParse("descriptor root is not an object".to_string())
        })?;

        let descriptor = if root.contains_key("swagger") {
            Self::from_swagger2(&value, source_url)
        } else if root.contains_key("openapi") {
            Self::from_openapi3(&value, source_url)?
        } else {
            return Err(ClientError::DescriptorParse(
                "missing 'swagger' or 'openapi' version marker".to_string(),
            ));
        };

        debug!(
            "Parsed descriptor from {}: {} schemas, base {}://{}{}",
            source_url,
            descriptor.schemas.len(),
            descriptor.scheme,
            descriptor.host,
            descriptor.base_path
        );
        Ok(descriptor)
    }

    fn from_swagger2(value: &Value, source_url: &str) -> Self {
        let scheme = value["schemes"]
            .as_array()
            .and_then(|s| s.first())
            .and_then(Value::as_str)
            .unwrap_or("https")
            .to_string();
        let host = value["host"].as_str().unwrap_or_default().to_string();
        let base_path = value["basePath"].as_str().unwrap_or_default().to_string();

        Self {
            scheme,
            host,
            base_path,
            source_url: source_url.to_string(),
            schemas: parse_schemas(value.get("definitions")),
        }
    }

    fn from_openapi3(value: &Value, source_url: &str) -> Result<Self> {
        // Derive the base URL from the first server entry, if any.
        let (scheme, host, base_path) = match value["servers"]
            .as_array()
            .and_then(|s| s.first())
            .and_then(|s| s["url"].as_str())
        {
            Some(server_url) => {
                let parsed = Url::parse(server_url).map_err(|e| {
                    ClientError::DescriptorParse(format!("invalid server URL '{server_url}': {e}"))
                })?;
                let host = match parsed.port() {
                    Some(port) => format!("{}:{}", parsed.host_str().unwrap_or_default(), port),
                    None => parsed.host_str().unwrap_or_default().to_string(),
                };
                let base_path = parsed.path().trim_end_matches('/').to_string();
                (parsed.scheme().to_string(), host, base_path)
            }
            None => ("https".to_string(), String::new(), String::new()),
        };

        Ok(Self {
            scheme,
            host,
            base_path,
            source_url: source_url.to_string(),
            schemas: parse_schemas(value.pointer("/components/schemas")),
        })
    }
}

fn parse_schemas(value: Option<&Value>) -> BTreeMap<String, SchemaNode> {
    let Some(map) = value.and_then(Value::as_object) else {
        return BTreeMap::new();
    };

    map.iter()
        .map(|(name, schema)| (name.clone(), SchemaNode::from_value(schema)))
        .collect()
}

impl SchemaNode {
    /// Convert a raw schema value into the typed node model.
    ///
    /// Unrecognized shapes become [`SchemaNode::Opaque`] rather than
    /// failing the whole descriptor; one odd schema must not take down
    /// the rest.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return SchemaNode::Opaque;
        };

        if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
            let target = reference
                .trim_start_matches("#/definitions/")
                .trim_start_matches("#/components/schemas/");
            return SchemaNode::Reference(target.to_string());
        }

        match obj.get("type").and_then(Value::as_str) {
            Some("string") => SchemaNode::Primitive(PrimitiveKind::String),
            Some("number") => SchemaNode::Primitive(PrimitiveKind::Number),
            Some("integer") => SchemaNode::Primitive(PrimitiveKind::Integer),
            Some("boolean") => SchemaNode::Primitive(PrimitiveKind::Boolean),
            Some("array") => match obj.get("items") {
                Some(items) => SchemaNode::ArrayOf(Box::new(SchemaNode::from_value(items))),
                None => SchemaNode::Opaque,
            },
            // Nodes carrying properties directly count as objects even
            // without an explicit type.
            Some("object") | None if obj.contains_key("properties") => {
                let properties = obj
                    .get("properties")
                    .and_then(Value::as_object)
                    .map(|props| {
                        props
                            .iter()
                            .map(|(name, prop)| (name.clone(), SchemaNode::from_value(prop)))
                            .collect()
                    })
                    .unwrap_or_default();
                SchemaNode::ObjectOf(properties)
            }
            Some("object") => SchemaNode::ObjectOf(BTreeMap::new()),
            other => {
                if let Some(ty) = other {
                    warn!("Unrecognized schema type '{}'", ty);
                }
                SchemaNode::Opaque
            }
        }
    }
}
