//! Pure request resolution.
//!
//! Turns a logical (method, path, query, body) call plus a descriptor
//! into a concrete request shape. No network and no mutable state:
//! given the same descriptor, auth and call, resolution always
//! produces the same result, which keeps it unit-testable without a
//! live descriptor fetch.

use crate::auth::AuthProvider;
use crate::descriptor::ApiDescriptor;
use crate::error::{ClientError, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

/// An abstract request, independent of any concrete base URL.
///
/// Constructed per invocation; never persisted.
#[derive(Debug, Clone, Default)]
pub struct LogicalCall {
    /// HTTP method; defaults to GET when unset
    pub method: Option<String>,
    /// Relative path, or an absolute URL used verbatim
    pub path: String,
    /// Query parameters
    pub query: BTreeMap<String, String>,
    /// Optional request body
    pub body: Option<CallBody>,
}

/// Request body as supplied by the caller.
#[derive(Debug, Clone)]
pub enum CallBody {
    /// JSON-encoded text, decoded during resolution
    Text(String),
    /// Already-structured value, passed through
    Structured(Value),
}

impl LogicalCall {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn body_text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(CallBody::Text(body.into()));
        self
    }

    pub fn body_json(mut self, body: Value) -> Self {
        self.body = Some(CallBody::Structured(body));
        self
    }
}

/// A fully-formed request, ready for the transport layer.
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    /// Canonical (uppercase) HTTP method
    pub method: String,
    /// Absolute target URL
    pub url: String,
    /// Headers; only auth credentials are ever injected here
    pub headers: BTreeMap<String, String>,
    /// Query parameters
    pub query: BTreeMap<String, String>,
    /// Structured body, omitted entirely when absent
    pub body: Option<Value>,
}

/// Resolve a logical call against a descriptor.
pub fn resolve(
    descriptor: &ApiDescriptor,
    auth: &AuthProvider,
    call: &LogicalCall,
) -> Result<ResolvedRequest> {
    let url = resolve_url(descriptor, &call.path);

    let method = match call.method.as_deref().map(str::trim) {
        None | Some("") => "GET".to_string(),
        Some(method) => method.to_uppercase(),
    };

    let body = match &call.body {
        None => None,
        Some(CallBody::Structured(value)) => Some(value.clone()),
        // The original client skips empty text bodies rather than
        // treating them as a JSON parse failure.
        Some(CallBody::Text(text)) if text.trim().is_empty() => None,
        Some(CallBody::Text(text)) => Some(
            serde_json::from_str(text)
                .map_err(|e| ClientError::InvalidRequestBody(e.to_string()))?,
        ),
    };

    let mut headers = BTreeMap::new();
    auth.apply(&mut headers);

    Ok(ResolvedRequest {
        method,
        url,
        headers,
        query: call.query.clone(),
        body,
    })
}

/// Compose the target URL for a call path.
///
/// An already-absolute path is used verbatim; otherwise the descriptor's
/// scheme, host and base path are joined with the call path, with
/// exactly one `/` between segments regardless of leading or trailing
/// slashes on either side.
fn resolve_url(descriptor: &ApiDescriptor, path: &str) -> String {
    if is_absolute_url(path) {
        return path.to_string();
    }

    let origin = format!("{}://{}", descriptor.scheme, descriptor.host);
    join_path(&join_path(&origin, &descriptor.base_path), path)
}

fn is_absolute_url(path: &str) -> bool {
    Url::parse(path)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

fn join_path(base: &str, segment: &str) -> String {
    let base = base.trim_end_matches('/');
    let segment = segment.trim_start_matches('/');
    if segment.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{segment}")
    }
}
