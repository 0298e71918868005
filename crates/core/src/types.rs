//! Shared identifier and response-envelope types.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::pagination::PaginationMetadata;

/// All backend entity ids are integers.
pub type EntityId = i64;

/// Opaque server-issued concurrency token from the `ETag` response header.
///
/// Returned on reads and creates; required (as `If-Match`) on updates and
/// deletes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ETag(String);

impl ETag {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Versioned
// ---------------------------------------------------------------------------

/// A response body together with the ETag read from its response header.
///
/// The ETag is kept beside the body rather than inside it, so a body field
/// that happens to be called `etag` is never silently replaced. Use
/// [`Versioned::merged`] when the flat single-object shape is needed.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub etag: Option<ETag>,
}

impl<T> Versioned<T> {
    pub fn new(value: T, etag: Option<ETag>) -> Self {
        Self { value, etag }
    }
}

impl Versioned<Value> {
    /// Flatten into one JSON object carrying an `etag` key.
    ///
    /// The header ETag always wins: an `etag` field already present in the
    /// body is replaced (or set to `null` when the response had no ETag
    /// header). Non-object bodies are wrapped as `{ "value": ..., "etag": ... }`.
    pub fn merged(self) -> Value {
        let etag = self
            .etag
            .map(|t| Value::String(t.0))
            .unwrap_or(Value::Null);
        let mut object = match self.value {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        object.insert("etag".to_string(), etag);
        Value::Object(object)
    }

    /// Integer `id` field of the body, if present.
    pub fn id(&self) -> Option<EntityId> {
        self.value.get("id").and_then(Value::as_i64)
    }
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// One page of a resource collection plus its pagination header.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    pub resource_name: String,
    pub pagination: Option<PaginationMetadata>,
    pub items: Vec<T>,
}

impl<T: Serialize> Collection<T> {
    /// Render as `{ "paginationMetadata": ..., "<resourceName>": [...] }`.
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        let mut object = Map::new();
        object.insert(
            "paginationMetadata".to_string(),
            serde_json::to_value(&self.pagination)?,
        );
        object.insert(self.resource_name.clone(), serde_json::to_value(&self.items)?);
        Ok(Value::Object(object))
    }
}
