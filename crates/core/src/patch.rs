//! JSON-Patch (RFC 6902) documents sent by resource `PATCH` calls.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// Content type for PATCH request bodies.
pub const JSON_PATCH_CONTENT_TYPE: &str = "application/json-patch+json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
}

/// A single patch operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: PatchOp,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

/// An ordered list of patch operations; serializes as a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchDocument(Vec<PatchOperation>);

impl PatchDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(self, path: &str, value: Value) -> Result<Self, CoreError> {
        self.push(PatchOp::Replace, path, Some(value))
    }

    pub fn add(self, path: &str, value: Value) -> Result<Self, CoreError> {
        self.push(PatchOp::Add, path, Some(value))
    }

    pub fn remove(self, path: &str) -> Result<Self, CoreError> {
        self.push(PatchOp::Remove, path, None)
    }

    /// One `replace` per top-level field, in map order.
    pub fn from_fields(fields: &Map<String, Value>) -> Self {
        let ops = fields
            .iter()
            .map(|(key, value)| PatchOperation {
                op: PatchOp::Replace,
                path: format!("/{}", escape_pointer_token(key)),
                value: Some(value.clone()),
                from: None,
            })
            .collect();
        Self(ops)
    }

    pub fn operations(&self) -> &[PatchOperation] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn push(mut self, op: PatchOp, path: &str, value: Option<Value>) -> Result<Self, CoreError> {
        if !path.starts_with('/') {
            return Err(CoreError::Validation(format!(
                "JSON-Patch path '{path}' must start with '/'"
            )));
        }
        self.0.push(PatchOperation {
            op,
            path: path.to_string(),
            value,
            from: None,
        });
        Ok(self)
    }
}

/// Escape `~` and `/` in a JSON Pointer reference token.
fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}
