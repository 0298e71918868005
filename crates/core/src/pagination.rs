//! Pagination metadata carried in the `x-pagination` response header.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// Name of the collection response header holding [`PaginationMetadata`].
pub const PAGINATION_HEADER: &str = "x-pagination";

/// Paging state for one collection response.
///
/// Known keys are read leniently: a key with an unexpected JSON type (for
/// example `"hasNext": null` or a numeric string) reads as `None` instead
/// of failing an otherwise successful collection read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMetadata {
    #[serde(default, deserialize_with = "lenient")]
    pub total_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub page_size: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub current_page: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_pages: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub has_next: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub has_previous: Option<bool>,
    /// Any further keys the backend sends (e.g. navigation links).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PaginationMetadata {
    /// Parse the JSON value of an `x-pagination` header.
    ///
    /// Only input that is not a JSON object is rejected.
    pub fn from_header(raw: &str) -> Result<Self, CoreError> {
        serde_json::from_str(raw).map_err(|e| {
            CoreError::Validation(format!("Malformed {PAGINATION_HEADER} header: {e}"))
        })
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}
