//! Query-string construction for resource requests.
//!
//! [`build_query_params`] turns a [`QueryOptions`] into the `key=value&...`
//! string appended to every resource URL. Absent or falsy values (`None`,
//! `0`, `""`) are dropped entirely. String parameters are percent-encoded;
//! numeric ones are written as-is.

use serde::{Deserialize, Serialize};

/// Optional named parameters accepted by every resource endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    pub api_version: Option<u32>,
    pub page_size: Option<u32>,
    pub page_number: Option<u32>,
    pub filter: Option<String>,
    pub search_query: Option<String>,
    pub order_by: Option<String>,
    pub fields: Option<String>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_version(mut self, version: u32) -> Self {
        self.api_version = Some(version);
        self
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn page_number(mut self, number: u32) -> Self {
        self.page_number = Some(number);
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn search_query(mut self, query: impl Into<String>) -> Self {
        self.search_query = Some(query.into());
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    pub fn fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    /// Fill in `api_version` only if the caller left it unset (or zero).
    pub fn with_default_version(mut self, version: u32) -> Self {
        if self.api_version.unwrap_or(0) == 0 {
            self.api_version = Some(version);
        }
        self
    }
}

/// Build the query string for `options`, without a leading `?`.
pub fn build_query_params(options: &QueryOptions) -> String {
    let numeric = [
        ("apiVersion", options.api_version),
        ("pageSize", options.page_size),
        ("pageNumber", options.page_number),
    ];
    let textual = [
        ("filter", options.filter.as_deref()),
        ("searchQuery", options.search_query.as_deref()),
        ("orderBy", options.order_by.as_deref()),
        ("fields", options.fields.as_deref()),
    ];

    let mut pairs: Vec<String> = Vec::new();
    for (key, value) in numeric {
        if let Some(n) = value.filter(|n| *n != 0) {
            pairs.push(format!("{key}={n}"));
        }
    }
    for (key, value) in textual {
        if let Some(s) = value.filter(|s| !s.is_empty()) {
            pairs.push(format!("{key}={}", urlencoding::encode(s)));
        }
    }
    pairs.join("&")
}
