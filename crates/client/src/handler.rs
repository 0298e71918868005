//! Shared handler invoked once for every failed HTTP call.
//!
//! The client does no recovery of its own: a failed request is reported to
//! the injected [`HttpErrorHandler`] (log it, surface it to a user, count it)
//! and the same error is then returned to the caller.

use crate::error::ClientError;

/// Identifies the request an error belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub method: reqwest::Method,
    pub url: String,
    /// Value sent in the `x-request-id` header.
    pub request_id: String,
}

/// Host-supplied reaction to HTTP failures.
pub trait HttpErrorHandler: Send + Sync {
    fn handle(&self, request: &RequestInfo, error: &ClientError);
}

/// Default handler: logs the failure through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorHandler;

impl HttpErrorHandler for TracingErrorHandler {
    fn handle(&self, request: &RequestInfo, error: &ClientError) {
        tracing::error!(
            method = %request.method,
            url = %request.url,
            request_id = %request.request_id,
            status = error.status(),
            error = %error,
            "Backend request failed",
        );
    }
}
