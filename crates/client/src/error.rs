//! Error type shared by every client operation.

use intake_core::error::CoreError;
use intake_core::resource::Verb;

use crate::auth::TokenError;

/// Errors from the resource client layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, body decode, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// Token acquisition failed for a reason other than needing interaction.
    #[error("Token acquisition failed: {0}")]
    Auth(#[from] TokenError),

    /// Silent token refresh needed user interaction; an interactive login
    /// has been started and the current operation cannot continue.
    #[error("Re-authentication started; the current operation was abandoned")]
    ReauthenticationStarted,

    /// The resource does not support the requested verb. No request was sent.
    #[error("Resource '{resource}' does not support {verb}")]
    UnsupportedVerb { resource: &'static str, verb: Verb },

    /// A response header could not be read or parsed.
    #[error("Invalid response header '{header}': {message}")]
    Header {
        header: &'static str,
        message: String,
    },

    /// A request body could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ClientError {
    /// HTTP status for [`ClientError::Api`] errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
