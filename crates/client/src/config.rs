use std::sync::Arc;

use crate::auth::{ClientCredentialsProvider, StaticTokenProvider, TokenError, TokenProvider};

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {message}")]
    Invalid { var: &'static str, message: String },

    #[error(transparent)]
    Provider(#[from] TokenError),
}

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the REST backend, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// RPC path that starts the new-engagement workflow.
    pub workflow_start_path: String,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                         |
    /// |-------------------------------|---------------------------------|
    /// | `INTAKE_API_BASE_URL`         | required                        |
    /// | `INTAKE_REQUEST_TIMEOUT_SECS` | `30`                            |
    /// | `INTAKE_WORKFLOW_START_PATH`  | `workflows/newEngagement/start` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("INTAKE_API_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("INTAKE_API_BASE_URL"))?;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: "INTAKE_API_BASE_URL",
                message: format!("'{base_url}' is not an http(s) URL"),
            });
        }

        let request_timeout_secs = match lookup("INTAKE_REQUEST_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(0) => {
                    return Err(ConfigError::Invalid {
                        var: "INTAKE_REQUEST_TIMEOUT_SECS",
                        message: "must be at least 1".into(),
                    })
                }
                Ok(secs) => secs,
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        var: "INTAKE_REQUEST_TIMEOUT_SECS",
                        message: format!("{e}"),
                    })
                }
            },
            None => 30,
        };

        let workflow_start_path = match lookup("INTAKE_WORKFLOW_START_PATH") {
            Some(path) => {
                let path = path.trim().trim_matches('/');
                if path.is_empty() {
                    return Err(ConfigError::Invalid {
                        var: "INTAKE_WORKFLOW_START_PATH",
                        message: "must not be empty".into(),
                    });
                }
                path.to_string()
            }
            None => "workflows/newEngagement/start".into(),
        };

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout_secs,
            workflow_start_path,
        })
    }
}

/// Where bearer tokens come from.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthConfig {
    /// A pre-issued token (`INTAKE_ACCESS_TOKEN`).
    Static { token: String },
    /// OAuth2 client credentials.
    ClientCredentials {
        token_url: String,
        client_id: String,
        client_secret: String,
        scope: Option<String>,
    },
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static { .. } => f.write_str("AuthConfig::Static"),
            Self::ClientCredentials {
                token_url,
                client_id,
                ..
            } => f
                .debug_struct("AuthConfig::ClientCredentials")
                .field("token_url", token_url)
                .field("client_id", client_id)
                .finish_non_exhaustive(),
        }
    }
}

impl AuthConfig {
    /// Select the token source from environment variables.
    ///
    /// `INTAKE_ACCESS_TOKEN` wins when set. Otherwise `INTAKE_TOKEN_URL`,
    /// `INTAKE_CLIENT_ID` and `INTAKE_CLIENT_SECRET` are required, with an
    /// optional `INTAKE_SCOPE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = non_empty("INTAKE_ACCESS_TOKEN") {
            return Ok(Self::Static { token });
        }
        Ok(Self::ClientCredentials {
            token_url: non_empty("INTAKE_TOKEN_URL").ok_or(ConfigError::Missing("INTAKE_TOKEN_URL"))?,
            client_id: non_empty("INTAKE_CLIENT_ID").ok_or(ConfigError::Missing("INTAKE_CLIENT_ID"))?,
            client_secret: non_empty("INTAKE_CLIENT_SECRET")
                .ok_or(ConfigError::Missing("INTAKE_CLIENT_SECRET"))?,
            scope: non_empty("INTAKE_SCOPE"),
        })
    }

    /// Build the configured [`TokenProvider`].
    pub fn into_provider(self) -> Result<Arc<dyn TokenProvider>, ConfigError> {
        Ok(match self {
            Self::Static { token } => Arc::new(StaticTokenProvider::new(token)),
            Self::ClientCredentials {
                token_url,
                client_id,
                client_secret,
                scope,
            } => Arc::new(ClientCredentialsProvider::new(
                token_url,
                client_id,
                client_secret,
                scope,
            )?),
        })
    }
}
