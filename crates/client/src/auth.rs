//! Bearer-token acquisition.
//!
//! Every request first asks a [`TokenProvider`] for a token silently. When
//! the provider reports that user interaction is required, the client starts
//! an interactive (redirect-style) login and abandons the current operation;
//! see [`crate::resource_client::ResourceClient::bearer_token`].

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;

/// Cached tokens are refreshed this long before they expire.
const EXPIRY_SKEW_SECS: i64 = 60;

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 300;

/// Timeout for a single token endpoint request.
const TOKEN_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// OAuth error codes that mean a silent refresh cannot succeed.
const INTERACTION_ERROR_CODES: [&str; 4] = [
    "interaction_required",
    "login_required",
    "consent_required",
    "invalid_grant",
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// An opaque bearer token. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Errors from a [`TokenProvider`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Silent acquisition failed and the user must sign in again.
    #[error("Interaction required: {0}")]
    InteractionRequired(String),

    /// Any other acquisition failure.
    #[error("Token provider error: {0}")]
    Provider(String),
}

/// Source of bearer tokens for outgoing requests.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return a valid token without user interaction (cache or refresh).
    async fn acquire_token_silent(&self) -> Result<AccessToken, TokenError>;

    /// Start an interactive login. The flow that needed the token does not
    /// resume; a successful call only means re-authentication has begun.
    async fn begin_interactive_login(&self) -> Result<(), TokenError>;
}

// ---------------------------------------------------------------------------
// StaticTokenProvider
// ---------------------------------------------------------------------------

/// Hands out a fixed token. Used for pre-issued tokens and tests.
pub struct StaticTokenProvider {
    token: AccessToken,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(token),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn acquire_token_silent(&self) -> Result<AccessToken, TokenError> {
        Ok(self.token.clone())
    }

    async fn begin_interactive_login(&self) -> Result<(), TokenError> {
        Err(TokenError::Provider(
            "interactive login is not available for a static token".into(),
        ))
    }
}

// ---------------------------------------------------------------------------
// ClientCredentialsProvider
// ---------------------------------------------------------------------------

/// OAuth2 client-credentials provider with an in-memory token cache.
pub struct ClientCredentialsProvider {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: Option<String>,
    cache: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    token: AccessToken,
    expires_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

impl ClientCredentialsProvider {
    pub fn new(
        token_url: String,
        client_id: String,
        client_secret: String,
        scope: Option<String>,
    ) -> Result<Self, TokenError> {
        let http = reqwest::Client::builder()
            .timeout(TOKEN_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TokenError::Provider(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            token_url,
            client_id,
            client_secret,
            scope,
            cache: Mutex::new(None),
        })
    }

    async fn request_token(&self) -> Result<CachedToken, TokenError> {
        let mut form = vec![
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];
        if let Some(scope) = self.scope.as_deref() {
            form.push(("scope", scope));
        }

        let response = self
            .http
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| TokenError::Provider(format!("token request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TokenError::Provider(format!("token response unreadable: {e}")))?;

        if !status.is_success() {
            return Err(classify_token_error(status.as_u16(), &body));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| TokenError::Provider(format!("malformed token response: {e}")))?;
        let lifetime = parsed.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        let expires_at = expiry_after(Utc::now(), lifetime)?;

        tracing::debug!(expires_in = lifetime, "Acquired client-credentials token");

        Ok(CachedToken {
            token: AccessToken::new(parsed.access_token),
            expires_at,
        })
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsProvider {
    async fn acquire_token_silent(&self) -> Result<AccessToken, TokenError> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if is_fresh(cached.expires_at, Utc::now()) {
                return Ok(cached.token.clone());
            }
        }
        let fresh = self.request_token().await?;
        let token = fresh.token.clone();
        *cache = Some(fresh);
        Ok(token)
    }

    async fn begin_interactive_login(&self) -> Result<(), TokenError> {
        self.cache.lock().await.take();
        Err(TokenError::Provider(
            "client-credentials flow cannot sign in interactively; check the client registration"
                .into(),
        ))
    }
}

/// Expiry instant for a token issued at `now` that lives `expires_in` seconds.
fn expiry_after(now: DateTime<Utc>, expires_in: i64) -> Result<DateTime<Utc>, TokenError> {
    if expires_in < 0 {
        return Err(TokenError::Provider(format!(
            "invalid expires_in {expires_in}: must not be negative"
        )));
    }
    chrono::Duration::try_seconds(expires_in)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| TokenError::Provider(format!("invalid expires_in {expires_in}: out of range")))
}

/// Whether a token expiring at `expires_at` can still be handed out at `now`.
fn is_fresh(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expires_at - chrono::Duration::seconds(EXPIRY_SKEW_SECS) > now
}

/// Map a failed token endpoint response to a [`TokenError`].
fn classify_token_error(status: u16, body: &str) -> TokenError {
    match serde_json::from_str::<TokenErrorResponse>(body) {
        Ok(err) => {
            let detail = match err.error_description {
                Some(desc) => format!("{}: {desc}", err.error),
                None => err.error.clone(),
            };
            if INTERACTION_ERROR_CODES.contains(&err.error.as_str()) {
                TokenError::InteractionRequired(detail)
            } else {
                TokenError::Provider(format!("token endpoint returned {status}: {detail}"))
            }
        }
        Err(_) => TokenError::Provider(format!("token endpoint returned {status}: {body}")),
    }
}
