//! Generic REST access over versioned backend collections.
//!
//! [`ResourceClient`] provides create/read/update/delete primitives plus an
//! RPC-style `POST` for non-CRUD endpoints. Every call acquires a bearer
//! token first, builds its query string with
//! [`intake_core::query::build_query_params`], and lifts the `ETag` and
//! `x-pagination` response headers into the returned value.
//!
//! Failures are passed once to the injected [`HttpErrorHandler`] and then
//! returned unchanged. Nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, ETAG, IF_MATCH};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use intake_core::pagination::{PaginationMetadata, PAGINATION_HEADER};
use intake_core::patch::{PatchDocument, JSON_PATCH_CONTENT_TYPE};
use intake_core::query::{build_query_params, QueryOptions};
use intake_core::resource::validate_resource_name;
use intake_core::types::{Collection, ETag, EntityId, Versioned};

use crate::auth::{AccessToken, TokenError, TokenProvider};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::handler::{HttpErrorHandler, RequestInfo};

/// Header carrying a per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request timeout used by [`ResourceClient::new`].
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Body and headers of a successful response.
struct RawResponse {
    headers: HeaderMap,
    body: Vec<u8>,
}

/// Body sent with a request, with the content type it must be labelled as.
enum RequestBody {
    Json(Vec<u8>),
    JsonPatch(Vec<u8>),
}

/// Authenticated client for the engagement backend.
///
/// Cheap to clone: the HTTP connection pool, token provider and error
/// handler are shared.
#[derive(Clone)]
pub struct ResourceClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
    on_error: Arc<dyn HttpErrorHandler>,
}

impl ResourceClient {
    /// Create a client with its own connection pool and the default timeout.
    pub fn new(
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
        on_error: Arc<dyn HttpErrorHandler>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(http, base_url, tokens, on_error))
    }

    /// Create a client using the timeout and base URL from `config`.
    pub fn from_config(
        config: &ClientConfig,
        tokens: Arc<dyn TokenProvider>,
        on_error: Arc<dyn HttpErrorHandler>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self::with_client(http, config.base_url.clone(), tokens, on_error))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
        on_error: Arc<dyn HttpErrorHandler>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            tokens,
            on_error,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Acquire a bearer token: silently if possible, otherwise start an
    /// interactive login and fail with [`ClientError::ReauthenticationStarted`].
    ///
    /// Interactive login takes over the session, so whatever operation asked
    /// for the token is abandoned rather than retried.
    pub async fn bearer_token(&self) -> Result<AccessToken, ClientError> {
        match self.tokens.acquire_token_silent().await {
            Ok(token) => Ok(token),
            Err(TokenError::InteractionRequired(reason)) => {
                tracing::warn!(%reason, "Silent token acquisition needs interaction, starting login");
                self.tokens.begin_interactive_login().await?;
                Err(ClientError::ReauthenticationStarted)
            }
            Err(other) => Err(other.into()),
        }
    }

    // ---- CRUD ----

    /// `GET /{resource}/{id}/`: one entity plus its ETag.
    pub async fn get<T: DeserializeOwned>(
        &self,
        resource: &str,
        id: EntityId,
        query: &QueryOptions,
    ) -> Result<Versioned<T>, ClientError> {
        validate_resource_name(resource)?;
        let (info, raw) = self
            .execute(Method::GET, &format!("{resource}/{id}/"), query, None, None)
            .await?;
        let etag = read_etag(&raw.headers).map_err(|e| self.report(&info, e))?;
        let value = decode(&raw.body).map_err(|e| self.report(&info, e))?;
        Ok(Versioned::new(value, etag))
    }

    /// `GET /{resource}/`: one page of a collection plus its pagination header.
    pub async fn get_collection<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &QueryOptions,
    ) -> Result<Collection<T>, ClientError> {
        validate_resource_name(resource)?;
        let (info, raw) = self
            .execute(Method::GET, &format!("{resource}/"), query, None, None)
            .await?;
        let pagination = read_pagination(&raw.headers).map_err(|e| self.report(&info, e))?;
        let items = decode(&raw.body).map_err(|e| self.report(&info, e))?;
        Ok(Collection {
            resource_name: resource.to_string(),
            pagination,
            items,
        })
    }

    /// `PATCH /{resource}/{id}` with a JSON-Patch body, conditional on `etag`.
    ///
    /// Returns only the new ETag; callers needing the updated body re-fetch.
    pub async fn patch(
        &self,
        resource: &str,
        id: EntityId,
        query: &QueryOptions,
        patch: &PatchDocument,
        etag: &ETag,
    ) -> Result<Option<ETag>, ClientError> {
        validate_resource_name(resource)?;
        let body = RequestBody::JsonPatch(serde_json::to_vec(patch)?);
        let (info, raw) = self
            .execute(
                Method::PATCH,
                &format!("{resource}/{id}"),
                query,
                Some(body),
                Some(etag),
            )
            .await?;
        read_etag(&raw.headers).map_err(|e| self.report(&info, e))
    }

    /// `POST /{resource}/`: create an entity and return it with its new ETag.
    pub async fn post<B, T>(
        &self,
        resource: &str,
        query: &QueryOptions,
        data: &B,
    ) -> Result<Versioned<T>, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        validate_resource_name(resource)?;
        let body = RequestBody::Json(serde_json::to_vec(data)?);
        let (info, raw) = self
            .execute(Method::POST, &format!("{resource}/"), query, Some(body), None)
            .await?;
        let etag = read_etag(&raw.headers).map_err(|e| self.report(&info, e))?;
        let value = decode(&raw.body).map_err(|e| self.report(&info, e))?;
        Ok(Versioned::new(value, etag))
    }

    /// `DELETE /{resource}/{id}/`, conditional on `etag`.
    pub async fn delete(
        &self,
        resource: &str,
        id: EntityId,
        query: &QueryOptions,
        etag: &ETag,
    ) -> Result<(), ClientError> {
        validate_resource_name(resource)?;
        self.execute(
            Method::DELETE,
            &format!("{resource}/{id}/"),
            query,
            None,
            Some(etag),
        )
        .await?;
        Ok(())
    }

    // ---- RPC ----

    /// `POST /{path}` against a non-CRUD endpoint; returns the raw body.
    /// An empty response body decodes as JSON `null`.
    pub async fn rpc_post<B, T>(
        &self,
        path: &str,
        query: &QueryOptions,
        data: &B,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = RequestBody::Json(serde_json::to_vec(data)?);
        let (info, raw) = self
            .execute(
                Method::POST,
                path.trim_start_matches('/'),
                query,
                Some(body),
                None,
            )
            .await?;
        decode(&raw.body).map_err(|e| self.report(&info, e))
    }

    // ---- private helpers ----

    fn url(&self, path: &str, query: &QueryOptions) -> String {
        let qs = build_query_params(query);
        if qs.is_empty() {
            format!("{}/{path}", self.base_url)
        } else {
            format!("{}/{path}?{qs}", self.base_url)
        }
    }

    /// Send one authenticated request and read the whole response.
    ///
    /// Auth failures are returned directly; transport and status failures
    /// go through the error handler first.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &QueryOptions,
        body: Option<RequestBody>,
        if_match: Option<&ETag>,
    ) -> Result<(RequestInfo, RawResponse), ClientError> {
        let token = self.bearer_token().await?;

        let info = RequestInfo {
            method: method.clone(),
            url: self.url(path, query),
            request_id: uuid::Uuid::new_v4().to_string(),
        };

        let mut request = self
            .http
            .request(method, &info.url)
            .header(AUTHORIZATION, format!("bearer {}", token.secret()))
            .header(REQUEST_ID_HEADER, &info.request_id);

        if let Some(etag) = if_match {
            let value = HeaderValue::from_str(etag.as_str()).map_err(|e| ClientError::Header {
                header: "if-match",
                message: e.to_string(),
            })?;
            request = request.header(IF_MATCH, value);
        }
        request = match body {
            Some(RequestBody::Json(bytes)) => request
                .header(CONTENT_TYPE, "application/json")
                .body(bytes),
            Some(RequestBody::JsonPatch(bytes)) => request
                .header(CONTENT_TYPE, JSON_PATCH_CONTENT_TYPE)
                .body(bytes),
            None => request,
        };

        tracing::debug!(
            method = %info.method,
            url = %info.url,
            request_id = %info.request_id,
            "Sending backend request",
        );

        match Self::read_response(request).await {
            Ok(raw) => Ok((info, raw)),
            Err(e) => Err(self.report(&info, e)),
        }
    }

    async fn read_response(request: reqwest::RequestBuilder) -> Result<RawResponse, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        Ok(RawResponse { headers, body })
    }

    /// Hand `error` to the shared handler and give it back for propagation.
    fn report(&self, info: &RequestInfo, error: ClientError) -> ClientError {
        self.on_error.handle(info, &error);
        error
    }
}

fn read_etag(headers: &HeaderMap) -> Result<Option<ETag>, ClientError> {
    headers
        .get(ETAG)
        .map(|value| {
            value
                .to_str()
                .map(ETag::new)
                .map_err(|e| ClientError::Header {
                    header: "etag",
                    message: e.to_string(),
                })
        })
        .transpose()
}

fn read_pagination(headers: &HeaderMap) -> Result<Option<PaginationMetadata>, ClientError> {
    let Some(value) = headers.get(PAGINATION_HEADER) else {
        return Ok(None);
    };
    let raw = value.to_str().map_err(|e| ClientError::Header {
        header: PAGINATION_HEADER,
        message: e.to_string(),
    })?;
    PaginationMetadata::from_header(raw)
        .map(Some)
        .map_err(|e| ClientError::Header {
            header: PAGINATION_HEADER,
            message: e.to_string(),
        })
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ClientError> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"null".as_slice()
    } else {
        body
    };
    Ok(serde_json::from_slice(body)?)
}
