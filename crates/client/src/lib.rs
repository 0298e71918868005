//! REST client for the engagement intake backend.
//!
//! - [`ResourceClient`]: authenticated CRUD and RPC primitives over
//!   versioned resource collections, built on [`reqwest`].
//! - [`ResourceApi`]: the client bound to one catalog resource.
//! - [`auth`]: bearer-token providers with silent-then-interactive
//!   acquisition.
//! - [`handler`]: the shared hook every failed request passes through.
//! - [`config`]: environment-driven connection and auth settings.

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod resource_api;
pub mod resource_client;

pub use auth::{
    AccessToken, ClientCredentialsProvider, StaticTokenProvider, TokenError, TokenProvider,
};
pub use config::{AuthConfig, ClientConfig, ConfigError};
pub use error::ClientError;
pub use handler::{HttpErrorHandler, RequestInfo, TracingErrorHandler};
pub use resource_api::ResourceApi;
pub use resource_client::ResourceClient;
