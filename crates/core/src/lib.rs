//! Domain types for the new-engagement intake client.
//!
//! Pure data and helpers with no I/O: entity ids and ETags, the query-string
//! builder, pagination metadata, JSON-Patch documents, the backend resource
//! catalog, and the engagement-creation payloads.

pub mod engagement;
pub mod error;
pub mod pagination;
pub mod patch;
pub mod query;
pub mod resource;
pub mod types;
