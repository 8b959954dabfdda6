//! Sync layer: HTTP transport to the registry lookup service.

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{LookupClient, LookupError, LookupResponse};
