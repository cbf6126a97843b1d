//! REST API client module for the campus bus backend.
//!
//! This module provides the `ApiClient`, which every page-level caller uses
//! to talk to the backend. Requests go through a pluggable `Transport`
//! (reqwest by default); GET responses are cached briefly and the outcome of
//! each network call is reported to a `Notifier`.
//!
//! Authenticated calls carry the session's bearer token.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod request;
pub mod response;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::ApiClient;
pub use error::ApiError;
pub use request::{ApiRequest, RequestOptions, CACHE_TTL_HEADER};
pub use response::ApiResponse;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
