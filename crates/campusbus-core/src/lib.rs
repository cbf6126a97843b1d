//! Core library for the campus bus application.
//!
//! Every backend call goes through [`ApiClient`], which answers GET requests
//! from a short-lived in-memory [`ResponseCache`] when it can, falls back to
//! an injectable [`Transport`] otherwise, and reports the outcome of network
//! calls to a [`Notifier`].

pub mod api;
pub mod cache;
pub mod config;
pub mod notify;

pub use api::{
    ApiClient, ApiError, ApiRequest, ApiResponse, HttpRequest, HttpResponse, ReqwestTransport,
    RequestOptions, Transport, TransportError,
};
pub use cache::{cache_key, Clock, ManualClock, ResponseCache, SystemClock, DEFAULT_CACHE_TTL};
pub use config::Config;
pub use notify::{ChannelNotifier, Notification, Notifier, NotifyError, Severity, TracingNotifier};
