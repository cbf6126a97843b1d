use std::time::Duration;

use reqwest::Method;
use serde_json::Value;

/// Request header that overrides the cache TTL, in milliseconds.
/// It is consumed by the client and never sent to the backend.
pub const CACHE_TTL_HEADER: &str = "x-cache-ttl";

/// Per-call knobs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// `None` means the default: cache GETs, never cache anything else.
    /// `Some(true)` only has an effect on GET.
    pub use_cache: Option<bool>,
    /// How long a cached GET response stays fresh. Falls back to the cache's
    /// default TTL.
    pub cache_ttl: Option<Duration>,
    /// Skip both success and failure notifications for this call.
    pub suppress_toast: bool,
}

/// A request as issued by callers: method, target, optional params or body,
/// extra headers and options.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Absolute URL or a path relative to the client's base URL
    pub target: String,
    /// Query parameters; for GET these also feed the cache key
    pub params: Option<Value>,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
    pub options: RequestOptions,
}

impl ApiRequest {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            params: None,
            body: None,
            headers: Vec::new(),
            options: RequestOptions::default(),
        }
    }

    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::GET, target)
    }

    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::POST, target)
    }

    pub fn put(target: impl Into<String>) -> Self {
        Self::new(Method::PUT, target)
    }

    pub fn patch(target: impl Into<String>) -> Self {
        Self::new(Method::PATCH, target)
    }

    pub fn delete(target: impl Into<String>) -> Self {
        Self::new(Method::DELETE, target)
    }

    pub fn params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn use_cache(mut self, enabled: bool) -> Self {
        self.options.use_cache = Some(enabled);
        self
    }

    /// Always go to the network for this call.
    pub fn no_cache(self) -> Self {
        self.use_cache(false)
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.options.cache_ttl = Some(ttl);
        self
    }

    pub fn suppress_toast(mut self) -> Self {
        self.options.suppress_toast = true;
        self
    }

    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Whether this request may be answered from, and stored in, the cache.
    pub fn cache_enabled(&self) -> bool {
        self.method == Method::GET && self.options.use_cache.unwrap_or(true)
    }

    /// The payload that feeds the cache key: params for GET, body otherwise.
    pub fn key_payload(&self) -> Option<&Value> {
        if self.method == Method::GET {
            self.params.as_ref()
        } else {
            self.body.as_ref()
        }
    }

    /// Remove the TTL override header, returning its value if it parsed.
    pub(crate) fn take_ttl_header(&mut self) -> Option<Duration> {
        let mut ttl = None;
        self.headers.retain(|(name, value)| {
            if name.eq_ignore_ascii_case(CACHE_TTL_HEADER) {
                ttl = value.trim().parse::<u64>().ok().map(Duration::from_millis);
                false
            } else {
                true
            }
        });
        ttl
    }
}

/// Join a target onto the base URL. Absolute targets are returned as-is.
pub fn resolve_url(base_url: &str, target: &str) -> String {
    if target.starts_with("http://") || target.starts_with("https://") {
        return target.to_string();
    }
    if base_url.is_empty() {
        return target.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        target.trim_start_matches('/')
    )
}

/// Flatten a params object into query pairs. Strings are used verbatim,
/// other scalars and nested values are JSON-encoded, nulls are dropped.
pub fn query_pairs(params: &Value) -> Vec<(String, String)> {
    match params {
        Value::Object(map) => map
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect(),
        _ => Vec::new(),
    }
}
