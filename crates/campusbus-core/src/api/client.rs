//! API client for communicating with the campus bus REST API.
//!
//! `ApiClient::execute` is the single entry point: it answers cacheable GET
//! requests from the `ResponseCache`, sends everything else through the
//! `Transport`, and reports the outcome of network calls to the `Notifier`.

use std::sync::Arc;

use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{cache_key, ResponseCache};
use crate::config::Config;
use crate::notify::{self, failure_message, success_message, Notifier, Severity};

use super::request::{query_pairs, resolve_url};
use super::response::parse_body;
use super::{ApiError, ApiRequest, ApiResponse, HttpRequest, ReqwestTransport, Transport};

/// API client for the campus bus backend.
/// Clone is cheap - transport, cache and notifier are shared behind `Arc`s,
/// so every clone sees the same cache.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    cache: Arc<ResponseCache>,
    notifier: Arc<dyn Notifier>,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        cache: Arc<ResponseCache>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            transport,
            cache,
            notifier,
            base_url: base_url.into(),
            token: None,
        }
    }

    /// Create a reqwest-backed client from application configuration
    pub fn from_config(config: &Config, notifier: Arc<dyn Notifier>) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(config.request_timeout())?;
        let cache = ResponseCache::with_ttl(config.cache_ttl());
        let mut client = Self::new(
            config.base_url.clone(),
            Arc::new(transport),
            Arc::new(cache),
            notifier,
        );
        if let Some(ref token) = config.token {
            client.set_token(token.clone());
        }
        Ok(client)
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Create a new ApiClient with the given token, sharing transport,
    /// cache and notifier.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            token: Some(token),
            ..self.clone()
        }
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Whether a session token is present. Route guards key off this.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Cache key this client would use for `request`.
    pub fn cache_key_for(&self, request: &ApiRequest) -> String {
        let url = resolve_url(&self.base_url, &request.target);
        cache_key(&request.method, &url, request.key_payload())
    }

    /// Run a request through the cache, the transport and the notifier.
    pub async fn execute(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let header_ttl = request.take_ttl_header();
        let use_cache = request.cache_enabled();
        let key = self.cache_key_for(&request);

        if use_cache {
            if let Some(data) = self.cache.get(&key) {
                debug!(key = %key, "Cache hit");
                return Ok(ApiResponse::from_cache(data));
            }
            debug!(key = %key, "Cache miss");
        }

        let ApiRequest {
            method,
            target,
            params,
            body,
            headers,
            options,
        } = request;

        let http_request = match self.build_request(method.clone(), &target, params.as_ref(), body, headers) {
            Ok(http_request) => http_request,
            Err(err) => {
                warn!(method = %method, target = %target, error = %err, "Request could not be built");
                if !options.suppress_toast {
                    self.emit(Severity::Error, failure_message(None, Some(&err.message())));
                }
                return Err(err);
            }
        };
        let url = http_request.url.clone();

        let response = match self.transport.send(http_request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(method = %method, url = %url, error = %err, "Request failed to send");
                if !options.suppress_toast {
                    self.emit(Severity::Error, failure_message(None, Some(err.message())));
                }
                return Err(err.into());
            }
        };

        let data = parse_body(&response.body);

        if !response.is_success() {
            let message = failure_message(Some(&data), Some(&response.status_text));
            warn!(method = %method, url = %url, status = response.status, reason = %message, "Request returned error status");
            if !options.suppress_toast {
                self.emit(Severity::Error, message.clone());
            }
            let body = match data {
                Value::String(text) => Value::String(ApiError::truncate_body(&text)),
                other => other,
            };
            return Err(ApiError::Status {
                status: response.status,
                message,
                body,
            });
        }

        if use_cache {
            self.cache
                .insert(&key, data.clone(), options.cache_ttl.or(header_ttl));
        }

        if method != Method::GET && !options.suppress_toast {
            self.emit(Severity::Success, success_message(&data));
        }

        Ok(ApiResponse::new(response.status, data))
    }

    fn emit(&self, severity: Severity, message: String) {
        notify::emit(self.notifier.as_ref(), severity, message);
    }

    fn build_request(
        &self,
        method: Method,
        target: &str,
        params: Option<&Value>,
        body: Option<Value>,
        headers: Vec<(String, String)>,
    ) -> Result<HttpRequest, ApiError> {
        let mut all_headers = Vec::with_capacity(headers.len() + 1);
        if let Some(ref token) = self.token {
            let value = format!("Bearer {}", token);
            HeaderValue::from_str(&value)
                .map_err(|_| ApiError::InvalidRequest("token is not a valid header value".to_string()))?;
            all_headers.push((AUTHORIZATION.as_str().to_string(), value));
        }
        for (name, value) in headers {
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ApiError::InvalidRequest(format!("invalid header name: {}", name)))?;
            HeaderValue::from_str(&value)
                .map_err(|_| ApiError::InvalidRequest(format!("invalid value for header {}", name)))?;
            all_headers.push((name, value));
        }

        Ok(HttpRequest {
            method,
            url: resolve_url(&self.base_url, target),
            query: params.map(query_pairs).unwrap_or_default(),
            headers: all_headers,
            body,
        })
    }

    // ===== Convenience Methods =====

    pub async fn get(&self, target: &str) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::get(target)).await
    }

    pub async fn post(&self, target: &str, body: Value) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::post(target).body(body)).await
    }

    pub async fn put(&self, target: &str, body: Value) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::put(target).body(body)).await
    }

    pub async fn patch(&self, target: &str, body: Value) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::patch(target).body(body)).await
    }

    pub async fn delete(&self, target: &str) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::delete(target)).await
    }
}

// ============================================================================
// Tests
// ============================================================================
