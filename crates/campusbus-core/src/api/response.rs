use serde::de::DeserializeOwned;
use serde_json::Value;

use super::ApiError;

/// Status of a response synthesized from the cache.
const CACHED_STATUS: u16 = 200;

/// A successful response, either fresh from the network or replayed from
/// the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    status: u16,
    data: Value,
    cached: bool,
}

impl ApiResponse {
    pub fn new(status: u16, data: Value) -> Self {
        Self {
            status,
            data,
            cached: false,
        }
    }

    pub fn from_cache(data: Value) -> Self {
        Self {
            status: CACHED_STATUS,
            data,
            cached: true,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_cached(&self) -> bool {
        self.cached
    }

    /// The parsed body
    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn into_data(self) -> Value {
        self.data
    }

    /// Decode the body into a concrete type.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        Ok(serde_json::from_value(self.data.clone())?)
    }
}

/// Parse a raw body. Empty bodies become `null`; bodies that are not JSON
/// are kept as a string.
pub(crate) fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
