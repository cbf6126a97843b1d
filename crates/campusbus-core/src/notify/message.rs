use serde_json::Value;

/// Fallback text for a successful mutating call with no message in its body.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Request successful";

/// Fallback text for a failed call when nothing better is available.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Request failed";

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Pull the backend's human-readable message out of a response body.
///
/// Looks at `data.message`, then `message`, then `msg`. Only non-empty
/// strings count.
pub fn extract_message(body: &Value) -> Option<&str> {
    non_empty_str(body.get("data").and_then(|data| data.get("message")))
        .or_else(|| non_empty_str(body.get("message")))
        .or_else(|| non_empty_str(body.get("msg")))
}

pub fn success_message(body: &Value) -> String {
    extract_message(body)
        .unwrap_or(DEFAULT_SUCCESS_MESSAGE)
        .to_string()
}

/// Message for a failed call. `fallback` is the transport error text or the
/// HTTP status text, used when the body carries no message of its own.
pub fn failure_message(body: Option<&Value>, fallback: Option<&str>) -> String {
    body.and_then(extract_message)
        .or_else(|| fallback.filter(|s| !s.trim().is_empty()))
        .unwrap_or(DEFAULT_FAILURE_MESSAGE)
        .to_string()
}
