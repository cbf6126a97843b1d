use reqwest::Method;
use serde_json::Value;

/// Build the cache key for a request.
///
/// The key has the shape `{METHOD}:{url}?{payload}` where `payload` is the
/// JSON serialization of the query params (GET) or body (everything else),
/// or the empty string when there is none. The method is always part of the
/// key so a GET and a POST with identical URL and payload never collide.
pub fn cache_key(method: &Method, url: &str, payload: Option<&Value>) -> String {
    let serialized = payload.map(Value::to_string).unwrap_or_default();
    format!("{}:{}?{}", method.as_str(), url, serialized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_without_payload() {
        assert_eq!(cache_key(&Method::GET, "/bus/schedule", None), "GET:/bus/schedule?");
    }

    #[test]
    fn test_key_with_params() {
        let params = json!({"route": 4});
        assert_eq!(
            cache_key(&Method::GET, "https://api.example.edu/notices", Some(&params)),
            r#"GET:https://api.example.edu/notices?{"route":4}"#
        );
    }

    #[test]
    fn test_key_is_method_qualified() {
        let body = json!({"busRoute": 1});
        let get = cache_key(&Method::GET, "/trips", Some(&body));
        let post = cache_key(&Method::POST, "/trips", Some(&body));
        assert_ne!(get, post);
        assert!(post.starts_with("POST:"));
    }

    #[test]
    fn test_key_distinguishes_payloads() {
        let a = json!({"page": 1});
        let b = json!({"page": 2});
        assert_ne!(
            cache_key(&Method::GET, "/notices", Some(&a)),
            cache_key(&Method::GET, "/notices", Some(&b))
        );
        assert_ne!(
            cache_key(&Method::GET, "/notices", Some(&a)),
            cache_key(&Method::GET, "/notices", None)
        );
    }

    #[test]
    fn test_key_is_deterministic() {
        let params = json!({"from": "North Gate", "to": "Library"});
        assert_eq!(
            cache_key(&Method::GET, "/bus/schedule", Some(&params)),
            cache_key(&Method::GET, "/bus/schedule", Some(&params.clone()))
        );
    }
}
