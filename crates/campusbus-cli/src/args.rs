//! Command-line argument parsing.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use campusbus_core::ApiRequest;
use clap::Parser;
use serde_json::Value;

/// Issue a request through the cached, notifying campus bus client
#[derive(Parser, Debug, Clone)]
#[command(name = "campusbus")]
#[command(about = "Send requests to the campus bus backend")]
#[command(version)]
pub struct Args {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    #[arg(value_parser = parse_method)]
    pub method: String,

    /// Path relative to the configured base URL, e.g. /bus/schedule
    pub path: String,

    /// Request body as JSON
    #[arg(value_name = "JSON", value_parser = parse_json)]
    pub body: Option<Value>,

    /// Query parameters as a JSON object
    #[arg(long, value_name = "JSON", value_parser = parse_json)]
    pub params: Option<Value>,

    /// Always go to the network
    #[arg(long)]
    pub no_cache: bool,

    /// Cache lifetime for this GET, in milliseconds
    #[arg(long, value_name = "MS", value_parser = parse_millis)]
    pub ttl: Option<Duration>,

    /// Do not show toasts
    #[arg(long)]
    pub quiet: bool,

    /// Issue the request N times (shows caching at work)
    #[arg(long, value_name = "N", default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub repeat: u32,

    /// Write logs to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Bearer token to send, saved to the config file for later runs
    #[arg(long)]
    pub token: Option<String>,
}

fn parse_method(raw: &str) -> Result<String, String> {
    let method = raw.to_ascii_uppercase();
    if method.is_empty() || !method.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(format!("'{}' is not an HTTP method", raw));
    }
    Ok(method)
}

fn parse_json(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("not valid JSON: {}", e))
}

fn parse_millis(raw: &str) -> Result<Duration, String> {
    raw.parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| format!("'{}' is not a number of milliseconds", raw))
}

impl Args {
    pub fn to_request(&self) -> Result<ApiRequest> {
        let method = self
            .method
            .parse()
            .map_err(|_| anyhow!("unsupported method {}", self.method))?;
        let mut request = ApiRequest::new(method, self.path.clone());
        if let Some(ref params) = self.params {
            request = request.params(params.clone());
        }
        if let Some(ref body) = self.body {
            request = request.body(body.clone());
        }
        if self.no_cache {
            request = request.no_cache();
        }
        if let Some(ttl) = self.ttl {
            request = request.cache_ttl(ttl);
        }
        if self.quiet {
            request = request.suppress_toast();
        }
        Ok(request)
    }
}
