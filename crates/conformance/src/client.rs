//! HTTP adapter for the backend under test
//!
//! Every call produces a [`ResponseEnvelope`]. Connection failures, timeouts
//! and unparseable bodies are folded into the envelope so case functions
//! never have to handle a transport error.

use std::fmt;
use std::time::{Duration, Instant};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::config::HarnessConfig;
use crate::error::ConformanceResult;

/// Marker stored under `error` when a body is not valid JSON
pub const INVALID_JSON: &str = "Invalid JSON response";

/// HTTP methods the backend contract uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// One outgoing call. Built per request and dropped afterwards.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub token: Option<String>,
}

impl Request {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
            token: None,
        }
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: None,
            token: None,
        }
    }

    /// Attach a JSON body
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Authenticate with a bearer token
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Authenticate only if a token is available
    pub fn bearer_opt(mut self, token: Option<&str>) -> Self {
        self.token = token.map(str::to_string);
        self
    }
}

/// Uniform result of a call
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    /// HTTP status, or 0 when no response arrived
    pub status: u16,

    /// Parsed JSON body; an empty object when the response had no body
    pub body: Value,

    /// `status < 400` and the body parsed
    pub success: bool,
}

impl ResponseEnvelope {
    pub fn from_parts(status: u16, bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Self {
                status,
                body: Value::Object(Map::new()),
                success: status < 400,
            };
        }

        match serde_json::from_slice::<Value>(bytes) {
            Ok(body) => Self {
                status,
                body,
                success: status < 400,
            },
            Err(_) => Self {
                status,
                body: json!({ "error": INVALID_JSON }),
                success: false,
            },
        }
    }

    /// Envelope for a call that never got a response
    pub fn transport_failure(reason: impl fmt::Display) -> Self {
        Self {
            status: 0,
            body: json!({ "error": reason.to_string() }),
            success: false,
        }
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.field(key).is_some()
    }

    /// String at a JSON pointer such as `/user/role`
    pub fn str_at(&self, pointer: &str) -> Option<&str> {
        self.body.pointer(pointer).and_then(Value::as_str)
    }

    /// Length of the array stored under `key`
    pub fn array_len(&self, key: &str) -> Option<usize> {
        self.field(key).and_then(Value::as_array).map(Vec::len)
    }

    pub fn is_status(&self, code: u16) -> bool {
        self.status == code
    }

    /// The backend's `error` string, if it sent one
    pub fn error_message(&self) -> Option<&str> {
        self.str_at("/error")
    }

    /// Compact rendering of the body for result messages
    pub fn body_text(&self) -> String {
        self.body.to_string()
    }
}

/// Client bound to one backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    api_base: String,
}

impl ApiClient {
    /// Build a client from the harness configuration
    pub fn from_config(config: &HarnessConfig) -> ConformanceResult<Self> {
        Self::new(config.api_base(), config.timeout())
    }

    /// Build a client rooted at `api_base` with a fixed per-call timeout
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> ConformanceResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Full URL for an endpoint path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    /// Perform a call exactly once
    pub async fn send(&self, request: &Request) -> ResponseEnvelope {
        let url = self.url(&request.path);
        let start = Instant::now();

        let mut builder = match request.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
        };
        builder = builder.header(CONTENT_TYPE, "application/json");
        if let Some(token) = &request.token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let envelope = match builder.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                match response.bytes().await {
                    Ok(bytes) => ResponseEnvelope::from_parts(status, &bytes),
                    Err(e) => ResponseEnvelope::transport_failure(e),
                }
            }
            Err(e) => ResponseEnvelope::transport_failure(e),
        };

        debug!(
            "{} {} -> {} ({} ms)",
            request.method,
            url,
            envelope.status,
            start.elapsed().as_millis()
        );
        envelope
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> ResponseEnvelope {
        self.send(&Request::get(path).bearer_opt(token)).await
    }

    pub async fn post(&self, path: &str, body: Value, token: Option<&str>) -> ResponseEnvelope {
        self.send(&Request::post(path).json(body).bearer_opt(token)).await
    }
}
