//! Shared fixtures for integration tests
#![allow(dead_code)]

pub mod stub_backend;

use std::time::Duration;

use pulsecheck::{ApiClient, ConformanceRunner, Context, Group, HarnessConfig};

pub use stub_backend::{StubBackend, StubOptions};

/// Configuration pointed at `base_url` with a short timeout
pub fn config_for(base_url: &str) -> HarnessConfig {
    HarnessConfig {
        base_url: base_url.to_string(),
        timeout_ms: 2_000,
        ..Default::default()
    }
}

pub fn runner_for(base_url: &str, groups: &[Group]) -> ConformanceRunner {
    let config = config_for(base_url);
    let client = ApiClient::from_config(&config).unwrap();
    ConformanceRunner::with_groups(Context::new(client, config), groups)
}

pub fn client_for(base_url: &str, timeout: Duration) -> ApiClient {
    ApiClient::new(format!("{}/api", base_url), timeout).unwrap()
}

/// Origin nothing listens on
pub fn closed_origin() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
