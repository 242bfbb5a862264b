//! Harness configuration
//!
//! Values come from built-in defaults, then an optional TOML file, then
//! command-line flags (which also read `PULSECHECK_*` environment variables).

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{ConformanceError, ConformanceResult};

/// Top-level harness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Backend origin, e.g. `http://127.0.0.1:3000`
    pub base_url: String,

    /// Prefix every endpoint lives under
    pub api_prefix: String,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,

    /// Credentials of the pre-seeded identities
    pub credentials: CredentialsConfig,

    /// Minimum counts the backend is expected to report
    pub expectations: Expectations,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            api_prefix: "/api".to_string(),
            timeout_ms: 10_000,
            credentials: CredentialsConfig::default(),
            expectations: Expectations::default(),
        }
    }
}

impl HarnessConfig {
    /// Parse a configuration from a TOML string
    pub fn from_toml(content: &str) -> ConformanceResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file
    pub fn from_file(path: &Path) -> ConformanceResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            ConformanceError::ConfigRead {
                path: path.display().to_string(),
                source,
            }
        })?;
        Self::from_toml(&content)
    }

    /// Root of every API path: base URL plus prefix, without a trailing slash
    pub fn api_base(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        if prefix.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, prefix)
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Reject settings the runner cannot work with
    pub fn validate(&self) -> ConformanceResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConformanceError::Config(format!(
                "base_url must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.timeout_ms == 0 {
            return Err(ConformanceError::Config(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Email/password pair used to log in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub email: String,
    pub password: String,
}

impl Credential {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Credentials for the three identities the seed data creates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub admin: Credential,
    pub user_a: Credential,
    pub user_b: Credential,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            admin: Credential::new("admin@datapulse.com", "password123"),
            user_a: Credential::new("sarah@example.com", "password123"),
            user_b: Credential::new("john@example.com", "password123"),
        }
    }
}

/// Lower bounds checked against listing and aggregate endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Expectations {
    /// Courses the public listing must return
    pub min_courses: usize,

    /// Identities the seed creates; user listing and `totalUsers` must reach it
    pub min_users: usize,
}

impl Default for Expectations {
    fn default() -> Self {
        Self {
            min_courses: 5,
            min_users: 3,
        }
    }
}
