//! Conformance cases, one module per backend resource
//!
//! Every case follows the same shape: issue the call(s), derive a boolean
//! expectation, record it. A case whose prerequisite is missing records a
//! skip instead of issuing a request.

pub mod activities;
pub mod analytics;
pub mod auth;
pub mod chatbot;
pub mod courses;
pub mod dashboard;
pub mod setup;
pub mod users;

use crate::client::{ApiClient, Request, ResponseEnvelope};
use crate::config::HarnessConfig;
use crate::report::ResultLog;
use crate::session::{Identity, Session};

/// Everything a case may read or write
#[derive(Debug)]
pub struct Context {
    pub client: ApiClient,
    pub config: HarnessConfig,
    pub session: Session,
    pub log: ResultLog,
}

impl Context {
    pub fn new(client: ApiClient, config: HarnessConfig) -> Self {
        Self {
            client,
            config,
            session: Session::new(),
            log: ResultLog::new(),
        }
    }

    /// Token for `identity`, or a recorded skip of `case` when login failed
    pub fn require_token(&mut self, identity: Identity, case: &str) -> Option<String> {
        match self.session.token(identity) {
            Some(token) => Some(token.to_string()),
            None => {
                self.log.skip(
                    case,
                    format!("{} token unavailable", identity.label().to_lowercase()),
                );
                None
            }
        }
    }

    /// A discovered value, or a recorded skip of `case`
    pub fn require<T>(&mut self, value: Option<T>, case: &str, what: &str) -> Option<T> {
        if value.is_none() {
            self.log.skip(case, format!("{} unavailable", what));
        }
        value
    }

    /// The call must be rejected as unauthenticated or unauthorized
    pub async fn expect_denied(&mut self, case: &str, request: Request) -> ResponseEnvelope {
        let response = self.client.send(&request).await;
        let message = if is_denied(&response) {
            format!("Correctly rejected: {}", response.body_text())
        } else {
            format!(
                "Expected 401, got {}: {}",
                response.status,
                response.body_text()
            )
        };
        self.log.record(case, is_denied(&response), message);
        response
    }

    /// An anonymous lookup of `path` must come back 404
    pub async fn expect_missing(&mut self, case: &str, path: &str) -> ResponseEnvelope {
        let response = self.client.get(path, None).await;
        let missing = !response.success && response.is_status(404);
        let message = if missing {
            format!("Correctly returned 404: {}", response.body_text())
        } else {
            format!("Expected 404, got {}: {}", response.status, response.body_text())
        };
        self.log.record(case, missing, message);
        response
    }

    /// The call must succeed and return `key`
    pub async fn expect_key(
        &mut self,
        case: &str,
        request: Request,
        key: &str,
    ) -> ResponseEnvelope {
        let response = self.client.send(&request).await;
        let ok = response.success && response.has_key(key);
        let message = match response.array_len(key) {
            Some(count) if ok => format!("Retrieved {} {}", count, key),
            _ if ok => format!("Received '{}'", key),
            _ => format!(
                "Expected '{}' with success, got {}: {}",
                key,
                response.status,
                response.body_text()
            ),
        };
        self.log.record(case, ok, message);
        response
    }
}

/// 401-class rejection
pub fn is_denied(response: &ResponseEnvelope) -> bool {
    !response.success && response.is_status(401)
}

/// A 409 that says the mutation already happened
///
/// Prefers a structured `code` field. Without one, falls back to matching
/// `phrase` in the error text, which breaks if the backend rewords it.
pub fn is_already_done(response: &ResponseEnvelope, code: &str, phrase: &str) -> bool {
    if !response.is_status(409) {
        return false;
    }
    if let Some(actual) = response.str_at("/code") {
        return actual.eq_ignore_ascii_case(code);
    }
    response
        .error_message()
        .map(|message| message.to_lowercase().contains(&phrase.to_lowercase()))
        .unwrap_or(false)
}
