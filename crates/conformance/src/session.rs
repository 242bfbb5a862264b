//! State carried from one case to the next
//!
//! Tokens and discovered ids are written by early groups and read by later
//! ones. Every slot may be unset; readers treat that as a missing
//! prerequisite.

use serde_json::Value;

use crate::config::{Credential, CredentialsConfig};

/// A pre-seeded identity the suite logs in as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    Admin,
    UserA,
    UserB,
}

impl Identity {
    pub const ALL: [Identity; 3] = [Identity::Admin, Identity::UserA, Identity::UserB];

    /// Role the backend must report for this identity
    pub fn expected_role(self) -> &'static str {
        match self {
            Identity::Admin => "admin",
            Identity::UserA | Identity::UserB => "user",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Identity::Admin => "Admin",
            Identity::UserA => "User A",
            Identity::UserB => "User B",
        }
    }

    pub fn credential(self, credentials: &CredentialsConfig) -> &Credential {
        match self {
            Identity::Admin => &credentials.admin,
            Identity::UserA => &credentials.user_a,
            Identity::UserB => &credentials.user_b,
        }
    }
}

/// Mutable run state
#[derive(Debug, Default, Clone)]
pub struct Session {
    pub admin_token: Option<String>,
    pub user_a_token: Option<String>,
    pub user_b_token: Option<String>,

    /// First course of the public listing
    pub course_id: Option<String>,
    pub course_title: Option<String>,

    /// First identity of the admin user listing
    pub user_id: Option<String>,

    /// Email registered by the signup case
    pub signup_email: Option<String>,

    /// User A is known to be enrolled in `course_id`
    pub enrolled: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self, identity: Identity) -> Option<&str> {
        match identity {
            Identity::Admin => self.admin_token.as_deref(),
            Identity::UserA => self.user_a_token.as_deref(),
            Identity::UserB => self.user_b_token.as_deref(),
        }
    }

    pub fn set_token(&mut self, identity: Identity, token: impl Into<String>) {
        let slot = match identity {
            Identity::Admin => &mut self.admin_token,
            Identity::UserA => &mut self.user_a_token,
            Identity::UserB => &mut self.user_b_token,
        };
        *slot = Some(token.into());
    }
}

/// Read an entity id that may be serialized as a string or a number
pub fn entity_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
