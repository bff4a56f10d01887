//! Authentication context types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authentication context for a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum AuthContext {
    /// Request from localhost or with auth disabled
    Local,
    /// Authenticated with a bearer token
    Authenticated {
        /// The authenticated caller's identity
        identity: Identity,
    },
}

impl AuthContext {
    /// Returns the identity if authenticated, None otherwise
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthContext::Authenticated { identity } => Some(identity),
            AuthContext::Local => None,
        }
    }

    /// Returns true if the request is authenticated
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthContext::Authenticated { .. })
    }

    /// Short label for logs
    pub fn principal(&self) -> &str {
        match self {
            AuthContext::Local => "local",
            AuthContext::Authenticated { identity } => &identity.subject,
        }
    }
}

/// Identity carried by a validated access token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Subject claim (user id)
    pub subject: String,
    /// Email address, when the token carries one
    pub email: Option<String>,
    /// Role claim, when the token carries one
    pub role: Option<String>,
    /// When the token expires
    pub expires_at: DateTime<Utc>,
}

impl Identity {
    /// Create a new Identity
    pub fn new(subject: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            subject: subject.into(),
            email: None,
            role: None,
            expires_at,
        }
    }

    /// Set the email address
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the role
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}
