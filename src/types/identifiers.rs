//! Newtype wrappers for type safety

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

use crate::utils::random_alphanumeric;

/// Length of generated JSON-RPC request ids
const REQUEST_ID_LEN: usize = 10;

// ============================================================================
// Client Credentials
// ============================================================================

/// OAuth client secret
///
/// `Debug` and `Display` never reveal the value; use [`ClientSecret::expose`]
/// when the secret must be sent to the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSecret(String);

impl ClientSecret {
    /// Wrap a client secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Get the secret value
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ClientSecret(<redacted>)")
    }
}

impl std::fmt::Display for ClientSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<redacted>")
    }
}

impl From<String> for ClientSecret {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ClientSecret {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ============================================================================
// Scope
// ============================================================================

/// Set of permissions requested from the OAuth provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(Vec<String>);

impl Scope {
    /// Create a scope from permission names
    pub fn new<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(permissions.into_iter().map(Into::into).collect())
    }

    /// The individual permissions
    #[must_use]
    pub fn permissions(&self) -> &[String] {
        &self.0
    }

    /// Whether no permission is requested
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Space separated form used in OAuth requests
    #[must_use]
    pub fn to_param(&self) -> String {
        self.0.join(" ")
    }
}

impl From<Vec<String>> for Scope {
    fn from(permissions: Vec<String>) -> Self {
        Self(permissions)
    }
}

impl From<Vec<&str>> for Scope {
    fn from(permissions: Vec<&str>) -> Self {
        Self::new(permissions)
    }
}

impl<const N: usize> From<[&str; N]> for Scope {
    fn from(permissions: [&str; N]) -> Self {
        Self::new(permissions)
    }
}

impl<S: Into<String>> FromIterator<S> for Scope {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

// ============================================================================
// JSON-RPC Request Id
// ============================================================================

/// JSON-RPC request id
///
/// Ids are random and only useful for debugging; responses are not
/// correlated by id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Create a request ID from an existing value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a random 10 character alphanumeric request ID
    #[must_use]
    pub fn random() -> Self {
        Self(random_alphanumeric(REQUEST_ID_LEN))
    }

    /// Get the request ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::random()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for RequestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for RequestId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
