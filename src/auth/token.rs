//! Token state for the OAuth and API consumers

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tokens are considered expired this many seconds before their actual expiry
const EXPIRY_MARGIN_SECS: i64 = 60;

/// The two kinds of token a session can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Short-lived bearer token for API calls
    Access,
    /// Longer-lived token used to obtain a new access token
    Renew,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Access => f.write_str("access"),
            Self::Renew => f.write_str("renew"),
        }
    }
}

/// Access token, renew token and expiry of one session
///
/// Either token may be absent. The pair is serializable so applications can
/// persist it between runs; the library itself never writes it to storage.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token for API calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Renew (refresh) token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renew_token: Option<String>,

    /// Moment the access token expires, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenPair {
    /// Create a pair without expiry information
    #[must_use]
    pub fn new(access_token: Option<String>, renew_token: Option<String>) -> Self {
        Self {
            access_token,
            renew_token,
            expires_at: None,
        }
    }

    /// Create a pair from a token endpoint answer
    ///
    /// `expires_in` is the number of seconds the access token is valid,
    /// counted from now.
    #[must_use]
    pub fn issued(access_token: String, renew_token: String, expires_in: Option<i64>) -> Self {
        let expires_at = expires_in.and_then(|seconds| {
            TimeDelta::try_seconds(seconds).and_then(|ttl| Utc::now().checked_add_signed(ttl))
        });

        Self {
            access_token: Some(access_token),
            renew_token: Some(renew_token),
            expires_at,
        }
    }

    /// Check if the access token is expired (with 60 second buffer)
    ///
    /// A pair with unknown expiry is never considered expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|expires_at| {
            Utc::now() + TimeDelta::seconds(EXPIRY_MARGIN_SECS) >= expires_at
        })
    }

    /// Get remaining validity duration, if known
    #[must_use]
    pub fn remaining_validity(&self) -> Option<Duration> {
        self.expires_at
            .and_then(|expires_at| (expires_at - Utc::now()).to_std().ok())
            .filter(|remaining| !remaining.is_zero())
    }

    /// Get the Authorization header value, if an access token is present
    #[must_use]
    pub fn authorization_header(&self) -> Option<String> {
        self.access_token
            .as_ref()
            .map(|token| format!("Bearer {token}"))
    }
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &self.access_token.as_ref().map(|_| "<token>"))
            .field("renew_token", &self.renew_token.as_ref().map(|_| "<token>"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Successful answer of the token endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: Option<String>,
    #[serde(default)]
    pub(crate) refresh_token: Option<String>,
    #[serde(default)]
    pub(crate) expires_in: Option<i64>,
    #[serde(default)]
    pub(crate) scope: Option<String>,
}

/// Error answer of the token endpoint (RFC 6749 section 5.2)
#[derive(Debug, Deserialize)]
pub(crate) struct TokenErrorResponse {
    pub(crate) error: String,
    #[serde(default)]
    pub(crate) error_description: Option<String>,
}

/// In-memory token state of one consumer
///
/// The connector writes into a consumer's slot when relaying tokens, so the
/// slot is shared behind an `Arc`. Locks are never held across an await.
#[derive(Debug, Default)]
pub(crate) struct TokenSlot {
    tokens: RwLock<TokenPair>,
}

impl TokenSlot {
    pub(crate) fn new(tokens: TokenPair) -> Self {
        Self {
            tokens: RwLock::new(tokens),
        }
    }

    pub(crate) fn snapshot(&self) -> TokenPair {
        self.tokens.read().clone()
    }

    pub(crate) fn access_token(&self) -> Option<String> {
        self.tokens.read().access_token.clone()
    }

    pub(crate) fn renew_token(&self) -> Option<String> {
        self.tokens.read().renew_token.clone()
    }

    pub(crate) fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.tokens.read().expires_at
    }

    /// Replace the whole pair
    pub(crate) fn replace(&self, tokens: TokenPair) {
        *self.tokens.write() = tokens;
    }

    /// Overwrite only the tokens that are given
    ///
    /// A relayed access token comes without expiry information, so a new
    /// access token resets the expiry to unknown.
    pub(crate) fn update(&self, access_token: Option<&str>, renew_token: Option<&str>) {
        let mut tokens = self.tokens.write();
        if let Some(access_token) = access_token {
            tokens.access_token = Some(access_token.to_string());
            tokens.expires_at = None;
        }
        if let Some(renew_token) = renew_token {
            tokens.renew_token = Some(renew_token.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_pair_issued() {
        let tokens = TokenPair::issued("access123".into(), "renew456".into(), Some(3600));

        assert_eq!(tokens.access_token.as_deref(), Some("access123"));
        assert_eq!(tokens.renew_token.as_deref(), Some("renew456"));
        assert!(tokens.expires_at.is_some());
        assert!(!tokens.is_expired());
        let remaining = tokens.remaining_validity().unwrap();
        assert!(remaining <= Duration::from_secs(3600));
        assert!(remaining > Duration::from_secs(3500));
    }

    #[test]
    fn test_token_pair_without_expiry() {
        let tokens = TokenPair::issued("a".into(), "r".into(), None);
        assert!(tokens.expires_at.is_none());
        assert!(!tokens.is_expired());
        assert!(tokens.remaining_validity().is_none());
    }

    #[test]
    fn test_token_expired() {
        let mut tokens = TokenPair::issued("a".into(), "r".into(), Some(3600));
        tokens.expires_at = Some(Utc::now() - TimeDelta::seconds(100));
        assert!(tokens.is_expired());
        assert!(tokens.remaining_validity().is_none());

        // Inside the safety margin counts as expired
        tokens.expires_at = Some(Utc::now() + TimeDelta::seconds(30));
        assert!(tokens.is_expired());
    }

    #[test]
    fn test_authorization_header() {
        let tokens = TokenPair::new(Some("access123".into()), None);
        assert_eq!(
            tokens.authorization_header().as_deref(),
            Some("Bearer access123")
        );
        assert!(TokenPair::default().authorization_header().is_none());
    }

    #[test]
    fn test_debug_hides_tokens() {
        let tokens = TokenPair::new(Some("access123".into()), Some("renew456".into()));
        let debug = format!("{tokens:?}");
        assert!(!debug.contains("access123"));
        assert!(!debug.contains("renew456"));
    }

    #[test]
    fn test_token_pair_serde() {
        let tokens = TokenPair::new(Some("a".into()), None);
        let json = serde_json::to_value(&tokens).unwrap();
        assert_eq!(json, serde_json::json!({"access_token": "a"}));

        let parsed: TokenPair = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, tokens);
    }

    #[test]
    fn test_slot_update_is_partial() {
        let slot = TokenSlot::new(TokenPair::issued("a".into(), "r".into(), Some(60)));

        slot.update(None, Some("r2"));
        assert_eq!(slot.access_token().as_deref(), Some("a"));
        assert_eq!(slot.renew_token().as_deref(), Some("r2"));
        assert!(slot.expires_at().is_some());

        slot.update(Some("a2"), None);
        assert_eq!(slot.access_token().as_deref(), Some("a2"));
        assert_eq!(slot.renew_token().as_deref(), Some("r2"));
        assert!(slot.expires_at().is_none());

        slot.update(None, None);
        assert_eq!(slot.snapshot().access_token.as_deref(), Some("a2"));
    }
}
