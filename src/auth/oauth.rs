//! OAuth 2.0 consumer for the Inter-Actief OAuth endpoint

use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use thiserror::Error;
use url::Url;

use super::session::{AuthorizationRequest, OAuthSession};
use super::token::{TokenKind, TokenPair, TokenSlot};
use crate::connector::TokenRelay;
use crate::types::{ClientSecret, OAuthConfig, Scope};
use crate::utils::{USER_AGENT, build_http_client, normalize_base_url};

/// Errors that can occur during OAuth operations
#[derive(Debug, Error)]
pub enum OAuthError {
    /// No token of the requested kind is stored
    #[error("There is no {0} token present. Request a token using fetch_access_token.")]
    MissingToken(TokenKind),

    /// The provider redirected back with an error instead of a code
    #[error("Authorization failed: {error}")]
    Authorization {
        /// OAuth error code, e.g. `access_denied`
        error: String,
        /// Human readable description, if provided
        description: Option<String>,
    },

    /// The authorization response carries no code
    #[error("Authorization response contains no code")]
    MissingCode,

    /// The authorization response carries a different state than was issued
    #[error("Authorization response state does not match the issued state")]
    StateMismatch,

    /// The token endpoint rejected the exchange or refresh
    #[error("Token endpoint error: {error}")]
    TokenEndpoint {
        /// OAuth error code or HTTP status
        error: String,
        /// Human readable description, if provided
        description: Option<String>,
    },

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A configured or received URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for OAuth operations
pub type AuthResult<T> = Result<T, OAuthError>;

/// OAuth endpoints relative to the base URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Where the user logs in and grants access
    Authorization,
    /// Code exchange
    Token,
    /// Token refresh
    Refresh,
}

impl Endpoint {
    /// Path of the endpoint relative to the OAuth base URL
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Authorization => "authorize/",
            Self::Token | Self::Refresh => "token/",
        }
    }
}

/// OAuth consumer for one user session
///
/// For each session (user) a new instance needs to be created. Instances are
/// meant for use by one task at a time; concurrent renewals on the same
/// consumer race and the last answer wins.
#[derive(Debug)]
pub struct OAuthConsumer {
    client_id: String,
    client_secret: ClientSecret,
    redirect_uri: String,
    scope: Scope,
    pkce: bool,
    base_url: String,
    http_client: reqwest::Client,
    session: OnceLock<OAuthSession>,
    tokens: Arc<TokenSlot>,
    relay: Option<TokenRelay>,
}

impl OAuthConsumer {
    /// Create a new OAuth consumer
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an absolute URL or the HTTP
    /// client cannot be constructed.
    pub fn new(config: OAuthConfig) -> AuthResult<Self> {
        let base_url = normalize_base_url(&config.base_url);
        Url::parse(&base_url)?;

        let http_client = build_http_client(config.timeout, USER_AGENT)?;

        tracing::debug!(
            url = %base_url,
            client_id = %config.client_id,
            "OAuth initialized"
        );

        Ok(Self {
            client_id: config.client_id,
            client_secret: config.client_secret,
            redirect_uri: config.redirect_uri,
            scope: config.scope,
            pkce: config.pkce,
            base_url,
            http_client,
            session: OnceLock::new(),
            tokens: Arc::new(TokenSlot::new(TokenPair::new(
                config.access_token,
                config.renew_token,
            ))),
            relay: None,
        })
    }

    pub(crate) fn bind(mut self, relay: TokenRelay) -> Self {
        self.relay = Some(relay);
        self
    }

    pub(crate) fn token_slot(&self) -> Arc<TokenSlot> {
        Arc::clone(&self.tokens)
    }

    /// The registered client id
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The redirect URI
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// The requested scope
    #[must_use]
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// The normalized base URL, always ending with `/`
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// External URL of an OAuth endpoint
    #[must_use]
    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// The protocol session, created on first access
    #[must_use]
    pub fn session(&self) -> &OAuthSession {
        self.session.get_or_init(|| {
            OAuthSession::new(
                self.client_id.clone(),
                self.scope.clone(),
                self.redirect_uri.clone(),
                self.pkce,
                self.http_client.clone(),
            )
        })
    }

    /// Authorization URL the user can be redirected to in order to log in
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL cannot be parsed.
    pub fn authorization_url(&self) -> AuthResult<AuthorizationRequest> {
        let endpoint = Url::parse(&self.endpoint_url(Endpoint::Authorization))?;
        Ok(self.session().authorization_url(&endpoint))
    }

    /// Retrieve tokens for the authorized user
    ///
    /// `authorization_response` is the full URL the provider redirected the
    /// user to after authorizing. Afterwards the tokens can be read with
    /// [`access_token`](Self::access_token) and
    /// [`renew_token`](Self::renew_token). When this consumer was created by a
    /// [`Connector`](crate::Connector) the tokens are propagated.
    ///
    /// # Errors
    ///
    /// Returns an error if the callback carries an error, no code or a wrong
    /// state, or if the token endpoint rejects the exchange. Stored tokens are
    /// left untouched on failure.
    pub async fn fetch_access_token(&self, authorization_response: &str) -> AuthResult<TokenPair> {
        tracing::debug!(client_id = %self.client_id, "Fetching access token");

        let token_url = Url::parse(&self.endpoint_url(Endpoint::Token))?;
        let tokens = self
            .session()
            .fetch_token(&token_url, authorization_response, &self.client_secret)
            .await?;

        self.store(&tokens);
        Ok(tokens)
    }

    /// Retrieve a new access token using the stored renew token
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::MissingToken`] without contacting the server if no
    /// renew token is stored, or an error if the refresh is rejected. Stored
    /// tokens are left untouched on failure.
    pub async fn renew_access_token(&self) -> AuthResult<TokenPair> {
        let renew_token = self
            .tokens
            .renew_token()
            .ok_or(OAuthError::MissingToken(TokenKind::Renew))?;

        tracing::debug!(client_id = %self.client_id, "Renewing access token");

        let refresh_url = Url::parse(&self.endpoint_url(Endpoint::Refresh))?;
        let tokens = self
            .session()
            .refresh_token(&refresh_url, &renew_token, &self.client_secret)
            .await?;

        self.store(&tokens);
        Ok(tokens)
    }

    fn store(&self, tokens: &TokenPair) {
        self.tokens.replace(tokens.clone());
        if let Some(relay) = &self.relay {
            relay.notify(
                tokens.access_token.as_deref(),
                tokens.renew_token.as_deref(),
            );
        }
    }

    /// Access token of the current session
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::MissingToken`] if there is no access token.
    pub fn access_token(&self) -> AuthResult<String> {
        self.tokens
            .access_token()
            .ok_or(OAuthError::MissingToken(TokenKind::Access))
    }

    /// Renew token of the current session
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::MissingToken`] if there is no renew token.
    pub fn renew_token(&self) -> AuthResult<String> {
        self.tokens
            .renew_token()
            .ok_or(OAuthError::MissingToken(TokenKind::Renew))
    }

    /// Moment the access token expires; `None` if unknown
    #[must_use]
    pub fn token_expiry(&self) -> Option<DateTime<Utc>> {
        self.tokens.expires_at()
    }

    /// Snapshot of the current tokens, e.g. for persisting them
    #[must_use]
    pub fn tokens(&self) -> TokenPair {
        self.tokens.snapshot()
    }

    /// Whether the access token is known to be (almost) expired
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.tokens.snapshot().is_expired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_OAUTH_BASE_URL;

    fn config() -> OAuthConfig {
        OAuthConfig::builder()
            .client_id("test")
            .client_secret("vault")
            .redirect_uri("https://example.test/oauth")
            .scope(["ice_creams", "waffles"])
            .access_token("access_granted")
            .renew_token("renew_possible")
            .build()
    }

    fn bare_config() -> OAuthConfig {
        OAuthConfig::builder()
            .client_id("test")
            .client_secret("vault")
            .redirect_uri("https://example.test/oauth")
            .build()
    }

    #[test]
    fn test_init() {
        let oauth = OAuthConsumer::new(config()).unwrap();
        assert_eq!(oauth.client_id(), "test");
        assert_eq!(oauth.client_secret.expose(), "vault");
        assert_eq!(oauth.redirect_uri(), "https://example.test/oauth");
        assert_eq!(oauth.scope(), &Scope::from(["ice_creams", "waffles"]));
        assert_eq!(oauth.access_token().unwrap(), "access_granted");
        assert_eq!(oauth.renew_token().unwrap(), "renew_possible");
        assert_eq!(oauth.base_url(), DEFAULT_OAUTH_BASE_URL);
        assert!(oauth.token_expiry().is_none());
    }

    #[test]
    fn test_base_url_normalization() {
        let mut cfg = config();
        cfg.base_url = "https://test.example/oauth".to_string();
        let oauth = OAuthConsumer::new(cfg).unwrap();
        assert_eq!(oauth.base_url(), "https://test.example/oauth/");

        let mut cfg = config();
        cfg.base_url = "https://test.example/oauth/".to_string();
        let oauth = OAuthConsumer::new(cfg).unwrap();
        assert_eq!(oauth.base_url(), "https://test.example/oauth/");
    }

    #[test]
    fn test_invalid_base_url() {
        let mut cfg = config();
        cfg.base_url = "not a url".to_string();
        assert!(matches!(
            OAuthConsumer::new(cfg),
            Err(OAuthError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_session_is_memoized() {
        let oauth = OAuthConsumer::new(config()).unwrap();
        assert!(oauth.session.get().is_none());

        let session = oauth.session();
        assert_eq!(session.client_id(), "test");
        assert!(std::ptr::eq(session, oauth.session()));

        oauth.authorization_url().unwrap();
        assert!(std::ptr::eq(session, oauth.session()));
    }

    #[test]
    fn test_endpoint_urls() {
        let oauth = OAuthConsumer::new(config()).unwrap();
        let base = oauth.base_url().to_string();
        assert_eq!(
            oauth.endpoint_url(Endpoint::Authorization),
            format!("{base}authorize/")
        );
        assert_eq!(oauth.endpoint_url(Endpoint::Token), format!("{base}token/"));
        assert_eq!(
            oauth.endpoint_url(Endpoint::Refresh),
            format!("{base}token/")
        );
    }

    #[test]
    fn test_authorization_url_uses_endpoint() {
        let oauth = OAuthConsumer::new(config()).unwrap();
        let request = oauth.authorization_url().unwrap();
        assert!(
            request
                .url
                .starts_with("https://www.inter-actief.utwente.nl/o/authorize/?")
        );
        assert!(request.url.contains("client_id=test"));
    }

    #[test]
    fn test_missing_tokens() {
        let oauth = OAuthConsumer::new(bare_config()).unwrap();
        assert!(matches!(
            oauth.access_token(),
            Err(OAuthError::MissingToken(TokenKind::Access))
        ));
        assert!(matches!(
            oauth.renew_token(),
            Err(OAuthError::MissingToken(TokenKind::Renew))
        ));
        assert_eq!(
            oauth.access_token().unwrap_err().to_string(),
            "There is no access token present. Request a token using fetch_access_token."
        );
        assert!(!oauth.is_expired());
    }

    #[tokio::test]
    async fn test_renew_without_renew_token_fails_fast() {
        // Unroutable base URL: reaching the network would fail differently
        let mut cfg = bare_config();
        cfg.base_url = "http://127.0.0.1:9/o/".to_string();
        let oauth = OAuthConsumer::new(cfg).unwrap();

        let result = oauth.renew_access_token().await;
        assert!(matches!(
            result,
            Err(OAuthError::MissingToken(TokenKind::Renew))
        ));
    }
}
