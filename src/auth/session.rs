//! OAuth 2.0 authorization-code protocol session

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use parking_lot::Mutex;
use reqwest::header::ACCEPT;
use sha2::{Digest, Sha256};
use url::Url;

use super::oauth::{AuthResult, OAuthError};
use super::token::{TokenErrorResponse, TokenPair, TokenResponse};
use crate::types::{ClientSecret, Scope};
use crate::utils::random_alphanumeric;

/// Length of the generated `state` parameter
const STATE_LEN: usize = 30;

/// Length of the generated PKCE code verifier (RFC 7636 allows 43-128)
const PKCE_VERIFIER_LEN: usize = 64;

/// Authorization URL together with the state it carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    /// URL the user must visit to log in and grant the requested scope
    pub url: String,
    /// Anti-forgery state; the callback must echo it back
    pub state: String,
}

/// PKCE code challenge data
#[derive(Debug, Clone)]
struct PkceChallenge {
    /// Code verifier (random string)
    verifier: String,
    /// Code challenge (SHA-256 hash of verifier, base64url encoded)
    challenge: String,
}

impl PkceChallenge {
    fn generate() -> Self {
        let verifier = random_alphanumeric(PKCE_VERIFIER_LEN);

        // Code challenge: BASE64URL(SHA256(verifier))
        let mut hasher = Sha256::new();
        hasher.update(verifier.as_bytes());
        let challenge = URL_SAFE_NO_PAD.encode(hasher.finalize());

        Self {
            verifier,
            challenge,
        }
    }
}

/// Authorization issued by this session and not yet exchanged
#[derive(Debug, Clone)]
struct PendingAuthorization {
    state: String,
    code_verifier: Option<String>,
}

/// Protocol session bound to one client id, scope and redirect URI
///
/// Created lazily by [`OAuthConsumer`](super::OAuthConsumer) and reused for
/// its whole lifetime. Remembers the state (and PKCE verifier) of the last
/// authorization URL so the callback can be verified.
#[derive(Debug)]
pub struct OAuthSession {
    client_id: String,
    scope: Scope,
    redirect_uri: String,
    pkce: bool,
    http_client: reqwest::Client,
    pending: Mutex<Option<PendingAuthorization>>,
}

impl OAuthSession {
    pub(crate) fn new(
        client_id: String,
        scope: Scope,
        redirect_uri: String,
        pkce: bool,
        http_client: reqwest::Client,
    ) -> Self {
        tracing::debug!(client_id = %client_id, pkce, "Created OAuth session");
        Self {
            client_id,
            scope,
            redirect_uri,
            pkce,
            http_client,
            pending: Mutex::new(None),
        }
    }

    /// Client id this session is bound to
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Scope this session requests
    #[must_use]
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Redirect URI this session is bound to
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// State of the last issued authorization URL, if not yet exchanged
    #[must_use]
    pub fn pending_state(&self) -> Option<String> {
        self.pending.lock().as_ref().map(|p| p.state.clone())
    }

    /// Build the authorization URL for `endpoint` with a fresh state
    pub(crate) fn authorization_url(&self, endpoint: &Url) -> AuthorizationRequest {
        let state = random_alphanumeric(STATE_LEN);
        let pkce = self.pkce.then(PkceChallenge::generate);

        let mut url = endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.client_id)
                .append_pair("redirect_uri", &self.redirect_uri);
            if !self.scope.is_empty() {
                query.append_pair("scope", &self.scope.to_param());
            }
            query.append_pair("state", &state);
            if let Some(pkce) = &pkce {
                query
                    .append_pair("code_challenge", &pkce.challenge)
                    .append_pair("code_challenge_method", "S256");
            }
        }

        *self.pending.lock() = Some(PendingAuthorization {
            state: state.clone(),
            code_verifier: pkce.map(|p| p.verifier),
        });

        AuthorizationRequest {
            url: url.into(),
            state,
        }
    }

    /// Exchange the authorization callback for a token pair
    pub(crate) async fn fetch_token(
        &self,
        token_url: &Url,
        authorization_response: &str,
        client_secret: &ClientSecret,
    ) -> AuthResult<TokenPair> {
        let pending = self.pending.lock().clone();
        let code = parse_authorization_response(
            authorization_response,
            pending.as_ref().map(|p| p.state.as_str()),
        )?;

        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", client_secret.expose()),
        ];
        if let Some(verifier) = pending.as_ref().and_then(|p| p.code_verifier.as_deref()) {
            form.push(("code_verifier", verifier));
        }

        let tokens = self.request_token(token_url, &form).await?;
        self.pending.lock().take();
        Ok(tokens)
    }

    /// Exchange a renew token for a new token pair
    pub(crate) async fn refresh_token(
        &self,
        refresh_url: &Url,
        renew_token: &str,
        client_secret: &ClientSecret,
    ) -> AuthResult<TokenPair> {
        let scope = self.scope.to_param();
        let mut form = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", renew_token),
        ];
        if !scope.is_empty() {
            form.push(("scope", scope.as_str()));
        }
        form.push(("client_id", self.client_id.as_str()));
        form.push(("client_secret", client_secret.expose()));

        self.request_token(refresh_url, &form).await
    }

    async fn request_token(&self, url: &Url, form: &[(&str, &str)]) -> AuthResult<TokenPair> {
        let response = self
            .http_client
            .post(url.clone())
            .header(ACCEPT, "application/json")
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        // Try to parse as error first
        if let Ok(error) = serde_json::from_str::<TokenErrorResponse>(&response_text) {
            tracing::warn!(%status, error = %error.error, "Token endpoint rejected the request");
            return Err(OAuthError::TokenEndpoint {
                error: error.error,
                description: error.error_description,
            });
        }

        if !status.is_success() {
            tracing::warn!(%status, "Token endpoint request failed");
            return Err(OAuthError::TokenEndpoint {
                error: status.to_string(),
                description: None,
            });
        }

        let token_response: TokenResponse = serde_json::from_str(&response_text).map_err(|e| {
            OAuthError::InvalidResponse(format!("Failed to parse token response: {e}"))
        })?;

        if let Some(granted) = token_response.scope.as_deref() {
            let requested = self.scope.to_param();
            if !requested.is_empty() && !same_scope(&requested, granted) {
                tracing::warn!(%requested, %granted, "Granted scope differs from requested scope");
            }
        }

        match (token_response.access_token, token_response.refresh_token) {
            (Some(access_token), Some(renew_token)) => Ok(TokenPair::issued(
                access_token,
                renew_token,
                token_response.expires_in,
            )),
            (None, _) => Err(OAuthError::InvalidResponse(
                "token response has no access_token".to_string(),
            )),
            (_, None) => Err(OAuthError::InvalidResponse(
                "token response has no refresh_token".to_string(),
            )),
        }
    }
}

/// Extract the authorization code from the callback URL.
///
/// When `expected_state` is given the callback must carry the same state.
fn parse_authorization_response(
    authorization_response: &str,
    expected_state: Option<&str>,
) -> AuthResult<String> {
    let url = Url::parse(authorization_response)?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    let mut description = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            "error_description" => description = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(OAuthError::Authorization { error, description });
    }

    if let Some(expected) = expected_state {
        if state.as_deref() != Some(expected) {
            return Err(OAuthError::StateMismatch);
        }
    }

    code.filter(|c| !c.is_empty()).ok_or(OAuthError::MissingCode)
}

fn same_scope(requested: &str, granted: &str) -> bool {
    let mut requested: Vec<&str> = requested.split_whitespace().collect();
    let mut granted: Vec<&str> = granted.split_whitespace().collect();
    requested.sort_unstable();
    granted.sort_unstable();
    requested == granted
}
