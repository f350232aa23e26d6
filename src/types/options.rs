//! Consumer configuration options

use std::time::Duration;
use typed_builder::TypedBuilder;

use super::identifiers::{ClientSecret, Scope};

/// Production OAuth endpoint of the Inter-Actief web site
pub const DEFAULT_OAUTH_BASE_URL: &str = "https://www.inter-actief.utwente.nl/o/";

/// Production JSON-RPC endpoint of the Inter-Actief API
pub const DEFAULT_API_BASE_URL: &str = "https://api.ia.utwente.nl/app/lennart/";

// ============================================================================
// OAuth Configuration
// ============================================================================

/// Options for an [`OAuthConsumer`](crate::auth::OAuthConsumer)
///
/// # Example
///
/// ```
/// use iaconnector::types::OAuthConfig;
///
/// let config = OAuthConfig::builder()
///     .client_id("my-app")
///     .client_secret("s3cret")
///     .redirect_uri("https://my-app.example/oauth/callback")
///     .scope(["read"])
///     .build();
///
/// assert_eq!(config.base_url, iaconnector::types::DEFAULT_OAUTH_BASE_URL);
/// ```
#[derive(Clone, TypedBuilder)]
#[builder(
    builder_method(doc = "Create a new builder for OAuthConfig"),
    builder_type(doc = "Builder for OAuthConfig", vis = "pub"),
    build_method(doc = "Build the OAuthConfig")
)]
pub struct OAuthConfig {
    /// The registered client id of the application
    #[builder(setter(into))]
    pub client_id: String,

    /// The registered client secret of the application
    #[builder(setter(into))]
    pub client_secret: ClientSecret,

    /// URI the provider redirects to after authorizing; must be registered
    #[builder(setter(into))]
    pub redirect_uri: String,

    /// Permissions to request
    #[builder(default, setter(into))]
    pub scope: Scope,

    /// Current access token, if known
    #[builder(default, setter(strip_option, into))]
    pub access_token: Option<String>,

    /// Current renew token, if known
    #[builder(default, setter(strip_option, into))]
    pub renew_token: Option<String>,

    /// Base URL of the OAuth implementation
    #[builder(default = DEFAULT_OAUTH_BASE_URL.to_string(), setter(into))]
    pub base_url: String,

    /// Send a PKCE (S256) challenge with the authorization request
    #[builder(default)]
    pub pkce: bool,

    /// Timeout applied to token endpoint requests
    #[builder(default, setter(strip_option))]
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret)
            .field("redirect_uri", &self.redirect_uri)
            .field("scope", &self.scope)
            .field("access_token", &self.access_token.as_ref().map(|_| "<token>"))
            .field("renew_token", &self.renew_token.as_ref().map(|_| "<token>"))
            .field("base_url", &self.base_url)
            .field("pkce", &self.pkce)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ============================================================================
// API Configuration
// ============================================================================

/// Options for an [`ApiConsumer`](crate::api::ApiConsumer)
#[derive(Clone, TypedBuilder)]
#[builder(
    builder_method(doc = "Create a new builder for ApiConfig"),
    builder_type(doc = "Builder for ApiConfig", vis = "pub"),
    build_method(doc = "Build the ApiConfig")
)]
pub struct ApiConfig {
    /// URL on which the API resides
    #[builder(default = DEFAULT_API_BASE_URL.to_string(), setter(into))]
    pub base_url: String,

    /// Pre-obtained access token, bypassing OAuth
    #[builder(default, setter(strip_option, into))]
    pub access_token: Option<String>,

    /// Tag outgoing requests as preview (sandbox) traffic
    #[builder(default)]
    pub preview: bool,

    /// Timeout applied to every RPC request
    #[builder(default, setter(strip_option))]
    pub timeout: Option<Duration>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "<token>"))
            .field("preview", &self.preview)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_config_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, DEFAULT_API_BASE_URL);
        assert!(config.access_token.is_none());
        assert!(!config.preview);
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_oauth_config_builder() {
        let config = OAuthConfig::builder()
            .client_id("test")
            .client_secret("vault")
            .redirect_uri("https://example.test/oauth")
            .scope(["ice_creams", "waffles"])
            .access_token("access_granted")
            .timeout(Duration::from_secs(5))
            .build();

        assert_eq!(config.client_id, "test");
        assert_eq!(config.client_secret.expose(), "vault");
        assert_eq!(config.scope.to_param(), "ice_creams waffles");
        assert_eq!(config.access_token.as_deref(), Some("access_granted"));
        assert!(config.renew_token.is_none());
        assert_eq!(config.base_url, DEFAULT_OAUTH_BASE_URL);
        assert!(!config.pkce);
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let config = OAuthConfig::builder()
            .client_id("test")
            .client_secret("vault")
            .redirect_uri("https://example.test/oauth")
            .access_token("access_granted")
            .build();
        let debug = format!("{config:?}");
        assert!(debug.contains("test"));
        assert!(!debug.contains("vault"));
        assert!(!debug.contains("access_granted"));

        let api = ApiConfig::builder().access_token("secret_token").build();
        assert!(!format!("{api:?}").contains("secret_token"));
    }
}
