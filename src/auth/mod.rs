//! OAuth authentication module for the Inter-Actief web site
//!
//! Implements the client side of the OAuth 2.0 authorization-code flow:
//!
//! 1. Build an authorization URL and redirect the user to it
//! 2. The user logs in and grants the requested scope
//! 3. The provider redirects to the registered redirect URI with a code
//! 4. Exchange the full callback URL for an access and renew token
//! 5. Renew the access token when it expires
//!
//! # Example
//!
//! ```no_run
//! use iaconnector::auth::OAuthConsumer;
//! use iaconnector::types::OAuthConfig;
//!
//! # async fn example(callback_url: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let oauth = OAuthConsumer::new(
//!     OAuthConfig::builder()
//!         .client_id("my-app")
//!         .client_secret("s3cret")
//!         .redirect_uri("https://my-app.example/oauth/callback")
//!         .scope(["read"])
//!         .build(),
//! )?;
//!
//! // Redirect the user here
//! let request = oauth.authorization_url()?;
//! println!("Log in at {}", request.url);
//!
//! // ...and exchange the URL the user came back on
//! oauth.fetch_access_token(callback_url).await?;
//! println!("Token expires at: {:?}", oauth.token_expiry());
//! # Ok(())
//! # }
//! ```
//!
//! # Token Storage
//!
//! Tokens live in memory only. Use [`OAuthConsumer::tokens`] to take a
//! serializable snapshot and pass the tokens back through
//! [`OAuthConfig`](crate::types::OAuthConfig) to restore a session.
//!
//! # Security
//!
//! - The `state` parameter of the callback is checked against the issued one
//! - PKCE can be enabled with [`OAuthConfig::pkce`](crate::types::OAuthConfig)
//! - The client secret and tokens never appear in `Debug` output or logs

mod oauth;
mod session;
mod token;

pub use oauth::{AuthResult, Endpoint, OAuthConsumer, OAuthError};
pub use session::{AuthorizationRequest, OAuthSession};
pub use token::{TokenKind, TokenPair};

pub(crate) use token::TokenSlot;
