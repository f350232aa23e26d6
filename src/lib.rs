//! # Inter-Actief connector for Rust
//!
//! Client library for the web services of Inter-Actief: log users in through
//! OAuth 2.0 and call the JSON-RPC API on their behalf.
//! Async/await, strong typing, reqwest-based.
//!
//! ## Quick Start
//!
//! A [`Connector`] owns one OAuth consumer and one API consumer and keeps
//! their tokens in sync:
//!
//! ```no_run
//! use iaconnector::Connector;
//! use iaconnector::types::{ApiConfig, OAuthConfig};
//!
//! # async fn example(callback_url: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let mut connector = Connector::new();
//! let oauth = connector.init_oauth(
//!     OAuthConfig::builder()
//!         .client_id("my-app")
//!         .client_secret("s3cret")
//!         .redirect_uri("https://my-app.example/oauth/callback")
//!         .scope(["read"])
//!         .build(),
//! )?;
//!
//! // Send the user to the login page
//! let request = oauth.authorization_url()?;
//! println!("Log in at {}", request.url);
//!
//! connector.init_api(ApiConfig::default())?;
//!
//! // Exchange the callback URL; the API consumer receives the access token
//! if let Some(oauth) = connector.oauth() {
//!     oauth.fetch_access_token(callback_url).await?;
//! }
//! if let Some(api) = connector.api() {
//!     let activities = api
//!         .get_activity_stream(chrono::Utc::now(), chrono::Utc::now() + chrono::Duration::days(7))
//!         .await?;
//!     println!("{} activities this week", activities.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Features
//!
//! ### 1. OAuth with [`OAuthConsumer`]
//!
//! The authorization-code flow against the Inter-Actief web site: build the
//! authorization URL, exchange the callback for tokens, renew them later.
//! See the [`auth`] module.
//!
//! ### 2. JSON-RPC with [`ApiConsumer`]
//!
//! Named wrappers for the remote procedures (person details, activity stream,
//! enrollments) and a generic [`ApiConsumer::call`]. See the [`api`] module.
//!
//! ### 3. Token relaying with [`Connector`]
//!
//! Tokens obtained by one consumer are copied into the other, never back into
//! the one that produced them. See the [`connector`] module.
//!
//! ## Logging
//!
//! This crate uses [`tracing`](https://crates.io/crates/tracing) for structured logging.
//! Tokens and secrets are never logged. To see logs, attach a tracing
//! subscriber in your application:
//!
//! ```rust,ignore
//! tracing_subscriber::fmt::init();
//! ```
//!
//! ## Error Handling
//!
//! API calls fail with an [`ApiError`] whose variant follows the remote error
//! code:
//!
//! ```no_run
//! # use iaconnector::{ApiConsumer, ApiError};
//! # async fn example(api: &ApiConsumer) {
//! match api.activity_signup(42, 0.0, &[]).await {
//!     Ok(()) => println!("Enrolled"),
//!     Err(ApiError::SignupRejected { message }) => eprintln!("Rejected: {message}"),
//!     Err(ApiError::NotLoggedIn { .. }) => eprintln!("Log in first"),
//!     Err(e) => eprintln!("Error: {e}"),
//! }
//! # }
//! ```
//!
//! OAuth operations fail with an [`OAuthError`]. Both convert into the
//! crate-level [`Error`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod auth;
pub mod connector;
pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use api::{ActivityId, ApiConsumer, Record, SignupOption};
pub use auth::{AuthorizationRequest, OAuthConsumer, OAuthError, TokenKind, TokenPair};
pub use connector::{Connector, TokenSource};
pub use error::{ApiError, ApiErrorKind, Error, Result, resolve_error};
pub use types::{ApiConfig, ClientSecret, OAuthConfig, RequestId, Scope};

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
