//! `Connector` binding the OAuth and API consumers together
//!
//! The connector owns at most one [`OAuthConsumer`] and at most one
//! [`ApiConsumer`]. Neither consumer knows the other; when one of them
//! obtains new tokens it notifies the connector, which copies the tokens into
//! the other consumer.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                    Connector                     │
//! │                                                  │
//! │  ┌───────────────┐            ┌───────────────┐  │
//! │  │ OAuthConsumer │            │  ApiConsumer  │  │
//! │  │ tokens (Arc)  │            │ tokens (Arc)  │  │
//! │  │ relay (Weak)  │            │ relay (Weak)  │  │
//! │  └───────┬───────┘            └───────┬───────┘  │
//! │   notify │   ▲                 ▲      │ notify   │
//! │          ▼   │ update   update │      ▼          │
//! │  ┌───────────┴─────────────────┴───────────────┐ │
//! │  │                 Relay (Arc)                 │ │
//! │  └─────────────────────────────────────────────┘ │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! - The connector owns both consumers and the relay
//! - Consumers hold only a weak handle to the relay plus their source tag
//! - The relay never writes back into the consumer that sent the update
//!
//! # Example
//!
//! ```no_run
//! use iaconnector::Connector;
//! use iaconnector::types::{ApiConfig, OAuthConfig};
//!
//! # async fn example(callback_url: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let mut connector = Connector::new();
//! connector.init_oauth(
//!     OAuthConfig::builder()
//!         .client_id("my-app")
//!         .client_secret("s3cret")
//!         .redirect_uri("https://my-app.example/oauth/callback")
//!         .scope(["read"])
//!         .build(),
//! )?;
//! connector.init_api(ApiConfig::default())?;
//!
//! let oauth = connector.oauth().expect("initialized above");
//! oauth.fetch_access_token(callback_url).await?;
//!
//! // The API consumer received the new access token
//! let api = connector.api().expect("initialized above");
//! let person = api.get_person_details().await?;
//! println!("{person:?}");
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, OnceLock, Weak};

use crate::api::ApiConsumer;
use crate::auth::{AuthResult, OAuthConsumer, TokenSlot};
use crate::error::ApiError;
use crate::types::{ApiConfig, OAuthConfig};

/// Origin of a token update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenSource {
    /// The OAuth consumer obtained or refreshed tokens
    OAuth,
    /// The API consumer's token was set directly
    Api,
    /// The embedding application
    External,
}

/// Routing table for token updates
///
/// Holds the token slots of the consumers created by the connector. Each slot
/// is registered at most once.
#[derive(Debug, Default)]
struct Relay {
    oauth: OnceLock<Arc<TokenSlot>>,
    api: OnceLock<Arc<TokenSlot>>,
}

impl Relay {
    fn propagate(&self, access_token: Option<&str>, renew_token: Option<&str>, source: TokenSource) {
        if access_token.is_none() && renew_token.is_none() {
            return;
        }

        if source != TokenSource::Api {
            if let Some(api) = self.api.get() {
                // The API consumer has no use for a renew token
                api.update(access_token, None);
            }
        }

        if source != TokenSource::OAuth {
            if let Some(oauth) = self.oauth.get() {
                oauth.update(access_token, renew_token);
            }
        }

        tracing::debug!(
            ?source,
            access_token = access_token.is_some(),
            renew_token = renew_token.is_some(),
            "Propagated tokens"
        );
    }
}

/// Back-reference from a consumer to the connector that created it
#[derive(Debug, Clone)]
pub(crate) struct TokenRelay {
    source: TokenSource,
    relay: Weak<Relay>,
}

impl TokenRelay {
    /// Forward updated tokens to the connector, if it is still alive
    pub(crate) fn notify(&self, access_token: Option<&str>, renew_token: Option<&str>) {
        match self.relay.upgrade() {
            Some(relay) => relay.propagate(access_token, renew_token, self.source),
            None => tracing::trace!(source = ?self.source, "Connector gone, tokens not propagated"),
        }
    }
}

/// Wrapper for interacting with Amelie, the Inter-Actief web site
///
/// OAuth and API functionality have to be initialized with
/// [`init_oauth`](Self::init_oauth) and [`init_api`](Self::init_api) before
/// use. Each can be initialized once per connector.
#[derive(Debug, Default)]
pub struct Connector {
    oauth: Option<OAuthConsumer>,
    api: Option<ApiConsumer>,
    relay: Arc<Relay>,
}

impl Connector {
    /// Create a connector with neither consumer initialized
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn relay_for(&self, source: TokenSource) -> TokenRelay {
        TokenRelay {
            source,
            relay: Arc::downgrade(&self.relay),
        }
    }

    /// Initialize the OAuth consumer
    ///
    /// A configured access token is handed to an already initialized API
    /// consumer that has no token of its own.
    ///
    /// # Panics
    ///
    /// Panics if the OAuth consumer was already initialized on this connector.
    ///
    /// # Errors
    ///
    /// Returns an error if the consumer cannot be constructed from `config`.
    pub fn init_oauth(&mut self, config: OAuthConfig) -> AuthResult<&OAuthConsumer> {
        assert!(
            self.oauth.is_none(),
            "OAuth consumer is already initialized on this connector"
        );

        let oauth = OAuthConsumer::new(config)?.bind(self.relay_for(TokenSource::OAuth));
        let slot = oauth.token_slot();
        let known = slot.snapshot();
        let _ = self.relay.oauth.set(slot);

        // A token set on the API consumer is kept
        if self.api.as_ref().is_none_or(|api| api.access_token().is_none()) {
            self.relay
                .propagate(known.access_token.as_deref(), None, TokenSource::OAuth);
        }

        Ok(self.oauth.insert(oauth))
    }

    /// Initialize the API consumer
    ///
    /// Without a token in `config`, the consumer starts with the OAuth
    /// consumer's access token when one is known.
    ///
    /// # Panics
    ///
    /// Panics if the API consumer was already initialized on this connector.
    ///
    /// # Errors
    ///
    /// Returns an error if the consumer cannot be constructed from `config`.
    pub fn init_api(&mut self, config: ApiConfig) -> Result<&ApiConsumer, ApiError> {
        assert!(
            self.api.is_none(),
            "API consumer is already initialized on this connector"
        );

        let api = ApiConsumer::new(config)?.bind(self.relay_for(TokenSource::Api));
        let _ = self.relay.api.set(api.token_slot());

        if api.access_token().is_none() {
            let known = self.oauth.as_ref().and_then(|oauth| oauth.access_token().ok());
            self.relay
                .propagate(known.as_deref(), None, TokenSource::OAuth);
        }

        Ok(self.api.insert(api))
    }

    /// The OAuth consumer, if initialized
    #[must_use]
    pub fn oauth(&self) -> Option<&OAuthConsumer> {
        self.oauth.as_ref()
    }

    /// The API consumer, if initialized
    #[must_use]
    pub fn api(&self) -> Option<&ApiConsumer> {
        self.api.as_ref()
    }

    /// Copy tokens into the initialized consumers
    ///
    /// Only given tokens are written; `None` leaves the current value in
    /// place. The consumer matching `source` is skipped. The access token goes
    /// to both consumers, the renew token only to the OAuth consumer.
    pub fn propagate_tokens(
        &self,
        access_token: Option<&str>,
        renew_token: Option<&str>,
        source: TokenSource,
    ) {
        self.relay.propagate(access_token, renew_token, source);
    }
}
