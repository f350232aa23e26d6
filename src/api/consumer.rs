//! API consumer for the Inter-Actief JSON-RPC API

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::rpc::{RpcRequest, parse_response};
use crate::auth::{TokenPair, TokenSlot};
use crate::connector::TokenRelay;
use crate::error::ApiError;
use crate::types::{ApiConfig, RequestId};
use crate::utils::{USER_AGENT, build_http_client, normalize_base_url};

/// API consumer for the Inter-Actief API
///
/// Every call is a single JSON-RPC request; failures are returned to the
/// caller without retrying. Set the access token directly with
/// [`set_access_token`](Self::set_access_token) or let a
/// [`Connector`](crate::Connector) push it in after an OAuth exchange.
#[derive(Debug)]
pub struct ApiConsumer {
    base_url: String,
    preview: bool,
    http_client: reqwest::Client,
    tokens: Arc<TokenSlot>,
    relay: Option<TokenRelay>,
}

impl ApiConsumer {
    /// Create a new API consumer
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an absolute URL or the HTTP
    /// client cannot be constructed.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(&config.base_url);
        Url::parse(&base_url)
            .map_err(|e| ApiError::invalid_config(format!("invalid base URL {base_url}: {e}")))?;

        let user_agent = if config.preview {
            format!("{USER_AGENT} (preview)")
        } else {
            USER_AGENT.to_string()
        };
        let http_client = build_http_client(config.timeout, &user_agent)?;

        tracing::debug!(url = %base_url, preview = config.preview, "API initialized");

        Ok(Self {
            base_url,
            preview: config.preview,
            http_client,
            tokens: Arc::new(TokenSlot::new(TokenPair::new(config.access_token, None))),
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

    /// The normalized base URL, always ending with `/`
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether requests are tagged as preview traffic
    #[must_use]
    pub fn is_preview(&self) -> bool {
        self.preview
    }

    /// The access token sent with every call, if any
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.tokens.access_token()
    }

    /// Use `token` for subsequent calls
    ///
    /// When this consumer belongs to a [`Connector`](crate::Connector) the
    /// token is also handed to its OAuth consumer.
    pub fn set_access_token(&self, token: impl Into<String>) {
        let token = token.into();
        self.tokens.update(Some(&token), None);
        if let Some(relay) = &self.relay {
            relay.notify(Some(&token), None);
        }
    }

    /// Perform a JSON-RPC call and decode its result
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] matching the remote error code, or
    /// [`ApiError::InvalidResponse`] if the response is not a JSON-RPC
    /// answer or its result does not decode into `T`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, ApiError> {
        let result = self.call_raw(method, params).await?;
        serde_json::from_value(result).map_err(|e| {
            ApiError::invalid_response(format!("unexpected result for {method}: {e}"))
        })
    }

    /// Perform a JSON-RPC call and return its raw result
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn call_raw(&self, method: &str, params: Vec<Value>) -> Result<Value, ApiError> {
        let id = RequestId::random();
        let request = RpcRequest {
            method,
            params: &params,
            id: &id,
        };

        let mut builder = self.http_client.post(&self.base_url).json(&request);
        if let Some(token) = self.tokens.access_token() {
            builder = builder.bearer_auth(token);
        }

        tracing::debug!(method, %id, "Calling API method");
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        parse_response(&body).inspect_err(|e| {
            tracing::warn!(method, %id, %status, error = %e, "API call failed");
        })
    }
}
