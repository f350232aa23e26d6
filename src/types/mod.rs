//! Type definitions for the Inter-Actief connector
//!
//! Configuration options for both consumers and the newtypes they use.

pub mod identifiers;
pub mod options;

pub use identifiers::{ClientSecret, RequestId, Scope};
pub use options::{
    ApiConfig, ApiConfigBuilder, DEFAULT_API_BASE_URL, DEFAULT_OAUTH_BASE_URL, OAuthConfig,
    OAuthConfigBuilder,
};
