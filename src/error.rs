//! Error types for the Inter-Actief connector
//!
//! Remote JSON-RPC failures are classified by their numeric error code into
//! [`ApiErrorKind`]. The table is static; codes without an entry resolve to
//! [`ApiErrorKind::Generic`].

use thiserror::Error;

use crate::auth::OAuthError;

/// Classification of a remote API error by its JSON-RPC error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// The given token is rejected (403)
    NotLoggedIn,
    /// The given device id is rejected (406)
    UnknownDevice,
    /// Could not sign up the user for the activity (412)
    SignupRejected,
    /// Unexpected server side error (500)
    ServerError,
    /// Any other, unregistered or absent code
    Generic,
}

/// Registered error codes and the kind each one resolves to
const ERROR_CODES: &[(i64, ApiErrorKind)] = &[
    (403, ApiErrorKind::NotLoggedIn),
    (406, ApiErrorKind::UnknownDevice),
    (412, ApiErrorKind::SignupRejected),
    (500, ApiErrorKind::ServerError),
];

impl ApiErrorKind {
    /// The error code registered for this kind, `None` for [`ApiErrorKind::Generic`]
    #[must_use]
    pub fn code(self) -> Option<i64> {
        ERROR_CODES
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(code, _)| *code)
    }
}

/// Resolve a JSON-RPC error code to its error kind.
///
/// # Example
/// ```
/// use iaconnector::error::{resolve_error, ApiErrorKind};
///
/// assert_eq!(resolve_error(Some(412)), ApiErrorKind::SignupRejected);
/// assert_eq!(resolve_error(Some(-32700)), ApiErrorKind::Generic);
/// assert_eq!(resolve_error(None), ApiErrorKind::Generic);
/// ```
#[must_use]
pub fn resolve_error(code: Option<i64>) -> ApiErrorKind {
    code.and_then(|code| {
        ERROR_CODES
            .iter()
            .find(|(registered, _)| *registered == code)
            .map(|(_, kind)| *kind)
    })
    .unwrap_or(ApiErrorKind::Generic)
}

/// Errors returned by the API consumer
#[derive(Error, Debug)]
pub enum ApiError {
    /// The token was rejected; fetch or renew a token and retry
    #[error("Not logged in: {message}")]
    NotLoggedIn {
        /// Message reported by the server
        message: String,
    },

    /// The device id was rejected
    #[error("Unknown device: {message}")]
    UnknownDevice {
        /// Message reported by the server
        message: String,
    },

    /// The activity signup (or signup revocation) was rejected
    #[error("Signup rejected: {message}")]
    SignupRejected {
        /// Message reported by the server
        message: String,
    },

    /// The server failed unexpectedly
    #[error("Server error: {message}")]
    ServerError {
        /// Message reported by the server
        message: String,
    },

    /// Remote error without a registered code
    #[error("API error ({}): {}", display_code(.code), .message.as_deref().unwrap_or("no message"))]
    Generic {
        /// Error code, if the server sent one
        code: Option<i64>,
        /// Error message, if the server sent one
        message: Option<String>,
    },

    /// The server answered with something that is not a JSON-RPC response
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// HTTP transport failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid consumer configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

fn display_code(code: &Option<i64>) -> String {
    code.map_or_else(|| "unknown".to_string(), |c| c.to_string())
}

impl ApiError {
    /// Build the error for a remote `{code, message}` error record.
    ///
    /// Registered codes map to their specific variant; anything else becomes
    /// [`ApiError::Generic`].
    pub fn from_code(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        match resolve_error(Some(code)) {
            ApiErrorKind::NotLoggedIn => Self::NotLoggedIn { message },
            ApiErrorKind::UnknownDevice => Self::UnknownDevice { message },
            ApiErrorKind::SignupRejected => Self::SignupRejected { message },
            ApiErrorKind::ServerError => Self::ServerError { message },
            ApiErrorKind::Generic => Self::Generic {
                code: Some(code),
                message: Some(message),
            },
        }
    }

    /// Create a generic remote error
    #[must_use]
    pub fn generic(code: Option<i64>, message: Option<String>) -> Self {
        Self::Generic { code, message }
    }

    /// Create an invalid response error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Taxonomy kind of a remote error, `None` for local failures
    #[must_use]
    pub fn kind(&self) -> Option<ApiErrorKind> {
        match self {
            Self::NotLoggedIn { .. } => Some(ApiErrorKind::NotLoggedIn),
            Self::UnknownDevice { .. } => Some(ApiErrorKind::UnknownDevice),
            Self::SignupRejected { .. } => Some(ApiErrorKind::SignupRejected),
            Self::ServerError { .. } => Some(ApiErrorKind::ServerError),
            Self::Generic { .. } => Some(ApiErrorKind::Generic),
            Self::InvalidResponse(_) | Self::Http(_) | Self::InvalidConfig(_) => None,
        }
    }

    /// Remote error code, if any
    #[must_use]
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Generic { code, .. } => *code,
            other => other.kind().and_then(ApiErrorKind::code),
        }
    }

    /// Message reported by the server, if this is a remote error
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::NotLoggedIn { message }
            | Self::UnknownDevice { message }
            | Self::SignupRejected { message }
            | Self::ServerError { message } => Some(message),
            Self::Generic { message, .. } => message.as_deref(),
            Self::InvalidResponse(_) | Self::Http(_) | Self::InvalidConfig(_) => None,
        }
    }
}

/// Crate level error covering both consumers
#[derive(Error, Debug)]
pub enum Error {
    /// API consumer failure
    #[error(transparent)]
    Api(#[from] ApiError),

    /// OAuth consumer failure
    #[error(transparent)]
    OAuth(#[from] OAuthError),
}

/// Result type alias for connector operations
pub type Result<T> = std::result::Result<T, Error>;
