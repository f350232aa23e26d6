//! Consumer for the Inter-Actief JSON-RPC API
//!
//! Every remote procedure is called with a POST of
//! `{"method": ..., "params": [...], "id": ...}` to the API base URL, carrying
//! the access token as a bearer token when one is set. The response body is
//! read as JSON whatever the HTTP status, and a JSON-RPC `error` member is
//! mapped onto [`ApiError`](crate::ApiError) by its code.
//!
//! # Example
//!
//! ```no_run
//! use iaconnector::api::ApiConsumer;
//! use iaconnector::types::ApiConfig;
//!
//! # async fn example() -> Result<(), iaconnector::ApiError> {
//! let api = ApiConsumer::new(ApiConfig::default())?;
//! api.set_access_token("token-from-oauth");
//!
//! let person = api.get_person_details().await?;
//! println!("Logged in as {:?}", person.get("name"));
//! # Ok(())
//! # }
//! ```

mod consumer;
mod methods;
mod rpc;
mod types;

pub use consumer::ApiConsumer;
pub use types::{ActivityId, Record, SignupOption};
