//! Named wrappers around the remote procedures
//!
//! | Method                     | Remote procedure      |
//! |----------------------------|-----------------------|
//! | `get_device_id`            | `getDeviceId`         |
//! | `get_auth_token`           | `getAuthToken`        |
//! | `check_auth_token`         | `checkAuthToken`      |
//! | `revoke_auth_token`        | `revokeAuthToken`     |
//! | `get_person_details`       | `getPersonDetails`    |
//! | `get_activity_stream`      | `getActivityStream`   |
//! | `get_activity_details`     | `getActivityDetailed` |
//! | `activity_signup`          | `activitySignup`      |
//! | `revoke_activity_signup`   | `activityRevokeSignup`|

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde_json::json;

use super::consumer::ApiConsumer;
use super::types::{ActivityId, Record, SignupOption};
use crate::error::ApiError;

impl ApiConsumer {
    /// Request a new device id for [`get_auth_token`](Self::get_auth_token)
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn get_device_id(&self) -> Result<String, ApiError> {
        self.call("getDeviceId", Vec::new()).await
    }

    /// Log in with a username and password
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the credentials are rejected.
    #[deprecated(note = "log in through OAuth instead of handling passwords")]
    pub async fn get_auth_token(
        &self,
        username: &str,
        password: &str,
        device_id: &str,
    ) -> Result<String, ApiError> {
        self.call(
            "getAuthToken",
            vec![json!(username), json!(password), json!(device_id)],
        )
        .await
    }

    /// Check whether the current access token is accepted
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn check_auth_token(&self) -> Result<bool, ApiError> {
        self.call("checkAuthToken", Vec::new()).await
    }

    /// Invalidate the current access token on the server
    ///
    /// The locally held token is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn revoke_auth_token(&self) -> Result<bool, ApiError> {
        self.call("revokeAuthToken", Vec::new()).await
    }

    /// Details of the logged in person
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotLoggedIn`] without a valid access token.
    pub async fn get_person_details(&self) -> Result<Record, ApiError> {
        self.call("getPersonDetails", Vec::new()).await
    }

    /// Activities between `begin` and `end`
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn get_activity_stream(
        &self,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Record>, ApiError> {
        self.call(
            "getActivityStream",
            vec![json!(begin.to_rfc3339()), json!(end.to_rfc3339())],
        )
        .await
    }

    /// Full details of one activity
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn get_activity_details(&self, id: ActivityId) -> Result<Record, ApiError> {
        self.call("getActivityDetailed", vec![json!(id)]).await
    }

    /// Enroll the logged in person for an activity
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::SignupRejected`] when the enrollment is refused,
    /// for instance because the activity is full.
    pub async fn activity_signup(
        &self,
        id: ActivityId,
        price: f64,
        options: &[SignupOption],
    ) -> Result<(), ApiError> {
        let params = vec![json!(id), json!(price), json!(options)];
        let _: IgnoredAny = self.call("activitySignup", params).await?;
        Ok(())
    }

    /// Undo an enrollment
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::SignupRejected`] when the enrollment cannot be
    /// revoked anymore.
    pub async fn revoke_activity_signup(&self, id: ActivityId) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .call("activityRevokeSignup", vec![json!(id)])
            .await?;
        Ok(())
    }
}
