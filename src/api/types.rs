//! Values exchanged with the JSON-RPC API

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON object as returned by the API
///
/// Person and activity records are passed through unmodified; their fields
/// are defined by the server.
pub type Record = serde_json::Map<String, Value>;

/// Activity identifier
pub type ActivityId = i64;

/// Answer to one enrollment option of an activity
///
/// `value` is whatever the option expects: a boolean for checkboxes, a
/// number or string for fields, the chosen choice id for selections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignupOption {
    /// Enrollment option id
    pub id: i64,
    /// Answer for this option
    pub value: Value,
}

impl SignupOption {
    /// Create an answer for option `id`
    pub fn new(id: i64, value: impl Into<Value>) -> Self {
        Self {
            id,
            value: value.into(),
        }
    }
}
