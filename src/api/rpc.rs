//! JSON-RPC request and response handling

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::types::RequestId;

/// JSON-RPC request body
#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub(crate) method: &'a str,
    pub(crate) params: &'a [Value],
    pub(crate) id: &'a RequestId,
}

/// Extract the `result` of a JSON-RPC response body.
///
/// A non-null `error` member becomes the matching [`ApiError`]; anything that
/// is not a JSON object with a `result` member is an invalid response.
pub(crate) fn parse_response(body: &str) -> Result<Value, ApiError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ApiError::invalid_response(format!("response is not valid JSON: {e}")))?;

    let Value::Object(mut response) = value else {
        return Err(ApiError::invalid_response(
            "response is not a JSON object",
        ));
    };

    match response.remove("error") {
        None | Some(Value::Null) => {}
        Some(error) => return Err(remote_error(&error)),
    }

    response
        .remove("result")
        .ok_or_else(|| ApiError::invalid_response("response has no result"))
}

/// Map a JSON-RPC `error` member onto the error taxonomy
fn remote_error(error: &Value) -> ApiError {
    let code = error.get("code").and_then(numeric_code);
    let message = match error {
        Value::String(message) => Some(message.clone()),
        _ => error.get("message").and_then(|message| match message {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }),
    };

    match (code, message) {
        (Some(code), Some(message)) => ApiError::from_code(code, message),
        (code, message) => ApiError::generic(code, message),
    }
}

/// Integral error code; `412.0` counts as `412`
fn numeric_code(code: &Value) -> Option<i64> {
    code.as_i64().or_else(|| {
        code.as_f64()
            .filter(|c| c.fract() == 0.0 && *c >= i64::MIN as f64 && *c < i64::MAX as f64)
            .map(|c| c as i64)
    })
}
