//! JSON response envelopes shared by the HTTP routers.
//!
//! Successful responses carry `"success": true` plus the payload fields; failures carry
//! `"success": false` and a human readable `"error"`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};

/// Merge `fields` into a success envelope.
pub fn success(status: StatusCode, fields: Value) -> Response {
    let mut body = Map::new();
    body.insert("success".to_string(), Value::Bool(true));
    if let Value::Object(fields) = fields {
        body.extend(fields);
    }
    (status, Json(Value::Object(body))).into_response()
}

pub fn failure(status: StatusCode, error: impl Into<String>) -> Response {
    let payload = json!({
        "success": false,
        "error": error.into(),
    });
    (status, Json(payload)).into_response()
}

/// Raw JSON body with an explicit status, for envelopes carrying extra keys.
pub fn with_status(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

/// Serialize `value` or fall back to an internal error envelope.
pub fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, Response> {
    serde_json::to_value(value).map_err(|error| {
        tracing::error!(%error, "response serialization failed");
        failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode response")
    })
}
