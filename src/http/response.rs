//! Interpretation of raw HTTP responses.
//!
//! Listmonk wraps successful payloads as `{"data": ...}` and reports failures
//! as `{"message": "..."}`, sometimes with a 2xx status.

use reqwest::StatusCode;
use serde_json::Value;

use super::error::ApiError;

/// Decodes a response body that may or may not be JSON.
///
/// Empty text yields `None`; text that is not valid JSON is kept as an opaque
/// JSON string.
pub fn parse_maybe_json(raw: &str) -> Option<Value> {
    if raw.is_empty() {
        return None;
    }

    Some(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())))
}

/// Message to report for a non-2xx response, if the body provides one.
pub fn error_message(body: Option<&Value>) -> Option<&str> {
    match body? {
        Value::String(text) if !text.is_empty() => Some(text),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty()),
        _ => None,
    }
}

/// An object with a string `message` and no `data` is an error envelope.
pub fn application_error_message(body: Option<&Value>) -> Option<&str> {
    let map = body?.as_object()?;
    if map.contains_key("data") {
        return None;
    }
    map.get("message")?.as_str()
}

/// Classifies one received response as a decoded success body or an error.
pub fn interpret(status: StatusCode, raw_body: String) -> Result<Value, ApiError> {
    let body = parse_maybe_json(&raw_body);

    if !status.is_success() {
        let message = error_message(body.as_ref())
            .map(str::to_string)
            .unwrap_or_else(|| status_line(status));
        return Err(ApiError::rejected(status.as_u16(), message, body, raw_body));
    }

    if let Some(message) = application_error_message(body.as_ref()).map(str::to_string) {
        return Err(ApiError::application(status.as_u16(), message, body, raw_body));
    }

    Ok(body.unwrap_or(Value::Null))
}

/// Strips the `{"data": ...}` envelope. Other bodies pass through untouched.
pub fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}
