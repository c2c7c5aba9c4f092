// src/api/envelope.rs
//! Response envelope decoding.
//!
//! Every successful response is a JSON object carrying its payload under a
//! command-specific property. The service nests arbitrary structured
//! configuration as a base64-encoded JSON string named `config`; it is
//! unwrapped here, once, so nothing downstream ever sees the encoded form.

use crate::constants::{ERROR_BODY_PREVIEW_LENGTH, UNKNOWN_ERROR_MESSAGE};
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use serde_json::Value;

const CONFIG_PROPERTY: &str = "config";

/// Extracts the payload stored under `property` from a successful body.
///
/// Returns `None` when the body is not JSON or the payload is missing or
/// empty. Any `config` blob on the payload, or on each item of a list
/// payload, is decoded in place.
pub fn extract_payload(body: &str, property: &str) -> Option<Value> {
    let envelope: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            log::warn!(
                "Response is not JSON ({}): {}",
                e,
                preview(body)
            );
            return None;
        }
    };

    let mut payload = match envelope {
        Value::Object(mut map) => map.remove(property)?,
        _ => return None,
    };
    if is_empty_payload(&payload) {
        return None;
    }

    match &mut payload {
        Value::Array(items) => items.iter_mut().for_each(decode_config_property),
        other => decode_config_property(other),
    }
    Some(payload)
}

/// The `error` property of a failed response body, or a generic message.
pub fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| match value.get("error") {
            Some(Value::String(message)) if !message.trim().is_empty() => Some(message.clone()),
            Some(Value::Object(detail)) => detail
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        })
        .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string())
}

/// Decodes a base64 + JSON config blob.
pub fn decode_config(encoded: &str) -> Option<Value> {
    let bytes = BASE64_STANDARD.decode(encoded.trim()).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Encodes a config value the way the service sends it.
pub fn encode_config(config: &Value) -> String {
    BASE64_STANDARD.encode(config.to_string())
}

/// Replaces an encoded `config` string with its decoded value, or with
/// `null` when it does not decode.
fn decode_config_property(item: &mut Value) {
    let Some(config) = item.get_mut(CONFIG_PROPERTY) else {
        return;
    };
    if let Value::String(encoded) = config {
        *config = decode_config(encoded).unwrap_or_else(|| {
            log::debug!("Undecodable config blob replaced with null");
            Value::Null
        });
    }
}

/// Payloads that carry no data: absent, `null`, `false`, `0`, `""`, `"0"`,
/// `[]` and `{}`.
fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn preview(body: &str) -> String {
    if body.chars().count() > ERROR_BODY_PREVIEW_LENGTH {
        let cut: String = body.chars().take(ERROR_BODY_PREVIEW_LENGTH).collect();
        format!("{}...", cut)
    } else {
        body.to_string()
    }
}
