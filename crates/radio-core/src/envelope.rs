//! Server response bodies.
//!
//! Each endpoint reads only the field it needs. A field that is missing or
//! has an unexpected type counts as absent for that field alone; a body that
//! is not a JSON object at all is treated as empty by callers.

use serde_json::{Map, Value};

/// Text used when the server flags an error without a usable message
pub const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Envelope {
    fields: Map<String, Value>,
}

impl Envelope {
    pub fn decode(raw: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(fields)) => Some(Self { fields }),
            Ok(other) => {
                tracing::debug!("Response body is not an object: {}", other);
                None
            }
            Err(e) => {
                if !raw.trim().is_empty() {
                    tracing::debug!("Undecodable response body ({}): {:?}", e, raw);
                }
                None
            }
        }
    }

    /// Non-empty message payload, if any
    pub fn message_text(&self) -> Option<&str> {
        self.fields
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
    }

    /// Server-reported error. Any non-null `error` counts; its text is used
    /// when it is a non-blank string.
    pub fn error_text(&self) -> Option<String> {
        match self.fields.get("error")? {
            Value::Null => None,
            Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
            _ => Some(UNKNOWN_ERROR.to_string()),
        }
    }

    /// String entries of `users`, if it is an array
    pub fn users(&self) -> Option<Vec<String>> {
        let users = self.fields.get("users")?.as_array()?;
        Some(
            users
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect(),
        )
    }
}

pub fn server_error(raw: &str) -> Option<String> {
    Envelope::decode(raw)?.error_text()
}

pub fn user_list(raw: &str) -> Option<Vec<String>> {
    Envelope::decode(raw)?.users()
}
