use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Uniform response body of both the metadata and document services:
/// `ok` plus either `data` or an `error` message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub ok: bool,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    pub fn success(data: Value) -> Self {
        Self {
            ok: true,
            data,
            error: None,
        }
    }

    pub fn failure(message: &str) -> Self {
        Self {
            ok: false,
            data: Value::Null,
            error: Some(message.to_string()),
        }
    }

    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Unwrap the payload, surfacing the server-supplied message on `ok: false`.
    pub fn into_data(self) -> Result<Value, String> {
        if self.ok {
            Ok(self.data)
        } else {
            Err(self
                .error
                .unwrap_or_else(|| "request failed without error detail".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_envelope_yields_data() {
        let env = Envelope::parse(br#"{"ok": true, "data": {"id": 3}}"#).unwrap();
        assert_eq!(env.into_data().unwrap(), json!({"id": 3}));
    }

    #[test]
    fn failed_envelope_yields_server_message() {
        let env = Envelope::parse(br#"{"ok": false, "error": "schema not found"}"#).unwrap();
        assert_eq!(env.into_data().unwrap_err(), "schema not found");
    }

    #[test]
    fn failed_envelope_without_message_still_errors() {
        let env = Envelope::parse(br#"{"ok": false}"#).unwrap();
        assert!(env.into_data().is_err());
    }

    #[test]
    fn garbage_body_is_a_parse_error() {
        assert!(Envelope::parse(b"<html>bad gateway</html>").is_err());
    }
}
