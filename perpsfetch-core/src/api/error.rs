//! API response envelope and structured error types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Structured error types for API operations.
///
/// Callers branch on the variant; the message is for humans only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("API key required: set API_KEY or pass --api-key")]
    CredentialMissing,

    #[error("invalid API key (HTTP 401)")]
    AuthFailed,

    #[error("rate limit exceeded (HTTP 429)")]
    RateLimited,

    #[error("API error: HTTP {status}")]
    Http { status: u16 },

    #[error("network error: {0}")]
    Network(String),

    #[error("response decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// Map a non-success HTTP status to its error variant.
    ///
    /// Only 200 counts as success; every other status is an error.
    pub fn check_status(status: u16) -> Result<(), ApiError> {
        match status {
            200 => Ok(()),
            401 => Err(ApiError::AuthFailed),
            429 => Err(ApiError::RateLimited),
            status => Err(ApiError::Http { status }),
        }
    }
}

/// Response envelope returned by every endpoint.
///
/// Records are opaque. Only the enclosing `data` list is interpreted; all
/// other top-level fields are kept as-is in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ApiResponse {
    /// Build a response holding only records.
    pub fn from_records(data: Vec<Value>) -> Self {
        Self {
            data,
            extra: Map::new(),
        }
    }

    /// Decode a JSON body. The body must be an object; a missing or null
    /// `data` field means no records.
    pub fn from_value(body: Value) -> Result<Self, ApiError> {
        let Value::Object(mut fields) = body else {
            return Err(ApiError::Decode("expected a JSON object".into()));
        };

        let data = match fields.remove("data") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(records)) => records,
            Some(other) => {
                return Err(ApiError::Decode(format!(
                    "`data` must be a list, got {}",
                    json_kind(&other)
                )))
            }
        };

        Ok(Self {
            data,
            extra: fields,
        })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError::check_status(200), Ok(()));
        assert_eq!(ApiError::check_status(401), Err(ApiError::AuthFailed));
        assert_eq!(ApiError::check_status(429), Err(ApiError::RateLimited));
        assert_eq!(
            ApiError::check_status(500),
            Err(ApiError::Http { status: 500 })
        );
        // 2xx other than 200 is still an error
        assert_eq!(
            ApiError::check_status(204),
            Err(ApiError::Http { status: 204 })
        );
    }

    #[test]
    fn decode_keeps_extra_fields() {
        let resp = ApiResponse::from_value(json!({
            "cached": true,
            "data": [{"symbol": "BTC-USD"}],
            "pagination": {"limit": 1, "offset": 0}
        }))
        .unwrap();

        assert_eq!(resp.len(), 1);
        assert_eq!(resp.extra["cached"], json!(true));
        assert!(resp.extra.contains_key("pagination"));
        assert!(!resp.extra.contains_key("data"));
    }

    #[test]
    fn decode_missing_or_null_data_is_empty() {
        assert!(ApiResponse::from_value(json!({})).unwrap().is_empty());
        assert!(ApiResponse::from_value(json!({"data": null}))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn decode_rejects_non_object_and_non_list() {
        assert!(matches!(
            ApiResponse::from_value(json!([1, 2])),
            Err(ApiError::Decode(_))
        ));
        assert!(matches!(
            ApiResponse::from_value(json!({"data": "nope"})),
            Err(ApiError::Decode(_))
        ));
    }
}
