use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top-level status value providers use for a successful response.
const SUCCESS_STATUS: &str = "success";

/// Opaque nested payload returned by a provider for one or more instruments.
///
/// The shape (and the delimiter used in compound keys inside it) varies by
/// endpoint and API version. Only the normalizer and extractors look inside.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawQuoteBlob(Value);

impl RawQuoteBlob {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Parse a blob from a response body.
    pub fn from_json_str(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body).map(Self)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// The top-level `status` field, if present.
    pub fn status(&self) -> Option<&str> {
        self.0.get("status").and_then(Value::as_str)
    }

    pub fn is_success(&self) -> bool {
        self.status()
            .is_some_and(|s| s.eq_ignore_ascii_case(SUCCESS_STATUS))
    }

    /// The `data` section, whatever its shape.
    pub fn data(&self) -> Option<&Value> {
        self.0.get("data").filter(|v| !v.is_null())
    }

    /// The `data` section when it is keyed by instrument.
    pub fn data_object(&self) -> Option<&Map<String, Value>> {
        self.data().and_then(Value::as_object)
    }

    /// First provider error message, if the payload carries an `errors` list.
    pub fn error_message(&self) -> Option<&str> {
        self.0
            .get("errors")
            .and_then(Value::as_array)
            .and_then(|errors| errors.first())
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
    }
}

impl From<Value> for RawQuoteBlob {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
