//! Per-action configuration parameters.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Raw configuration parameters attached to one action on one stub.
///
/// The serving engine stores these as a JSON object; each action decides
/// how to interpret them via [`Parameters::as_type`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Parameters(serde_json::Map<String, serde_json::Value>);

impl Parameters {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes a typed value into a parameter set.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` does not serialize to a JSON object.
    pub fn from_value<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        match serde_json::to_value(value)? {
            serde_json::Value::Object(map) => Ok(Self(map)),
            other => Err(serde::ser::Error::custom(format!(
                "parameters must be a JSON object, got {other}"
            ))),
        }
    }

    /// Deserializes the parameters into a typed value.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters do not match the shape of `T`.
    pub fn as_type<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(self.0.clone()))
    }

    /// Returns the value for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// Returns the parameters as a JSON value.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(self.0.clone())
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Parameters {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(map)
    }
}
