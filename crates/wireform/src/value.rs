//! value representation
//!
//! The universal currency of the conversion engine. Both the human form and
//! the wire form of a configuration are trees of [Value]:
//! - boolean (true/false)
//! - integer (signed, currently: i64 - may change)
//! - decimal (currently: f64 - may change)
//! - string (utf-8)
//! - array ("list" of values)
//! - object (order-preserving "map"/"dictionary", where the key is of type string)
//!
//! Additionally:
//! - there is no `null`/`None` value. On the wire (JSON) `null` means "absent"
//!   and is dropped during [Value::from_json].
//! - shape is implied by context; a [Value] carries no schema of its own
//! - numeric type ranges (min/max) for `integer` or `decimal` are currently not
//!   defined and are subject to change
use serde::{
    ser::{SerializeMap, SerializeSeq},
    Serializer,
};

/// All possible value types
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    String(String),
    Array(Vec<Value>),
    Object(indexmap::IndexMap<String, Value>),
}

impl Value {
    /// Convert wire JSON into a [Value]
    ///
    /// Returns [None] for `null`. Inside objects a `null` entry is dropped
    /// (an absent field), inside arrays a `null` element is dropped as well.
    /// Out-of-range numbers fall back to their decimal representation.
    pub fn from_json(value: serde_json::Value) -> Option<Value> {
        use serde_json::Value as Json;

        match value {
            Json::Null => None,
            Json::Bool(b) => Some(b.into()),
            Json::Number(num) => {
                if let Some(int) = num.as_i64() {
                    return Some(Value::Integer(int));
                }

                num.as_f64().map(Value::Decimal)
            }
            Json::String(s) => Some(s.into()),
            Json::Array(items) => Some(Value::Array(
                items.into_iter().flat_map(Value::from_json).collect(),
            )),
            Json::Object(fields) => Some(Value::Object(
                fields
                    .into_iter()
                    .flat_map(|(key, value)| Value::from_json(value).map(|value| (key, value)))
                    .collect(),
            )),
        }
    }

    pub fn as_object(&self) -> Option<&indexmap::IndexMap<String, Value>> {
        match self {
            Value::Object(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this value counts as "populated" when scanning variant keys
    ///
    /// Scalars are always populated; strings, arrays and objects are populated
    /// when non-empty.
    pub fn is_populated(&self) -> bool {
        match self {
            Value::Boolean(_) | Value::Integer(_) | Value::Decimal(_) => true,
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(fields) => !fields.is_empty(),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

impl<K: ToString, V: Into<Value>> From<indexmap::IndexMap<K, V>> for Value {
    fn from(value: indexmap::IndexMap<K, V>) -> Self {
        Value::Object(
            value
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.into()))
                .collect(),
        )
    }
}

impl serde::ser::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Boolean(value) => serializer.serialize_bool(*value),
            Value::Integer(value) => serializer.serialize_i64(*value),
            Value::Decimal(value) => serializer.serialize_f64(*value),
            Value::String(value) => serializer.serialize_str(value),
            Value::Array(value) => {
                let mut ser = serializer.serialize_seq(Some(value.len()))?;
                for element in value {
                    ser.serialize_element(element)?;
                }
                ser.end()
            }
            Value::Object(value) => {
                let mut ser = serializer.serialize_map(Some(value.len()))?;
                for (element_key, element_value) in value {
                    ser.serialize_entry(element_key, element_value)?;
                }
                ser.end()
            }
        }
    }
}
