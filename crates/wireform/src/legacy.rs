//! deprecated/current location shape bridge
//!
//! A dataset location entry has two valid human spellings for the same datum:
//!
//! - deprecated, flat: the variant sub-block sits directly on the entry
//!   (`relational_location = [{...}]`)
//! - current, nested: the variant sub-block sits inside a `location` block
//!   (`location = [{ relational_location = [{...}] }]`)
//!
//! Both encode to the same canonical wire shape `{dataStoreId, location}`.
//! Decoding is deliberately not a pure function of the wire value alone: it
//! re-emits whichever spelling the previously stored entry used, so a read
//! right after a write reports no difference and the author's chosen syntax
//! never oscillates. With no prior state the current spelling wins.
use crate::error::ConvertError;
use crate::location::{DatasetLocation, GenericLocation, LocationKind};
use crate::value::Value;
use indexmap::IndexMap;

const DATASTORE_KEY: &str = "datastore";
const CURRENT_KEY: &str = "location";
const WIRE_DATASTORE_KEY: &str = "dataStoreId";
const WIRE_LOCATION_KEY: &str = "location";

/// Two field names addressing one logical datum in two shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_new::new)]
pub struct LegacyFieldPair {
    pub deprecated: &'static str,
    pub current: &'static str,
}

/// The legacy pairs of a dataset location entry
///
/// Every flat variant key is a deprecated alias of the nested `location` key.
pub fn pairs() -> [LegacyFieldPair; 5] {
    LocationKind::ALL.map(|kind| LegacyFieldPair::new(kind.human_key(), CURRENT_KEY))
}

/// Which spelling an entry uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryShape {
    Deprecated,
    Current,
}

/// The spelling a stored human form entry uses
///
/// An entry with no location at all reads as [EntryShape::Current]; there is
/// nothing deprecated to preserve.
pub fn entry_shape(entry: &IndexMap<String, Value>) -> EntryShape {
    let deprecated = LocationKind::ALL
        .iter()
        .any(|kind| is_populated(entry, kind.human_key()));

    if deprecated {
        EntryShape::Deprecated
    } else {
        EntryShape::Current
    }
}

/// Parse a human form entry into its tagged value
///
/// Rejects entries that populate both spellings; resolving that silently
/// would have to guess which one the author meant.
pub fn parse_entry(
    entry: &IndexMap<String, Value>,
    table_scoped: bool,
) -> Result<DatasetLocation, ConvertError> {
    let datastore = entry
        .get(DATASTORE_KEY)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(ConvertError::MissingField {
            key: DATASTORE_KEY,
        })?;

    let current = is_populated(entry, CURRENT_KEY);
    let deprecated = LocationKind::ALL
        .into_iter()
        .find(|kind| is_populated(entry, kind.human_key()));

    if current {
        if let Some(kind) = deprecated {
            return Err(ConvertError::ConflictingFieldFormats {
                deprecated: kind.human_key(),
                current: CURRENT_KEY,
            });
        }
    }

    let location = if current {
        let items = entry
            .get(CURRENT_KEY)
            .and_then(Value::as_array)
            .ok_or_else(|| ConvertError::UnexpectedShape {
                key: CURRENT_KEY.to_string(),
                expected: "a block sequence",
            })?;

        if items.len() > 1 {
            return Err(ConvertError::MalformedBlockCardinality {
                key: CURRENT_KEY.to_string(),
                found: items.len(),
            });
        }

        let inner = items[0]
            .as_object()
            .ok_or_else(|| ConvertError::UnexpectedShape {
                key: CURRENT_KEY.to_string(),
                expected: "a mapping",
            })?;

        GenericLocation::from_human(inner, table_scoped)?
    } else if deprecated.is_some() {
        // the scan also rejects two populated deprecated keys
        GenericLocation::from_human(entry, table_scoped)?
    } else {
        None
    };

    Ok(DatasetLocation::new(datastore.to_string(), location))
}

/// Encode one entry into the canonical wire shape
pub fn encode_entry(
    entry: &IndexMap<String, Value>,
    table_scoped: bool,
) -> Result<Value, ConvertError> {
    let parsed = parse_entry(entry, table_scoped)?;

    let mut out = IndexMap::new();
    out.insert(
        WIRE_DATASTORE_KEY.to_string(),
        parsed.datastore.as_str().into(),
    );

    if let Some(location) = &parsed.location {
        out.insert(WIRE_LOCATION_KEY.to_string(), location.to_wire());
    }

    Ok(Value::Object(out))
}

/// Decode one wire entry back into human form
///
/// `prior` is the previously stored human form of the same entry, if any; it
/// decides the spelling, never the value.
pub fn decode_entry(
    wire: &IndexMap<String, Value>,
    prior: Option<&Value>,
) -> Result<Value, ConvertError> {
    let datastore = wire
        .get(WIRE_DATASTORE_KEY)
        .and_then(Value::as_str)
        .ok_or(ConvertError::MissingField {
            key: WIRE_DATASTORE_KEY,
        })?;

    let location = match wire.get(WIRE_LOCATION_KEY) {
        Some(value) if value.is_populated() => {
            let mapping = value
                .as_object()
                .ok_or_else(|| ConvertError::UnexpectedShape {
                    key: WIRE_LOCATION_KEY.to_string(),
                    expected: "a mapping",
                })?;

            Some(GenericLocation::from_wire(mapping)?)
        }
        _ => None,
    };

    let shape = prior
        .and_then(Value::as_object)
        .map(entry_shape)
        .unwrap_or(EntryShape::Current);

    tracing::trace!(?shape, datastore, "decode location entry");

    let mut out = IndexMap::new();
    out.insert(DATASTORE_KEY.to_string(), datastore.into());

    if let Some(location) = location {
        let (variant_key, variant_value) = location.to_human();
        match shape {
            EntryShape::Deprecated => {
                out.insert(variant_key.to_string(), variant_value);
            }
            EntryShape::Current => {
                let block =
                    IndexMap::from_iter([(variant_key.to_string(), variant_value)]);
                out.insert(
                    CURRENT_KEY.to_string(),
                    Value::Array(vec![Value::Object(block)]),
                );
            }
        }
    }

    Ok(Value::Object(out))
}

fn is_populated(entry: &IndexMap<String, Value>, key: &str) -> bool {
    entry.get(key).is_some_and(Value::is_populated)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::value::Value;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tree(json: serde_json::Value) -> Value {
        Value::from_json(json).expect("test tree is not null")
    }

    fn entry(json: serde_json::Value) -> IndexMap<String, Value> {
        tree(json).as_object().expect("entry is a mapping").clone()
    }

    #[test]
    fn flat_and_nested_spellings_encode_identically() {
        let flat = entry(json!({
            "datastore": "ds1",
            "relational_location": [{"db": "sales", "schema": "public"}],
        }));
        let nested = entry(json!({
            "datastore": "ds1",
            "location": [{"relational_location": [{"db": "sales", "schema": "public"}]}],
        }));

        let expected = tree(json!({
            "dataStoreId": "ds1",
            "location": {"type": "RELATIONAL_LOCATION", "db": "sales", "schema": "public"},
        }));

        assert_eq!(encode_entry(&flat, false).unwrap(), expected);
        assert_eq!(encode_entry(&nested, false).unwrap(), expected);
    }

    #[test]
    fn both_spellings_at_once_conflict() {
        let both = entry(json!({
            "datastore": "ds1",
            "relational_location": [{"db": "sales"}],
            "location": [{"relational_location": [{"db": "sales"}]}],
        }));

        let err = encode_entry(&both, false).expect_err("must fail");
        assert_eq!(
            err,
            ConvertError::ConflictingFieldFormats {
                deprecated: "relational_location",
                current: "location"
            }
        );
    }

    #[test]
    fn no_location_means_whole_datastore() {
        let whole = entry(json!({"datastore": "ds1"}));
        assert_eq!(
            encode_entry(&whole, false).unwrap(),
            tree(json!({"dataStoreId": "ds1"}))
        );
    }

    #[test]
    fn missing_datastore_is_rejected() {
        let err = encode_entry(&entry(json!({"location": []})), false).expect_err("must fail");
        assert_eq!(err, ConvertError::MissingField { key: "datastore" });
    }

    #[test]
    fn decode_without_prior_uses_current_spelling() {
        let wire = entry(json!({
            "dataStoreId": "ds1",
            "location": {"type": "RELATIONAL_LOCATION", "db": "sales", "schema": "public"},
        }));

        assert_eq!(
            decode_entry(&wire, None).unwrap(),
            tree(json!({
                "datastore": "ds1",
                "location": [{"relational_location": [{"db": "sales", "schema": "public"}]}],
            }))
        );
    }

    #[test]
    fn decode_sticks_to_prior_deprecated_spelling() {
        let prior = tree(json!({
            "datastore": "ds1",
            "mongo_location": [{"db": "events", "collection": "clicks"}],
        }));
        let wire = entry(json!({
            "dataStoreId": "ds1",
            "location": {"type": "MONGO_LOCATION", "db": "events", "collection": "clicks"},
        }));

        // unchanged wire value decodes back to the prior form, bit for bit
        assert_eq!(decode_entry(&wire, Some(&prior)).unwrap(), prior);
    }

    #[test]
    fn decode_sticks_to_prior_current_spelling() {
        let prior = tree(json!({
            "datastore": "ds1",
            "location": [{"s3_location": [{"bucket": "exports"}]}],
        }));
        let wire = entry(json!({
            "dataStoreId": "ds1",
            "location": {"type": "S3_LOCATION", "bucket": "exports"},
        }));

        assert_eq!(decode_entry(&wire, Some(&prior)).unwrap(), prior);
    }

    #[test]
    fn every_variant_key_pairs_with_the_current_key() {
        for pair in pairs() {
            assert_eq!(pair.current, "location");
            assert!(pair.deprecated.ends_with("_location"));
        }
    }
}
