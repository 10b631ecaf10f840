//! recursive naming/shape conversion
//!
//! The outer transform between the two tree conventions:
//!
//! - human form: snake_case keys, optional settings blocks spelled as
//!   sequences of at most one mapping
//! - wire form: camelCase keys, blocks spelled as bare mappings
//!
//! Key renaming is driven entirely by the [Registry]; nothing is inferred
//! from the text of a key. Keys the registry attaches a [FieldCodec] to are
//! delegated to the matching variant codec, bridge or suppressor instead of
//! the generic rename - that is the composition point for the whole engine.
//!
//! The transform is a true inverse under a fixed registry:
//! `to_human_form(r, to_wire_form(r, x)?, prior)? == x` for any well-formed
//! `x` (with `prior = Some(x)`; `prior = None` suffices when `x` uses only
//! current-shape spellings and no default-valued policy block).
use crate::error::ConvertError;
use crate::identity::Identity;
use crate::legacy;
use crate::policy::CustomPolicy;
use crate::registry::{FieldCodec, Registry};
use crate::value::Value;
use indexmap::IndexMap;

/// Convert a human form tree into its wire form
pub fn to_wire_form(registry: &Registry, node: &Value) -> Result<Value, ConvertError> {
    match node {
        Value::Object(fields) => {
            let mut out = IndexMap::new();

            for (key, value) in fields {
                let converted = match registry.codec(key) {
                    Some(FieldCodec::LocationList { table_scoped }) => {
                        encode_location_list(key, value, table_scoped)?
                    }
                    Some(FieldCodec::IdentityList) => encode_identity_list(key, value)?,
                    // suppression only applies on the decode path; encoding a
                    // policy block is ordinary block handling
                    Some(FieldCodec::CustomPolicy) => encode_block(registry, key, value)?,
                    None if registry.is_block(key) => encode_block(registry, key, value)?,
                    None => to_wire_form(registry, value)?,
                };

                out.insert(registry.wire_name(key).to_string(), converted);
            }

            Ok(Value::Object(out))
        }
        Value::Array(items) => Ok(Value::Array(
            items
                .iter()
                .map(|item| to_wire_form(registry, item))
                .collect::<Result<_, _>>()?,
        )),
        scalar => Ok(scalar.clone()),
    }
}

/// Convert a wire form tree back into human form
///
/// `prior` is the previously stored human form of the same tree, if any. It
/// never contributes values - it only decides which of two equivalent
/// spellings legacy entries are re-emitted in.
pub fn to_human_form(
    registry: &Registry,
    node: &Value,
    prior: Option<&Value>,
) -> Result<Value, ConvertError> {
    match node {
        Value::Object(fields) => {
            let mut out = IndexMap::new();

            for (wire_key, value) in fields {
                let key = registry.human_name(wire_key);
                let prior_child = prior.and_then(Value::as_object).and_then(|p| p.get(key));

                let converted = match registry.codec(key) {
                    Some(FieldCodec::LocationList { .. }) => {
                        decode_location_list(key, value, prior_child)?
                    }
                    Some(FieldCodec::IdentityList) => decode_identity_list(key, value)?,
                    Some(FieldCodec::CustomPolicy) => {
                        decode_policy_block(registry, key, value, prior_child)?
                    }
                    None if registry.is_block(key) => {
                        decode_block(registry, key, value, prior_child)?
                    }
                    None => to_human_form(registry, value, prior_child)?,
                };

                out.insert(key.to_string(), converted);
            }

            Ok(Value::Object(out))
        }
        Value::Array(items) => Ok(Value::Array(
            items
                .iter()
                .map(|item| to_human_form(registry, item, None))
                .collect::<Result<_, _>>()?,
        )),
        scalar => Ok(scalar.clone()),
    }
}

/// Unwrap a human block sequence into the bare wire mapping
///
/// The empty sequence becomes the empty mapping so the block's "no settings"
/// state survives the round trip.
fn encode_block(registry: &Registry, key: &str, value: &Value) -> Result<Value, ConvertError> {
    let items = value.as_array().ok_or_else(|| ConvertError::UnexpectedShape {
        key: key.to_string(),
        expected: "a block sequence",
    })?;

    match items {
        [] => Ok(Value::Object(IndexMap::new())),
        [single] => {
            single.as_object().ok_or_else(|| ConvertError::UnexpectedShape {
                key: key.to_string(),
                expected: "a mapping",
            })?;

            to_wire_form(registry, single)
        }
        _ => Err(ConvertError::MalformedBlockCardinality {
            key: key.to_string(),
            found: items.len(),
        }),
    }
}

/// Wrap a bare wire mapping back into the human block sequence
fn decode_block(
    registry: &Registry,
    key: &str,
    value: &Value,
    prior: Option<&Value>,
) -> Result<Value, ConvertError> {
    let fields = value.as_object().ok_or_else(|| ConvertError::UnexpectedShape {
        key: key.to_string(),
        expected: "a mapping",
    })?;

    if fields.is_empty() {
        return Ok(Value::Array(vec![]));
    }

    // the prior form of a block is itself a singleton sequence
    let prior_inner = prior
        .and_then(Value::as_array)
        .and_then(<[Value]>::first);

    Ok(Value::Array(vec![to_human_form(
        registry,
        value,
        prior_inner,
    )?]))
}

fn decode_policy_block(
    registry: &Registry,
    key: &str,
    value: &Value,
    prior: Option<&Value>,
) -> Result<Value, ConvertError> {
    let fields = value.as_object().ok_or_else(|| ConvertError::UnexpectedShape {
        key: key.to_string(),
        expected: "a mapping",
    })?;

    let policy = CustomPolicy::from_wire(fields)?;
    if policy.is_default() {
        tracing::debug!(key, "suppressing default policy block");
        return Ok(Value::Array(vec![]));
    }

    decode_block(registry, key, value, prior)
}

fn encode_location_list(
    key: &str,
    value: &Value,
    table_scoped: bool,
) -> Result<Value, ConvertError> {
    let entries = value.as_array().ok_or_else(|| ConvertError::UnexpectedShape {
        key: key.to_string(),
        expected: "a sequence of entries",
    })?;

    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let fields = entry.as_object().ok_or_else(|| ConvertError::UnexpectedShape {
            key: key.to_string(),
            expected: "a mapping entry",
        })?;

        out.push(legacy::encode_entry(fields, table_scoped)?);
    }

    Ok(Value::Array(out))
}

/// Decode a wire entry list, pairing prior entries positionally
fn decode_location_list(
    key: &str,
    value: &Value,
    prior: Option<&Value>,
) -> Result<Value, ConvertError> {
    let entries = value.as_array().ok_or_else(|| ConvertError::UnexpectedShape {
        key: key.to_string(),
        expected: "a sequence of entries",
    })?;

    let prior_entries = prior.and_then(Value::as_array).unwrap_or(&[]);

    let mut out = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let fields = entry.as_object().ok_or_else(|| ConvertError::UnexpectedShape {
            key: key.to_string(),
            expected: "a mapping entry",
        })?;

        out.push(legacy::decode_entry(fields, prior_entries.get(index))?);
    }

    Ok(Value::Array(out))
}

fn encode_identity_list(key: &str, value: &Value) -> Result<Value, ConvertError> {
    let entries = value.as_array().ok_or_else(|| ConvertError::UnexpectedShape {
        key: key.to_string(),
        expected: "a sequence of identities",
    })?;

    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let fields = entry.as_object().ok_or_else(|| ConvertError::UnexpectedShape {
            key: key.to_string(),
            expected: "a mapping entry",
        })?;

        out.push(Identity::from_human(fields)?.to_wire());
    }

    Ok(Value::Array(out))
}

fn decode_identity_list(key: &str, value: &Value) -> Result<Value, ConvertError> {
    let entries = value.as_array().ok_or_else(|| ConvertError::UnexpectedShape {
        key: key.to_string(),
        expected: "a sequence of identities",
    })?;

    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let fields = entry.as_object().ok_or_else(|| ConvertError::UnexpectedShape {
            key: key.to_string(),
            expected: "a mapping entry",
        })?;

        out.push(Identity::from_wire(fields)?.to_human());
    }

    Ok(Value::Array(out))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::registry::Family;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tree(json: serde_json::Value) -> Value {
        Value::from_json(json).expect("test tree is not null")
    }

    #[test]
    fn renames_and_unwraps_blocks() {
        let registry = Family::Datastore.registry();
        let human = tree(json!({
            "name": "warehouse",
            "origin_port": 5432,
            "baseline_security_policy": [{
                "type": "BLOCK",
                "unassociated_queries_category": [{"query_action": "PASS"}],
                "exclusions": [],
            }],
        }));

        let wire = to_wire_form(&registry, &human).unwrap();
        assert_eq!(
            wire,
            tree(json!({
                "name": "warehouse",
                "originPort": 5432,
                "baselineSecurityPolicy": {
                    "type": "BLOCK",
                    "unassociatedQueriesCategory": {"queryAction": "PASS"},
                    "exclusions": {},
                },
            }))
        );
    }

    #[test]
    fn round_trip_is_identity() {
        let registry = Family::Datastore.registry();
        let human = tree(json!({
            "name": "warehouse",
            "hostname": "db.internal",
            "port": 8080,
            "origin_port": 5432,
            "parent_id": "p-1",
            "baseline_security_policy": [{
                "type": "BLOCK",
                "unassociated_queries_category": [{"query_action": "REDACT"}],
                "unsupported_queries_category": [],
                "exclusions": [{
                    "excluded_identities": [
                        {"type": "USER", "name": "a@b.com"},
                        {"type": "EVERYONE"},
                    ],
                    "excluded_query_patterns": [{"pattern": "^select 1"}],
                }],
            }],
        }));

        let wire = to_wire_form(&registry, &human).unwrap();
        let back = to_human_form(&registry, &wire, Some(&human)).unwrap();
        assert_eq!(back, human);

        // no prior state needed for a current-shape tree
        let back = to_human_form(&registry, &wire, None).unwrap();
        assert_eq!(back, human);
    }

    #[test]
    fn oversized_block_is_a_hard_error() {
        let registry = Family::Dataset.registry();
        let human = tree(json!({
            "custom_policy": [{"priority": 1}, {"priority": 2}],
        }));

        let err = to_wire_form(&registry, &human).expect_err("must fail");
        assert_eq!(
            err,
            ConvertError::MalformedBlockCardinality {
                key: "custom_policy".to_string(),
                found: 2
            }
        );
    }

    #[test]
    fn unregistered_keys_pass_through() {
        let registry = Family::Classifier.registry();
        let human = tree(json!({"name": "ssn", "internalMarker": true}));

        let wire = to_wire_form(&registry, &human).unwrap();
        assert_eq!(wire, tree(json!({"name": "ssn", "internalMarker": true})));
        assert_eq!(to_human_form(&registry, &wire, None).unwrap(), human);
    }

    #[test]
    fn default_policy_block_is_suppressed() {
        let registry = Family::Dataset.registry();
        let wire = tree(json!({
            "name": "sales",
            "customPolicy": {"priority": 100, "rulesYaml": "", "tagsYaml": ""},
        }));

        let human = to_human_form(&registry, &wire, None).unwrap();
        assert_eq!(
            human,
            tree(json!({"name": "sales", "custom_policy": []}))
        );
    }

    #[test]
    fn non_default_policy_block_survives() {
        let registry = Family::Dataset.registry();
        let wire = tree(json!({
            "customPolicy": {"priority": 7, "rulesYaml": "rules: []\n"},
        }));

        let human = to_human_form(&registry, &wire, None).unwrap();
        assert_eq!(
            human,
            tree(json!({
                "custom_policy": [{"priority": 7, "rules_yaml": "rules: []\n"}],
            }))
        );
    }

    #[test]
    fn identity_lists_convert_both_ways() {
        let registry = Family::Dataset.registry();
        let human = tree(json!({
            "owners": [
                {"type": "USER", "name": "a@b.com"},
                {"type": "DIRECTORY_GROUP", "group_id": "g-17"},
            ],
        }));

        let wire = to_wire_form(&registry, &human).unwrap();
        assert_eq!(
            wire,
            tree(json!({
                "owners": [
                    {"identityType": "USER", "identity": "a@b.com"},
                    {"identityType": "DIRECTORY_GROUP", "identity": "g-17"},
                ],
            }))
        );

        assert_eq!(to_human_form(&registry, &wire, None).unwrap(), human);
    }

    #[test]
    fn location_lists_bridge_through_the_registry() {
        let registry = Family::Dataset.registry();
        let human = tree(json!({
            "include_location": [
                {"datastore": "ds1", "relational_location": [{"db": "sales"}]},
                {"datastore": "ds2"},
            ],
        }));

        let wire = to_wire_form(&registry, &human).unwrap();
        assert_eq!(
            wire,
            tree(json!({
                "includeLocations": [
                    {"dataStoreId": "ds1", "location": {"type": "RELATIONAL_LOCATION", "db": "sales"}},
                    {"dataStoreId": "ds2"},
                ],
            }))
        );

        // the deprecated spelling sticks when the prior state used it
        assert_eq!(to_human_form(&registry, &wire, Some(&human)).unwrap(), human);

        // with no prior state the current spelling wins
        assert_eq!(
            to_human_form(&registry, &wire, None).unwrap(),
            tree(json!({
                "include_location": [
                    {"datastore": "ds1", "location": [{"relational_location": [{"db": "sales"}]}]},
                    {"datastore": "ds2"},
                ],
            }))
        );
    }

    #[test]
    fn table_scoped_flag_comes_from_the_attachment() {
        let registry = Family::Classifier.registry();
        let human = tree(json!({
            "scope": [
                {"datastore": "ds1", "location": [{"mysql_location": [{"db": "crm", "table": "contacts"}]}]},
            ],
        }));

        let wire = to_wire_form(&registry, &human).unwrap();
        assert_eq!(
            wire,
            tree(json!({
                "scope": [
                    {"dataStoreId": "ds1", "location": {"type": "MYSQL_TABLE_LOCATION", "db": "crm", "table": "contacts"}},
                ],
            }))
        );
    }
}
