//! custom policy default detection
//!
//! A resource whose policy was never configured still reports a policy object
//! on the wire, filled with defaults. Writing that object back into stored
//! configuration would make a block appear that the author never wrote, and
//! every subsequent read would report a difference. The suppressor recognizes
//! the default and lets the decode path emit the block's absent form instead.
//!
//! A [CustomPolicy] is computed fresh on every decode and never persisted.
use crate::error::ConvertError;
use crate::value::Value;
use indexmap::IndexMap;

/// Priority a policy has when nobody ever set one
pub const DEFAULT_PRIORITY: i64 = 100;

#[derive(Debug, Clone, PartialEq, derive_new::new)]
pub struct CustomPolicy {
    pub priority: i64,
    pub rules_yaml: String,
    pub tags_yaml: String,
}

impl CustomPolicy {
    /// Read a policy from its wire form mapping
    ///
    /// Absent fields take their default, so an empty mapping is the default
    /// policy.
    pub fn from_wire(mapping: &IndexMap<String, Value>) -> Result<CustomPolicy, ConvertError> {
        let priority = match mapping.get("priority") {
            Some(Value::Integer(priority)) => *priority,
            None => DEFAULT_PRIORITY,
            Some(_) => {
                return Err(ConvertError::UnexpectedShape {
                    key: "priority".to_string(),
                    expected: "an integer",
                })
            }
        };

        Ok(CustomPolicy {
            priority,
            rules_yaml: text_field(mapping, "rulesYaml")?,
            tags_yaml: text_field(mapping, "tagsYaml")?,
        })
    }

    /// Whether this policy is indistinguishable from "never configured"
    pub fn is_default(&self) -> bool {
        self.priority == DEFAULT_PRIORITY && self.rules_yaml.is_empty() && self.tags_yaml.is_empty()
    }
}

fn text_field(mapping: &IndexMap<String, Value>, key: &str) -> Result<String, ConvertError> {
    match mapping.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        None => Ok(String::new()),
        Some(_) => Err(ConvertError::UnexpectedShape {
            key: key.to_string(),
            expected: "a string",
        }),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_policy() {
        assert!(CustomPolicy::new(DEFAULT_PRIORITY, String::new(), String::new()).is_default());
        assert!(!CustomPolicy::new(99, String::new(), String::new()).is_default());
        assert!(!CustomPolicy::new(DEFAULT_PRIORITY, "rules: []".into(), String::new()).is_default());
    }

    #[test]
    fn empty_wire_mapping_is_default() {
        let policy = CustomPolicy::from_wire(&IndexMap::new()).unwrap();
        assert!(policy.is_default());
        assert_eq!(policy.priority, DEFAULT_PRIORITY);
    }

    #[test]
    fn populated_wire_mapping() {
        let mapping = IndexMap::from_iter([
            ("priority".to_string(), Value::from(5)),
            ("rulesYaml".to_string(), Value::from("rules:\n- name: r1\n")),
        ]);

        let policy = CustomPolicy::from_wire(&mapping).unwrap();
        assert!(!policy.is_default());
        assert_eq!(policy.priority, 5);
        assert_eq!(policy.tags_yaml, "");
    }
}
