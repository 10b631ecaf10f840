//! discriminated identity variants
//!
//! An identity is exactly one of four shapes. The human form declares the
//! kind in a `type` attribute and carries the value in either `name`
//! (User, IdpGroup) or `group_id` (DirectoryGroup); Everyone carries neither
//! and its wire value is the fixed sentinel equal to its own tag. On the wire
//! an identity is the pair `{identityType, identity}`.
//!
//! The codec is stateless. The kind is immutable after creation on every
//! resource embedding an identity; diffing old against new is the
//! orchestrator's concern, not ours.
use crate::error::ConvertError;
use crate::value::Value;
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind {
    User,
    IdpGroup,
    DirectoryGroup,
    Everyone,
}

impl IdentityKind {
    pub const ALL: [IdentityKind; 4] = [
        IdentityKind::User,
        IdentityKind::IdpGroup,
        IdentityKind::DirectoryGroup,
        IdentityKind::Everyone,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            IdentityKind::User => "USER",
            IdentityKind::IdpGroup => "IDP_GROUP",
            IdentityKind::DirectoryGroup => "DIRECTORY_GROUP",
            IdentityKind::Everyone => "EVERYONE",
        }
    }

    pub fn from_tag(tag: &str) -> Option<IdentityKind> {
        IdentityKind::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// The human field this kind carries its value in, if any
    pub fn value_field(self) -> Option<&'static str> {
        match self {
            IdentityKind::User | IdentityKind::IdpGroup => Some("name"),
            IdentityKind::DirectoryGroup => Some("group_id"),
            IdentityKind::Everyone => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_new::new)]
pub struct Identity {
    pub kind: IdentityKind,
    pub value: String,
}

impl Identity {
    /// Read an identity from its human form mapping
    ///
    /// Field precedence is fixed: `name`, then `group_id`, then the kind tag
    /// itself - the last only for Everyone. Any other kind with neither field
    /// populated is a caller contract violation, not a silent default.
    pub fn from_human(mapping: &IndexMap<String, Value>) -> Result<Identity, ConvertError> {
        let kind = declared_kind(mapping, "type")?;

        let value = if let Some(name) = populated_string(mapping, "name") {
            name.to_string()
        } else if let Some(group_id) = populated_string(mapping, "group_id") {
            group_id.to_string()
        } else if kind == IdentityKind::Everyone {
            kind.tag().to_string()
        } else {
            return Err(ConvertError::InvalidIdentityShape {
                kind: kind.tag(),
                field: kind.value_field().expect("only Everyone has no value field"),
            });
        };

        Ok(Identity { kind, value })
    }

    /// Read an identity from its wire form mapping
    pub fn from_wire(mapping: &IndexMap<String, Value>) -> Result<Identity, ConvertError> {
        let kind = declared_kind(mapping, "identityType")?;

        let value = match populated_string(mapping, "identity") {
            Some(value) => value.to_string(),
            None if kind == IdentityKind::Everyone => kind.tag().to_string(),
            None => {
                return Err(ConvertError::InvalidIdentityShape {
                    kind: kind.tag(),
                    field: "identity",
                })
            }
        };

        Ok(Identity { kind, value })
    }

    pub fn to_wire(&self) -> Value {
        let mut out = IndexMap::new();
        out.insert("identityType".to_string(), self.kind.tag().into());
        out.insert("identity".to_string(), self.value.as_str().into());
        Value::Object(out)
    }

    pub fn to_human(&self) -> Value {
        let mut out = IndexMap::new();
        out.insert("type".to_string(), self.kind.tag().into());
        if let Some(field) = self.kind.value_field() {
            out.insert(field.to_string(), self.value.as_str().into());
        }
        Value::Object(out)
    }
}

fn declared_kind(
    mapping: &IndexMap<String, Value>,
    key: &'static str,
) -> Result<IdentityKind, ConvertError> {
    let tag = mapping
        .get(key)
        .and_then(Value::as_str)
        .ok_or(ConvertError::MissingField { key })?;

    IdentityKind::from_tag(tag).ok_or_else(|| ConvertError::UnknownVariantTag {
        tag: tag.to_string(),
    })
}

fn populated_string<'a>(mapping: &'a IndexMap<String, Value>, key: &str) -> Option<&'a str> {
    mapping.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}
