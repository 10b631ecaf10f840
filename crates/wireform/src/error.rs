//! conversion error kinds
//!
//! Every error here is deterministic: the same input tree fails the same way
//! on every call. Nothing is retried and nothing is repaired - ambiguity is
//! surfaced to the caller, who owns the resource/field context.

/// Failure while converting between human form and wire form
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConvertError {
    /// More than one variant sub-block of a discriminated union is populated
    #[error("both {first} and {second} are populated, expected at most one location variant")]
    AmbiguousVariant {
        first: &'static str,
        second: &'static str,
    },

    /// Both the deprecated and the current shape of a legacy field pair are populated
    #[error("both the deprecated {deprecated} and the current {current} field are populated")]
    ConflictingFieldFormats {
        deprecated: &'static str,
        current: &'static str,
    },

    /// The declared identity type requires a field that is absent
    #[error("identity type {kind} requires the {field} field")]
    InvalidIdentityShape {
        kind: &'static str,
        field: &'static str,
    },

    /// A "treat as block" sequence holds more than one element (maxItems=1)
    #[error("block {key} must hold at most one element, found {found}")]
    MalformedBlockCardinality { key: String, found: usize },

    /// A wire discriminant tag that no known variant carries
    #[error("unknown variant tag {tag:?}")]
    UnknownVariantTag { tag: String },

    /// A field the conversion cannot proceed without
    #[error("missing required field {key}")]
    MissingField { key: &'static str },

    /// A registered key holds a value of the wrong node type
    #[error("{key} must be {expected}")]
    UnexpectedShape {
        key: String,
        expected: &'static str,
    },
}
