//! discriminated location variants
//!
//! A generic location is one of five mutually exclusive shapes. The human
//! form has no explicit discriminant - the variant is implied by which of the
//! five optional sub-blocks is populated. The wire form carries an explicit
//! `type` tag instead.
//!
//! Each variant owns an ordered field chain, most general field first
//! (relational: db, schema, table). A deeper field is only meaningful when
//! every shallower field is present, so a [GenericLocation] stores the
//! populated *prefix* of the chain and a "table but no schema" location cannot
//! be constructed at all.
use crate::error::ConvertError;
use crate::value::Value;
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    Relational,
    Mysql,
    Athena,
    Mongo,
    S3,
}

impl LocationKind {
    pub const ALL: [LocationKind; 5] = [
        LocationKind::Relational,
        LocationKind::Mysql,
        LocationKind::Athena,
        LocationKind::Mongo,
        LocationKind::S3,
    ];

    /// The human form sub-block key of this variant
    pub fn human_key(self) -> &'static str {
        match self {
            LocationKind::Relational => "relational_location",
            LocationKind::Mysql => "mysql_location",
            LocationKind::Athena => "athena_location",
            LocationKind::Mongo => "mongo_location",
            LocationKind::S3 => "s3_location",
        }
    }

    /// The wire discriminant tag
    ///
    /// Table-scoped use sites (scope references rather than filters) carry a
    /// distinct tag over the same field set.
    pub fn wire_tag(self, table_scoped: bool) -> &'static str {
        match (self, table_scoped) {
            (LocationKind::Relational, false) => "RELATIONAL_LOCATION",
            (LocationKind::Relational, true) => "RELATIONAL_TABLE_LOCATION",
            (LocationKind::Mysql, false) => "MYSQL_LOCATION",
            (LocationKind::Mysql, true) => "MYSQL_TABLE_LOCATION",
            (LocationKind::Athena, false) => "ATHENA_LOCATION",
            (LocationKind::Athena, true) => "ATHENA_TABLE_LOCATION",
            (LocationKind::Mongo, false) => "MONGO_LOCATION",
            (LocationKind::Mongo, true) => "MONGO_TABLE_LOCATION",
            (LocationKind::S3, false) => "S3_LOCATION",
            (LocationKind::S3, true) => "S3_TABLE_LOCATION",
        }
    }

    pub fn from_wire_tag(tag: &str) -> Option<(LocationKind, bool)> {
        for kind in LocationKind::ALL {
            for table_scoped in [false, true] {
                if kind.wire_tag(table_scoped) == tag {
                    return Some((kind, table_scoped));
                }
            }
        }

        None
    }

    /// Ordered (human, wire) field chain, most general field first
    pub fn field_chain(self) -> &'static [(&'static str, &'static str)] {
        match self {
            LocationKind::Relational => &[("db", "db"), ("schema", "schema"), ("table", "table")],
            LocationKind::Mysql => &[("db", "db"), ("table", "table")],
            LocationKind::Athena => &[("catalog", "catalog"), ("db", "db"), ("table", "table")],
            LocationKind::Mongo => &[("db", "db"), ("collection", "collection")],
            LocationKind::S3 => &[("bucket", "bucket"), ("object_key", "objectKey")],
        }
    }
}

/// One concrete location: a variant kind plus the populated prefix of its
/// field chain
#[derive(Debug, Clone, PartialEq)]
pub struct GenericLocation {
    pub kind: LocationKind,
    pub table_scoped: bool,
    fields: Vec<String>,
}

impl GenericLocation {
    pub fn new(
        kind: LocationKind,
        table_scoped: bool,
        fields: Vec<String>,
    ) -> GenericLocation {
        assert!(
            fields.len() <= kind.field_chain().len(),
            "{:?} location holds at most {} fields",
            kind,
            kind.field_chain().len()
        );

        GenericLocation {
            kind,
            table_scoped,
            fields,
        }
    }

    /// Populated chain prefix, shallowest field first
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Resolve the variant populated in a human form mapping
    ///
    /// Scans the five sub-block keys. Zero populated keys is a valid outcome
    /// (the location means "everything"), two is [ConvertError::AmbiguousVariant].
    pub fn from_human(
        mapping: &IndexMap<String, Value>,
        table_scoped: bool,
    ) -> Result<Option<GenericLocation>, ConvertError> {
        let mut found: Option<(LocationKind, &[Value])> = None;

        for kind in LocationKind::ALL {
            let Some(value) = mapping.get(kind.human_key()) else {
                continue;
            };

            let items = value
                .as_array()
                .ok_or_else(|| ConvertError::UnexpectedShape {
                    key: kind.human_key().to_string(),
                    expected: "a block sequence",
                })?;

            if items.is_empty() {
                continue;
            }

            if let Some((first, _)) = found {
                return Err(ConvertError::AmbiguousVariant {
                    first: first.human_key(),
                    second: kind.human_key(),
                });
            }

            found = Some((kind, items));
        }

        let Some((kind, items)) = found else {
            return Ok(None);
        };

        if items.len() > 1 {
            return Err(ConvertError::MalformedBlockCardinality {
                key: kind.human_key().to_string(),
                found: items.len(),
            });
        }

        let fields = items[0]
            .as_object()
            .ok_or_else(|| ConvertError::UnexpectedShape {
                key: kind.human_key().to_string(),
                expected: "a mapping",
            })?;

        let chain = kind
            .field_chain()
            .iter()
            .map(|(human, _wire)| *human);

        Ok(Some(GenericLocation {
            kind,
            table_scoped,
            fields: read_chain(fields, chain)?,
        }))
    }

    /// Resolve a wire form mapping through its `type` tag
    pub fn from_wire(mapping: &IndexMap<String, Value>) -> Result<GenericLocation, ConvertError> {
        let tag = mapping
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ConvertError::MissingField { key: "type" })?;

        let (kind, table_scoped) =
            LocationKind::from_wire_tag(tag).ok_or_else(|| ConvertError::UnknownVariantTag {
                tag: tag.to_string(),
            })?;

        let chain = kind.field_chain().iter().map(|(_human, wire)| *wire);

        Ok(GenericLocation {
            kind,
            table_scoped,
            fields: read_chain(mapping, chain)?,
        })
    }

    /// Emit the single populated variant key, human shaped
    ///
    /// The value is the sub-block in its human form: a singleton sequence
    /// wrapping the populated fields.
    pub fn to_human(&self) -> (&'static str, Value) {
        let fields: IndexMap<String, Value> = self
            .kind
            .field_chain()
            .iter()
            .zip(&self.fields)
            .map(|((human, _wire), value)| (human.to_string(), value.as_str().into()))
            .collect();

        (
            self.kind.human_key(),
            Value::Array(vec![Value::Object(fields)]),
        )
    }

    /// Emit the wire form mapping, tagged and nested only as deep as the
    /// populated fields go
    pub fn to_wire(&self) -> Value {
        let mut out = IndexMap::new();
        out.insert(
            "type".to_string(),
            self.kind.wire_tag(self.table_scoped).into(),
        );

        for ((_human, wire), value) in self.kind.field_chain().iter().zip(&self.fields) {
            out.insert(wire.to_string(), value.as_str().into());
        }

        Value::Object(out)
    }
}

/// Read the populated prefix of a field chain, top-down
///
/// Stops at the first absent or empty field; deeper fields are not read at
/// all, mirroring the implied hierarchy of the remote API.
fn read_chain<'a>(
    mapping: &IndexMap<String, Value>,
    chain: impl Iterator<Item = &'a str>,
) -> Result<Vec<String>, ConvertError> {
    let mut fields = Vec::new();

    for key in chain {
        match mapping.get(key) {
            Some(Value::String(s)) if !s.is_empty() => fields.push(s.clone()),
            Some(Value::String(_)) | None => break,
            Some(_) => {
                return Err(ConvertError::UnexpectedShape {
                    key: key.to_string(),
                    expected: "a string",
                })
            }
        }
    }

    Ok(fields)
}

/// A data-store reference plus an optional location within it
///
/// An absent location is valid and means "the entire data store".
#[derive(Debug, Clone, PartialEq, derive_new::new)]
pub struct DatasetLocation {
    pub datastore: String,
    pub location: Option<GenericLocation>,
}
