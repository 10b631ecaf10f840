//! per-family conversion registries
//!
//! A [Registry] is the static metadata one resource family ships alongside its
//! schema: the bijective human/wire field-name map, the set of keys whose
//! human form is an optional settings block (a sequence of at most one
//! mapping), and the keys whose subtree is handled by a specialized codec
//! instead of the generic rename.
//!
//! Registries are plain immutable values. They are constructed explicitly and
//! passed by reference into the converter - never looked up through a global.
//! Field names are mapped through the registry in both directions because a
//! pure-text camel/snake rule cannot reconstruct several of them (for example
//! `include_location` vs `includeLocations`).
use indexmap::{IndexMap, IndexSet};

/// Specialized handling for one registered key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCodec {
    /// Repeated data-store location entries, bridged through the legacy
    /// deprecated/current shape rules
    ///
    /// `table_scoped` selects the table-scoped wire discriminant tags. It is a
    /// property of where the list is used (filter vs scope reference), not of
    /// the data, so it lives on the attachment.
    LocationList { table_scoped: bool },
    /// Repeated identity entries
    IdentityList,
    /// Optional custom policy block, default-suppressed on decode
    CustomPolicy,
}

/// Static conversion metadata for one resource family
#[derive(Debug)]
pub struct Registry {
    human_to_wire: IndexMap<&'static str, &'static str>,
    wire_to_human: IndexMap<&'static str, &'static str>,
    blocks: IndexSet<&'static str>,
    codecs: IndexMap<&'static str, FieldCodec>,
}

impl Registry {
    fn new(
        names: &[(&'static str, &'static str)],
        blocks: &[&'static str],
        codecs: &[(&'static str, FieldCodec)],
    ) -> Self {
        let mut human_to_wire = IndexMap::new();
        let mut wire_to_human = IndexMap::new();

        for (human, wire) in names {
            assert!(
                human_to_wire.insert(*human, *wire).is_none(),
                "duplicate human field name: {human}"
            );
            assert!(
                wire_to_human.insert(*wire, *human).is_none(),
                "duplicate wire field name: {wire}"
            );
        }

        Self {
            human_to_wire,
            wire_to_human,
            blocks: blocks.iter().copied().collect(),
            codecs: codecs.iter().copied().collect(),
        }
    }

    /// Wire name for a human field name
    ///
    /// Unregistered names pass through unchanged, in both directions. This
    /// keeps the conversion a bijection over arbitrary well-formed trees;
    /// dropping server-side extras is the orchestrator's business.
    pub fn wire_name<'a>(&self, human: &'a str) -> &'a str {
        self.human_to_wire.get(human).copied().unwrap_or(human)
    }

    /// Human name for a wire field name
    pub fn human_name<'a>(&self, wire: &'a str) -> &'a str {
        self.wire_to_human.get(wire).copied().unwrap_or(wire)
    }

    /// Whether the human form of this key is an optional settings block
    pub fn is_block(&self, human: &str) -> bool {
        self.blocks.contains(human)
    }

    pub fn codec(&self, human: &str) -> Option<FieldCodec> {
        self.codecs.get(human).copied()
    }
}

/// The resource families the engine ships registries for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Dataset,
    Datastore,
    Classifier,
}

impl Family {
    pub const ALL: [Family; 3] = [Family::Dataset, Family::Datastore, Family::Classifier];

    /// Family for a root block identifier, if it names one
    pub fn from_ident(ident: &str) -> Option<Family> {
        Family::ALL.into_iter().find(|f| f.ident() == ident)
    }

    pub fn ident(&self) -> &'static str {
        match self {
            Family::Dataset => "dataset",
            Family::Datastore => "datastore",
            Family::Classifier => "classifier",
        }
    }

    pub fn registry(&self) -> Registry {
        match self {
            Family::Dataset => Registry::new(
                &[
                    ("name", "name"),
                    ("description", "description"),
                    ("access_level", "accessLevel"),
                    ("data_access_controlled", "dataAccessControlled"),
                    ("include_location", "includeLocations"),
                    ("exclude_location", "excludeLocations"),
                    ("owners", "owners"),
                    ("approvers", "approvers"),
                    ("custom_policy", "customPolicy"),
                    ("priority", "priority"),
                    ("rules_yaml", "rulesYaml"),
                    ("tags_yaml", "tagsYaml"),
                ],
                &["custom_policy"],
                &[
                    (
                        "include_location",
                        FieldCodec::LocationList {
                            table_scoped: false,
                        },
                    ),
                    (
                        "exclude_location",
                        FieldCodec::LocationList {
                            table_scoped: false,
                        },
                    ),
                    ("owners", FieldCodec::IdentityList),
                    ("approvers", FieldCodec::IdentityList),
                    ("custom_policy", FieldCodec::CustomPolicy),
                ],
            ),
            Family::Datastore => Registry::new(
                &[
                    ("name", "name"),
                    ("hostname", "hostname"),
                    ("port", "port"),
                    ("type", "type"),
                    ("origin_port", "originPort"),
                    ("parent_id", "parentId"),
                    ("identity_provider_id", "identityProviderId"),
                    ("baseline_security_policy", "baselineSecurityPolicy"),
                    ("unassociated_queries_category", "unassociatedQueriesCategory"),
                    ("unsupported_queries_category", "unsupportedQueriesCategory"),
                    ("query_action", "queryAction"),
                    ("exclusions", "exclusions"),
                    ("excluded_identities", "excludedIdentities"),
                    ("excluded_query_patterns", "excludedQueryPatterns"),
                    ("pattern", "pattern"),
                ],
                &[
                    "baseline_security_policy",
                    "unassociated_queries_category",
                    "unsupported_queries_category",
                    "exclusions",
                ],
                &[("excluded_identities", FieldCodec::IdentityList)],
            ),
            Family::Classifier => Registry::new(
                &[
                    ("name", "name"),
                    ("description", "description"),
                    ("classifier_type", "classifierType"),
                    ("regex_pattern", "regexPattern"),
                    ("case_sensitive", "caseSensitive"),
                    ("scope", "scope"),
                ],
                &[],
                &[("scope", FieldCodec::LocationList { table_scoped: true })],
            ),
        }
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.ident())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn names_map_both_ways() {
        let registry = Family::Dataset.registry();
        assert_eq!(registry.wire_name("include_location"), "includeLocations");
        assert_eq!(registry.human_name("includeLocations"), "include_location");
    }

    #[test]
    fn unregistered_names_pass_through() {
        let registry = Family::Classifier.registry();
        assert_eq!(registry.wire_name("not_registered"), "not_registered");
        assert_eq!(registry.human_name("notRegistered"), "notRegistered");
    }

    #[test]
    fn every_family_registry_constructs() {
        // Registry::new asserts bijectivity of the name map
        for family in Family::ALL {
            let _ = family.registry();
        }
    }

    #[test]
    fn family_idents_round_trip() {
        for family in Family::ALL {
            assert_eq!(Family::from_ident(family.ident()), Some(family));
        }
        assert_eq!(Family::from_ident("unknown"), None);
    }
}
