//! End-to-end conversion tests
//!
//! Parse resource definitions the way an author writes them, encode to wire
//! form, and decode back under different prior-state assumptions.

use pretty_assertions::assert_eq;
use serde_json::json;
use wireform::convert::{to_human_form, to_wire_form};
use wireform::documents::ResourceSet;
use wireform::error::ConvertError;
use wireform::registry::Family;
use wireform::resource_documents;
use wireform::value::Value;

fn tree(json: serde_json::Value) -> Value {
    Value::from_json(json).expect("test tree is not null")
}

fn parse_one(family: Family, name: &str, hcl: &str) -> Value {
    let documents = resource_documents! { hcl };
    let resources = ResourceSet::new(&documents).expect("valid resource document");
    resources
        .get(family, name)
        .expect("resource is present")
        .config
        .clone()
}

#[test]
fn dataset_location_scenario() {
    // the deprecated flat spelling of a relational location
    let human = parse_one(
        Family::Dataset,
        "sales",
        r#"
        dataset "sales" {
            name = "sales"

            include_location {
                datastore = "ds1"

                relational_location {
                    db     = "sales"
                    schema = "public"
                }
            }
        }
        "#,
    );

    let registry = Family::Dataset.registry();
    let wire = to_wire_form(&registry, &human).expect("encodes");

    assert_eq!(
        wire,
        tree(json!({
            "name": "sales",
            "includeLocations": [{
                "dataStoreId": "ds1",
                "location": {"type": "RELATIONAL_LOCATION", "db": "sales", "schema": "public"},
            }],
        }))
    );

    // no prior state: the current nested spelling wins
    assert_eq!(
        to_human_form(&registry, &wire, None).expect("decodes"),
        tree(json!({
            "name": "sales",
            "include_location": [{
                "datastore": "ds1",
                "location": [{"relational_location": [{"db": "sales", "schema": "public"}]}],
            }],
        }))
    );

    // prior state in the deprecated spelling: the spelling sticks
    assert_eq!(
        to_human_form(&registry, &wire, Some(&human)).expect("decodes"),
        human
    );
}

#[test]
fn converged_configuration_reports_no_difference() {
    let human = parse_one(
        Family::Dataset,
        "finance",
        r#"
        dataset "finance" {
            name                   = "finance"
            description            = "quarterly reports"
            access_level           = "READ"
            data_access_controlled = true

            owners {
                type = "USER"
                name = "a@b.com"
            }

            approvers {
                type = "EVERYONE"
            }

            include_location {
                datastore = "ds1"

                location {
                    athena_location {
                        catalog = "main"
                        db      = "finance"
                    }
                }
            }

            exclude_location {
                datastore = "ds1"

                location {
                    s3_location {
                        bucket     = "scratch"
                        object_key = "tmp/"
                    }
                }
            }

            custom_policy {
                priority   = 7
                rules_yaml = "rules: []\n"
            }
        }
        "#,
    );

    let registry = Family::Dataset.registry();
    let wire = to_wire_form(&registry, &human).expect("encodes");

    // a read right after a write reports exactly the stored configuration
    assert_eq!(
        to_human_form(&registry, &wire, Some(&human)).expect("decodes"),
        human
    );

    // this tree only uses current spellings, so no prior state is needed
    assert_eq!(
        to_human_form(&registry, &wire, None).expect("decodes"),
        human
    );
}

#[test]
fn ambiguous_variant_is_rejected_end_to_end() {
    let human = parse_one(
        Family::Dataset,
        "broken",
        r#"
        dataset "broken" {
            include_location {
                datastore = "ds1"

                relational_location {
                    db = "sales"
                }

                mysql_location {
                    db = "crm"
                }
            }
        }
        "#,
    );

    let registry = Family::Dataset.registry();
    assert_eq!(
        to_wire_form(&registry, &human).expect_err("two variants must not encode"),
        ConvertError::AmbiguousVariant {
            first: "relational_location",
            second: "mysql_location"
        }
    );
}

#[test]
fn conflicting_spellings_are_rejected_end_to_end() {
    let human = parse_one(
        Family::Dataset,
        "broken",
        r#"
        dataset "broken" {
            include_location {
                datastore = "ds1"

                relational_location {
                    db = "sales"
                }

                location {
                    relational_location {
                        db = "sales"
                    }
                }
            }
        }
        "#,
    );

    let registry = Family::Dataset.registry();
    assert_eq!(
        to_wire_form(&registry, &human).expect_err("both spellings must not encode"),
        ConvertError::ConflictingFieldFormats {
            deprecated: "relational_location",
            current: "location"
        }
    );
}

#[test]
fn datastore_wire_shape() {
    let human = parse_one(
        Family::Datastore,
        "warehouse",
        r#"
        datastore "warehouse" {
            name        = "warehouse"
            hostname    = "db.internal"
            port        = 8080
            origin_port = 5432

            baseline_security_policy {
                type = "BLOCK"

                unassociated_queries_category {
                    query_action = "REDACT"
                }
            }
        }
        "#,
    );

    let registry = Family::Datastore.registry();
    let wire = to_wire_form(&registry, &human).expect("encodes");

    let rendered = serde_json::to_string_pretty(&wire).expect("serializes");
    insta::assert_snapshot!(rendered, @r###"
    {
      "name": "warehouse",
      "hostname": "db.internal",
      "port": 8080,
      "originPort": 5432,
      "baselineSecurityPolicy": {
        "type": "BLOCK",
        "unassociatedQueriesCategory": {
          "queryAction": "REDACT"
        }
      }
    }
    "###);

    assert_eq!(
        to_human_form(&registry, &wire, None).expect("decodes"),
        human
    );
}

#[test]
fn server_side_policy_defaults_stay_invisible() {
    // the server reports a policy object even when nobody configured one
    let wire = tree(json!({
        "name": "sales",
        "customPolicy": {"priority": 100, "rulesYaml": "", "tagsYaml": ""},
        "includeLocations": [],
    }));

    let registry = Family::Dataset.registry();
    let human = to_human_form(&registry, &wire, None).expect("decodes");

    assert_eq!(
        human,
        tree(json!({
            "name": "sales",
            "custom_policy": [],
            "include_location": [],
        }))
    );
}
