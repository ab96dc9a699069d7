//! Validates the classifier JSON report against the formal schema at
//! schema/classifier-schema.json.

use std::path::Path;

use carver_core::{Record, Rule};
use carver_prune::build_classifier;

fn record(id: u64, pairs: &[(&str, &str)]) -> Record {
    let mut rec = Record::new(id);
    for (k, v) in pairs {
        rec.put(*k, *v);
    }
    rec
}

fn validator() -> jsonschema::Validator {
    let schema_path =
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../schema/classifier-schema.json");
    let schema_src = std::fs::read_to_string(&schema_path)
        .unwrap_or_else(|e| panic!("Failed to read schema at {}: {}", schema_path.display(), e));
    let schema_value: serde_json::Value = serde_json::from_str(&schema_src).unwrap();
    jsonschema::validator_for(&schema_value)
        .unwrap_or_else(|e| panic!("Failed to compile schema: {}", e))
}

#[test]
fn report_with_rules_validates_against_schema() {
    let rules = vec![
        Rule::build("{outlook=overcast} => {play=yes}", 0.95, 0.29).unwrap(),
        Rule::build("{outlook=sunny,humidity=high} => {play=no}", 0.9, 0.21).unwrap(),
    ];
    let records = vec![
        record(1, &[("outlook", "overcast"), ("play", "yes")]),
        record(2, &[("outlook", "sunny"), ("humidity", "high"), ("play", "no")]),
        record(3, &[("outlook", "rainy"), ("play", "yes")]),
        record(4, &[("outlook", "rainy"), ("play", "yes")]),
    ];
    let classifier = build_classifier(rules, &records).unwrap();
    let report = classifier.to_json();

    if let Err(error) = validator().validate(&report) {
        panic!("classifier report failed schema validation: {}", error);
    }
}

#[test]
fn default_only_report_validates_against_schema() {
    let rules = vec![Rule::build("{outlook=foggy} => {play=no}", 0.99, 0.1).unwrap()];
    let records = vec![
        record(1, &[("outlook", "sunny"), ("play", "yes")]),
        record(2, &[("outlook", "rainy"), ("play", "yes")]),
    ];
    let classifier = build_classifier(rules, &records).unwrap();
    let report = classifier.to_json();

    assert!(report["rules"].as_array().unwrap().is_empty());
    if let Err(error) = validator().validate(&report) {
        panic!("default-only report failed schema validation: {}", error);
    }
}
