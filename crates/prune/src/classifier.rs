//! The final ordered classifier: a decision list plus a terminal default
//! rule.

use carver_core::{Record, Rule};

use crate::coverage::CoverageEngine;
use crate::default_chain::DefaultCandidate;
use crate::truncate::{PrefixError, Truncation};

/// An ordered rule list with a majority-class fallback. Produced by
/// [`build_classifier`](crate::build_classifier); immutable afterwards.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<Rule>,
    default_rule: Rule,
    class_attribute: String,
    cutoff: usize,
    errors: Vec<PrefixError>,
}

impl Classifier {
    pub(crate) fn assemble(
        engine: &CoverageEngine,
        chain: &[DefaultCandidate],
        truncation: &Truncation,
        class_attribute: String,
    ) -> Classifier {
        let rules: Vec<Rule> = engine
            .live_indices()
            .take(truncation.cutoff)
            .map(|index| engine.rule(index).clone())
            .collect();
        let default_rule = chain
            .get(truncation.cutoff)
            .map(|candidate| candidate.to_rule(&class_attribute))
            .unwrap_or_else(|| Rule::default_rule(&class_attribute, ""));
        Classifier {
            rules,
            default_rule,
            class_attribute,
            cutoff: truncation.cutoff,
            errors: truncation.errors.clone(),
        }
    }

    /// The retained rules, in pruning order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The terminal fallback rule (empty antecedent).
    pub fn default_rule(&self) -> &Rule {
        &self.default_rule
    }

    pub fn default_class(&self) -> &str {
        self.default_rule.predicted_class()
    }

    pub fn class_attribute(&self) -> &str {
        &self.class_attribute
    }

    /// Total training error of the chosen cutoff.
    pub fn total_error(&self) -> u64 {
        self.errors
            .get(self.cutoff)
            .map(PrefixError::total)
            .unwrap_or(0)
    }

    /// The full error table the truncation chose from, indexed by prefix
    /// length over the surviving rule sequence.
    pub fn prefix_errors(&self) -> &[PrefixError] {
        &self.errors
    }

    /// Classify a record: the first matching rule's predicted class, or the
    /// default class when no rule matches.
    pub fn classify(&self, record: &Record) -> &str {
        self.rules
            .iter()
            .find(|rule| rule.matches(record))
            .map(Rule::predicted_class)
            .unwrap_or_else(|| self.default_rule.predicted_class())
    }

    /// Fraction of records whose actual class matches the classified one.
    /// An empty record set yields 0.
    pub fn accuracy(&self, records: &[Record]) -> f64 {
        if records.is_empty() {
            return 0.0;
        }
        let correct = records
            .iter()
            .filter(|record| record.get(&self.class_attribute) == Some(self.classify(record)))
            .count();
        correct as f64 / records.len() as f64
    }

    /// Deterministic JSON report of the classifier: the retained rules in
    /// order with their statistics, the default class, and the total error.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "class_attribute": self.class_attribute,
            "rule_count": self.rules.len(),
            "total_error": self.total_error(),
            "default_class": self.default_class(),
            "rules": self
                .rules
                .iter()
                .map(|rule| {
                    serde_json::json!({
                        "text": rule.to_text(),
                        "confidence": rule.confidence(),
                        "support": rule.support(),
                        "lift": rule.lift(),
                    })
                })
                .collect::<Vec<_>>(),
        })
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use carver_core::{Record, Rule};

    use crate::build_classifier;

    fn record(id: u64, pairs: &[(&str, &str)]) -> Record {
        let mut rec = Record::new(id);
        for (k, v) in pairs {
            rec.put(*k, *v);
        }
        rec
    }

    fn sample() -> (Vec<Rule>, Vec<Record>) {
        let rules = vec![
            Rule::build("{a=1} => {c=x}", 0.9, 0.4).unwrap(),
            Rule::build("{b=2} => {c=y}", 0.8, 0.4).unwrap(),
        ];
        let records = vec![
            record(1, &[("a", "1"), ("c", "x")]),
            record(2, &[("a", "1"), ("c", "x")]),
            record(3, &[("b", "2"), ("c", "y")]),
            record(4, &[("b", "2"), ("c", "y")]),
            record(5, &[("d", "4"), ("c", "x")]),
        ];
        (rules, records)
    }

    #[test]
    fn classify_walks_rules_then_default() {
        let (rules, records) = sample();
        let classifier = build_classifier(rules, &records).unwrap();

        assert_eq!(classifier.classify(&record(10, &[("a", "1")])), "x");
        assert_eq!(classifier.classify(&record(11, &[("b", "2")])), "y");
        // nothing matches: the default class answers
        assert_eq!(
            classifier.classify(&record(12, &[("e", "5")])),
            classifier.default_class()
        );
    }

    #[test]
    fn accuracy_over_training_records() {
        let (rules, records) = sample();
        let classifier = build_classifier(rules, &records).unwrap();
        // every record classifies correctly: covered ones by their rules,
        // the stray one by the default class `x`
        assert_eq!(classifier.accuracy(&records), 1.0);
        assert_eq!(classifier.accuracy(&[]), 0.0);
    }

    #[test]
    fn json_report_is_deterministic_and_complete() {
        let (rules, records) = sample();
        let classifier = build_classifier(rules, &records).unwrap();
        let json = classifier.to_json();

        assert_eq!(json["class_attribute"], "c");
        assert_eq!(json["rule_count"], 2);
        assert_eq!(json["default_class"], "x");
        let listed = json["rules"].as_array().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0]["text"], "{a=1} => {c=x}");
        assert_eq!(listed[0]["confidence"], 0.9);
        assert_eq!(listed[1]["text"], "{b=2} => {c=y}");

        // serialization is stable across calls
        assert_eq!(
            serde_json::to_string(&json).unwrap(),
            serde_json::to_string(&classifier.to_json()).unwrap()
        );
    }
}
