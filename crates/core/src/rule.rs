//! The classification rule entity.
//!
//! A [`Rule`] is immutable after construction: text, predicate maps, and
//! statistics never change. Per-run pruning bookkeeping (coverage counts,
//! takeover history, the marked flag) lives in the coverage engine's arena,
//! keyed by rule position, not on the rule itself.

use std::fmt;

use crate::codec::{parse_rule_text, predicates_to_text, Metadata, Predicates};
use crate::error::RuleError;
use crate::record::Record;

/// A class association rule: `antecedent => consequent` plus the statistics
/// supplied by the mining stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    text: String,
    antecedent: Predicates,
    consequent: Predicates,
    confidence: f64,
    support: f64,
    lift: f64,
}

impl Rule {
    /// Parse `text` without a vocabulary. Lift defaults to 0.
    pub fn build(text: &str, confidence: f64, support: f64) -> Result<Rule, RuleError> {
        Rule::build_with_lift(text, confidence, support, 0.0)
    }

    pub fn build_with_lift(
        text: &str,
        confidence: f64,
        support: f64,
        lift: f64,
    ) -> Result<Rule, RuleError> {
        let (antecedent, consequent) = parse_rule_text(text, None)?;
        Ok(Rule {
            text: text.trim().to_owned(),
            antecedent,
            consequent,
            confidence,
            support,
            lift,
        })
    }

    /// Parse `text` against a known attribute/value vocabulary. A segment the
    /// vocabulary explains none of falls back to the unguided parser.
    pub fn build_with_meta(
        text: &str,
        meta: &Metadata,
        confidence: f64,
        support: f64,
        lift: f64,
    ) -> Result<Rule, RuleError> {
        let (antecedent, consequent) = parse_rule_text(text, Some(meta))?;
        Ok(Rule {
            text: text.trim().to_owned(),
            antecedent,
            consequent,
            confidence,
            support,
            lift,
        })
    }

    /// Synthetic fallback rule: empty antecedent, so it matches every record
    /// and predicts `class_value`. Only ever used as a classifier's terminal
    /// rule; it cannot be produced by parsing.
    pub fn default_rule(class_attr: &str, class_value: &str) -> Rule {
        let mut consequent = Predicates::new();
        consequent.insert(class_attr.to_owned(), class_value.to_owned());
        let text = predicates_to_text(&Predicates::new(), &consequent);
        Rule {
            text,
            antecedent: Predicates::new(),
            consequent,
            confidence: 0.0,
            support: 0.0,
            lift: 0.0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn antecedent(&self) -> &Predicates {
        &self.antecedent
    }

    pub fn consequent(&self) -> &Predicates {
        &self.consequent
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn support(&self) -> f64 {
        self.support
    }

    pub fn lift(&self) -> f64 {
        self.lift
    }

    /// True iff the record has every antecedent attribute with an equal
    /// value. The empty antecedent (default rule) matches everything.
    pub fn matches(&self, record: &Record) -> bool {
        self.antecedent
            .iter()
            .all(|(key, value)| record.get(key) == Some(value.as_str()))
    }

    /// The attribute this rule predicts on. Class association rules carry
    /// exactly one consequent pair; the first pair is used.
    pub fn class_attribute(&self) -> &str {
        self.consequent.keys().next().map(String::as_str).unwrap_or("")
    }

    /// The class value this rule predicts.
    pub fn predicted_class(&self) -> &str {
        self.consequent
            .values()
            .next()
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Canonical textual form, pairs in attribute order. Re-parsing the
    /// result yields the same predicate maps.
    pub fn to_text(&self) -> String {
        predicates_to_text(&self.antecedent, &self.consequent)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (confidence={}, support={})",
            self.to_text(),
            self.confidence,
            self.support
        )
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
