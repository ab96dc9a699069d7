//! carver-prune: database-coverage pruning and classifier assembly.
//!
//! Consumes a parsed candidate rule pool plus the training record set, runs
//! the single coverage pass, drops rules that never uniquely cover a
//! record, and truncates the survivors at the error-minimizing prefix with
//! an attached default rule.
//!
//! The whole pipeline is a single-threaded batch computation over
//! already-loaded data: no I/O, no timers, no unbounded recursion. The
//! coverage engine is the only mutator, and [`build_classifier`] drives it
//! from a clean slate, so a failed or abandoned build leaves nothing to
//! recover.

pub mod classifier;
pub mod coverage;
pub mod default_chain;
pub mod error;
pub mod truncate;

pub use classifier::Classifier;
pub use coverage::{CoverState, CoverageEngine, Replacement};
pub use default_chain::{build_default_chain, DefaultCandidate};
pub use error::BuildError;
pub use truncate::{truncate, PrefixError, Truncation};

use carver_core::{Record, Rule};

/// Build the final classifier from a candidate rule pool and the training
/// record set.
///
/// Pipeline: validate the pool, sort (stable) into pruning order, run the
/// single coverage pass, drop unmarked rules, truncate at the prefix with
/// minimal total error, attach that prefix's default rule. If no rule
/// survives, the classifier is the default rule alone, predicting the
/// global majority class.
///
/// # Errors
///
/// Fails if the pool is empty, a rule is not a class association rule, the
/// pool spans more than one class attribute, or a record lacks the class
/// attribute. The coverage and truncation passes themselves cannot fail on
/// validated input.
pub fn build_classifier(
    rules: Vec<Rule>,
    records: &[Record],
) -> Result<Classifier, BuildError> {
    let class_attr = validate(&rules, records)?;
    let mut engine = CoverageEngine::new(rules);
    engine.run(records, &class_attr);
    engine.drop_unmarked();
    let chain = build_default_chain(&engine, records, &class_attr);
    let truncation = truncate(&engine, &chain);
    Ok(Classifier::assemble(&engine, &chain, &truncation, class_attr))
}

/// Check the pool is a single-class-attribute CAR set and every record
/// carries that attribute. Returns the class attribute.
fn validate(rules: &[Rule], records: &[Record]) -> Result<String, BuildError> {
    let mut class_attr: Option<&str> = None;
    for rule in rules {
        if rule.consequent().len() != 1 {
            return Err(BuildError::NotAClassRule {
                text: rule.text().to_owned(),
            });
        }
        let attr = rule.class_attribute();
        match class_attr {
            None => class_attr = Some(attr),
            Some(expected) if expected != attr => {
                return Err(BuildError::MixedClassAttribute {
                    expected: expected.to_owned(),
                    found: attr.to_owned(),
                    text: rule.text().to_owned(),
                });
            }
            Some(_) => {}
        }
    }
    let class_attr = class_attr.ok_or(BuildError::EmptyRulePool)?;
    for record in records {
        if !record.contains_key(class_attr) {
            return Err(BuildError::RecordMissingClass {
                record_id: record.id(),
                class_attribute: class_attr.to_owned(),
            });
        }
    }
    Ok(class_attr.to_owned())
}

// ──────────────────────────────────────────────
// Integration tests
// ──────────────────────────────────────────────
