//! Majority-class fallback candidates, one per prefix length.
//!
//! The chain is an explicit vector indexed by prefix length rather than a
//! graph of rule-to-rule pointers; the truncator only ever walks it by
//! index. Entry `i` describes the fallback for a classifier truncated after
//! the first `i` surviving rules.

use std::collections::BTreeMap;

use carver_core::{Record, Rule};

use crate::coverage::CoverageEngine;

/// The majority-class fallback for one prefix length: classifies the
/// records the prefix leaves uncovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultCandidate {
    /// Majority class among the uncovered records.
    pub class: String,
    /// Uncovered records of the majority class.
    pub majority_count: u64,
    /// Total uncovered records at this prefix.
    pub uncovered: u64,
}

impl DefaultCandidate {
    /// Misclassifications if every uncovered record is classified as the
    /// majority class.
    pub fn error(&self) -> u64 {
        self.uncovered - self.majority_count
    }

    /// Materialize the synthetic fallback rule for this candidate.
    pub fn to_rule(&self, class_attr: &str) -> Rule {
        Rule::default_rule(class_attr, &self.class)
    }
}

/// Build the chain of default candidates for prefix lengths `0..=N` over
/// the engine's live rule sequence.
///
/// Entry 0 sees every record as uncovered; entry `i` subtracts the class
/// counts covered by the i-th live rule, so no majority vote is recomputed
/// from scratch. Majority ties break toward the class seen first in record
/// order, which is deterministic across runs.
pub fn build_default_chain(
    engine: &CoverageEngine,
    records: &[Record],
    class_attr: &str,
) -> Vec<DefaultCandidate> {
    let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
    let mut first_seen: Vec<&str> = Vec::new();
    for record in records {
        let Some(class) = record.get(class_attr) else {
            continue;
        };
        if !counts.contains_key(class) {
            first_seen.push(class);
        }
        *counts.entry(class).or_insert(0) += 1;
    }

    let mut chain = Vec::with_capacity(engine.live_count() + 1);
    chain.push(majority(&counts, &first_seen));
    for index in engine.live_indices() {
        for (class, covered) in engine.state(index).class_cases() {
            if let Some(count) = counts.get_mut(class.as_str()) {
                *count -= covered;
            }
        }
        chain.push(majority(&counts, &first_seen));
    }
    chain
}

fn majority(counts: &BTreeMap<&str, i64>, first_seen: &[&str]) -> DefaultCandidate {
    let uncovered: i64 = counts.values().sum();
    let mut best: Option<(&str, i64)> = None;
    for &class in first_seen {
        let count = counts.get(class).copied().unwrap_or(0);
        // strict comparison keeps the earliest-seen class on ties
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((class, count));
        }
    }
    let (class, count) = best.unwrap_or(("", 0));
    DefaultCandidate {
        class: class.to_owned(),
        majority_count: count.max(0) as u64,
        uncovered: uncovered.max(0) as u64,
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(text: &str, confidence: f64, support: f64) -> Rule {
        Rule::build(text, confidence, support).unwrap()
    }

    fn record(id: u64, pairs: &[(&str, &str)]) -> Record {
        let mut rec = Record::new(id);
        for (k, v) in pairs {
            rec.put(*k, *v);
        }
        rec
    }

    #[test]
    fn prefix_zero_sees_the_global_majority() {
        let engine = CoverageEngine::new(Vec::new());
        let records = vec![
            record(1, &[("c", "yes")]),
            record(2, &[("c", "yes")]),
            record(3, &[("c", "no")]),
        ];
        let chain = build_default_chain(&engine, &records, "c");
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].class, "yes");
        assert_eq!(chain[0].majority_count, 2);
        assert_eq!(chain[0].uncovered, 3);
        assert_eq!(chain[0].error(), 1);
    }

    #[test]
    fn majority_tie_breaks_toward_first_seen_class() {
        let engine = CoverageEngine::new(Vec::new());
        let records = vec![
            record(1, &[("c", "no")]),
            record(2, &[("c", "yes")]),
            record(3, &[("c", "yes")]),
            record(4, &[("c", "no")]),
        ];
        let chain = build_default_chain(&engine, &records, "c");
        assert_eq!(chain[0].class, "no");
    }

    #[test]
    fn chain_shrinks_uncovered_per_prefix() {
        let mut engine = CoverageEngine::new(vec![
            rule("{a=1} => {c=yes}", 0.9, 0.5),
            rule("{b=2} => {c=no}", 0.6, 0.5),
        ]);
        let records = vec![
            record(1, &[("a", "1"), ("c", "yes")]),
            record(2, &[("a", "1"), ("c", "yes")]),
            record(3, &[("b", "2"), ("c", "no")]),
            record(4, &[("d", "4"), ("c", "no")]),
        ];
        engine.run(&records, "c");
        let chain = build_default_chain(&engine, &records, "c");

        assert_eq!(chain.len(), 3);
        assert_eq!(chain[0].uncovered, 4);
        // after the first rule, its two `yes` records leave the pool
        assert_eq!(chain[1].uncovered, 2);
        assert_eq!(chain[1].class, "no");
        assert_eq!(chain[1].error(), 0);
        // after both rules only the unmatched record remains
        assert_eq!(chain[2].uncovered, 1);
        assert_eq!(chain[2].class, "no");
        assert_eq!(chain[2].error(), 0);
    }

    #[test]
    fn candidate_materializes_a_default_rule() {
        let candidate = DefaultCandidate {
            class: "yes".to_owned(),
            majority_count: 3,
            uncovered: 4,
        };
        let rule = candidate.to_rule("play");
        assert!(rule.antecedent().is_empty());
        assert_eq!(rule.class_attribute(), "play");
        assert_eq!(rule.predicted_class(), "yes");
    }

    #[test]
    fn empty_record_set_yields_an_empty_candidate() {
        let engine = CoverageEngine::new(Vec::new());
        let chain = build_default_chain(&engine, &[], "c");
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].uncovered, 0);
        assert_eq!(chain[0].error(), 0);
    }
}
