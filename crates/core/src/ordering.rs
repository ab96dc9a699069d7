//! Total order over candidate rules.
//!
//! Higher confidence sorts first; ties break by higher support, then by
//! smaller antecedent cardinality (fewer conditions, the more general rule
//! wins). Sorting is stable, so rules ranked equal keep their mining order
//! and tied record assignments stay reproducible.

use std::cmp::Ordering;

use crate::rule::Rule;

/// Compare two rules in pruning order. This is a strict weak ordering over
/// the (confidence, support, antecedent size) triple.
pub fn compare_rules(a: &Rule, b: &Rule) -> Ordering {
    b.confidence()
        .total_cmp(&a.confidence())
        .then_with(|| b.support().total_cmp(&a.support()))
        .then_with(|| a.antecedent().len().cmp(&b.antecedent().len()))
}

/// Stable sort into pruning order.
pub fn sort_rules(rules: &mut [Rule]) {
    rules.sort_by(compare_rules);
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
