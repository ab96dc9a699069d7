//! Error-minimizing truncation of the surviving rule sequence.
//!
//! For every prefix length of the live rule sequence, the total error is
//! the misclassifications committed by the prefix's own rules plus the
//! misclassifications of the matching default candidate over the records
//! the prefix leaves uncovered. The shortest prefix with minimal total
//! error wins; everything after it is discarded even if marked.

use serde::Serialize;

use crate::coverage::CoverageEngine;
use crate::default_chain::DefaultCandidate;

/// Errors for one prefix length of the surviving rule sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrefixError {
    /// Misclassifications by records whose first match is inside the
    /// prefix, judged by each covering rule's predicted class.
    pub rule_error: u64,
    /// Misclassifications among the uncovered records under the prefix's
    /// default class.
    pub default_error: u64,
}

impl PrefixError {
    pub fn total(&self) -> u64 {
        self.rule_error + self.default_error
    }
}

/// Result of the truncation scan. `errors` is indexed by prefix length;
/// `cutoff` is the chosen prefix length.
#[derive(Debug, Clone, PartialEq)]
pub struct Truncation {
    pub cutoff: usize,
    pub errors: Vec<PrefixError>,
}

/// Compute cumulative classification error at every prefix length and pick
/// the shortest prefix with minimal total error.
///
/// `chain` must be the default chain built for the same engine state, so
/// `chain.len() == live rule count + 1`.
pub fn truncate(engine: &CoverageEngine, chain: &[DefaultCandidate]) -> Truncation {
    let mut errors = Vec::with_capacity(chain.len());
    let mut rule_error: u64 = 0;
    errors.push(PrefixError {
        rule_error,
        default_error: chain.first().map(DefaultCandidate::error).unwrap_or(0),
    });
    for (prefix, index) in engine.live_indices().enumerate() {
        let state = engine.state(index);
        let covered = state.covered_total();
        let correct = state.covered_for(engine.rule(index).predicted_class());
        rule_error += (covered - correct).max(0) as u64;
        errors.push(PrefixError {
            rule_error,
            default_error: chain
                .get(prefix + 1)
                .map(DefaultCandidate::error)
                .unwrap_or(0),
        });
    }

    let mut cutoff = 0usize;
    for (prefix, error) in errors.iter().enumerate() {
        // strict improvement only, so ties keep the shorter classifier
        if error.total() < errors[cutoff].total() {
            cutoff = prefix;
        }
    }
    Truncation { cutoff, errors }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
