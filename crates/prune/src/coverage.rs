//! The single coverage pass and its reversible bookkeeping.
//!
//! Rules stay immutable; every mutation of the run lands in a per-rule
//! [`CoverState`] arena owned by the engine and keyed by rule position.
//! Each training record is assigned to the first rule in pruning order
//! whose antecedent matches it. Removing a rule re-evaluates only that
//! rule's records, recording each takeover so the removal can be reversed
//! without rescanning the record set.

use std::collections::BTreeMap;

use carver_core::{sort_rules, Record, Rule};

/// One coverage takeover: `record` moved to the owning rule from the
/// `displaced` rule when the latter was removed from the cover set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replacement {
    pub record: usize,
    pub displaced: usize,
}

/// Per-rule, per-run pruning state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverState {
    marked: bool,
    class_cases: BTreeMap<String, i64>,
    replaces: Vec<Replacement>,
}

impl CoverState {
    /// True once the rule has been the first match for at least one record.
    pub fn marked(&self) -> bool {
        self.marked
    }

    /// Actual-class -> count of records currently attributed to the rule.
    /// Counts are always >= 0; zeroed classes are dropped from the map.
    pub fn class_cases(&self) -> &BTreeMap<String, i64> {
        &self.class_cases
    }

    /// Takeovers this rule performed, in assignment order, no duplicates.
    pub fn replaces(&self) -> &[Replacement] {
        &self.replaces
    }

    /// Total records currently attributed to the rule.
    pub fn covered_total(&self) -> i64 {
        self.class_cases.values().sum()
    }

    /// Records of `class` currently attributed to the rule.
    pub fn covered_for(&self, class: &str) -> i64 {
        self.class_cases.get(class).copied().unwrap_or(0)
    }

    fn inc(&mut self, class: &str) {
        *self.class_cases.entry(class.to_owned()).or_insert(0) += 1;
    }

    fn dec(&mut self, class: &str) {
        if let Some(count) = self.class_cases.get_mut(class) {
            *count -= 1;
            if *count <= 0 {
                self.class_cases.remove(class);
            }
        }
    }

    fn push_replacement(&mut self, replacement: Replacement) {
        if !self.replaces.contains(&replacement) {
            self.replaces.push(replacement);
        }
    }
}

/// Scans training records against the sorted rule list, assigns each record
/// to its first matching rule, and maintains per-rule, per-class coverage
/// counts with reversible bookkeeping.
///
/// The record slice passed to [`run`](CoverageEngine::run) must be the same
/// slice (same order) passed to every later [`remove`](CoverageEngine::remove)
/// and [`uncover`](CoverageEngine::uncover) call; assignments are positional.
#[derive(Debug)]
pub struct CoverageEngine {
    rules: Vec<Rule>,
    states: Vec<CoverState>,
    removed: Vec<bool>,
    /// record position -> covering rule position, None when uncovered.
    assigned: Vec<Option<usize>>,
}

impl CoverageEngine {
    /// Sorts the candidate pool (stable) into pruning order on construction.
    pub fn new(mut rules: Vec<Rule>) -> CoverageEngine {
        sort_rules(&mut rules);
        let count = rules.len();
        CoverageEngine {
            rules,
            states: vec![CoverState::default(); count],
            removed: vec![false; count],
            assigned: Vec::new(),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, index: usize) -> &Rule {
        &self.rules[index]
    }

    pub fn states(&self) -> &[CoverState] {
        &self.states
    }

    pub fn state(&self, index: usize) -> &CoverState {
        &self.states[index]
    }

    /// record position -> covering rule position.
    pub fn assignment(&self) -> &[Option<usize>] {
        &self.assigned
    }

    pub fn is_live(&self, index: usize) -> bool {
        index < self.removed.len() && !self.removed[index]
    }

    /// Positions of the rules still in the cover set, in pruning order.
    pub fn live_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.rules.len()).filter(move |&index| !self.removed[index])
    }

    pub fn live_count(&self) -> usize {
        self.removed.iter().filter(|removed| !**removed).count()
    }

    /// Clear all bookkeeping, keeping the sorted rule sequence.
    pub fn reset(&mut self) {
        for state in &mut self.states {
            *state = CoverState::default();
        }
        for removed in &mut self.removed {
            *removed = false;
        }
        self.assigned.clear();
    }

    /// The single coverage pass. For each record in order, the first rule
    /// whose antecedent matches covers it: the rule is marked and its count
    /// for the record's actual class incremented. Records matching no rule
    /// stay unassigned, left for the default rule chain.
    ///
    /// Starts from a clean slate, so re-running yields identical state.
    pub fn run(&mut self, records: &[Record], class_attr: &str) {
        self.reset();
        self.assigned = vec![None; records.len()];
        for (position, record) in records.iter().enumerate() {
            let Some(class) = record.get(class_attr) else {
                continue;
            };
            if let Some(index) = self.first_match(record) {
                self.assigned[position] = Some(index);
                self.states[index].marked = true;
                self.states[index].inc(class);
            }
        }
    }

    fn first_match(&self, record: &Record) -> Option<usize> {
        self.rules
            .iter()
            .enumerate()
            .find(|(index, rule)| !self.removed[*index] && rule.matches(record))
            .map(|(index, _)| index)
    }

    /// Discard every rule never marked during the pass: a rule that never
    /// became the first match for any record contributes nothing and is
    /// pruned unconditionally, independent of the truncation step. The
    /// arena is compacted and all bookkeeping indices remapped.
    pub fn drop_unmarked(&mut self) {
        let keep: Vec<bool> = self
            .states
            .iter()
            .zip(&self.removed)
            .map(|(state, removed)| state.marked && !removed)
            .collect();
        let mut remap: Vec<Option<usize>> = Vec::with_capacity(keep.len());
        let mut next = 0usize;
        for &kept in &keep {
            if kept {
                remap.push(Some(next));
                next += 1;
            } else {
                remap.push(None);
            }
        }

        let old_rules = std::mem::take(&mut self.rules);
        let old_states = std::mem::take(&mut self.states);
        for (index, (rule, mut state)) in old_rules.into_iter().zip(old_states).enumerate() {
            if remap[index].is_none() {
                continue;
            }
            let old_replaces = std::mem::take(&mut state.replaces);
            state.replaces = old_replaces
                .into_iter()
                .filter_map(|rep| {
                    remap[rep.displaced].map(|displaced| Replacement {
                        record: rep.record,
                        displaced,
                    })
                })
                .collect();
            self.rules.push(rule);
            self.states.push(state);
        }
        self.removed = vec![false; self.rules.len()];
        for slot in &mut self.assigned {
            *slot = slot.and_then(|index| remap[index]);
        }
    }

    /// Remove a live rule from the cover set and re-evaluate its records
    /// incrementally: each record it covered is rescanned against the
    /// remaining live rules. A rule taking a record over gets the count
    /// increment plus a `(record, previous rule)` replacement entry (no
    /// duplicates); the removed rule's count is decremented. Records with
    /// no remaining match become unassigned.
    pub fn remove(&mut self, index: usize, records: &[Record], class_attr: &str) {
        if index >= self.rules.len() || self.removed[index] {
            return;
        }
        self.removed[index] = true;
        let limit = self.assigned.len().min(records.len());
        for position in 0..limit {
            if self.assigned[position] != Some(index) {
                continue;
            }
            let Some(class) = records[position].get(class_attr) else {
                continue;
            };
            match self.first_match(&records[position]) {
                Some(taker) => {
                    self.assigned[position] = Some(taker);
                    self.states[taker].marked = true;
                    self.states[taker].inc(class);
                    self.states[taker].push_replacement(Replacement {
                        record: position,
                        displaced: index,
                    });
                    self.states[index].dec(class);
                }
                None => {
                    self.assigned[position] = None;
                    self.states[index].dec(class);
                }
            }
        }
        self.states[index].marked = false;
    }

    /// Reverse a prior [`remove`](CoverageEngine::remove): replay every
    /// replacement entry naming the rule as displaced, restoring the rule's
    /// counts (increment restored, decrement taker) and reassigning the
    /// records, without rescanning the record set.
    pub fn uncover(&mut self, index: usize, records: &[Record], class_attr: &str) {
        if index >= self.rules.len() || !self.removed[index] {
            return;
        }
        self.removed[index] = false;
        for taker in 0..self.states.len() {
            if taker == index {
                continue;
            }
            let (back, keep): (Vec<Replacement>, Vec<Replacement>) = self.states[taker]
                .replaces
                .drain(..)
                .partition(|rep| rep.displaced == index);
            self.states[taker].replaces = keep;
            if back.is_empty() {
                continue;
            }
            for rep in back {
                let Some(class) = records.get(rep.record).and_then(|r| r.get(class_attr))
                else {
                    continue;
                };
                self.assigned[rep.record] = Some(index);
                self.states[index].inc(class);
                self.states[taker].dec(class);
            }
            self.states[taker].marked = self.states[taker].covered_total() > 0;
        }
        self.states[index].marked = self.states[index].covered_total() > 0;
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
