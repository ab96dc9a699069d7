//! The training record collaborator.
//!
//! The pruning engine only ever reads records: to test rule antecedent
//! matches and to read the true class value. Records are produced by the
//! surrounding application, usually deserialized from its JSON export.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A training record: attribute -> value, plus a stable numeric id used by
/// the coverage bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    id: u64,
    values: BTreeMap<String, String>,
}

impl Record {
    pub fn new(id: u64) -> Record {
        Record {
            id,
            values: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Build a record from a flat JSON object. Scalar values are
    /// stringified; returns `None` unless `value` is an object of scalars.
    pub fn from_json(id: u64, value: &serde_json::Value) -> Option<Record> {
        let object = value.as_object()?;
        let mut record = Record::new(id);
        for (key, v) in object {
            let text = match v {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            record.put(key.clone(), text);
        }
        Some(record)
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
