/// Errors raised while assembling a classifier from mined rules and
/// training records. All of them are detected before the coverage pass
/// starts; the pass itself cannot fail on validated input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    /// A rule's consequent is not a single class pair, so it is not a class
    /// association rule.
    #[error("rule `{text}` is not a class association rule: consequent must be a single class pair")]
    NotAClassRule { text: String },

    /// The rule pool spans more than one class attribute.
    #[error("rule `{text}` predicts on `{found}` but the pool classifies on `{expected}`")]
    MixedClassAttribute {
        expected: String,
        found: String,
        text: String,
    },

    /// A training record lacks the class attribute the pool predicts on.
    #[error("record {record_id} lacks the class attribute `{class_attribute}`")]
    RecordMissingClass {
        record_id: u64,
        class_attribute: String,
    },

    /// No class attribute can be derived from an empty rule pool.
    #[error("cannot derive a class attribute from an empty rule pool")]
    EmptyRulePool,
}
