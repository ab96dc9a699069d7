//! Rule text codec.
//!
//! Parses the textual rule syntax `{k=v,...} => {k=v,...}` into antecedent
//! and consequent predicate maps, and serializes predicate maps back to the
//! canonical text form.
//!
//! Grammar (exact, case-sensitive):
//!
//! ```text
//! rule     := "{" pairlist "}" WS "=>" WS "{" pairlist "}"
//! pairlist := pair ("," pair)*
//! pair     := key "=" value
//! ```
//!
//! No escaping of `,` `=` `{` `}` inside keys or values is defined. Two
//! parsing modes exist:
//!
//! - **Unguided**: split each braced segment on commas, each token on the
//!   first `=`. Cannot represent values that themselves contain commas.
//! - **Metadata-guided**: tokenize against a known attribute/value
//!   vocabulary with longest-match precedence. Values containing commas are
//!   handled because matching is vocabulary-driven. Two distinct candidates
//!   of equal length at one position are rejected as ambiguous rather than
//!   resolved by iteration order.
//!
//! The caller selects the mode explicitly by passing (or withholding) the
//! vocabulary; there is no runtime inspection.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::RuleError;

/// Attribute name -> required value.
pub type Predicates = BTreeMap<String, String>;

/// Attribute name -> legal value vocabulary, for metadata-guided parsing.
pub type Metadata = BTreeMap<String, BTreeSet<String>>;

/// Parse rule text into `(antecedent, consequent)` predicate maps.
///
/// With `meta` present the metadata-guided tokenizer runs first; a segment
/// the vocabulary explains none of falls back to the unguided parser, so
/// vocabulary gaps degrade to naive splitting rather than failing the rule.
/// Either side parsing to an empty map fails the whole rule.
pub fn parse_rule_text(
    text: &str,
    meta: Option<&Metadata>,
) -> Result<(Predicates, Predicates), RuleError> {
    let (ant_seg, cons_seg) = split_sides(text)?;
    let antecedent = parse_segment(text, ant_seg, meta)?;
    let consequent = parse_segment(text, cons_seg, meta)?;
    if antecedent.is_empty() {
        return Err(RuleError::malformed(text, "empty antecedent"));
    }
    if consequent.is_empty() {
        return Err(RuleError::malformed(text, "empty consequent"));
    }
    Ok((antecedent, consequent))
}

/// Serialize predicate maps to the canonical text form.
///
/// Pairs appear in attribute order, so the output is deterministic and
/// re-parsing it yields the same maps.
pub fn predicates_to_text(antecedent: &Predicates, consequent: &Predicates) -> String {
    format!("{{{}}} => {{{}}}", join_pairs(antecedent), join_pairs(consequent))
}

fn join_pairs(preds: &Predicates) -> String {
    preds
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}

/// Split `{...} => {...}` into the two brace-stripped segments.
fn split_sides(text: &str) -> Result<(&str, &str), RuleError> {
    let trimmed = text.trim();
    let Some((left, right)) = trimmed.split_once("=>") else {
        return Err(RuleError::malformed(text, "missing `=>`"));
    };
    let left = strip_braces(text, left.trim())?;
    let right = strip_braces(text, right.trim())?;
    Ok((left, right))
}

fn strip_braces<'a>(text: &str, seg: &'a str) -> Result<&'a str, RuleError> {
    seg.strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .ok_or_else(|| RuleError::malformed(text, "predicate side must be `{...}`"))
}

fn parse_segment(
    text: &str,
    seg: &str,
    meta: Option<&Metadata>,
) -> Result<Predicates, RuleError> {
    match meta {
        Some(m) => {
            let parsed = parse_guided(seg, m)?;
            if parsed.is_empty() {
                // The vocabulary explained nothing of this segment; fall
                // back to naive splitting.
                parse_unguided(text, seg)
            } else {
                Ok(parsed)
            }
        }
        None => parse_unguided(text, seg),
    }
}

/// Unguided mode: commas separate pairs, the first `=` separates key from
/// value. Any non-empty token lacking `=` fails the rule.
fn parse_unguided(text: &str, seg: &str) -> Result<Predicates, RuleError> {
    let mut out = Predicates::new();
    for token in seg.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let Some((key, value)) = token.split_once('=') else {
            return Err(RuleError::malformed(text, format!("pair `{}` lacks `=`", token)));
        };
        out.insert(key.to_owned(), value.to_owned());
    }
    Ok(out)
}

/// Metadata-guided mode: repeatedly consume the longest `key=value` token
/// the vocabulary can produce at the current position. A pair must be
/// followed by `,` or the end of the segment. Equal-length distinct
/// candidates make the boundary ambiguous and fail the parse; trailing
/// input the vocabulary cannot explain is dropped (the caller falls back
/// to the unguided parser when the whole segment is unexplained).
fn parse_guided(seg: &str, meta: &Metadata) -> Result<Predicates, RuleError> {
    let mut out = Predicates::new();
    let mut rest = seg;
    while !rest.is_empty() {
        let mut longest = 0usize;
        let mut winners: Vec<(&str, &str)> = Vec::new();
        for (key, values) in meta {
            for value in values {
                if !pair_matches_at(rest, key, value) {
                    continue;
                }
                let token_len = key.len() + 1 + value.len();
                if token_len > longest {
                    longest = token_len;
                    winners.clear();
                    winners.push((key.as_str(), value.as_str()));
                } else if token_len == longest {
                    winners.push((key.as_str(), value.as_str()));
                }
            }
        }
        match winners.as_slice() {
            [] => break,
            [(key, value)] => {
                out.insert((*key).to_owned(), (*value).to_owned());
                rest = &rest[longest..];
                if let Some(stripped) = rest.strip_prefix(',') {
                    rest = stripped;
                }
            }
            _ => {
                return Err(RuleError::AmbiguousMetadata {
                    segment: rest.to_owned(),
                    candidates: winners
                        .iter()
                        .map(|(k, v)| format!("{}={}", k, v))
                        .collect(),
                });
            }
        }
    }
    Ok(out)
}

/// True iff `rest` starts with `key=value` followed by `,` or end-of-input.
fn pair_matches_at(rest: &str, key: &str, value: &str) -> bool {
    let Some(after_key) = rest.strip_prefix(key) else {
        return false;
    };
    let Some(after_eq) = after_key.strip_prefix('=') else {
        return false;
    };
    let Some(after_value) = after_eq.strip_prefix(value) else {
        return false;
    };
    after_value.is_empty() || after_value.starts_with(',')
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
