//! Near-duplicate filtering for generated text variants.
//!
//! Two texts count as the same variant when their normalized forms are equal
//! or their word sets differ by fewer than [`MIN_TOKEN_DIFFERENCE`] words.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Minimum size of the symmetric word-set difference between accepted variants.
pub const MIN_TOKEN_DIFFERENCE: usize = 3;

static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\s]+").expect("valid non-word regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Lowercase, turn punctuation and symbols into spaces, collapse whitespace, trim.
pub fn normalize(s: &str) -> String {
    let lowered = s.to_lowercase();
    let words_only = NON_WORD.replace_all(&lowered, " ");
    WHITESPACE.replace_all(&words_only, " ").trim().to_string()
}

/// Number of words present in exactly one of the two normalized strings.
pub fn token_difference(a: &str, b: &str) -> usize {
    let left: HashSet<&str> = a.split_whitespace().collect();
    let right: HashSet<&str> = b.split_whitespace().collect();
    left.symmetric_difference(&right).count()
}

/// Accepted variants, in acceptance order.
#[derive(Debug, Clone)]
pub struct VariantSet {
    accepted: Vec<String>,
    normalized: Vec<String>,
    min_difference: usize,
}

impl Default for VariantSet {
    fn default() -> Self {
        Self::new(MIN_TOKEN_DIFFERENCE)
    }
}

impl VariantSet {
    pub fn new(min_difference: usize) -> Self {
        Self {
            accepted: Vec::new(),
            normalized: Vec::new(),
            min_difference,
        }
    }

    /// Whether `candidate` is far enough from every accepted variant.
    pub fn admits(&self, candidate: &str) -> bool {
        let candidate = normalize(candidate);
        self.admits_normalized(&candidate)
    }

    fn admits_normalized(&self, candidate: &str) -> bool {
        self.normalized.iter().all(|existing| {
            existing != candidate && token_difference(existing, candidate) >= self.min_difference
        })
    }

    /// Accept `candidate` (trimmed, otherwise untouched) if it is unique.
    pub fn try_accept(&mut self, candidate: &str) -> bool {
        let normalized = normalize(candidate);
        if !self.admits_normalized(&normalized) {
            return false;
        }
        self.accepted.push(candidate.trim().to_string());
        self.normalized.push(normalized);
        true
    }

    /// Append without a similarity check. Used for fallback padding.
    pub fn push_unchecked(&mut self, variant: String) {
        self.normalized.push(normalize(&variant));
        self.accepted.push(variant);
    }

    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.accepted
    }

    pub fn into_vec(self) -> Vec<String> {
        self.accepted
    }
}

/// Drop blank and exact (post-normalization) duplicates, keep at most `limit`.
pub fn dedupe_exact<I, S>(variants: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for variant in variants {
        if out.len() >= limit {
            break;
        }
        let variant = variant.as_ref();
        let key = normalize(variant);
        if key.is_empty() || !seen.insert(key) {
            continue;
        }
        out.push(variant.trim().to_string());
    }
    out
}
