//! Word-set similarity scoring.
//!
//! Every duplication or relevance decision in the pipeline funnels through
//! `token_jaccard`: case-insensitive whitespace tokenization into sets,
//! then |intersection| / |union|. No stemming, no stopword removal: the
//! crudeness is a known limitation, kept deliberately so scores stay cheap
//! and explainable.

use std::collections::HashSet;

use moka::sync::Cache;
use xxhash_rust::xxh64::Xxh64;

/// Jaccard similarity over whitespace-delimited, lowercased token sets.
///
/// - Returns 0.0 when either input has no tokens.
/// - Returns 1.0 iff both token sets are identical and non-empty.
/// - Symmetric in its arguments.
pub fn token_jaccard(a: &str, b: &str) -> f64 {
    let ta: HashSet<String> = tokens(a);
    let tb: HashSet<String> = tokens(b);

    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }

    let intersection = ta.intersection(&tb).count();
    let union = ta.union(&tb).count();

    intersection as f64 / union as f64
}

fn tokens(s: &str) -> HashSet<String> {
    s.split_whitespace().map(|w| w.to_lowercase()).collect()
}

/// Pair-scoring cache for repeated similarity queries.
///
/// A duplicate sweep scores every candidate description against every known
/// capability, so the same pairs recur across batches. Keys are order
/// independent: the pair hashes identically in both directions, matching the
/// symmetry of the underlying score.
pub struct SimilarityCache {
    cache: Cache<u64, f64>,
}

impl SimilarityCache {
    /// Create a cache sized for `capacity` distinct pairs.
    pub fn new(capacity: u64) -> Self {
        Self {
            cache: Cache::new(capacity),
        }
    }

    /// Cached `token_jaccard`. Caching never changes the returned value.
    pub fn score(&self, a: &str, b: &str) -> f64 {
        let key = pair_key(a, b);

        if let Some(s) = self.cache.get(&key) {
            return s;
        }

        let s = token_jaccard(a, b);
        self.cache.insert(key, s);
        s
    }
}

impl Default for SimilarityCache {
    fn default() -> Self {
        Self::new(100_000)
    }
}

/// Order-independent hash of a string pair (xxhash64, seed 0).
fn pair_key(a: &str, b: &str) -> u64 {
    // Hash the lexicographically smaller side first so (a, b) and (b, a)
    // collapse to one entry.
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

    let mut hasher = Xxh64::new(0);
    hasher.update(lo.as_bytes());
    hasher.update(&[0xff]); // separator, keeps "ab"+"c" distinct from "a"+"bc"
    hasher.update(hi.as_bytes());
    hasher.digest()
}
