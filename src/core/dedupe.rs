//! Duplicate probing against the capability catalog.
//!
//! Two independent nets, both intentionally wide:
//!
//! 1. Symmetric substring containment between every lookup key and the
//!    normalized candidate name. Both directions are checked, so a short
//!    key like `range` will flag many candidates, a documented limitation
//!    of the probe, not a bug.
//! 2. Description similarity against every raw catalog entry (including
//!    entries shadowed out of keyed lookup), above a configurable cutoff.
//!
//! The probe never fails: an empty result means "no known duplicate", and
//! the caller decides whether that counts as a pass.

use std::collections::HashSet;

use crate::core::catalog::{CapabilityCatalog, KnownCapability};
use crate::core::similarity::SimilarityCache;

/// Catalog-backed duplicate probe.
pub struct DuplicateDetector<'a> {
    catalog: &'a CapabilityCatalog,
    cache: &'a SimilarityCache,

    /// Description-similarity threshold above which an entry is a match
    description_cutoff: f64,
}

impl<'a> DuplicateDetector<'a> {
    pub fn new(
        catalog: &'a CapabilityCatalog,
        cache: &'a SimilarityCache,
        description_cutoff: f64,
    ) -> Self {
        Self {
            catalog,
            cache,
            description_cutoff,
        }
    }

    /// Collect every catalog capability the candidate plausibly duplicates.
    ///
    /// Matches are deduplicated by capability name with insertion order
    /// preserved: keyed matches first (table order), then similarity
    /// matches (registration order).
    pub fn check(&self, candidate_name: &str, candidate_description: &str) -> Vec<KnownCapability> {
        let mut matches: Vec<KnownCapability> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        let squashed = normalize_squashed(candidate_name);
        let spaced = normalize_spaced(candidate_name);

        // 1) Keyed containment probe. An empty normalized name would make
        //    the containment test vacuously true for every key; skip it.
        if !squashed.is_empty() {
            for (key, cap) in self.catalog.keyed_entries() {
                let hit = contains_either_way(key, &squashed) || contains_either_way(key, &spaced);

                if hit && seen.insert(cap.name.clone()) {
                    matches.push(cap.clone());
                }
            }
        }

        // 2) Description-similarity scan over the raw entry list, so
        //    capabilities shadowed out of keyed lookup still surface here.
        if !candidate_description.trim().is_empty() {
            for cap in self.catalog.entries() {
                let sim = self.cache.score(candidate_description, &cap.description);

                if sim > self.description_cutoff && seen.insert(cap.name.clone()) {
                    matches.push(cap.clone());
                }
            }
        }

        matches
    }
}

/// Post-generation sweep: count batch members whose name or description
/// token-overlap with any catalog entry crosses the configured cutoffs.
///
/// The generator's real-time screen works on normalized keys; this pass is
/// the independent overlap check run before validation, and any nonzero
/// count aborts the batch upstream.
pub fn overlap_duplicates(
    batch: &[crate::core::generate::Suggestion],
    catalog: &CapabilityCatalog,
    cache: &SimilarityCache,
    name_cutoff: f64,
    description_cutoff: f64,
) -> usize {
    batch
        .iter()
        .filter(|s| {
            catalog.entries().iter().any(|cap| {
                cache.score(&s.name, &cap.name) > name_cutoff
                    || cache.score(&s.description, &cap.description) > description_cutoff
            })
        })
        .count()
}

/// Lowercase with separators and whitespace removed: `Smart Filter` → `smartfilter`.
fn normalize_squashed(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .collect()
}

/// Lowercase with separator runs collapsed to single spaces.
fn normalize_spaced(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn contains_either_way(key: &str, name: &str) -> bool {
    !name.is_empty() && (key.contains(name) || name.contains(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::KnownCapability;

    fn catalog() -> CapabilityCatalog {
        CapabilityCatalog::build(vec![
            KnownCapability::new("Filter", "addin.select.Filter", "element filtering", &[]),
            KnownCapability::new(
                "Transaction",
                "host.db.Transaction",
                "Create transaction for model modifications",
                &[],
            ),
        ])
    }

    #[test]
    fn substring_containment_flags_extended_names() {
        let catalog = catalog();
        let cache = SimilarityCache::default();
        let det = DuplicateDetector::new(&catalog, &cache, 0.7);

        let hits = det.check("Smart Filter", "advanced element filtering tool");
        assert!(!hits.is_empty());
        assert_eq!(hits[0].name, "Filter");
    }

    #[test]
    fn exact_lowercase_name_matches() {
        let catalog = catalog();
        let cache = SimilarityCache::default();
        let det = DuplicateDetector::new(&catalog, &cache, 0.7);

        let hits = det.check("filter", "");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Filter");
    }

    #[test]
    fn description_similarity_catches_renames() {
        let catalog = catalog();
        let cache = SimilarityCache::default();
        let det = DuplicateDetector::new(&catalog, &cache, 0.7);

        // No name overlap at all, description nearly identical.
        let hits = det.check("Model Guard", "create transaction for model modifications");
        assert!(hits.iter().any(|c| c.name == "Transaction"));
    }

    #[test]
    fn clean_candidate_returns_empty() {
        let catalog = catalog();
        let cache = SimilarityCache::default();
        let det = DuplicateDetector::new(&catalog, &cache, 0.7);

        let hits = det.check("Daylight Optimizer", "simulates seasonal sun exposure per room");
        assert!(hits.is_empty());
    }

    #[test]
    fn empty_candidate_never_matches_everything() {
        let catalog = catalog();
        let cache = SimilarityCache::default();
        let det = DuplicateDetector::new(&catalog, &cache, 0.7);

        assert!(det.check("", "").is_empty());
        assert!(det.check("   ", "").is_empty());
    }

    #[test]
    fn matches_dedup_by_name_in_insertion_order() {
        // "Filter" matches via several keys; it must appear once.
        let catalog = catalog();
        let cache = SimilarityCache::default();
        let det = DuplicateDetector::new(&catalog, &cache, 0.7);

        let hits = det.check("filter", "element filtering");
        assert_eq!(hits.len(), 1);
    }
}
