//! Criterion scoring.
//!
//! Seven independent, deterministic scoring functions over a
//! (suggestion, build-spec) pair. Every function is total: missing or empty
//! inputs fall back to neutral/zero sub-scores instead of failing. The one
//! exception is a contract violation (a precomputed score outside [0,1]),
//! which surfaces as an `EvalError` so the orchestrator can record it
//! distinctly from an honest threshold miss.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::catalog::CapabilityCatalog;
use crate::core::generate::Suggestion;
use crate::core::similarity::SimilarityCache;
use crate::core::specs::BuildSpec;
use crate::infra::config::{ScoringConfig, Thresholds};

/// The seven validation criteria, in canonical evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    TechnicalFeasibility,
    DuplicateCheck,
    DomainValue,
    ImplementationComplexity,
    ApiCompatibility,
    InnovationScore,
    ResourceRequirements,
}

impl Criterion {
    /// All criteria in canonical order.
    pub const ALL: [Criterion; 7] = [
        Criterion::TechnicalFeasibility,
        Criterion::DuplicateCheck,
        Criterion::DomainValue,
        Criterion::ImplementationComplexity,
        Criterion::ApiCompatibility,
        Criterion::InnovationScore,
        Criterion::ResourceRequirements,
    ];

    /// Stable string key used in reports and config.
    pub fn key(self) -> &'static str {
        match self {
            Criterion::TechnicalFeasibility => "technical_feasibility",
            Criterion::DuplicateCheck => "duplicate_check",
            Criterion::DomainValue => "domain_value",
            Criterion::ImplementationComplexity => "implementation_complexity",
            Criterion::ApiCompatibility => "api_compatibility",
            Criterion::InnovationScore => "innovation_score",
            Criterion::ResourceRequirements => "resource_requirements",
        }
    }
}

/// Pass/fail outcome of a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Pass,
    Fail,
}

/// One (candidate × criterion) outcome. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRecord {
    /// Candidate this record belongs to
    pub candidate_id: String,

    /// Criterion evaluated
    pub criterion: Criterion,

    /// Threshold outcome
    pub status: RecordStatus,

    /// Score in [0,1]
    pub score: f64,

    /// Human-readable scoring breakdown
    pub details: String,

    /// Non-empty only on fail-with-explanation (e.g. named duplicates)
    #[serde(default)]
    pub blocking_reasons: Vec<String>,

    /// True when the score is a placeholder for a failed evaluation,
    /// not a legitimate measurement
    #[serde(default)]
    pub evaluation_error: bool,
}

/// A criterion could not be scored because its input breaks the contract.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("{field} out of range for candidate {candidate}: {value}")]
    ScoreOutOfRange {
        candidate: String,
        field: &'static str,
        value: f64,
    },
}

/// Evaluates one criterion at a time against the catalog and config.
pub struct Validator<'a> {
    catalog: &'a CapabilityCatalog,
    cache: &'a SimilarityCache,
    thresholds: &'a Thresholds,
    scoring: &'a ScoringConfig,

    /// Namespace prefixes an API reference may resolve against
    known_namespaces: BTreeSet<String>,
}

impl<'a> Validator<'a> {
    pub fn new(
        catalog: &'a CapabilityCatalog,
        cache: &'a SimilarityCache,
        thresholds: &'a Thresholds,
        scoring: &'a ScoringConfig,
    ) -> Self {
        let mut known_namespaces = catalog.api_namespaces();
        known_namespaces.extend(scoring.known_api_prefixes.iter().map(|p| p.to_lowercase()));

        Self {
            catalog,
            cache,
            thresholds,
            scoring,
            known_namespaces,
        }
    }

    /// Score one criterion. Deterministic: identical inputs yield
    /// bit-identical records.
    pub fn evaluate(
        &self,
        suggestion: &Suggestion,
        spec: &BuildSpec,
        criterion: Criterion,
    ) -> Result<ValidationRecord, EvalError> {
        match criterion {
            Criterion::TechnicalFeasibility => Ok(self.technical_feasibility(suggestion, spec)),
            Criterion::DuplicateCheck => Ok(self.duplicate_check(suggestion)),
            Criterion::DomainValue => Ok(self.domain_value(suggestion)),
            Criterion::ImplementationComplexity => Ok(self.implementation_complexity(suggestion, spec)),
            Criterion::ApiCompatibility => Ok(self.api_compatibility(suggestion, spec)),
            Criterion::InnovationScore => self.innovation_score(suggestion),
            Criterion::ResourceRequirements => Ok(self.resource_requirements(suggestion, spec)),
        }
    }

    fn record(
        &self,
        suggestion: &Suggestion,
        criterion: Criterion,
        score: f64,
        details: String,
        blocking_reasons: Vec<String>,
    ) -> ValidationRecord {
        let status = if score >= self.thresholds.for_criterion(criterion) {
            RecordStatus::Pass
        } else {
            RecordStatus::Fail
        };

        ValidationRecord {
            candidate_id: suggestion.id.clone(),
            criterion,
            status,
            score,
            details,
            blocking_reasons,
            evaluation_error: false,
        }
    }

    /// Mean of four clamped sub-scores: API-dependency count, external
    /// dependency count, the spec's compatibility constant, and effort.
    fn technical_feasibility(&self, suggestion: &Suggestion, spec: &BuildSpec) -> ValidationRecord {
        let api_deps = spec.api_requirements.len();
        let ext_deps = spec.external_dependencies.len();

        let api_score = clamp01((10.0 - api_deps as f64) / 10.0);
        let dep_score = clamp01((5.0 - ext_deps as f64) / 5.0);
        let compat_score = clamp01(spec.compatibility);
        let effort_score = clamp01((100.0 - spec.effort_estimate as f64) / 100.0);

        let score = (api_score + dep_score + compat_score + effort_score) / 4.0;
        let details = format!(
            "api deps={}, external deps={}, compatibility={:.2}, effort={}%",
            api_deps, ext_deps, spec.compatibility, spec.effort_estimate
        );

        self.record(suggestion, Criterion::TechnicalFeasibility, score, details, Vec::new())
    }

    /// 1 − max pairwise similarity against every known capability, where
    /// pairwise similarity averages name and description overlap. The
    /// default threshold of 1.0 means any nonzero similarity fails;
    /// zero-tolerance is intentional and adjustable only through config.
    fn duplicate_check(&self, suggestion: &Suggestion) -> ValidationRecord {
        let mut max_similarity: f64 = 0.0;
        let mut blocking = Vec::new();

        for cap in self.catalog.entries() {
            let name_sim = self.cache.score(&suggestion.name, &cap.name);
            let desc_sim = self.cache.score(&suggestion.description, &cap.description);
            let overall = (name_sim + desc_sim) / 2.0;

            max_similarity = max_similarity.max(overall);

            if overall > self.scoring.duplicate_blocking_cutoff {
                blocking.push(format!("Duplicate of: {}", cap.name));
            }
        }

        let score = (1.0 - max_similarity).max(0.0);
        let details = format!(
            "max similarity={:.2}, named duplicates={}",
            max_similarity,
            blocking.len()
        );

        self.record(suggestion, Criterion::DuplicateCheck, score, details, blocking)
    }

    /// Mean of workflow-keyword coverage, industry-keyword ratio, and
    /// problem-verb ratio over the description and category text.
    fn domain_value(&self, suggestion: &Suggestion) -> ValidationRecord {
        let text = format!(
            "{} {}",
            suggestion.description.to_lowercase(),
            suggestion.category.label().to_lowercase()
        );

        // Each matched workflow keyword contributes 0.2, capped at 1.0.
        let workflow_hits = self
            .scoring
            .workflow_keywords
            .iter()
            .filter(|k| text.contains(k.as_str()))
            .count();
        let workflow_score = (workflow_hits as f64 * 0.2).min(1.0);

        let industry_score = keyword_ratio(&text, &self.scoring.industry_keywords);
        let verb_score = keyword_ratio(&text, &self.scoring.problem_verbs);

        let score = ((workflow_score + industry_score + verb_score) / 3.0).min(1.0);
        let details = format!(
            "workflow={:.2}, industry keywords={:.2}, problem verbs={:.2}",
            workflow_score, industry_score, verb_score
        );

        self.record(suggestion, Criterion::DomainValue, score, details, Vec::new())
    }

    /// Ease of implementation: complement of the fixed complexity weight.
    fn implementation_complexity(&self, suggestion: &Suggestion, spec: &BuildSpec) -> ValidationRecord {
        let score = 1.0 - spec.complexity_level.weight();
        let details = format!("complexity level={:?}", spec.complexity_level);

        self.record(suggestion, Criterion::ImplementationComplexity, score, details, Vec::new())
    }

    /// Fraction of named API references that resolve against a known
    /// namespace. No references at all is neutral, not failing.
    fn api_compatibility(&self, suggestion: &Suggestion, spec: &BuildSpec) -> ValidationRecord {
        let total = spec.api_requirements.len();

        let (score, details) = if total == 0 {
            (1.0, "no API references named".to_string())
        } else {
            let known = spec
                .api_requirements
                .iter()
                .filter(|r| {
                    let rl = r.to_lowercase();
                    self.known_namespaces.iter().any(|ns| rl.starts_with(ns))
                })
                .count();

            (
                known as f64 / total as f64,
                format!("known API references={known}/{total}"),
            )
        };

        self.record(suggestion, Criterion::ApiCompatibility, score, details, Vec::new())
    }

    /// Pass-through of the precomputed innovation score. A value outside
    /// [0,1] is a programming-contract violation, not a low score.
    fn innovation_score(&self, suggestion: &Suggestion) -> Result<ValidationRecord, EvalError> {
        let value = suggestion.innovation_score;

        if value.is_nan() || !(0.0..=1.0).contains(&value) {
            return Err(EvalError::ScoreOutOfRange {
                candidate: suggestion.id.clone(),
                field: "innovation_score",
                value,
            });
        }

        let details = format!("precomputed innovation score={value:.2}");
        Ok(self.record(suggestion, Criterion::InnovationScore, value, details, Vec::new()))
    }

    /// Inverse-scaled development-hour estimate.
    fn resource_requirements(&self, suggestion: &Suggestion, spec: &BuildSpec) -> ValidationRecord {
        let max_hours = self.scoring.max_development_hours;

        let score = if max_hours == 0 {
            0.0
        } else {
            clamp01((max_hours as f64 - spec.development_hours as f64) / max_hours as f64)
        };
        let details = format!(
            "development hours={} (scale max {})",
            spec.development_hours, max_hours
        );

        self.record(suggestion, Criterion::ResourceRequirements, score, details, Vec::new())
    }
}

/// Fraction of `keywords` present in `text`; empty keyword lists score zero.
fn keyword_ratio(text: &str, keywords: &[String]) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }

    let hits = keywords.iter().filter(|k| text.contains(k.as_str())).count();
    hits as f64 / keywords.len() as f64
}

/// NaN-safe clamp into [0,1].
fn clamp01(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{CapabilityCatalog, KnownCapability};
    use crate::core::generate::{Category, SuggestionStatus};
    use crate::core::specs::Complexity;

    fn catalog() -> CapabilityCatalog {
        CapabilityCatalog::build(vec![KnownCapability::new(
            "Filter",
            "addin.select.Filter",
            "element filtering",
            &[],
        )])
    }

    fn suggestion(name: &str, description: &str) -> Suggestion {
        Suggestion {
            id: "idea-0001".to_string(),
            name: name.to_string(),
            category: Category::SelectionFiltering,
            functionality: String::new(),
            description: description.to_string(),
            relevance_score: 0.7,
            innovation_score: 0.6,
            status: SuggestionStatus::Pending,
        }
    }

    fn spec(complexity: Complexity, apis: &[&str], ext: &[&str]) -> BuildSpec {
        BuildSpec {
            suggestion_id: "idea-0001".to_string(),
            api_requirements: apis.iter().map(|s| (*s).to_string()).collect(),
            external_dependencies: ext.iter().map(|s| (*s).to_string()).collect(),
            complexity_level: complexity,
            development_hours: complexity.development_hours(),
            effort_estimate: 20,
            compatibility: 0.9,
            completeness: 1.0,
        }
    }

    fn harness() -> (CapabilityCatalog, SimilarityCache, Thresholds, ScoringConfig) {
        (
            catalog(),
            SimilarityCache::default(),
            Thresholds::default(),
            ScoringConfig::default(),
        )
    }

    #[test]
    fn evaluation_is_deterministic() {
        let (catalog, cache, thresholds, scoring) = harness();
        let validator = Validator::new(&catalog, &cache, &thresholds, &scoring);

        let s = suggestion("Daylight Optimizer", "simulates seasonal sun exposure per room");
        let sp = spec(Complexity::Low, &["addin.select.Filter"], &[]);

        for criterion in Criterion::ALL {
            let a = validator.evaluate(&s, &sp, criterion).unwrap();
            let b = validator.evaluate(&s, &sp, criterion).unwrap();
            assert_eq!(a.score.to_bits(), b.score.to_bits(), "{criterion:?}");
            assert_eq!(a.status, b.status);
            assert_eq!(a.details, b.details);
        }
    }

    #[test]
    fn exact_duplicate_scores_zero_and_fails() {
        let (catalog, cache, thresholds, scoring) = harness();
        let validator = Validator::new(&catalog, &cache, &thresholds, &scoring);

        let s = suggestion("Filter", "element filtering");
        let sp = spec(Complexity::Low, &[], &[]);

        let rec = validator.evaluate(&s, &sp, Criterion::DuplicateCheck).unwrap();
        assert_eq!(rec.score, 0.0);
        assert_eq!(rec.status, RecordStatus::Fail);
        assert_eq!(rec.blocking_reasons, vec!["Duplicate of: Filter"]);
    }

    #[test]
    fn clean_candidate_passes_strict_duplicate_check() {
        let (catalog, cache, thresholds, scoring) = harness();
        let validator = Validator::new(&catalog, &cache, &thresholds, &scoring);

        // Zero token overlap with the catalog in both name and description.
        let s = suggestion("Daylight Optimizer", "simulates seasonal sun exposure per room");
        let sp = spec(Complexity::Low, &[], &[]);

        let rec = validator.evaluate(&s, &sp, Criterion::DuplicateCheck).unwrap();
        assert_eq!(rec.score, 1.0);
        assert_eq!(rec.status, RecordStatus::Pass);
        assert!(rec.blocking_reasons.is_empty());
    }

    #[test]
    fn any_nonzero_similarity_fails_the_literal_threshold() {
        let (catalog, cache, thresholds, scoring) = harness();
        let validator = Validator::new(&catalog, &cache, &thresholds, &scoring);

        // "filtering" overlaps the catalog description; max similarity > 0.
        let s = suggestion("Daylight Optimizer", "room filtering by sun exposure");
        let sp = spec(Complexity::Low, &[], &[]);

        let rec = validator.evaluate(&s, &sp, Criterion::DuplicateCheck).unwrap();
        assert!(rec.score < 1.0);
        assert_eq!(rec.status, RecordStatus::Fail);
    }

    #[test]
    fn feasibility_sub_scores_clamp_at_zero() {
        let (catalog, cache, thresholds, scoring) = harness();
        let validator = Validator::new(&catalog, &cache, &thresholds, &scoring);

        let s = suggestion("Heavy Tool", "does everything");
        let many_apis: Vec<&str> = vec!["host.db.A"; 14];
        let sp = spec(Complexity::Expert, &many_apis, &["a", "b", "c", "d", "e", "f"]);

        let rec = validator
            .evaluate(&s, &sp, Criterion::TechnicalFeasibility)
            .unwrap();
        // 14 APIs and 6 external deps push both counts past their scale;
        // the score stays within bounds instead of going negative.
        assert!((0.0..=1.0).contains(&rec.score));
        assert_eq!(rec.status, RecordStatus::Fail);
    }

    #[test]
    fn api_compatibility_neutral_when_unspecified() {
        let (catalog, cache, thresholds, scoring) = harness();
        let validator = Validator::new(&catalog, &cache, &thresholds, &scoring);

        let s = suggestion("Quiet Tool", "no api surface");
        let sp = spec(Complexity::Low, &[], &[]);

        let rec = validator.evaluate(&s, &sp, Criterion::ApiCompatibility).unwrap();
        assert_eq!(rec.score, 1.0);
        assert_eq!(rec.status, RecordStatus::Pass);
    }

    #[test]
    fn api_compatibility_counts_unknown_namespaces() {
        let (catalog, cache, thresholds, scoring) = harness();
        let validator = Validator::new(&catalog, &cache, &thresholds, &scoring);

        let s = suggestion("Bridge Tool", "bridges things");
        let sp = spec(
            Complexity::Low,
            &["addin.select.Filter", "mystery.api.Call"],
            &[],
        );

        let rec = validator.evaluate(&s, &sp, Criterion::ApiCompatibility).unwrap();
        assert_eq!(rec.score, 0.5);
        assert_eq!(rec.status, RecordStatus::Fail);
    }

    #[test]
    fn out_of_range_innovation_is_a_contract_violation() {
        let (catalog, cache, thresholds, scoring) = harness();
        let validator = Validator::new(&catalog, &cache, &thresholds, &scoring);

        let mut s = suggestion("Odd Tool", "odd");
        s.innovation_score = 1.7;
        let sp = spec(Complexity::Low, &[], &[]);

        let err = validator.evaluate(&s, &sp, Criterion::InnovationScore);
        assert!(err.is_err());
    }

    #[test]
    fn complexity_ease_thresholds() {
        let (catalog, cache, thresholds, scoring) = harness();
        let validator = Validator::new(&catalog, &cache, &thresholds, &scoring);
        let s = suggestion("Tool", "text");

        let low = validator
            .evaluate(&s, &spec(Complexity::Low, &[], &[]), Criterion::ImplementationComplexity)
            .unwrap();
        assert_eq!(low.status, RecordStatus::Pass); // ease 0.8

        let medium = validator
            .evaluate(&s, &spec(Complexity::Medium, &[], &[]), Criterion::ImplementationComplexity)
            .unwrap();
        assert_eq!(medium.status, RecordStatus::Fail); // ease 0.5 < 0.6
    }

    #[test]
    fn resource_scaling_follows_hours() {
        let (catalog, cache, thresholds, scoring) = harness();
        let validator = Validator::new(&catalog, &cache, &thresholds, &scoring);
        let s = suggestion("Tool", "text");

        let fast = validator
            .evaluate(&s, &spec(Complexity::Medium, &[], &[]), Criterion::ResourceRequirements)
            .unwrap();
        assert!((fast.score - 0.8).abs() < 1e-12); // (40-8)/40
        assert_eq!(fast.status, RecordStatus::Pass);

        let slow = validator
            .evaluate(&s, &spec(Complexity::High, &[], &[]), Criterion::ResourceRequirements)
            .unwrap();
        assert!((slow.score - 0.6).abs() < 1e-12); // (40-16)/40
        assert_eq!(slow.status, RecordStatus::Fail);
    }
}
