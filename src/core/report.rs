//! Batch quality aggregation and rendering.
//!
//! Pure fold over the validation records of a completed batch: coverage,
//! overall mean, per-criterion averages in canonical order, and improvement
//! deltas against the static historical baselines from config. The report
//! is read-only after construction and serializes to a flat JSON object.

use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::core::criteria::Criterion;
use crate::core::generate::{Suggestion, SuggestionStatus};
use crate::core::orchestrator::BatchRun;
use crate::infra::config::Baselines;

/// Aggregate output of one validated batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Report creation time (UTC)
    pub generated_at: DateTime<Utc>,

    /// Candidates in the batch
    pub total_candidates: usize,

    /// Recorded / required evaluations; 1.0 for a successful batch
    pub coverage: f64,

    /// Mean score across every validation record
    pub overall_score: f64,

    /// Candidates whose seven criteria all passed
    pub passed_candidates: usize,

    /// Candidates with at least one threshold miss
    pub failed_candidates: usize,

    /// Candidates carrying an evaluation-error record
    pub needs_review_candidates: usize,

    /// Mean score per criterion, canonical order
    pub per_criterion_average: IndexMap<String, f64>,

    /// Per-criterion average minus its historical baseline
    pub baseline_delta: IndexMap<String, f64>,

    /// Distinct blocking reasons collected from failed records
    pub blocking_issues: Vec<String>,
}

/// Fold a completed batch into its report.
pub fn aggregate(run: &BatchRun, suggestions: &[Suggestion], baselines: &Baselines) -> BatchReport {
    let records = &run.records;

    let overall_score = if records.is_empty() {
        0.0
    } else {
        records.iter().map(|r| r.score).sum::<f64>() / records.len() as f64
    };

    let mut per_criterion_average = IndexMap::new();
    let mut baseline_delta = IndexMap::new();

    for criterion in Criterion::ALL {
        let scores: Vec<f64> = records
            .iter()
            .filter(|r| r.criterion == criterion)
            .map(|r| r.score)
            .collect();

        if scores.is_empty() {
            continue;
        }

        let avg = scores.iter().sum::<f64>() / scores.len() as f64;
        per_criterion_average.insert(criterion.key().to_string(), avg);
        baseline_delta.insert(
            criterion.key().to_string(),
            avg - baselines.for_criterion(criterion),
        );
    }

    // Distinct blocking reasons, first-seen order.
    let blocking_issues: Vec<String> = records
        .iter()
        .flat_map(|r| r.blocking_reasons.iter().cloned())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect();

    let count = |status: SuggestionStatus| suggestions.iter().filter(|s| s.status == status).count();

    BatchReport {
        generated_at: Utc::now(),
        total_candidates: suggestions.len(),
        coverage: run.coverage(),
        overall_score,
        passed_candidates: count(SuggestionStatus::Passed),
        failed_candidates: count(SuggestionStatus::Failed),
        needs_review_candidates: count(SuggestionStatus::NeedsReview),
        per_criterion_average,
        baseline_delta,
        blocking_issues,
    }
}

#[derive(Tabled)]
struct CriterionRow {
    #[tabled(rename = "criterion")]
    criterion: String,

    #[tabled(rename = "average")]
    average: String,

    #[tabled(rename = "vs baseline")]
    delta: String,
}

impl BatchReport {
    /// Pretty JSON for the report file.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable summary: headline numbers plus a criterion table.
    pub fn render(&self, no_color: bool) -> String {
        let coverage = format!("{:.1}%", self.coverage * 100.0);
        let overall = format!("{:.2}", self.overall_score);

        let headline = if no_color {
            format!(
                "candidates: {}  coverage: {}  overall: {}  passed: {}  failed: {}  review: {}",
                self.total_candidates,
                coverage,
                overall,
                self.passed_candidates,
                self.failed_candidates,
                self.needs_review_candidates
            )
        } else {
            format!(
                "candidates: {}  coverage: {}  overall: {}  passed: {}  failed: {}  review: {}",
                self.total_candidates,
                coverage.cyan(),
                overall.cyan(),
                self.passed_candidates.green(),
                self.failed_candidates.red(),
                self.needs_review_candidates.yellow()
            )
        };

        let rows: Vec<CriterionRow> = self
            .per_criterion_average
            .iter()
            .map(|(key, avg)| {
                let delta = self.baseline_delta.get(key).copied().unwrap_or(0.0);
                CriterionRow {
                    criterion: key.clone(),
                    average: format!("{avg:.2}"),
                    delta: format!("{delta:+.2}"),
                }
            })
            .collect();

        let mut table = Table::new(rows);
        table.with(Style::sharp());

        let mut out = format!("{headline}\n\n{table}\n");

        if !self.blocking_issues.is_empty() {
            let issues = self
                .blocking_issues
                .iter()
                .map(|i| format!("  - {i}"))
                .join("\n");
            out.push_str(&format!("\nblocking issues:\n{issues}\n"));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::criteria::{RecordStatus, ValidationRecord};
    use crate::core::orchestrator::BatchState;

    fn record(id: &str, criterion: Criterion, score: f64, pass: bool) -> ValidationRecord {
        ValidationRecord {
            candidate_id: id.to_string(),
            criterion,
            status: if pass { RecordStatus::Pass } else { RecordStatus::Fail },
            score,
            details: String::new(),
            blocking_reasons: Vec::new(),
            evaluation_error: false,
        }
    }

    #[test]
    fn empty_batch_has_vacuous_coverage() {
        let run = BatchRun {
            state: BatchState::Complete,
            records: Vec::new(),
            required: 0,
        };

        let report = aggregate(&run, &[], &Baselines::default());

        assert_eq!(report.coverage, 1.0);
        assert_eq!(report.overall_score, 0.0);
        assert!(report.per_criterion_average.is_empty());
        assert_eq!(report.total_candidates, 0);
    }

    #[test]
    fn per_criterion_averages_and_deltas() {
        let records = vec![
            record("a", Criterion::InnovationScore, 0.6, true),
            record("b", Criterion::InnovationScore, 0.8, true),
            record("a", Criterion::DomainValue, 0.9, true),
        ];
        let run = BatchRun {
            state: BatchState::Complete,
            records,
            required: 3,
        };

        let baselines = Baselines::default();
        let report = aggregate(&run, &[], &baselines);

        let innovation = report.per_criterion_average["innovation_score"];
        assert!((innovation - 0.7).abs() < 1e-12);

        let delta = report.baseline_delta["innovation_score"];
        let expected = 0.7 - baselines.for_criterion(Criterion::InnovationScore);
        assert!((delta - expected).abs() < 1e-12);

        // Canonical ordering: domain_value precedes innovation_score.
        let keys: Vec<&String> = report.per_criterion_average.keys().collect();
        assert_eq!(keys, vec!["domain_value", "innovation_score"]);
    }

    #[test]
    fn blocking_issues_dedup_in_first_seen_order() {
        let mut r1 = record("a", Criterion::DuplicateCheck, 0.0, false);
        r1.blocking_reasons = vec!["Duplicate of: Filter".to_string()];
        let mut r2 = record("b", Criterion::DuplicateCheck, 0.0, false);
        r2.blocking_reasons = vec![
            "Duplicate of: Filter".to_string(),
            "Duplicate of: Selection".to_string(),
        ];

        let run = BatchRun {
            state: BatchState::Complete,
            records: vec![r1, r2],
            required: 2,
        };

        let report = aggregate(&run, &[], &Baselines::default());
        assert_eq!(
            report.blocking_issues,
            vec!["Duplicate of: Filter", "Duplicate of: Selection"]
        );
    }

    #[test]
    fn report_serializes_to_flat_json() {
        let run = BatchRun {
            state: BatchState::Complete,
            records: vec![record("a", Criterion::InnovationScore, 0.5, true)],
            required: 1,
        };

        let report = aggregate(&run, &[], &Baselines::default());
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value["per_criterion_average"].is_object());
        assert!(value["coverage"].is_number());
    }
}
