//! Batch orchestration with hard coverage accounting.
//!
//! Runs every (candidate × criterion) pair and tracks each one in a
//! coverage set. A batch only reaches `Complete` when exactly N×7 pairs
//! were recorded; anything less is `Failed` and must never be reported as
//! success. Threshold failures are the orthogonal, expected outcome; they
//! mark individual candidates failed without blocking the batch.
//!
//! Candidates evaluate in parallel (each candidate's seven evaluations are
//! pure functions over immutable inputs); results are merged back in
//! generation order so the coverage log stays deterministic, and
//! completeness is a single check at the end, never an incremental state.

use std::collections::HashSet;

use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::core::criteria::{Criterion, RecordStatus, ValidationRecord, Validator};
use crate::core::generate::{Suggestion, SuggestionStatus};
use crate::core::specs::BuildSpec;

/// Lifecycle of one orchestration pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchState {
    NotStarted,
    Running,
    Complete,
    Failed,
}

/// Outcome of one orchestrated batch.
#[derive(Debug)]
pub struct BatchRun {
    /// Final state: `Complete` or `Failed`
    pub state: BatchState,

    /// Every recorded (candidate × criterion) outcome, in coverage order
    pub records: Vec<ValidationRecord>,

    /// N×7: the record count required for completeness
    pub required: usize,
}

impl BatchRun {
    /// Recorded / required; vacuously 1.0 for an empty batch.
    pub fn coverage(&self) -> f64 {
        if self.required == 0 {
            1.0
        } else {
            self.records.len() as f64 / self.required as f64
        }
    }
}

/// One-shot orchestrator over a batch of (suggestion, spec) pairs.
pub struct CoverageOrchestrator<'a> {
    validator: Validator<'a>,
    state: BatchState,
    coverage: HashSet<(String, Criterion)>,
    records: Vec<ValidationRecord>,
}

impl<'a> CoverageOrchestrator<'a> {
    pub fn new(validator: Validator<'a>) -> Self {
        Self {
            validator,
            state: BatchState::NotStarted,
            coverage: HashSet::new(),
            records: Vec::new(),
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    /// Run all seven criteria over every candidate and finalize coverage.
    ///
    /// Candidate statuses are written back in place; this is the only
    /// place in the pipeline that mutates them.
    #[instrument(skip_all, fields(candidates = suggestions.len()))]
    pub fn run(
        mut self,
        suggestions: &mut [Suggestion],
        specs: &[BuildSpec],
        progress: &ProgressBar,
    ) -> BatchRun {
        debug_assert_eq!(suggestions.len(), specs.len());

        self.state = BatchState::Running;
        let total = suggestions.len();

        // Fan out per candidate; indexed collect keeps generation order.
        let evaluated: Vec<(Vec<ValidationRecord>, SuggestionStatus)> = suggestions
            .par_iter()
            .zip(specs.par_iter())
            .map(|(suggestion, spec)| {
                let out = self.evaluate_candidate(suggestion, spec);
                progress.inc(1);
                out
            })
            .collect();

        // Deterministic merge: coverage log follows candidate order, and
        // within a candidate the canonical criterion order.
        for (i, (records, status)) in evaluated.into_iter().enumerate() {
            suggestions[i].status = status;
            for record in records {
                self.ingest(record);
            }
        }

        self.finalize(total)
    }

    /// All seven evaluations for one candidate, plus its aggregate status.
    fn evaluate_candidate(
        &self,
        suggestion: &Suggestion,
        spec: &BuildSpec,
    ) -> (Vec<ValidationRecord>, SuggestionStatus) {
        let mut records = Vec::with_capacity(Criterion::ALL.len());
        let mut any_fail = false;
        let mut any_error = false;

        for criterion in Criterion::ALL {
            let record = match self.validator.evaluate(suggestion, spec, criterion) {
                Ok(record) => record,
                Err(e) => {
                    // A contract violation on one criterion must not abort
                    // the batch: record it as a failed result carrying the
                    // evaluation-error marker and keep going.
                    warn!(candidate = %suggestion.id, criterion = criterion.key(), error = %e,
                          "criterion evaluation failed");
                    ValidationRecord {
                        candidate_id: suggestion.id.clone(),
                        criterion,
                        status: RecordStatus::Fail,
                        score: 0.0,
                        details: format!("evaluation error: {e}"),
                        blocking_reasons: vec![format!("evaluation error: {e}")],
                        evaluation_error: true,
                    }
                }
            };

            any_fail |= record.status == RecordStatus::Fail;
            any_error |= record.evaluation_error;
            records.push(record);
        }

        let status = if any_error {
            SuggestionStatus::NeedsReview
        } else if any_fail {
            SuggestionStatus::Failed
        } else {
            SuggestionStatus::Passed
        };

        (records, status)
    }

    /// Record one outcome and mark its (candidate, criterion) pair covered.
    fn ingest(&mut self, record: ValidationRecord) {
        self.coverage
            .insert((record.candidate_id.clone(), record.criterion));
        self.records.push(record);
    }

    /// Single atomic completeness decision for the whole batch.
    fn finalize(mut self, total_candidates: usize) -> BatchRun {
        let required = total_candidates * Criterion::ALL.len();

        self.state = if self.coverage.len() == required {
            BatchState::Complete
        } else {
            warn!(
                recorded = self.coverage.len(),
                required, "batch coverage incomplete"
            );
            BatchState::Failed
        };

        debug!(state = ?self.state, records = self.records.len(), "batch finalized");

        BatchRun {
            state: self.state,
            records: self.records,
            required,
        }
    }
}
