//! End-to-end enhancement pipeline.
//!
//! Phase order is fixed: research gate → capability catalog → generation →
//! duplicate rejection → build specs → orchestrated validation →
//! aggregated report. The first two failures (research completeness, spec
//! coverage) abort the run; duplicate findings and threshold misses are
//! business outcomes that flow into the report instead.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::cli::{AppContext, PipelineArgs, ValidateArgs};
use crate::core::catalog::{CapabilityCatalog, builtin_capabilities};
use crate::core::criteria::Validator;
use crate::core::dedupe::{DuplicateDetector, overlap_duplicates};
use crate::core::generate::{Suggestion, SuggestionGenerator};
use crate::core::orchestrator::{BatchState, CoverageOrchestrator};
use crate::core::report::{BatchReport, aggregate};
use crate::core::research::{ResearchProvider, StaticResearch};
use crate::core::similarity::SimilarityCache;
use crate::core::specs::{BuildSpec, Specifier};
use crate::infra::config::{Config, load_config};

/// Pipeline failure taxonomy for exit-code mapping.
///
/// Individual criterion failures are never errors; they are report content.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Upstream input unusable: research incomplete, empty catalog,
    /// candidate/spec count mismatch
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Fewer evaluations recorded than the batch requires
    #[error("coverage incomplete: recorded {recorded} of {required} evaluations")]
    CoverageIncomplete { recorded: usize, required: usize },

    /// Generation could not produce an acceptable, duplicate-free batch
    #[error("generation failed: {0}")]
    Generation(String),

    /// A build spec fell below the completeness floor
    #[error("specification failed: {0}")]
    Specification(String),

    /// Internal failures or unexpected bugs
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Converts errors to process exit codes
/// 0=success, 2=coverage, 3=precondition, 4=generation/spec, 5=internal
pub fn exit_code_for(e: &PipelineError) -> i32 {
    match e {
        PipelineError::CoverageIncomplete { .. } => 2,
        PipelineError::Precondition(_) => 3,
        PipelineError::Generation(_) | PipelineError::Specification(_) => 4,
        PipelineError::Internal(_) => 5,
    }
}

/// Everything a finished run produces.
pub struct PipelineOutcome {
    pub report: BatchReport,
    pub suggestions: Vec<Suggestion>,
    pub specs: Vec<BuildSpec>,
    pub duplicates_rejected: usize,
}

/// Run the `pipeline` command end-to-end.
pub fn run(args: PipelineArgs, ctx: &AppContext) -> Result<(), PipelineError> {
    // Persisted config is best-effort; defaults apply when missing.
    let cfg = load_config().unwrap_or_default();

    let catalog = resolve_catalog(args.catalog.as_deref())?;
    let research = StaticResearch::new(args.research_completeness);
    let target = args.target.unwrap_or(cfg.generation.target_count);

    let progress = validation_progress(ctx);
    let outcome = execute(&cfg, &catalog, &research, target, args.seed, &progress)?;
    progress.finish_and_clear();

    let out_dir = args
        .output_dir
        .clone()
        .or_else(|| cfg.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("reports"));

    emit_report(&outcome.report, &out_dir, args.json, ctx)?;

    if !ctx.quiet && !args.json {
        println!(
            "duplicates rejected during generation: {}",
            outcome.duplicates_rejected
        );
    }

    Ok(())
}

/// Run the `validate` command over an externally supplied batch.
pub fn validate(args: ValidateArgs, ctx: &AppContext) -> Result<(), PipelineError> {
    let cfg = load_config().unwrap_or_default();
    let catalog = resolve_catalog(args.catalog.as_deref())?;

    let mut suggestions: Vec<Suggestion> = read_json(&args.suggestions)?;

    let specs: Vec<BuildSpec> = match &args.specs {
        Some(path) => {
            let specs: Vec<BuildSpec> = read_json(path)?;
            if specs.len() != suggestions.len() {
                return Err(PipelineError::Precondition(format!(
                    "candidate/spec count mismatch: {} suggestions vs {} specs",
                    suggestions.len(),
                    specs.len()
                )));
            }
            specs
        }
        None => {
            let specifier = Specifier::new(&cfg.scoring);
            suggestions.iter().map(|s| specifier.derive(s)).collect()
        }
    };

    let progress = validation_progress(ctx);
    progress.set_length(suggestions.len() as u64);

    let report = orchestrate(&cfg, &catalog, &mut suggestions, &specs, &progress)?;
    progress.finish_and_clear();

    let out_dir = args
        .output_dir
        .clone()
        .or_else(|| cfg.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("reports"));

    emit_report(&report, &out_dir, args.json, ctx)
}

/// Pure pipeline body, CLI-free for reuse and testing.
pub fn execute(
    cfg: &Config,
    catalog: &CapabilityCatalog,
    research: &dyn ResearchProvider,
    target: usize,
    seed: Option<u64>,
    progress: &ProgressBar,
) -> Result<PipelineOutcome, PipelineError> {
    // 1) Research gate: nothing runs on incomplete documentation access.
    let bundle = research.gather().map_err(PipelineError::Internal)?;
    if bundle.completeness < cfg.research.completeness_threshold {
        return Err(PipelineError::Precondition(format!(
            "research completeness {:.2} below required threshold {:.2}",
            bundle.completeness, cfg.research.completeness_threshold
        )));
    }
    info!(
        completeness = bundle.completeness,
        sources = bundle.sources.len(),
        "research gate passed"
    );

    // 2) Catalog must exist before any duplicate query.
    if catalog.is_empty() {
        return Err(PipelineError::Precondition(
            "no existing functionality mapped; cannot prevent duplicates".to_string(),
        ));
    }
    debug!(
        capabilities = catalog.len(),
        shadowed_keys = catalog.shadowed().len(),
        "capability catalog ready"
    );

    // 3) Generation with real-time screening. The seen-set is owned here
    //    and threaded through explicitly.
    let mut seen: HashSet<String> = HashSet::new();
    let mut generator = SuggestionGenerator::new(catalog, &cfg.generation, seed);
    let mut suggestions = generator
        .generate(target, &mut seen)
        .map_err(|e| PipelineError::Generation(e.to_string()))?;

    // 4) Duplicate rejection: probe every survivor and drop flagged ones.
    let cache = SimilarityCache::default();
    let detector = DuplicateDetector::new(catalog, &cache, cfg.similarity.description_cutoff);

    let before = suggestions.len();
    suggestions.retain(|s| {
        let matches = detector.check(&s.name, &s.description);
        if matches.is_empty() {
            true
        } else {
            debug!(candidate = %s.name, matched = %matches[0].name, "rejected as duplicate");
            false
        }
    });
    let duplicates_rejected = before - suggestions.len();

    // 5) Independent overlap sweep; any survivor crossing the token-overlap
    //    cutoffs means generation failed its zero-duplicate contract.
    let overlapping = overlap_duplicates(
        &suggestions,
        catalog,
        &cache,
        cfg.similarity.name_overlap_cutoff,
        cfg.similarity.description_cutoff,
    );
    if overlapping > 0 {
        return Err(PipelineError::Generation(format!(
            "{overlapping} suggestions overlap existing functionality after screening"
        )));
    }

    // 6) Build specs, gated on completeness.
    let specifier = Specifier::new(&cfg.scoring);
    let specs: Vec<BuildSpec> = suggestions.iter().map(|s| specifier.derive(s)).collect();

    let incomplete = specs
        .iter()
        .filter(|s| s.completeness < cfg.scoring.spec_completeness_floor)
        .count();
    if incomplete > 0 {
        return Err(PipelineError::Specification(format!(
            "{incomplete} specifications below completeness floor {:.2}",
            cfg.scoring.spec_completeness_floor
        )));
    }

    // 7) Orchestrated validation + aggregation.
    progress.set_length(suggestions.len() as u64);
    let report = orchestrate(cfg, catalog, &mut suggestions, &specs, progress)?;

    Ok(PipelineOutcome {
        report,
        suggestions,
        specs,
        duplicates_rejected,
    })
}

/// Shared validation tail: full-coverage orchestration, then aggregation.
fn orchestrate(
    cfg: &Config,
    catalog: &CapabilityCatalog,
    suggestions: &mut [Suggestion],
    specs: &[BuildSpec],
    progress: &ProgressBar,
) -> Result<BatchReport, PipelineError> {
    if suggestions.len() != specs.len() {
        return Err(PipelineError::Precondition(format!(
            "candidate/spec count mismatch: {} suggestions vs {} specs",
            suggestions.len(),
            specs.len()
        )));
    }

    let cache = SimilarityCache::default();
    let validator = Validator::new(catalog, &cache, &cfg.thresholds, &cfg.scoring);
    let run = CoverageOrchestrator::new(validator).run(suggestions, specs, progress);

    if run.state != BatchState::Complete {
        return Err(PipelineError::CoverageIncomplete {
            recorded: run.records.len(),
            required: run.required,
        });
    }

    info!(
        candidates = suggestions.len(),
        records = run.records.len(),
        coverage = run.coverage(),
        "batch validation complete"
    );

    Ok(aggregate(&run, suggestions, &cfg.baselines))
}

/// Write the report file and print the summary.
fn emit_report(
    report: &BatchReport,
    out_dir: &Path,
    as_json: bool,
    ctx: &AppContext,
) -> Result<(), PipelineError> {
    let json = report.to_json().context("serialize batch report")?;

    if !ctx.dry_run {
        fs::create_dir_all(out_dir)
            .with_context(|| format!("create report directory {}", out_dir.display()))?;
        let path = out_dir.join("batch_report.json");
        fs::write(&path, &json).with_context(|| format!("write report {}", path.display()))?;

        if !ctx.quiet && !as_json {
            println!("report written to {}", path.display());
        }
    }

    if as_json {
        println!("{json}");
    } else {
        print!("{}", report.render(ctx.no_color));
    }

    Ok(())
}

fn resolve_catalog(path: Option<&Path>) -> Result<CapabilityCatalog, PipelineError> {
    match path {
        Some(p) => CapabilityCatalog::load(p).map_err(PipelineError::Internal),
        None => Ok(CapabilityCatalog::build(builtin_capabilities())),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read {}", path.display()))
        .map_err(PipelineError::Internal)?;

    serde_json::from_str(&text)
        .with_context(|| format!("parse JSON {}", path.display()))
        .map_err(PipelineError::Internal)
}

/// Progress bar over per-candidate validation (hidden in --quiet mode).
fn validation_progress(ctx: &AppContext) -> ProgressBar {
    if ctx.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap(),
        );
        pb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::research::ResearchBundle;

    struct FixedResearch(f64);

    impl ResearchProvider for FixedResearch {
        fn gather(&self) -> anyhow::Result<ResearchBundle> {
            Ok(ResearchBundle {
                completeness: self.0,
                sources: vec!["snapshot".to_string()],
                extracted_content: Default::default(),
            })
        }
    }

    fn defaults() -> (Config, CapabilityCatalog) {
        (
            Config::default(),
            CapabilityCatalog::build(builtin_capabilities()),
        )
    }

    #[test]
    fn incomplete_research_is_a_precondition_failure() {
        let (cfg, catalog) = defaults();
        let research = FixedResearch(0.5);

        let err = execute(&cfg, &catalog, &research, 5, Some(1), &ProgressBar::hidden())
            .err()
            .expect("must fail");

        assert!(matches!(err, PipelineError::Precondition(_)));
        assert_eq!(exit_code_for(&err), 3);
        // The message names the value and the threshold.
        assert!(err.to_string().contains("0.50"));
        assert!(err.to_string().contains("0.95"));
    }

    #[test]
    fn empty_catalog_is_a_precondition_failure() {
        let cfg = Config::default();
        let catalog = CapabilityCatalog::build(Vec::new());
        let research = FixedResearch(1.0);

        let err = execute(&cfg, &catalog, &research, 5, Some(1), &ProgressBar::hidden())
            .err()
            .expect("must fail");

        assert!(matches!(err, PipelineError::Precondition(_)));
    }

    #[test]
    fn full_run_reaches_total_coverage() {
        let (cfg, catalog) = defaults();
        let research = FixedResearch(1.0);

        let outcome =
            execute(&cfg, &catalog, &research, 10, Some(42), &ProgressBar::hidden()).unwrap();

        assert_eq!(outcome.report.coverage, 1.0);
        assert_eq!(
            outcome.report.total_candidates,
            outcome.suggestions.len()
        );
        assert_eq!(outcome.suggestions.len(), outcome.specs.len());

        // Every candidate left the pending state.
        assert!(outcome
            .suggestions
            .iter()
            .all(|s| s.status != crate::core::generate::SuggestionStatus::Pending));
    }

    #[test]
    fn empty_target_yields_vacuous_batch() {
        let (cfg, catalog) = defaults();
        let research = FixedResearch(1.0);

        let outcome =
            execute(&cfg, &catalog, &research, 0, Some(7), &ProgressBar::hidden()).unwrap();

        assert_eq!(outcome.report.total_candidates, 0);
        assert_eq!(outcome.report.coverage, 1.0);
    }

    #[test]
    fn count_mismatch_is_a_precondition_failure() {
        let (cfg, catalog) = defaults();
        let progress = ProgressBar::hidden();

        let mut suggestions: Vec<Suggestion> = Vec::new();
        let specifier = Specifier::new(&cfg.scoring);
        let phantom = specifier.derive(&Suggestion {
            id: "idea-9999".to_string(),
            name: "Phantom".to_string(),
            category: crate::core::generate::Category::Analysis,
            functionality: String::new(),
            description: String::new(),
            relevance_score: 0.5,
            innovation_score: 0.5,
            status: Default::default(),
        });

        let err = orchestrate(&cfg, &catalog, &mut suggestions, &[phantom], &progress)
            .err()
            .expect("must fail");

        assert!(matches!(err, PipelineError::Precondition(_)));
    }
}
