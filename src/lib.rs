//! **ideagate** - Fast CLI for synthesizing, de-duplicating, and validating add-in feature suggestions
//!
//! Multi-stage content pipeline: a catalog of existing capabilities feeds
//! duplicate suppression, seven deterministic criteria score every candidate
//! under a hard 100%-coverage gate, and batch results aggregate into a
//! quality report with baseline deltas.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Core validation pipeline
pub mod core {
    /// Word-set Jaccard similarity with a pair cache
    pub mod similarity;
    pub use similarity::{SimilarityCache, token_jaccard};

    /// Existing-capability catalog and duplicate-lookup table
    pub mod catalog;
    pub use catalog::{CapabilityCatalog, KnownCapability, ShadowedKey, builtin_capabilities};

    /// Duplicate probing (substring keys + description similarity)
    pub mod dedupe;
    pub use dedupe::DuplicateDetector;

    /// Seven-criterion scoring over (suggestion, spec) pairs
    pub mod criteria;
    pub use criteria::{Criterion, RecordStatus, ValidationRecord, Validator};

    /// Template-driven suggestion synthesis (the only randomized stage)
    pub mod generate;
    pub use generate::{Category, Suggestion, SuggestionStatus};

    /// Build specifications derived per suggestion
    pub mod specs;
    pub use specs::{BuildSpec, Complexity, Specifier};

    /// Research-access seam and completeness gate input
    pub mod research;
    pub use research::{ResearchBundle, ResearchProvider, StaticResearch};

    /// Batch orchestration with N×7 coverage accounting
    pub mod orchestrator;
    pub use orchestrator::{BatchRun, BatchState, CoverageOrchestrator};

    /// Aggregation into the batch quality report
    pub mod report;
    pub use report::{BatchReport, aggregate};

    /// End-to-end pipeline command and error taxonomy
    pub mod pipeline;
    pub use pipeline::{PipelineError, PipelineOutcome, exit_code_for};
}

/// Infrastructure - Configuration and utilities
pub mod infra {
    /// Configuration management with TOML support and env overlay
    pub mod config;
    pub use config::{Config, Thresholds, init as config_init, load_config};
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use core::{BatchReport, CapabilityCatalog, Criterion, Suggestion};
pub use infra::{Config, load_config};
