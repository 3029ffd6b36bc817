//! Template-driven suggestion synthesis.
//!
//! Names and descriptions are assembled from per-category template tables
//! (function keywords, workflow patterns, innovation drivers) with the only
//! randomness the pipeline is allowed: an optionally seeded RNG confined to
//! this stage. Every synthesized candidate is screened in real time against
//! the capability catalog and an explicit seen-set before it enters the
//! batch; validation downstream is fully deterministic.

use std::collections::HashSet;

use anyhow::{Context as _, Result, bail};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::catalog::CapabilityCatalog;
use crate::infra::config::GenerationConfig;

/// Semantic grouping for a suggestion. Closed set of five.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    SelectionFiltering,
    ModelManagement,
    Documentation,
    Automation,
    Analysis,
}

impl Category {
    /// All categories in canonical order.
    pub const ALL: [Category; 5] = [
        Category::SelectionFiltering,
        Category::ModelManagement,
        Category::Documentation,
        Category::Automation,
        Category::Analysis,
    ];

    /// Human-readable label used in reports and category-text matching.
    pub fn label(self) -> &'static str {
        match self {
            Category::SelectionFiltering => "Selection and Filtering Tools",
            Category::ModelManagement => "Model Management and Analysis Tools",
            Category::Documentation => "Documentation and Reporting Tools",
            Category::Automation => "Automation and Workflow Tools",
            Category::Analysis => "Analysis and Simulation Tools",
        }
    }
}

/// Validation lifecycle of a suggestion.
///
/// Starts `Pending`; only the coverage orchestrator moves it afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
    #[default]
    Pending,
    Passed,
    Failed,
    NeedsReview,
}

/// A proposed add-in feature awaiting validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    /// Opaque unique identifier, assigned at creation, never reused
    pub id: String,

    /// Short display name
    pub name: String,

    /// Semantic grouping
    pub category: Category,

    /// One-line functionality summary
    pub functionality: String,

    /// Free-text description of what the feature does
    pub description: String,

    /// Workflow-relevance score in [0,1], fixed at creation
    pub relevance_score: f64,

    /// Novelty score in [0,1], fixed at creation
    pub innovation_score: f64,

    /// Aggregate validation status
    #[serde(default)]
    pub status: SuggestionStatus,
}

/// Name/description template for one flavor of suggestion.
struct Template {
    function_keywords: &'static [&'static str],
    base_functionality: &'static str,
}

/// Workflow context a suggestion is pitched against.
struct WorkflowPattern {
    workflow: &'static str,
    context_keywords: &'static [&'static str],
    problems: &'static [&'static str],
}

/// Creativity lever mixed into names and scores.
struct InnovationDriver {
    keywords: &'static [&'static str],
    factor: f64,
}

const ACTION_WORDS: &[&str] = &[
    "Smart",
    "Advanced",
    "Intelligent",
    "Automated",
    "Enhanced",
    "Dynamic",
    "Adaptive",
];

fn templates(category: Category) -> &'static [Template] {
    match category {
        Category::SelectionFiltering => &[
            Template {
                function_keywords: &["Selector", "Finder", "Matcher"],
                base_functionality: "intelligent model element selection and matching",
            },
            Template {
                function_keywords: &["Detector", "Inspector", "Checker"],
                base_functionality: "geometric relationship inspection across the design model",
            },
            Template {
                function_keywords: &["Probe", "Scope", "Lens"],
                base_functionality: "parameter-driven design data querying",
            },
        ],
        Category::ModelManagement => &[
            Template {
                function_keywords: &["Monitor", "Tracker", "Reporter"],
                base_functionality: "model health and performance monitoring",
            },
            Template {
                function_keywords: &["Optimizer", "Improver", "Streamliner"],
                base_functionality: "model optimization and performance tuning",
            },
            Template {
                function_keywords: &["Synchronizer", "Integrator", "Aligner"],
                base_functionality: "cross-discipline model coordination and integration",
            },
        ],
        Category::Documentation => &[
            Template {
                function_keywords: &["Generator", "Creator", "Assembler"],
                base_functionality: "automated construction documentation generation",
            },
            Template {
                function_keywords: &["Formatter", "Styler", "Organizer"],
                base_functionality: "documentation formatting and sheet organization",
            },
            Template {
                function_keywords: &["Exporter", "Converter", "Publisher"],
                base_functionality: "engineering data export and format conversion",
            },
        ],
        Category::Automation => &[
            Template {
                function_keywords: &["Automator", "Pipeline", "Processor"],
                base_functionality: "workflow automation across repetitive design tasks",
            },
            Template {
                function_keywords: &["Batcher", "Bulk", "Multi"],
                base_functionality: "batch processing and mass model operations",
            },
            Template {
                function_keywords: &["Connector", "Bridge", "Linker"],
                base_functionality: "system integration and construction data connectivity",
            },
        ],
        Category::Analysis => &[
            Template {
                function_keywords: &["Calculator", "Evaluator", "Assessor"],
                base_functionality: "engineering performance analysis and evaluation",
            },
            Template {
                function_keywords: &["Preparer", "Stager", "Packager"],
                base_functionality: "simulation model preparation and optimization",
            },
            Template {
                function_keywords: &["Verifier", "Auditor", "Tester"],
                base_functionality: "design validation and compliance analysis",
            },
        ],
    }
}

fn patterns(category: Category) -> &'static [WorkflowPattern] {
    match category {
        Category::SelectionFiltering => &[
            WorkflowPattern {
                workflow: "design review",
                context_keywords: &["Review", "Check", "Inspection"],
                problems: &["manual element picking", "inconsistent selections"],
            },
            WorkflowPattern {
                workflow: "model coordination",
                context_keywords: &["Coordination", "Clash", "Integration"],
                problems: &["complex geometric relationships", "multi-discipline coordination"],
            },
        ],
        Category::ModelManagement => &[
            WorkflowPattern {
                workflow: "quality control",
                context_keywords: &["Quality", "Standards", "Audit"],
                problems: &["model inconsistencies", "standard violations"],
            },
            WorkflowPattern {
                workflow: "performance optimization",
                context_keywords: &["Performance", "Efficiency", "Speed"],
                problems: &["slow model performance", "oversized files"],
            },
        ],
        Category::Documentation => &[
            WorkflowPattern {
                workflow: "deliverable production",
                context_keywords: &["Deliverable", "Drawing", "Report"],
                problems: &["manual documentation", "inconsistent formatting"],
            },
            WorkflowPattern {
                workflow: "client communication",
                context_keywords: &["Client", "Presentation", "Visualization"],
                problems: &["complex data presentation", "opaque progress reporting"],
            },
        ],
        Category::Automation => &[
            WorkflowPattern {
                workflow: "repetitive tasks",
                context_keywords: &["Routine", "Systematic", "Scheduled"],
                problems: &["manual repetitive work", "human error"],
            },
            WorkflowPattern {
                workflow: "process standardization",
                context_keywords: &["Standard", "Consistent", "Unified"],
                problems: &["process inconsistency", "quality variations"],
            },
        ],
        Category::Analysis => &[
            WorkflowPattern {
                workflow: "design analysis",
                context_keywords: &["Analysis", "Calculation", "Assessment"],
                problems: &["complex calculations", "tedious analysis preparation"],
            },
            WorkflowPattern {
                workflow: "compliance checking",
                context_keywords: &["Compliance", "Code", "Regulation"],
                problems: &["code compliance checks", "regulatory verification"],
            },
        ],
    }
}

const DRIVERS: &[InnovationDriver] = &[
    InnovationDriver {
        keywords: &["AI-Powered", "Predictive", "Learning"],
        factor: 0.9,
    },
    InnovationDriver {
        keywords: &["Self-Tuning", "Adaptive", "Dynamic"],
        factor: 0.8,
    },
    InnovationDriver {
        keywords: &["Visual", "Interactive", "Real-time"],
        factor: 0.7,
    },
    InnovationDriver {
        keywords: &["Connected", "Integrated", "Unified"],
        factor: 0.6,
    },
];

/// Suggestion generator with real-time catalog screening.
pub struct SuggestionGenerator<'a> {
    catalog: &'a CapabilityCatalog,
    cfg: &'a GenerationConfig,
    rng: StdRng,
    next_id: usize,
}

impl<'a> SuggestionGenerator<'a> {
    /// `seed` pins the RNG for reproducible batches; `None` draws from the OS.
    pub fn new(catalog: &'a CapabilityCatalog, cfg: &'a GenerationConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };

        Self {
            catalog,
            cfg,
            rng,
            next_id: 1,
        }
    }

    /// Generate up to `target` screened suggestions.
    ///
    /// `seen` is the cross-call duplicate tracker, owned by the caller and
    /// threaded through explicitly; accepted names are inserted into it.
    /// Fails when fewer than `tolerance × target` candidates survive the
    /// attempt budget.
    pub fn generate(&mut self, target: usize, seen: &mut HashSet<String>) -> Result<Vec<Suggestion>> {
        let mut out: Vec<Suggestion> = Vec::with_capacity(target);
        let max_attempts = target.saturating_mul(self.cfg.attempt_multiplier.max(1));

        for (category, category_target) in distribute(target) {
            let mut accepted = 0usize;
            let mut attempts = 0usize;

            while accepted < category_target && attempts < max_attempts {
                attempts += 1;

                let suggestion = self.synthesize(category);

                if self.screen(&suggestion, seen) {
                    seen.insert(squash(&suggestion.name));
                    out.push(suggestion);
                    accepted += 1;
                }
            }

            debug!(
                category = category.label(),
                accepted, attempts, "category generation finished"
            );
        }

        let floor = (target as f64 * self.cfg.tolerance).ceil() as usize;
        if out.len() < floor {
            bail!(
                "generated {} suggestions, below the acceptable floor of {} (target {})",
                out.len(),
                floor,
                target
            );
        }

        Ok(out)
    }

    /// Assemble one candidate from the category's template tables.
    fn synthesize(&mut self, category: Category) -> Suggestion {
        let template = choose(&mut self.rng, templates(category));
        let pattern = choose(&mut self.rng, patterns(category));
        let driver = choose(&mut self.rng, DRIVERS);

        let name = self.compose_name(template, pattern, driver);
        let functionality = format!(
            "Provides {} optimized for {} scenarios",
            template.base_functionality, pattern.workflow
        );
        let problem = pattern.problems[0];
        let description = format!(
            "{name} addresses {problem} by implementing {}. It streamlines {} processes for \
             design and construction teams, automates repetitive steps, improves coordination \
             and productivity, and enhances model quality control and analysis.",
            functionality.to_lowercase(),
            pattern.workflow
        );

        let relevance = self.relevance(&functionality, &description);
        let innovation = self.innovation(&name, &functionality, driver);

        let id = format!("idea-{:04}", self.next_id);
        self.next_id += 1;

        Suggestion {
            id,
            name,
            category,
            functionality,
            description,
            relevance_score: relevance,
            innovation_score: innovation,
            status: SuggestionStatus::Pending,
        }
    }

    fn compose_name(
        &mut self,
        template: &Template,
        pattern: &WorkflowPattern,
        driver: &InnovationDriver,
    ) -> String {
        let action = *choose(&mut self.rng, ACTION_WORDS);
        let function = *choose(&mut self.rng, template.function_keywords);
        let context = *choose(&mut self.rng, pattern.context_keywords);
        let novelty = *choose(&mut self.rng, driver.keywords);

        let variants = [
            format!("{action} {function}"),
            format!("{context} {function}"),
            format!("{novelty} {function}"),
            format!("{action} {context} {function}"),
        ];

        choose(&mut self.rng, &variants).clone()
    }

    /// Base 0.5 plus 0.1 per domain keyword present, capped at +0.4.
    fn relevance(&self, functionality: &str, description: &str) -> f64 {
        let text = format!("{} {}", functionality, description).to_lowercase();
        let hits = self
            .cfg
            .domain_keywords
            .iter()
            .filter(|k| text.contains(k.as_str()))
            .count();

        0.5 + (hits as f64 * 0.1).min(0.4)
    }

    /// Base 0.5 plus the driver factor's weight plus keyword bonus, clamped.
    fn innovation(&self, name: &str, functionality: &str, driver: &InnovationDriver) -> f64 {
        let text = format!("{} {}", name, functionality).to_lowercase();
        let hits = driver
            .keywords
            .iter()
            .filter(|k| text.contains(&k.to_lowercase()))
            .count();

        let bonus = (hits as f64 * 0.1).min(0.3);
        (0.5 + driver.factor * 0.3 + bonus).min(1.0)
    }

    /// Real-time screen: catalog key containment, seen-set, score floors.
    fn screen(&self, suggestion: &Suggestion, seen: &HashSet<String>) -> bool {
        let key = squash(&suggestion.name);

        if seen.contains(&key) {
            return false;
        }

        for (existing_key, _) in self.catalog.keyed_entries() {
            if existing_key.contains(&key) || key.contains(existing_key) {
                debug!(name = %suggestion.name, key = existing_key, "rejected: collides with catalog");
                return false;
            }
        }

        if suggestion.relevance_score < self.cfg.relevance_floor {
            return false;
        }
        if suggestion.innovation_score < self.cfg.innovation_floor {
            return false;
        }

        true
    }
}

/// Run the `generate` command: synthesize a batch and write it as JSON.
pub fn run(args: crate::cli::GenerateArgs, ctx: &crate::cli::AppContext) -> Result<()> {
    use crate::core::catalog::{CapabilityCatalog, builtin_capabilities};
    use crate::core::specs::Specifier;
    use crate::infra::config::load_config;

    let cfg = load_config().unwrap_or_default();

    let catalog = match &args.catalog {
        Some(path) => CapabilityCatalog::load(path)?,
        None => CapabilityCatalog::build(builtin_capabilities()),
    };

    let target = args.target.unwrap_or(cfg.generation.target_count);
    let mut seen = HashSet::new();
    let mut generator = SuggestionGenerator::new(&catalog, &cfg.generation, args.seed);
    let suggestions = generator.generate(target, &mut seen)?;

    if ctx.dry_run {
        if !ctx.quiet {
            println!("would write {} suggestions to {}", suggestions.len(), args.output.display());
        }
        return Ok(());
    }

    let json = serde_json::to_string_pretty(&suggestions)?;
    std::fs::write(&args.output, json)
        .with_context(|| format!("write suggestions to {}", args.output.display()))?;

    if let Some(specs_path) = &args.specs_output {
        let specifier = Specifier::new(&cfg.scoring);
        let specs: Vec<crate::core::specs::BuildSpec> =
            suggestions.iter().map(|s| specifier.derive(s)).collect();
        let json = serde_json::to_string_pretty(&specs)?;
        std::fs::write(specs_path, json)
            .with_context(|| format!("write specs to {}", specs_path.display()))?;
    }

    if !ctx.quiet {
        println!(
            "wrote {} suggestions to {}",
            suggestions.len(),
            args.output.display()
        );
    }

    Ok(())
}

/// Equal split across the five categories; the remainder lands on the
/// leading categories, which are ordered priority-first (selection/filtering
/// and model management ahead of the rest).
fn distribute(target: usize) -> Vec<(Category, usize)> {
    let base = target / Category::ALL.len();
    let remainder = target % Category::ALL.len();

    Category::ALL
        .iter()
        .enumerate()
        .map(|(i, &c)| (c, base + usize::from(i < remainder)))
        .collect()
}

/// Lowercased name with whitespace removed; the duplicate-tracker key form.
fn squash(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

fn choose<'t, T>(rng: &mut StdRng, items: &'t [T]) -> &'t T {
    // Template tables are compile-time non-empty.
    items.choose(rng).expect("non-empty choice table")
}
