use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};
use crate::core::criteria::Criterion;

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config
{
    /// Default output directory for report files
    pub output_dir: Option<PathBuf>,

    /// Research-gate settings
    pub research: ResearchConfig,

    /// Suggestion-generation settings
    pub generation: GenerationConfig,

    /// Similarity cutoffs for duplicate probing
    pub similarity: SimilarityConfig,

    /// Per-criterion pass thresholds
    pub thresholds: Thresholds,

    /// Scoring constants and keyword lists
    pub scoring: ScoringConfig,

    /// Historical per-criterion baselines for improvement deltas
    pub baselines: Baselines,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchConfig
{
    /// Minimum research completeness required before the pipeline proceeds
    pub completeness_threshold: f64,
}

impl Default for ResearchConfig
{
    fn default() -> Self
    {
        Self { completeness_threshold: 0.95 }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig
{
    /// Suggestions to synthesize per run
    pub target_count: usize,

    /// Minimum relevance score a candidate needs to enter the batch
    pub relevance_floor: f64,

    /// Minimum innovation score a candidate needs to enter the batch
    pub innovation_floor: f64,

    /// Attempt budget as a multiple of the target count
    pub attempt_multiplier: usize,

    /// Accept the batch when at least this fraction of the target survived
    pub tolerance: f64,

    /// Domain keywords that raise a candidate's relevance score
    pub domain_keywords: Vec<String>,
}

impl Default for GenerationConfig
{
    fn default() -> Self
    {
        Self {
            target_count: 40,
            relevance_floor: 0.6,
            innovation_floor: 0.4,
            attempt_multiplier: 3,
            tolerance: 0.9,
            domain_keywords: strings(&[
                "model",
                "design",
                "construction",
                "building",
                "architecture",
                "engineering",
            ]),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig
{
    /// Description-similarity cutoff for the duplicate probe
    pub description_cutoff: f64,

    /// Name token-overlap cutoff for the post-generation duplicate sweep
    pub name_overlap_cutoff: f64,
}

impl Default for SimilarityConfig
{
    fn default() -> Self
    {
        Self { description_cutoff: 0.7, name_overlap_cutoff: 0.8 }
    }
}

/// Pass thresholds for the seven criteria.
///
/// `duplicate_check` at 1.0 means any nonzero similarity against any known
/// capability fails the criterion. That zero-tolerance default is kept on
/// purpose; soften it here, not in code.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds
{
    pub technical_feasibility: f64,
    pub duplicate_check: f64,
    pub domain_value: f64,
    pub implementation_complexity: f64,
    pub api_compatibility: f64,
    pub innovation_score: f64,
    pub resource_requirements: f64,
}

impl Default for Thresholds
{
    fn default() -> Self
    {
        Self {
            technical_feasibility: 0.80,
            duplicate_check: 1.00,
            domain_value: 0.70,
            implementation_complexity: 0.60,
            api_compatibility: 0.90,
            innovation_score: 0.50,
            resource_requirements: 0.70,
        }
    }
}

impl Thresholds
{
    pub fn for_criterion(
        &self,
        criterion: Criterion,
    ) -> f64
    {
        match criterion
        {
            Criterion::TechnicalFeasibility => self.technical_feasibility,
            Criterion::DuplicateCheck => self.duplicate_check,
            Criterion::DomainValue => self.domain_value,
            Criterion::ImplementationComplexity => self.implementation_complexity,
            Criterion::ApiCompatibility => self.api_compatibility,
            Criterion::InnovationScore => self.innovation_score,
            Criterion::ResourceRequirements => self.resource_requirements,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig
{
    /// Fixed host-compatibility constant carried into build specs
    pub compatibility_constant: f64,

    /// Hour scale for the resource-requirements score
    pub max_development_hours: u32,

    /// Pairwise similarity above which a capability is named as a duplicate
    pub duplicate_blocking_cutoff: f64,

    /// Spec completeness floor enforced before validation starts
    pub spec_completeness_floor: f64,

    /// Namespace prefixes an API reference may resolve against
    pub known_api_prefixes: Vec<String>,

    /// Workflow keywords for the domain-value score (0.2 each)
    pub workflow_keywords: Vec<String>,

    /// Industry keywords for the domain-value ratio
    pub industry_keywords: Vec<String>,

    /// Problem verbs for the domain-value ratio
    pub problem_verbs: Vec<String>,
}

impl Default for ScoringConfig
{
    fn default() -> Self
    {
        Self {
            compatibility_constant: 0.9,
            max_development_hours: 40,
            duplicate_blocking_cutoff: 0.8,
            spec_completeness_floor: 0.95,
            known_api_prefixes: strings(&["addin.", "host.", "ui."]),
            workflow_keywords: strings(&[
                "design optimization",
                "documentation automation",
                "quality control",
                "coordination",
                "analysis",
                "compliance",
                "productivity",
            ]),
            industry_keywords: strings(&[
                "model",
                "design",
                "construction",
                "engineering",
                "documentation",
                "coordination",
            ]),
            problem_verbs: strings(&[
                "optimize",
                "automate",
                "improve",
                "enhance",
                "streamline",
                "coordinate",
            ]),
        }
    }
}

/// Static historical averages; the report subtracts these from current
/// per-criterion averages to show improvement deltas.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Baselines
{
    pub technical_feasibility: f64,
    pub duplicate_check: f64,
    pub domain_value: f64,
    pub implementation_complexity: f64,
    pub api_compatibility: f64,
    pub innovation_score: f64,
    pub resource_requirements: f64,
}

impl Default for Baselines
{
    fn default() -> Self
    {
        Self {
            technical_feasibility: 0.65,
            duplicate_check: 0.80,
            domain_value: 0.55,
            implementation_complexity: 0.50,
            api_compatibility: 0.75,
            innovation_score: 0.50,
            resource_requirements: 0.60,
        }
    }
}

impl Baselines
{
    pub fn for_criterion(
        &self,
        criterion: Criterion,
    ) -> f64
    {
        match criterion
        {
            Criterion::TechnicalFeasibility => self.technical_feasibility,
            Criterion::DuplicateCheck => self.duplicate_check,
            Criterion::DomainValue => self.domain_value,
            Criterion::ImplementationComplexity => self.implementation_complexity,
            Criterion::ApiCompatibility => self.api_compatibility,
            Criterion::InnovationScore => self.innovation_score,
            Criterion::ResourceRequirements => self.resource_requirements,
        }
    }
}

pub fn load_config() -> Result<Config>
{
    let mut builder = config::Config::builder();

    // Load from config files in priority order
    let config_paths = ["ideagate.toml", ".ideagate.toml"];

    for path in &config_paths
    {
        if Path::new(path).exists()
        {
            builder = builder.add_source(config::File::with_name(path));
            break;
        }
    }

    // Add environment variables with IDEAGATE_ prefix
    builder = builder.add_source(config::Environment::with_prefix("IDEAGATE").separator("_"));

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config_path = args
        .path
        .join("ideagate.toml");

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    let toml_string =
        toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}

fn strings(items: &[&str]) -> Vec<String>
{
    items
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}
