use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub dry_run: bool,  // global --dry-run
}

#[derive(Parser)]
#[command(name = "ideagate")]
#[command(
    about = "A fast CLI for synthesizing, de-duplicating, and validating add-in feature suggestions"
)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress progress bars and non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Show what would be done without writing files
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline: research gate, generation, validation, report
    Pipeline(PipelineArgs),

    /// Synthesize a screened suggestion batch and write it as JSON
    Generate(GenerateArgs),

    /// Validate an existing suggestions file with full criterion coverage
    Validate(ValidateArgs),

    /// Inspect the capability catalog and its shadowed lookup keys
    Catalog(CatalogArgs),

    /// Initialize an ideagate.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Parser)]
pub struct PipelineArgs {
    /// Number of suggestions to generate (default from config)
    #[arg(long)]
    pub target: Option<usize>,

    /// RNG seed for reproducible generation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Capability catalog JSON file (built-in catalog when omitted)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Research completeness reported by the research collaborator
    #[arg(long, default_value = "1.0")]
    pub research_completeness: f64,

    /// Output directory for the report file
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct GenerateArgs {
    /// Number of suggestions to generate (default from config)
    #[arg(long)]
    pub target: Option<usize>,

    /// RNG seed for reproducible generation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Capability catalog JSON file (built-in catalog when omitted)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Output file for the suggestion batch
    #[arg(short, long, default_value = "suggestions.json")]
    pub output: PathBuf,

    /// Also derive build specs and write them to this file
    #[arg(long)]
    pub specs_output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Suggestions JSON file to validate
    pub suggestions: PathBuf,

    /// Build specs JSON file (derived from the suggestions when omitted)
    #[arg(long)]
    pub specs: Option<PathBuf>,

    /// Capability catalog JSON file (built-in catalog when omitted)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Output directory for the report file
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct CatalogArgs {
    /// Capability catalog JSON file (built-in catalog when omitted)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Print the catalog as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct InitArgs {
    /// Directory for the config file
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Parser)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Directory to write the completion file into (stdout when omitted)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}
