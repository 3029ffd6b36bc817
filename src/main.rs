use anyhow::Result;
use clap::Parser;
use ideagate::cli::{AppContext, Cli, Commands};
use ideagate::core::pipeline::{self, exit_code_for};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Log filtering via IDEAGATE_LOG (defaults to warnings only)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("IDEAGATE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
        dry_run: cli.dry_run,
    };

    match cli.command {
        Commands::Pipeline(args) => exit_on_pipeline_error(pipeline::run(args, &ctx)),
        Commands::Validate(args) => exit_on_pipeline_error(pipeline::validate(args, &ctx)),
        Commands::Generate(args) => ideagate::core::generate::run(args, &ctx),
        Commands::Catalog(args) => ideagate::core::catalog::run(args, &ctx),
        Commands::Init(args) => ideagate::infra::config::init(args, &ctx),
        Commands::Completions(args) => ideagate::completion::run(args),
    }
}

/// Pipeline failures carry their own exit codes; everything else is anyhow.
fn exit_on_pipeline_error(result: Result<(), ideagate::core::pipeline::PipelineError>) -> Result<()> {
    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(exit_code_for(&e));
    }
    Ok(())
}
