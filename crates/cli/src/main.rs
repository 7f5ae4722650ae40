//! `sermon`: terminal driver for the sermon preparation pipeline.

mod render;
mod session;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Result, WrapErr};
use colored::Colorize;
use sp_core::config::loader::load_config;
use sp_core::init::{generate_sermon_pipeline_structure, InitOptions};
use sp_protocol::session_models::{AnalysisDepth, PipelineInput};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Sermon pipeline - staged research, planning and writing with human review
#[derive(Parser)]
#[command(name = "sermon")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run the sermon preparation pipeline with review checkpoints")]
struct Cli {
    /// Project directory containing `.sermon-pipeline/` (defaults to current directory)
    #[arg(short = 'd', long, global = true)]
    directory: Option<PathBuf>,

    /// Enable debug diagnostics
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create `.sermon-pipeline/` with default templates
    Init {
        /// Overwrite an existing configuration directory
        #[arg(long)]
        force: bool,

        /// Only write config.toml and input.toml
        #[arg(long)]
        minimal: bool,
    },

    /// List the steps of the configured pipeline
    Steps,

    /// Run the pipeline
    Run(RunArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Scripture passage, e.g. "Romans 8:28-30"
    #[arg(short, long)]
    passage: Option<String>,

    /// Thematic statement
    #[arg(short, long)]
    theme: Option<String>,

    /// Target audience
    #[arg(short, long)]
    audience: Option<String>,

    /// Target length, e.g. "30 minutes"
    #[arg(short, long)]
    length: Option<String>,

    /// Analysis depth
    #[arg(long, value_enum)]
    level: Option<Depth>,

    /// Sermon type, e.g. "Expository"
    #[arg(long)]
    sermon_type: Option<String>,

    /// Approve every review checkpoint without prompting
    #[arg(long)]
    auto_approve: bool,

    /// Draft offline with the mock agent instead of the configured model
    #[arg(long)]
    mock: bool,

    /// Directory for exported markdown (overrides `[export] output-dir`)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also export every completed step as its own file
    #[arg(long)]
    each_step: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Depth {
    Standard,
    Deep,
}

impl From<Depth> for AnalysisDepth {
    fn from(depth: Depth) -> Self {
        match depth {
            Depth::Standard => AnalysisDepth::Standard,
            Depth::Deep => AnalysisDepth::Deep,
        }
    }
}

impl RunArgs {
    /// Apply command-line overrides on top of the configured input.
    fn apply(&self, mut input: PipelineInput) -> PipelineInput {
        if let Some(passage) = &self.passage {
            input.passage = passage.clone();
        }
        if let Some(theme) = &self.theme {
            input.theme = theme.clone();
        }
        if let Some(audience) = &self.audience {
            input.audience = audience.clone();
        }
        if let Some(length) = &self.length {
            input.length = length.clone();
        }
        if let Some(level) = self.level {
            input.analysis_level = level.into();
        }
        if let Some(sermon_type) = &self.sermon_type {
            input.sermon_type = sermon_type.clone();
        }
        input
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("sp_core={level},sp_cli={level}").into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let root = match cli.directory {
        Some(dir) => dir,
        None => std::env::current_dir().wrap_err("Failed to read the current directory")?,
    };

    match cli.command {
        Commands::Init { force, minimal } => {
            let dir = generate_sermon_pipeline_structure(InitOptions {
                target_dir: root,
                force,
                minimal,
            })
            .await?;
            println!("{} {}", "Initialized".green().bold(), dir.display());
        }
        Commands::Steps => {
            let config = load_config(&root).await?;
            let registry = config.registry()?;
            print!("{}", render::step_table(&registry));
        }
        Commands::Run(args) => {
            let config = load_config(&root).await?;
            let input = args.apply(config.input_or_default());
            let output_dir = args
                .output
                .clone()
                .unwrap_or_else(|| root.join(&config.global.export.output_dir));

            session::run(
                &config,
                input,
                session::RunOptions {
                    auto_approve: args.auto_approve,
                    mock: args.mock,
                    each_step: args.each_step,
                    output_dir,
                },
            )
            .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_args_override_input() {
        let cli = Cli::parse_from([
            "sermon",
            "run",
            "--passage",
            "Psalm 23",
            "--level",
            "standard",
            "--auto-approve",
            "--each-step",
        ]);
        let Commands::Run(args) = cli.command else {
            panic!("Expected run command");
        };

        let input = args.apply(PipelineInput::default());
        assert_eq!(input.passage, "Psalm 23");
        assert_eq!(input.analysis_level, AnalysisDepth::Standard);
        assert_eq!(input.theme, PipelineInput::default().theme);
        assert!(args.auto_approve);
        assert!(args.each_step);
    }
}
