use anyhow::Context;
use clap::Parser;
use console::style;
use std::path::PathBuf;
use std::process::ExitCode;

use tac::config::Config;
use tac::errors::PipelineError;
use tac::pipeline::{self, RunOptions};

#[derive(Parser)]
#[command(name = "tac")]
#[command(
    version,
    about = "Run the map → plan → build prompt pipeline through a local AI assistant CLI"
)]
pub struct Cli {
    /// Goal text for planning (overwrites ai_docs/tac_goal.md if provided)
    #[arg(long)]
    pub goal: Option<String>,

    /// Prepare and print steps but do not invoke the assistant CLI
    #[arg(long)]
    pub dry_run: bool,

    /// Path to a builder command (.md) to use instead of autodetect
    #[arg(long)]
    pub builder: Option<PathBuf>,

    /// Assistant executable to try before the built-in candidates
    #[arg(long)]
    pub assistant: Option<String>,

    #[arg(long)]
    pub project_dir: Option<PathBuf>,

    #[arg(short, long)]
    pub verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", style("!").red().bold(), err);
            ExitCode::from(exit_code_to_u8(err.exit_code()))
        }
    }
}

fn run(cli: Cli) -> Result<(), PipelineError> {
    let project_dir = match cli.project_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let config = Config::new(project_dir, cli.assistant, cli.verbose)?;
    if config.verbose {
        println!("Project root: {}", config.project_dir.display());
    }

    let options = RunOptions {
        goal: cli.goal,
        dry_run: cli.dry_run,
        builder: cli.builder.or_else(|| config.builder_override.clone()),
    };

    pipeline::run(&config, &options)
}

/// ExitCode only carries a u8; propagated codes outside that range (for
/// example the -1 reported for signal-terminated children) clamp to 255.
fn exit_code_to_u8(code: i32) -> u8 {
    if !(0..=255).contains(&code) {
        255
    } else {
        code as u8
    }
}
