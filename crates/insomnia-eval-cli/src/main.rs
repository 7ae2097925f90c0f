mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use insomnia_eval_core::TaskConfig;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "evaluation failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Subtask1(args) => commands::evaluate::run(TaskConfig::subtask1(), args),
        Commands::Subtask2a(args) => commands::evaluate::run(TaskConfig::subtask2a(), args),
        Commands::Subtask2b(args) => commands::evaluate::run(TaskConfig::subtask2b(), args),
        Commands::Custom(args) => commands::evaluate::run_custom(args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
