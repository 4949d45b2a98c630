mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "arbiter-cli")]
#[command(about = "Arbiter CLI - Judge Java submissions against question files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Judge a source file against a question JSON file
    Run {
        /// Question file (methodSignature + testCases)
        #[arg(short, long)]
        question: PathBuf,

        /// Java source file
        #[arg(short, long)]
        source: PathBuf,

        /// Run hidden test cases too
        #[arg(long, default_value = "false")]
        submit: bool,

        /// Print the ExecutionResult as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Validate and compile a source file without running tests
    Check {
        /// Java source file
        #[arg(short, long)]
        source: PathBuf,
    },

    /// List the members the judge can call on a compiled source file
    Describe {
        /// Java source file
        #[arg(short, long)]
        source: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            question,
            source,
            submit,
            json,
        } => {
            commands::run(&question, &source, submit, json).await?;
        }
        Commands::Check { source } => {
            commands::check(&source).await?;
        }
        Commands::Describe { source } => {
            commands::describe(&source).await?;
        }
    }

    Ok(())
}
