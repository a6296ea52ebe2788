//! Consult CLI: the main entry point.
//!
//! Commands:
//! - `ask`: Send one prompt to an engine and print the answer
//! - `serve`: Answer line-delimited JSON tool calls on stdin/stdout
//! - `doctor`: Check engine availability and configuration
//! - `status`: Show the effective configuration
//! - `roles`: List the allowed agent roles

use clap::{Parser, Subcommand};
use consult_core::EngineKind;

mod commands;

#[derive(Parser)]
#[command(
    name = "consult",
    about = "Consult: bounded-time advisory calls to CLI reasoning engines",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a single prompt to an engine
    Ask {
        /// Engine to use (defaults to the configured engine)
        #[arg(short, long)]
        engine: Option<EngineKind>,

        /// Advisory role to run under
        #[arg(short, long)]
        role: String,

        /// Model override
        #[arg(short, long)]
        model: Option<String>,

        /// Context file to inline (repeatable)
        #[arg(short, long = "file")]
        files: Vec<String>,

        /// The prompt text
        prompt: String,
    },

    /// Serve tool calls over stdin/stdout
    Serve,

    /// Diagnose engine availability and configuration
    Doctor,

    /// Show the effective configuration
    Status,

    /// List allowed agent roles
    Roles,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout belongs to command output.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Ask {
            engine,
            role,
            model,
            files,
            prompt,
        } => commands::ask::run(engine, role, model, files, prompt).await?,
        Commands::Serve => commands::serve::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
        Commands::Status => commands::status::run().await?,
        Commands::Roles => commands::roles::run(),
    }

    Ok(())
}
