mod commands;

use clap::{Parser, Subcommand};
use graphql_project::Position;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "graphql")]
#[command(about = "GraphQL CLI for inspecting documents against a schema", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to GraphQL config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Project name (for multi-project configs)
    #[arg(short, long, global = true)]
    project: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the GraphQL node and type context at a position in a file
    Locate {
        /// GraphQL, JavaScript or TypeScript file
        file: PathBuf,

        /// Line in the file (0-indexed)
        #[arg(short, long)]
        line: usize,

        /// Character within the line (0-indexed)
        #[arg(long)]
        character: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Human,
    /// JSON output for tooling
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Locate {
            file,
            line,
            character,
            format,
        } => {
            let position = Position::new(line, character);
            commands::locate::run(cli.config, cli.project, file, position, format).await?;
        }
    }

    Ok(())
}
