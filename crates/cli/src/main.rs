use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
use commands::{analyze::AnalyzeArgs, categories};

#[derive(Parser)]
#[command(name = "nioi")]
#[command(about = "Structural code smell analysis for Python source files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one Python file and report validated code smells
    Analyze(AnalyzeArgs),

    /// List the smell categories the analyzer knows about
    Categories,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(commands::analyze::execute(args))
        }
        Commands::Categories => categories::execute(),
    }
}
