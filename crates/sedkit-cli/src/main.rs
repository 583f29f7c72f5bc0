mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sedkit", about = "Scanning electron diffraction frame processing")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Worker threads (defaults to one per core)
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Locate the direct beam in every frame
    Centers(commands::centers::CentersArgs),
    /// Compute radial intensity profiles
    Profile(commands::profile::ProfileArgs),
    /// Flag vacuum frames across the scan
    Vacuum(commands::vacuum::VacuumArgs),
    /// Remove the diffuse background from every frame
    Background(commands::background::BackgroundArgs),
    /// Rotate every frame about its center
    Rotate(commands::rotate::RotateArgs),
    /// Apply a distortion-correction matrix to every frame
    Warp(commands::warp::WarpArgs),
    /// Shift every frame so the direct beam sits at the frame center
    Recenter(commands::recenter::RecenterArgs),
    /// Run the processing pipeline from a TOML config
    Run(commands::run::RunArgs),
    /// Print a default pipeline config
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    match &cli.command {
        Commands::Centers(args) => commands::centers::run(args),
        Commands::Profile(args) => commands::profile::run(args),
        Commands::Vacuum(args) => commands::vacuum::run(args),
        Commands::Background(args) => commands::background::run(args),
        Commands::Rotate(args) => commands::rotate::run(args),
        Commands::Warp(args) => commands::warp::run(args),
        Commands::Recenter(args) => commands::recenter::run(args),
        Commands::Run(args) => commands::run::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
