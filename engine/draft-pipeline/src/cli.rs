use crate::config::Overrides;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "draft-pipeline")]
#[command(about = "Fetch NFL rosters, train the projection ensemble and publish ranked draft projections")]
#[command(version)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch, normalize, train and project
    Run(StageArgs),
    /// Fetch and normalize rosters only
    Fetch(StageArgs),
    /// Train a new model run from the stored normalized roster
    Train(StageArgs),
    /// Project the stored normalized roster with the current model run
    Project(StageArgs),
    /// Print the effective configuration as TOML
    ShowConfig(StageArgs),
}

#[derive(Debug, Clone, Args)]
pub struct StageArgs {
    /// NFL season
    #[arg(short, long)]
    pub season: Option<i32>,

    /// Root directory for all artifacts
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

impl Command {
    pub fn overrides(&self) -> Overrides {
        let args = match self {
            Command::Run(a) | Command::Fetch(a) | Command::Train(a) | Command::Project(a) | Command::ShowConfig(a) => a,
        };
        Overrides { season: args.season, output_dir: args.output_dir.clone() }
    }
}
