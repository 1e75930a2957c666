//! Draft Projections batch entry point

use anyhow::Result;
use clap::Parser;
use tracing::info;

use draft_pipeline::{initialize_logging, load_configuration, Cli, Command, Pipeline};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_configuration(cli.config.as_deref(), &cli.command.overrides())?;

    if let Command::ShowConfig(_) = cli.command {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    initialize_logging(&config.logging)?;
    info!("Starting draft-pipeline v{} for season {}", env!("CARGO_PKG_VERSION"), config.season);

    let pipeline = Pipeline::new(config)?;
    match cli.command {
        Command::Run(_) => {
            let chain = pipeline.acquisition_chain()?;
            let summary = pipeline.run(&chain).await?;
            info!("Projections written to {}", pipeline.store().predictions_path().display());
            info!("Run summary: {}", serde_json::to_string(&summary)?);
        }
        Command::Fetch(_) => {
            let chain = pipeline.acquisition_chain()?;
            let (provenance, records) = pipeline.fetch(&chain).await?;
            info!("Stored {} normalized players ({:?})", records.len(), provenance);
        }
        Command::Train(_) => {
            let roster = pipeline.load_roster()?;
            pipeline.train(&roster)?;
        }
        Command::Project(_) => {
            let roster = pipeline.load_roster()?;
            let players = pipeline.project(&roster)?;
            info!("Projected {} players", players.len());
        }
        Command::ShowConfig(_) => {}
    }

    Ok(())
}
