mod artifact;
mod cli;
mod config;
mod controller;
mod error;
mod gateway;
mod portal;
mod session;
mod state_machine;
mod ui;

use anyhow::{Result, bail};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};
use config::{CropConfig, ReadingSource};
use controller::RitualController;
use gateway::HttpGateway;
use portal::Portal;
use state_machine::RitualState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = CropConfig::load()?;
    if cli.live {
        config.use_mock = false;
    }
    if let Some(url) = cli.server_url {
        config.server_url = url;
    }
    if cli.placeholder {
        config.reading = ReadingSource::Placeholder;
    }
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Command::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
        Command::Sever { path, out, json } => {
            let gateway = HttpGateway::new(config.mock_delay(), config.request_timeout())?;
            let mut controller = RitualController::new(gateway, &config);
            let portal = Portal::new(controller.subscribe());

            let file = portal.offer_path(&path)?;
            let state =
                session::run_ritual(&mut controller, file, config.failure_reset_ms).await?;

            if json && let Some(record) = controller.last_record() {
                ui::print_record(record);
            }
            if state != RitualState::Complete {
                bail!("the ritual failed for {}", path.display());
            }
            controller.export(&out)?;
            println!("  written to {}", out.display());
        }
        Command::Session => {
            let gateway = HttpGateway::new(config.mock_delay(), config.request_timeout())?;
            let mut controller = RitualController::new(gateway, &config);
            session::run(&mut controller, config.failure_reset_ms).await?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "phantom_crop=debug"
    } else {
        "phantom_crop=warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
