mod api;
mod cli;
mod client;
mod config;
mod db;
mod models;
mod services;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::Config;

#[derive(Parser)]
#[command(name = "matchday")]
#[command(about = "League standings, fixtures and rankings dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Initialize the database
    InitDb,
    /// Load the demo leagues, teams and fixtures
    Seed,
    /// Print a league table
    Standings {
        #[arg(short, long)]
        league: Option<String>,
    },
    /// Query team details
    Team {
        #[arg(short, long)]
        name: String,
    },
    /// Give a user the admin role
    GrantAdmin {
        #[arg(short, long)]
        user: String,
    },
    /// Write a league table to a CSV file
    ExportStandings {
        #[arg(short, long)]
        league: String,
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Follow manager rankings on a running server
    WatchManagers {
        #[arg(short, long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("matchday=info,tower_http=info")),
        )
        .init();

    let mut config = Config::from_env();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { port, bind }) => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(bind) = bind {
                config.bind = bind;
            }
            tracing::info!("Starting Matchday API server on {}:{}", config.bind, config.port);
            api::serve(&config).await?;
        }
        Some(Commands::InitDb) => {
            tracing::info!("Initializing database...");
            cli::init_db(&config).await?;
        }
        Some(Commands::Seed) => cli::seed(&config).await?,
        Some(Commands::Standings { league }) => {
            cli::print_standings(&config, league.as_deref()).await?;
        }
        Some(Commands::Team { name }) => {
            tracing::info!("Querying team: {}", name);
            cli::query_team(&config, &name).await?;
        }
        Some(Commands::GrantAdmin { user }) => cli::grant_admin(&config, &user).await?,
        Some(Commands::ExportStandings { league, out }) => {
            cli::export_standings(&config, &league, &out).await?;
        }
        Some(Commands::WatchManagers { url }) => {
            let url = url.unwrap_or(config.api_url);
            cli::watch_managers(&url).await?;
        }
        None => {
            // Default to serving
            tracing::info!("Starting Matchday API server on {}:{}", config.bind, config.port);
            api::serve(&config).await?;
        }
    }

    Ok(())
}
