//! pinbridge CLI and REST API entry point.
//!
//! Binary name: `pinbridge`
//!
//! Parses CLI arguments, loads configuration, initializes tracing, the
//! database and services, then dispatches to the command handler.

mod cli;
mod http;
mod serve;
mod state;

use clap::Parser;
use pinbridge_infra::config::load_config;
use pinbridge_infra::sqlite::pool::DatabasePool;
use pinbridge_types::config::AppConfig;
use tracing::info;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config).await;
    if let Some(filter) = cli::verbosity_filter(cli.verbose) {
        config.logger.level = filter.to_string();
    }
    pinbridge_observe::init_tracing(&config.logger)?;

    let result = run(cli, config).await;

    pinbridge_observe::shutdown_tracing();
    result
}

async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve { bind } => {
            let state = AppState::init(&config).await?;
            serve::serve(state, &config, bind).await
        }

        Commands::Migrate => {
            let pool = DatabasePool::new(&config.database.url).await?;
            pool.close().await;
            info!("Migrations applied");
            Ok(())
        }

        Commands::Show { user_id } => {
            let state = AppState::init(&config).await?;
            let result = cli::user::show_user(&state, &user_id, cli.json).await;
            state.db_pool.close().await;
            result
        }
    }
}
