// src/main.rs
use std::env;

use dotenvy::dotenv;
use expense_tracker::config::Config;
use expense_tracker::database::db::{connection, migrate};
use expense_tracker::logging::{self, LogTarget};
use expense_tracker::{backend, cli};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = Config::from_env()?;

    let args: Vec<String> = env::args().collect();

    if args.len() > 1 && args[1] == "server" {
        let _guard = logging::init(&cfg, LogTarget::Stdout)?;
        info!("Starting backend server");

        let pool = connection::get_db_pool(&cfg).await?;
        migrate::run_migrations(&pool).await?;
        backend::run_server(&cfg, pool).await?;
    } else {
        let _guard = logging::init(&cfg, LogTarget::File)?;
        info!("Starting terminal client");

        cli::run(&cfg).await?;
    }
    Ok(())
}
