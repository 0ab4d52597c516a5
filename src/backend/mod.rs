pub mod handlers;
mod routes;

use axum::{routing::get, Router};
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Sqlite>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "Backend is running" }))
        .merge(routes::api_routes())
        .with_state(state)
}

pub async fn run_server(cfg: &Config, pool: Pool<Sqlite>) -> anyhow::Result<()> {
    let state = AppState { db: pool };

    let listener = tokio::net::TcpListener::bind(cfg.bind_addr).await?;
    info!("Server listening on http://{}", cfg.bind_addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
