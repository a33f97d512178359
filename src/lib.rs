pub(crate) mod controllers;
pub(crate) mod core;
pub(crate) mod routes;
#[cfg(test)]
pub(crate) mod testing;
pub(crate) mod token;
pub(crate) mod types;
pub(crate) mod utils;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::core::client::Client;
use crate::core::error::ConfigError as Error;
use crate::core::{config::Args, state::AppState};

pub async fn run() -> Result<(), Error> {
    let config = Args::load()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_new(&config.log_level).unwrap_or_default())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let client = Client::new(&config.user_agent, &config.base_url(), config.credentials())?;

    tracing::debug!(
        upstream = %config.base_url(),
        fan_out_limit = config.fan_out_limit,
        "upstream configured"
    );

    let state = AppState::new(client, config.fan_out_limit);

    let app = routes::router::routes(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .map_err(Error::IO)?;

    tracing::info!("Server is running on port {}", config.port);

    axum::serve(listener, app).await.map_err(Error::IO)?;

    Ok(())
}
