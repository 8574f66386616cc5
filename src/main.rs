use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use hourcast::config::HourcastConfig;
use hourcast::weather::{ForecastClient, GeoClient};
use hourcast::{HourcastError, logging, tui};

#[tokio::main]
async fn main() -> Result<()> {
    let config = match HourcastConfig::load() {
        Ok(config) => config,
        Err(e) => {
            let message = e
                .downcast_ref::<HourcastError>()
                .map_or_else(|| format!("{e:#}"), HourcastError::user_message);
            eprintln!("hourcast: {message}");
            return Err(e);
        }
    };

    logging::init(&config.logging).context("Failed to initialize logging")?;
    info!("Starting hourcast {}", hourcast::VERSION);

    let geocoder = GeoClient::new(&config.api, config.search.max_suggestions)
        .map_err(|e| HourcastError::client("geocoding", e))?;
    let forecaster =
        ForecastClient::new(&config.api).map_err(|e| HourcastError::client("forecast", e))?;

    let result = tui::run(&config, Arc::new(geocoder), Arc::new(forecaster)).await;
    if let Err(e) = &result {
        error!("hourcast exited with error: {:#}", e);
    }
    result
}
