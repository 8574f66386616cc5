//! Geocoding and forecast data sources.
//!
//! Both sources expose a typed `Result` API plus a boundary method
//! (`resolve`, `fetch_hourly`) that logs failures and yields `None` instead of
//! an error, so callers only ever have to handle "no data".

use async_trait::async_trait;
use tracing::warn;

use crate::models::Location;

pub mod error;
pub mod forecast;
pub mod geocoding;
pub mod open_meteo;

pub use error::FetchError;
pub use forecast::ForecastClient;
pub use geocoding::GeoClient;
pub use open_meteo::RawForecast;

pub(crate) const USER_AGENT: &str = concat!("hourcast/", env!("CARGO_PKG_VERSION"));

/// Resolves free text to ranked place candidates
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Location>, FetchError>;

    /// Like `search`, but failures are logged and reported as `None`
    async fn resolve(&self, query: &str) -> Option<Vec<Location>> {
        match self.search(query).await {
            Ok(locations) => Some(locations),
            Err(e) => {
                warn!("Geocoding '{}' failed: {}", query, e);
                None
            }
        }
    }
}

/// Retrieves the hourly temperature series for a coordinate
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<RawForecast, FetchError>;

    /// Like `fetch`, but failures are logged and reported as `None`
    async fn fetch_hourly(&self, latitude: f64, longitude: f64) -> Option<RawForecast> {
        match self.fetch(latitude, longitude).await {
            Ok(forecast) => Some(forecast),
            Err(e) => {
                warn!(
                    "Forecast for ({:.4}, {:.4}) failed: {}",
                    latitude, longitude, e
                );
                None
            }
        }
    }
}
