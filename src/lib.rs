//! `hourcast` - search a place and explore its hourly temperature forecast
//!
//! This library provides the geocoding and forecast clients, the pure series
//! builder, the chart scene with pointer tracking and the search controller
//! that ties them together behind the terminal front end.

pub mod chart;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod search;
pub mod series;
pub mod tui;
pub mod weather;

// Re-export core types for public API
pub use chart::{Chart, ChartError, ChartRenderer, ChartSurface};
pub use config::HourcastConfig;
pub use error::HourcastError;
pub use models::{Location, Sample, Series};
pub use search::{Applied, Command, ForecastTarget, Reply, SearchController, SearchState};
pub use series::SeriesError;
pub use weather::{FetchError, ForecastClient, ForecastProvider, GeoClient, Geocoder, RawForecast};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
