//! Hourly temperature forecast from the `OpenMeteo` forecast API

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use super::open_meteo::{RawForecast, get_json};
use super::{FetchError, ForecastProvider, USER_AGENT};
use crate::config::ApiConfig;

/// Hourly variable requested from the forecast endpoint
pub const HOURLY_VARIABLE: &str = "temperature_2m";

pub struct ForecastClient {
    client: Client,
    base_url: String,
    timezone: String,
}

impl ForecastClient {
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.forecast_url.clone(),
            timezone: config.timezone.clone(),
        })
    }

    /// Create a client with default settings against another endpoint
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let config = ApiConfig {
            forecast_url: base_url.into(),
            ..ApiConfig::default()
        };
        Self::new(&config)
    }

    fn forecast_url(&self, latitude: f64, longitude: f64) -> String {
        format!(
            "{}?latitude={}&longitude={}&hourly={}&timezone={}",
            self.base_url,
            latitude,
            longitude,
            HOURLY_VARIABLE,
            urlencoding::encode(&self.timezone)
        )
    }
}

#[async_trait]
impl ForecastProvider for ForecastClient {
    #[instrument(skip(self))]
    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<RawForecast, FetchError> {
        info!(
            "Getting hourly forecast for coordinates: {:.4}, {:.4}",
            latitude, longitude
        );
        let start_time = Instant::now();

        let url = self.forecast_url(latitude, longitude);
        debug!("OpenMeteo API request URL: {}", url);

        let forecast: RawForecast = get_json(&self.client, &url).await?;

        let total_duration = start_time.elapsed();
        info!(
            "Retrieved forecast with {} hourly points in {:.3}s",
            forecast.hourly.time.len(),
            total_duration.as_secs_f64()
        );

        if total_duration.as_secs() > 5 {
            warn!(
                "Slow forecast API response: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        Ok(forecast)
    }
}
