//! Place name search against the `OpenMeteo` geocoding API

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use super::open_meteo::{GeocodingResponse, get_json};
use super::{FetchError, Geocoder, USER_AGENT};
use crate::config::ApiConfig;
use crate::models::Location;

/// Geocoding client; one HTTP request per search, no retries
pub struct GeoClient {
    client: Client,
    base_url: String,
    count: usize,
    language: String,
}

impl GeoClient {
    /// Create a client for the configured endpoint returning up to `count` candidates
    pub fn new(config: &ApiConfig, count: usize) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.geocoding_url.clone(),
            count,
            language: config.language.clone(),
        })
    }

    /// Create a client with default settings against another endpoint
    pub fn with_base_url(base_url: impl Into<String>, count: usize) -> Result<Self, FetchError> {
        let config = ApiConfig {
            geocoding_url: base_url.into(),
            ..ApiConfig::default()
        };
        Self::new(&config, count)
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}?name={}&count={}&language={}&format=json",
            self.base_url,
            urlencoding::encode(query),
            self.count,
            urlencoding::encode(&self.language)
        )
    }
}

#[async_trait]
impl Geocoder for GeoClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<Location>, FetchError> {
        let start_time = Instant::now();
        let url = self.search_url(query);
        debug!("Geocoding request URL: {}", url);

        let response: GeocodingResponse = get_json(&self.client, &url).await?;

        let locations: Vec<Location> = response
            .results
            .unwrap_or_default()
            .into_iter()
            .map(Location::from)
            .collect();

        if locations.is_empty() {
            warn!("No results found for location '{}'", query);
        } else {
            info!(
                "Found {} geocoding results for '{}' in {:.3}s",
                locations.len(),
                query,
                start_time.elapsed().as_secs_f64()
            );
        }

        Ok(locations)
    }
}
