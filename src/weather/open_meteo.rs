//! `OpenMeteo` API response structures and the shared request helper

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::FetchError;
use crate::models::Location;

/// Geocoding response from `OpenMeteo`; `results` is absent when nothing matched
#[derive(Debug, Deserialize)]
pub struct GeocodingResponse {
    #[serde(default)]
    pub results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodingResult {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub admin1: Option<String>,
}

impl From<GeocodingResult> for Location {
    fn from(result: GeocodingResult) -> Self {
        Location {
            name: result.name,
            country: result.country.unwrap_or_default(),
            admin_region: result.admin1,
            country_code: result.country_code.unwrap_or_default(),
            latitude: result.latitude,
            longitude: result.longitude,
        }
    }
}

/// Hourly forecast payload as delivered by the forecast endpoint.
///
/// `hourly.time` and `hourly.temperature_2m` are parallel arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawForecast {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub timezone: Option<String>,
    pub hourly: HourlyTemperatures,
    pub hourly_units: HourlyUnits,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyTemperatures {
    pub time: Vec<String>,
    pub temperature_2m: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyUnits {
    pub temperature_2m: String,
}

impl RawForecast {
    /// Build a payload from parallel arrays, mostly useful for tests and fakes
    #[must_use]
    pub fn new(time: Vec<String>, temperature_2m: Vec<f64>, unit: impl Into<String>) -> Self {
        Self {
            latitude: None,
            longitude: None,
            timezone: None,
            hourly: HourlyTemperatures {
                time,
                temperature_2m,
            },
            hourly_units: HourlyUnits {
                temperature_2m: unit.into(),
            },
        }
    }
}

/// Error body `{"error": true, "reason": "..."}`
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    reason: String,
}

/// GET `url` and decode the JSON body, mapping API error bodies to `FetchError::Status`
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
) -> Result<T, FetchError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    let body = response.text().await?;

    debug!("HTTP response received: {} ({} bytes)", status, body.len());

    if !status.is_success() {
        let reason = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| b.reason)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Unknown error").to_string());
        return Err(FetchError::Status {
            status: status.as_u16(),
            reason,
        });
    }

    Ok(serde_json::from_str(&body)?)
}
