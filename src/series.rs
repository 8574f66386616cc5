//! Turns a raw hourly forecast into chartable samples.
//!
//! Everything here is pure. Timestamps are the API's wall-clock strings,
//! read as UTC so hour arithmetic never crosses a DST jump.

use chrono::{DateTime, Duration, NaiveDateTime, Timelike};
use thiserror::Error;

use crate::models::{Sample, Series};
use crate::weather::RawForecast;

const HOUR_MILLIS: i64 = 3_600_000;
const HALF_HOUR_MILLIS: i64 = HOUR_MILLIS / 2;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("Forecast has {times} timestamps but {temperatures} temperatures")]
    LengthMismatch { times: usize, temperatures: usize },

    #[error("Invalid timestamp '{value}' at index {index}")]
    InvalidTimestamp { index: usize, value: String },
}

/// Parse an API timestamp: `2024-01-01T00:00`, `2024-01-01T00:00:00` or RFC 3339
pub fn parse_time(value: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_utc())
        })
}

fn parse_all(raw: &RawForecast) -> Result<Vec<NaiveDateTime>, SeriesError> {
    raw.hourly
        .time
        .iter()
        .enumerate()
        .map(|(index, value)| {
            parse_time(value).ok_or_else(|| SeriesError::InvalidTimestamp {
                index,
                value: value.clone(),
            })
        })
        .collect()
}

fn check_lengths(raw: &RawForecast) -> Result<(), SeriesError> {
    let times = raw.hourly.time.len();
    let temperatures = raw.hourly.temperature_2m.len();
    if times != temperatures {
        return Err(SeriesError::LengthMismatch {
            times,
            temperatures,
        });
    }
    Ok(())
}

/// One sample per hourly entry, same order and count as the payload
pub fn to_series(raw: &RawForecast) -> Result<Vec<Sample>, SeriesError> {
    check_lengths(raw)?;
    let times = parse_all(raw)?;

    Ok(times
        .into_iter()
        .zip(raw.hourly.temperature_2m.iter().copied())
        .map(|(time, temp)| Sample { time, temp })
        .collect())
}

/// Epoch milliseconds of every timestamp, index-aligned with `to_series`
pub fn to_epoch_millis(raw: &RawForecast) -> Result<Vec<i64>, SeriesError> {
    Ok(parse_all(raw)?
        .into_iter()
        .map(|t| t.and_utc().timestamp_millis())
        .collect())
}

/// Round to the nearest hour; minute 30 and later rounds up
pub fn snap_to_hour(instant: NaiveDateTime) -> NaiveDateTime {
    let truncated = instant
        .with_nanosecond(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_minute(0))
        .unwrap_or(instant);

    if instant.minute() >= 30 {
        truncated + Duration::hours(1)
    } else {
        truncated
    }
}

/// `snap_to_hour` on epoch milliseconds
pub fn snap_millis(millis: i64) -> i64 {
    let into_hour = millis.rem_euclid(HOUR_MILLIS);
    let floor = millis - into_hour;
    if into_hour >= HALF_HOUR_MILLIS {
        floor + HOUR_MILLIS
    } else {
        floor
    }
}

/// Samples, timestamps and unit in one `Series`
pub fn build(raw: &RawForecast) -> Result<Series, SeriesError> {
    let samples = to_series(raw)?;
    Ok(Series::new(samples, raw.hourly_units.temperature_2m.clone()))
}
