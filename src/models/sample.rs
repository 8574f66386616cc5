//! Hourly samples and the index-aligned timestamp array used for pointer lookup

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::series::snap_millis;

/// One hourly temperature observation
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Wall-clock time of the forecast location
    pub time: NaiveDateTime,
    /// Temperature in the series unit
    pub temp: f64,
}

impl Sample {
    /// Epoch milliseconds of the sample time, reading the wall clock as UTC
    #[must_use]
    pub fn epoch_millis(&self) -> i64 {
        self.time.and_utc().timestamp_millis()
    }
}

/// Chronologically ordered samples plus their epoch-millisecond timestamps.
///
/// `dates[i]` always equals `samples[i].epoch_millis()`; both vectors are built
/// together and never mutated independently.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    samples: Vec<Sample>,
    dates: Vec<i64>,
    unit: String,
}

impl Series {
    #[must_use]
    pub fn new(samples: Vec<Sample>, unit: impl Into<String>) -> Self {
        let dates = samples.iter().map(Sample::epoch_millis).collect();
        Self {
            samples,
            dates,
            unit: unit.into(),
        }
    }

    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    #[must_use]
    pub fn dates(&self) -> &[i64] {
        &self.dates
    }

    /// Unit suffix reported by the forecast API, e.g. `°C`
    #[must_use]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    /// Earliest and latest timestamp in epoch milliseconds
    #[must_use]
    pub fn time_extent(&self) -> Option<(i64, i64)> {
        let min = self.dates.iter().copied().min()?;
        let max = self.dates.iter().copied().max()?;
        Some((min, max))
    }

    /// Lowest and highest temperature
    #[must_use]
    pub fn temperature_extent(&self) -> Option<(f64, f64)> {
        self.samples
            .iter()
            .map(|s| s.temp)
            .fold(None, |acc, t| match acc {
                None => Some((t, t)),
                Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
            })
    }

    /// Index of the sample shown for a pointer at `millis`.
    ///
    /// Instants outside the data extent never match. Inside it, the instant is
    /// snapped to the hour and matched exactly; when no sample sits on that hour
    /// the nearest sample wins, ties going to the later one like the snapping rule.
    #[must_use]
    pub fn index_at(&self, millis: i64) -> Option<usize> {
        let (min, max) = self.time_extent()?;
        if millis < min || millis > max {
            return None;
        }

        if let Ok(index) = self.dates.binary_search(&snap_millis(millis)) {
            return Some(index);
        }

        match self.dates.binary_search(&millis) {
            Ok(index) => Some(index),
            Err(0) => Some(0),
            Err(pos) if pos >= self.dates.len() => Some(self.dates.len() - 1),
            Err(pos) => {
                let before = millis - self.dates[pos - 1];
                let after = self.dates[pos] - millis;
                if after <= before { Some(pos) } else { Some(pos - 1) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    const HOUR: i64 = 3_600_000;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn hourly() -> Series {
        Series::new(
            vec![
                Sample { time: at(0, 0), temp: 5.0 },
                Sample { time: at(1, 0), temp: 6.0 },
                Sample { time: at(2, 0), temp: 4.5 },
            ],
            "°C",
        )
    }

    #[test]
    fn test_dates_align_with_samples() {
        let series = hourly();
        assert_eq!(series.len(), series.dates().len());
        for (sample, date) in series.samples().iter().zip(series.dates()) {
            assert_eq!(sample.epoch_millis(), *date);
        }
        assert_eq!(series.dates()[1] - series.dates()[0], HOUR);
    }

    #[test]
    fn test_extents() {
        let series = hourly();
        let (min, max) = series.time_extent().unwrap();
        assert_eq!(max - min, 2 * HOUR);
        assert_eq!(series.temperature_extent(), Some((4.5, 6.0)));
        assert_eq!(Series::new(Vec::new(), "°C").time_extent(), None);
    }

    #[rstest]
    #[case(0, 0, Some(0))]
    #[case(0, 29, Some(0))]
    #[case(0, 30, Some(1))]
    #[case(1, 20, Some(1))]
    #[case(1, 59, Some(2))]
    #[case(2, 0, Some(2))]
    fn test_index_at_snaps_inside_extent(
        #[case] hour: u32,
        #[case] minute: u32,
        #[case] expected: Option<usize>,
    ) {
        let series = hourly();
        let millis = at(hour, minute).and_utc().timestamp_millis();
        assert_eq!(series.index_at(millis), expected);
    }

    #[test]
    fn test_index_at_rejects_outside_extent() {
        let series = hourly();
        let start = series.dates()[0];
        let end = series.dates()[2];
        assert_eq!(series.index_at(start - 1), None);
        assert_eq!(series.index_at(end + 1), None);
    }

    #[test]
    fn test_index_at_between_samples_always_matches_a_neighbor() {
        let series = hourly();
        let start = series.dates()[0];
        for offset in (1..HOUR).step_by(60_000) {
            let index = series.index_at(start + offset).unwrap();
            assert!(index == 0 || index == 1);
        }
    }

    #[test]
    fn test_index_at_falls_back_to_nearest_on_gaps() {
        // 03:00 is missing, so the snapped hour has no exact match.
        let series = Series::new(
            vec![
                Sample { time: at(0, 0), temp: 1.0 },
                Sample { time: at(2, 0), temp: 2.0 },
                Sample { time: at(6, 0), temp: 3.0 },
            ],
            "°C",
        );
        let millis = |h, m| at(h, m).and_utc().timestamp_millis();
        assert_eq!(series.index_at(millis(2, 50)), Some(1));
        assert_eq!(series.index_at(millis(4, 0)), Some(2));
        assert_eq!(series.index_at(millis(4, 40)), Some(2));
    }
}
