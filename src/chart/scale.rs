//! Continuous scales with "nice" domains and tick generation.
//!
//! The tick and nice algorithms follow d3-scale so axes land on the same round
//! values a browser chart would show.

use chrono::{DateTime, NaiveDateTime, Timelike};

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

const MINUTE: i64 = 60_000;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;

/// `(i1, i2, inc)`: ticks are `i * inc` for positive inc, `i / -inc` otherwise
fn tick_bounds(start: f64, stop: f64, count: f64) -> Option<(f64, f64, f64)> {
    let step = (stop - start) / count.max(0.0);
    if !step.is_finite() || step <= 0.0 {
        return None;
    }

    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };

    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let inverse = 10f64.powf(-power) / factor;
        i1 = (start * inverse).round();
        i2 = (stop * inverse).round();
        if i1 / inverse < start {
            i1 += 1.0;
        }
        if i2 / inverse > stop {
            i2 -= 1.0;
        }
        inc = -inverse;
    } else {
        let step = 10f64.powf(power) * factor;
        i1 = (start / step).round();
        i2 = (stop / step).round();
        if i1 * step < start {
            i1 += 1.0;
        }
        if i2 * step > stop {
            i2 -= 1.0;
        }
        inc = step;
    }

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_bounds(start, stop, count * 2.0);
    }
    Some((i1, i2, inc))
}

/// Signed tick increment; negative values encode the reciprocal of a fractional step
pub fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    tick_bounds(start, stop, count as f64).map_or(0.0, |(_, _, inc)| inc)
}

/// Absolute distance between ticks
pub fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let inc = tick_increment(start, stop, count);
    if inc < 0.0 { -1.0 / inc } else { inc }
}

/// Round values between `start` and `stop`, roughly `count` of them
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }

    let Some((i1, i2, inc)) = tick_bounds(start, stop, count as f64) else {
        return Vec::new();
    };
    if i2 < i1 {
        return Vec::new();
    }

    let n = (i2 - i1) as i64;
    (0..=n)
        .map(|k| {
            let i = i1 + k as f64;
            if inc < 0.0 { i / -inc } else { i * inc }
        })
        .collect()
}

/// Linear mapping from values to pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    #[must_use]
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Value to pixel; a collapsed domain maps everything to the middle of the range
    #[must_use]
    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let t = if d1 == d0 { 0.5 } else { (value - d0) / (d1 - d0) };
        r0 + t * (r1 - r0)
    }

    /// Pixel to value
    #[must_use]
    pub fn invert(&self, pixel: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if r1 == r0 {
            return d0;
        }
        d0 + (pixel - r0) / (r1 - r0) * (d1 - d0)
    }

    /// Extend the domain to round values; converges within ten passes or leaves it alone
    pub fn nice(&mut self, count: usize) {
        let (mut start, mut stop) = self.domain;
        if !(stop > start) {
            return;
        }

        let mut previous = None;
        for _ in 0..10 {
            let step = tick_increment(start, stop, count);
            if previous == Some(step) {
                self.domain = (start, stop);
                return;
            }
            if step > 0.0 {
                start = (start / step).floor() * step;
                stop = (stop / step).ceil() * step;
            } else if step < 0.0 {
                start = (start * step).ceil() / step;
                stop = (stop * step).floor() / step;
            } else {
                break;
            }
            previous = Some(step);
        }
    }

    #[must_use]
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.domain.0, self.domain.1, count)
    }

    /// Decimal places needed to tell adjacent ticks apart
    #[must_use]
    pub fn tick_precision(&self, count: usize) -> usize {
        let step = tick_step(self.domain.0, self.domain.1, count);
        if step <= 0.0 || !step.is_finite() {
            return 0;
        }
        (-step.log10().floor()).max(0.0) as usize
    }
}

/// Calendar-ish interval used for time ticks. Intervals are aligned on epoch
/// multiples; weeks start on Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeInterval {
    Minutes(i64),
    Hours(i64),
    Days(i64),
    Weeks(i64),
}

const INTERVALS: [TimeInterval; 11] = [
    TimeInterval::Minutes(1),
    TimeInterval::Minutes(5),
    TimeInterval::Minutes(15),
    TimeInterval::Minutes(30),
    TimeInterval::Hours(1),
    TimeInterval::Hours(3),
    TimeInterval::Hours(6),
    TimeInterval::Hours(12),
    TimeInterval::Days(1),
    TimeInterval::Days(2),
    TimeInterval::Weeks(1),
];

impl TimeInterval {
    #[must_use]
    pub fn duration_millis(self) -> i64 {
        match self {
            TimeInterval::Minutes(n) => n * MINUTE,
            TimeInterval::Hours(n) => n * HOUR,
            TimeInterval::Days(n) => n * DAY,
            TimeInterval::Weeks(n) => n * WEEK,
        }
    }

    /// Interval closest to `(stop - start) / count`
    #[must_use]
    pub fn for_span(start: i64, stop: i64, count: usize) -> Self {
        let target = (stop - start).abs() as f64 / count.max(1) as f64;
        let i = INTERVALS.partition_point(|iv| (iv.duration_millis() as f64) <= target);

        if i == 0 {
            return INTERVALS[0];
        }
        if i == INTERVALS.len() {
            let weeks = (target / WEEK as f64).ceil().max(1.0) as i64;
            return TimeInterval::Weeks(weeks);
        }

        let below = INTERVALS[i - 1];
        let above = INTERVALS[i];
        let below_ratio = target / (below.duration_millis() as f64);
        let above_ratio = (above.duration_millis() as f64) / target;
        if below_ratio < above_ratio {
            below
        } else {
            above
        }
    }

    #[must_use]
    pub fn floor(self, millis: i64) -> i64 {
        match self {
            TimeInterval::Weeks(n) => {
                // 1970-01-04 was the first Sunday after the epoch.
                let day = millis.div_euclid(DAY);
                let week = (day - 3).div_euclid(7);
                let aligned = week - week.rem_euclid(n);
                (3 + aligned * 7) * DAY
            }
            _ => {
                let step = self.duration_millis();
                millis - millis.rem_euclid(step)
            }
        }
    }

    #[must_use]
    pub fn ceil(self, millis: i64) -> i64 {
        let floor = self.floor(millis);
        if floor == millis {
            millis
        } else {
            floor + self.duration_millis()
        }
    }

    #[must_use]
    pub fn is_sub_day(self) -> bool {
        self.duration_millis() < DAY
    }
}

/// Epoch-millisecond domain mapped linearly to pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    domain: (i64, i64),
    range: (f64, f64),
}

impl TimeScale {
    #[must_use]
    pub fn new(domain: (i64, i64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    #[must_use]
    pub fn domain(&self) -> (i64, i64) {
        self.domain
    }

    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    #[must_use]
    pub fn apply(&self, millis: i64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let t = if d1 == d0 {
            0.5
        } else {
            (millis - d0) as f64 / (d1 - d0) as f64
        };
        r0 + t * (r1 - r0)
    }

    /// Pixel to the nearest millisecond
    #[must_use]
    pub fn invert(&self, pixel: f64) -> i64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if r1 == r0 {
            return d0;
        }
        let t = (pixel - r0) / (r1 - r0);
        d0 + (t * (d1 - d0) as f64).round() as i64
    }

    #[must_use]
    pub fn interval(&self, count: usize) -> TimeInterval {
        TimeInterval::for_span(self.domain.0, self.domain.1, count)
    }

    /// Floor the start and ceil the end to the tick interval
    pub fn nice(&mut self, count: usize) {
        let (start, stop) = self.domain;
        if stop <= start {
            return;
        }
        let interval = self.interval(count);
        self.domain = (interval.floor(start), interval.ceil(stop));
    }

    /// Interval boundaries inside the domain, inclusive
    #[must_use]
    pub fn ticks(&self, count: usize) -> Vec<i64> {
        let (start, stop) = self.domain;
        if count == 0 || stop < start {
            return Vec::new();
        }
        let interval = self.interval(count);
        let step = interval.duration_millis();

        let mut ticks = Vec::new();
        let mut tick = interval.ceil(start);
        while tick <= stop {
            ticks.push(tick);
            tick += step;
        }
        ticks
    }

    /// `Jan 01` for day ticks and midnights, `13:00` otherwise
    #[must_use]
    pub fn tick_label(&self, millis: i64, count: usize) -> String {
        let Some(time) = DateTime::from_timestamp_millis(millis).map(|t| t.naive_utc()) else {
            return String::new();
        };
        if self.interval(count).is_sub_day() && !is_midnight(&time) {
            time.format("%H:%M").to_string()
        } else {
            time.format("%b %d").to_string()
        }
    }
}

fn is_midnight(time: &NaiveDateTime) -> bool {
    time.hour() == 0 && time.minute() == 0
}
