//! Hover marker state for the chart.

use chrono::NaiveDateTime;

use super::curve::Point;
use crate::models::Sample;

/// Horizontal gap between the marker and its label, in pixels
pub const LABEL_OFFSET: f64 = 15.0;
pub const MARKER_RADIUS: f64 = 3.0;

/// Text shown next to the marker, e.g. `Mon Jan 01 01:00 6.0°C`
#[must_use]
pub fn readout_label(sample: &Sample, unit: &str) -> String {
    format!("{} {:.1}{}", sample.time.format("%a %b %d %H:%M"), sample.temp, unit)
}

/// The sample the pointer currently resolves to
#[derive(Debug, Clone, PartialEq)]
pub struct Readout {
    pub index: usize,
    pub time: NaiveDateTime,
    pub temp: f64,
    pub label: String,
    pub marker: Point,
}

impl Readout {
    #[must_use]
    pub fn label_anchor(&self) -> Point {
        Point::new(self.marker.x + LABEL_OFFSET, self.marker.y)
    }
}

/// Marker visibility plus the last resolved readout.
///
/// Hiding keeps the readout so re-entering shows the marker where it was left.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Focus {
    visible: bool,
    readout: Option<Readout>,
}

impl Focus {
    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn update(&mut self, readout: Readout) {
        self.readout = Some(readout);
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn readout(&self) -> Option<&Readout> {
        self.readout.as_ref()
    }

    /// The readout to draw, if the marker is showing
    #[must_use]
    pub fn displayed(&self) -> Option<&Readout> {
        self.readout.as_ref().filter(|_| self.visible)
    }

    #[must_use]
    pub fn opacity(&self) -> f64 {
        if self.visible { 1.0 } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample(hour: u32, temp: f64) -> Sample {
        Sample {
            time: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            temp,
        }
    }

    fn readout(temp: f64) -> Readout {
        let s = sample(1, temp);
        Readout {
            index: 1,
            time: s.time,
            temp,
            label: readout_label(&s, "°C"),
            marker: Point::new(480.0, 100.0),
        }
    }

    #[test]
    fn test_readout_label() {
        assert_eq!(readout_label(&sample(1, 6.0), "°C"), "Mon Jan 01 01:00 6.0°C");
        assert_eq!(readout_label(&sample(13, -2.34), "°F"), "Mon Jan 01 13:00 -2.3°F");
    }

    #[test]
    fn test_label_sits_right_of_marker() {
        assert_eq!(readout(6.0).label_anchor(), Point::new(495.0, 100.0));
    }

    #[test]
    fn test_focus_visibility() {
        let mut focus = Focus::default();
        assert!(!focus.is_visible());
        assert_eq!(focus.opacity(), 0.0);

        focus.show();
        assert!(focus.displayed().is_none());
        focus.update(readout(6.0));
        assert_eq!(focus.displayed().map(|r| r.temp), Some(6.0));
        assert_eq!(focus.opacity(), 1.0);

        focus.hide();
        assert!(focus.displayed().is_none());
        assert_eq!(focus.readout().map(|r| r.temp), Some(6.0));
    }
}
