//! Temperature line chart: scales, axes, the smoothed series path and the hover marker.
//!
//! `ChartRenderer::render` builds a `Chart` scene in pixel space and swaps it into a
//! `ChartSurface`. The scene is backend-neutral; the terminal view and the SVG writer
//! both draw from it.

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ChartConfig, Margins};
use crate::models::Series;

pub mod curve;
pub mod pointer;
pub mod scale;
pub mod svg;

pub use curve::{PathCommand, Point};
pub use pointer::{Focus, Readout};
pub use scale::{LinearScale, TimeScale};

const HOUR_MILLIS: i64 = 3_600_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChartError {
    #[error("Cannot chart an empty series")]
    EmptySeries,
    #[error("Failed to write SVG: {0}")]
    Svg(String),
}

/// Axis tick in pixel space
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub position: f64,
    pub label: String,
}

/// Pixel rectangle the series is drawn into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl PlotArea {
    fn new(width: f64, height: f64, margin: &Margins) -> Self {
        Self {
            left: margin.left,
            right: width - margin.right,
            top: margin.top,
            bottom: height - margin.bottom - margin.top,
        }
    }

    #[must_use]
    pub fn center_x(&self) -> f64 {
        (self.left + self.right) / 2.0
    }
}

/// A rendered chart scene
#[derive(Debug, Clone)]
pub struct Chart {
    width: f64,
    height: f64,
    margin: Margins,
    title: String,
    x_scale: TimeScale,
    y_scale: LinearScale,
    x_ticks: Vec<Tick>,
    y_ticks: Vec<Tick>,
    path: Vec<PathCommand>,
    series: Series,
    focus: Focus,
}

impl Chart {
    pub const X_LABEL: &'static str = "Day";
    pub const Y_LABEL: &'static str = "Temperature";

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[must_use]
    pub fn margin(&self) -> &Margins {
        &self.margin
    }

    #[must_use]
    pub fn plot_area(&self) -> PlotArea {
        PlotArea::new(self.width, self.height, &self.margin)
    }

    /// `Temperature in {location}`
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Title position: centered over the plot, halfway into the top margin
    #[must_use]
    pub fn title_anchor(&self) -> Point {
        Point::new(self.plot_area().center_x(), self.margin.top / 2.0)
    }

    #[must_use]
    pub fn x_scale(&self) -> &TimeScale {
        &self.x_scale
    }

    #[must_use]
    pub fn y_scale(&self) -> &LinearScale {
        &self.y_scale
    }

    #[must_use]
    pub fn x_ticks(&self) -> &[Tick] {
        &self.x_ticks
    }

    #[must_use]
    pub fn y_ticks(&self) -> &[Tick] {
        &self.y_ticks
    }

    #[must_use]
    pub fn path(&self) -> &[PathCommand] {
        &self.path
    }

    #[must_use]
    pub fn series(&self) -> &Series {
        &self.series
    }

    #[must_use]
    pub fn focus(&self) -> &Focus {
        &self.focus
    }

    pub fn pointer_enter(&mut self) {
        self.focus.show();
    }

    pub fn pointer_leave(&mut self) {
        self.focus.hide();
    }

    /// Move the marker to the sample under pixel column `x`.
    ///
    /// Positions outside the data's time extent leave the marker where it was and
    /// return `None`.
    pub fn pointer_move(&mut self, x: f64) -> Option<&Readout> {
        let millis = self.x_scale.invert(x);
        let index = self.series.index_at(millis)?;
        let sample = *self.series.get(index)?;

        let readout = Readout {
            index,
            time: sample.time,
            temp: sample.temp,
            label: pointer::readout_label(&sample, self.series.unit()),
            marker: Point::new(
                self.x_scale.apply(sample.epoch_millis()),
                self.y_scale.apply(sample.temp),
            ),
        };
        debug!("Pointer at x={:.1} resolved to {}", x, readout.label);
        self.focus.update(readout);
        self.focus.readout()
    }

    /// Standalone SVG document of the current scene
    pub fn to_svg(&self) -> Result<String, ChartError> {
        svg::document(self)
    }
}

/// Holder for the chart currently on screen
#[derive(Debug, Default)]
pub struct ChartSurface {
    chart: Option<Chart>,
    renders: u64,
}

impl ChartSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn chart(&self) -> Option<&Chart> {
        self.chart.as_ref()
    }

    pub fn chart_mut(&mut self) -> Option<&mut Chart> {
        self.chart.as_mut()
    }

    /// Number of charts drawn onto this surface so far
    #[must_use]
    pub fn renders(&self) -> u64 {
        self.renders
    }

    fn replace(&mut self, chart: Chart) {
        self.chart = Some(chart);
        self.renders += 1;
    }
}

/// Lays out charts with a fixed size and margins
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    config: ChartConfig,
}

impl ChartRenderer {
    #[must_use]
    pub fn new(config: ChartConfig) -> Self {
        Self { config }
    }

    /// Build the chart for `series` and replace whatever `surface` showed before.
    ///
    /// An empty series is an error and leaves the surface untouched.
    pub fn render(
        &self,
        surface: &mut ChartSurface,
        series: &Series,
        location_name: &str,
        tick_count: usize,
    ) -> Result<(), ChartError> {
        let chart = self.build(series, location_name, tick_count)?;
        info!(
            "Rendered chart for {} with {} samples",
            location_name,
            series.len()
        );
        surface.replace(chart);
        Ok(())
    }

    pub fn build(
        &self,
        series: &Series,
        location_name: &str,
        tick_count: usize,
    ) -> Result<Chart, ChartError> {
        let (t0, t1) = series.time_extent().ok_or(ChartError::EmptySeries)?;
        let (v0, v1) = series
            .temperature_extent()
            .ok_or(ChartError::EmptySeries)?;

        // A single instant or a flat line still needs a span to scale against.
        let time_domain = if t0 == t1 {
            (t0 - HOUR_MILLIS, t1 + HOUR_MILLIS)
        } else {
            (t0, t1)
        };
        let value_domain = if v0 == v1 { (v0 - 1.0, v1 + 1.0) } else { (v0, v1) };

        let (width, height, margin) = (self.config.width, self.config.height, &self.config.margin);
        let area = PlotArea::new(width, height, margin);

        let mut x_scale = TimeScale::new(time_domain, (area.left, area.right));
        x_scale.nice(tick_count);
        let mut y_scale = LinearScale::new(value_domain, (area.bottom, area.top));
        y_scale.nice(tick_count);

        let x_ticks = x_scale
            .ticks(tick_count)
            .into_iter()
            .map(|t| Tick {
                position: x_scale.apply(t),
                label: x_scale.tick_label(t, tick_count),
            })
            .collect();

        let precision = y_scale.tick_precision(tick_count);
        let y_ticks = y_scale
            .ticks(tick_count)
            .into_iter()
            .map(|v| Tick {
                position: y_scale.apply(v),
                label: format!("{}{}", format_value(v, precision), series.unit()),
            })
            .collect();

        let points: Vec<Point> = series
            .samples()
            .iter()
            .map(|s| Point::new(x_scale.apply(s.epoch_millis()), y_scale.apply(s.temp)))
            .collect();

        Ok(Chart {
            width,
            height,
            margin: *margin,
            title: format!("Temperature in {location_name}"),
            x_scale,
            y_scale,
            x_ticks,
            y_ticks,
            path: curve::basis(&points),
            series: series.clone(),
            focus: Focus::default(),
        })
    }
}

fn format_value(value: f64, precision: usize) -> String {
    let text = format!("{value:.precision$}");
    if text.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
        text.trim_start_matches('-').to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sample;
    use chrono::NaiveDate;

    fn series(temps: &[f64]) -> Series {
        let samples = temps
            .iter()
            .enumerate()
            .map(|(hour, &temp)| Sample {
                time: NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(hour as u32, 0, 0)
                    .unwrap(),
                temp,
            })
            .collect();
        Series::new(samples, "°C")
    }

    fn millis(hour: u32, minute: u32) -> i64 {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis()
    }

    fn renderer() -> ChartRenderer {
        ChartRenderer::new(ChartConfig::default())
    }

    fn rendered(temps: &[f64]) -> Chart {
        let mut surface = ChartSurface::new();
        renderer()
            .render(&mut surface, &series(temps), "Rostov-on-Don", 5)
            .unwrap();
        surface.chart_mut().cloned().unwrap()
    }

    #[test]
    fn test_render_layout() {
        let chart = rendered(&[5.0, 6.0, 4.5]);
        let area = chart.plot_area();

        assert_eq!(chart.title(), "Temperature in Rostov-on-Don");
        assert_eq!(chart.title_anchor(), Point::new(480.0, 30.0));
        assert_eq!((area.left, area.right), (120.0, 840.0));
        assert_eq!((area.top, area.bottom), (60.0, 310.0));

        assert_eq!(chart.x_scale().range(), (120.0, 840.0));
        assert_eq!(chart.y_scale().range(), (310.0, 60.0));
        assert_eq!(chart.y_scale().domain(), (4.0, 6.0));
    }

    #[test]
    fn test_render_ticks() {
        let chart = rendered(&[5.0, 6.0, 4.5]);

        let x_labels: Vec<&str> = chart.x_ticks().iter().map(|t| t.label.as_str()).collect();
        assert_eq!(x_labels, vec!["Jan 01", "00:30", "01:00", "01:30", "02:00"]);
        assert_eq!(chart.x_ticks()[0].position, 120.0);

        let y_labels: Vec<&str> = chart.y_ticks().iter().map(|t| t.label.as_str()).collect();
        assert_eq!(y_labels, vec!["4.0°C", "4.5°C", "5.0°C", "5.5°C", "6.0°C"]);
        assert_eq!(chart.y_ticks()[0].position, 310.0);
    }

    #[test]
    fn test_path_spans_first_to_last_sample() {
        let chart = rendered(&[5.0, 6.0, 4.5]);
        let path = chart.path();
        assert_eq!(
            path.first(),
            Some(&PathCommand::MoveTo(Point::new(120.0, chart.y_scale().apply(5.0))))
        );
        assert_eq!(
            path.last(),
            Some(&PathCommand::LineTo(Point::new(840.0, chart.y_scale().apply(4.5))))
        );
    }

    #[test]
    fn test_pointer_snaps_to_hour() {
        let mut chart = rendered(&[5.0, 6.0, 4.5]);
        chart.pointer_enter();

        let x = chart.x_scale().apply(millis(1, 20));
        let readout = chart.pointer_move(x).cloned().unwrap();
        assert_eq!(readout.index, 1);
        assert_eq!(readout.temp, 6.0);
        assert_eq!(readout.label, "Mon Jan 01 01:00 6.0°C");
        assert_eq!(readout.marker.x, chart.x_scale().apply(millis(1, 0)));
        assert_eq!(readout.label_anchor().x, readout.marker.x + 15.0);

        let x = chart.x_scale().apply(millis(1, 40));
        assert_eq!(chart.pointer_move(x).map(|r| r.temp), Some(4.5));
        assert!(chart.focus().displayed().is_some());
    }

    #[test]
    fn test_pointer_outside_data_keeps_marker() {
        let mut chart = rendered(&[5.0, 6.0, 4.5]);
        chart.pointer_enter();
        chart.pointer_move(chart.x_scale().apply(millis(0, 10)));

        assert!(chart.pointer_move(0.0).is_none());
        assert!(chart.pointer_move(chart.width()).is_none());
        assert_eq!(chart.focus().readout().map(|r| r.index), Some(0));
    }

    #[test]
    fn test_pointer_leave_hides_marker() {
        let mut chart = rendered(&[5.0, 6.0, 4.5]);
        chart.pointer_enter();
        chart.pointer_move(chart.x_scale().apply(millis(2, 0)));
        chart.pointer_leave();
        assert!(!chart.focus().is_visible());
        assert!(chart.focus().displayed().is_none());
    }

    #[test]
    fn test_empty_series_leaves_surface_untouched() {
        let mut surface = ChartSurface::new();
        renderer()
            .render(&mut surface, &series(&[1.0, 2.0]), "First", 5)
            .unwrap();

        let err = renderer().render(&mut surface, &series(&[]), "Second", 5);
        assert_eq!(err, Err(ChartError::EmptySeries));
        assert_eq!(surface.renders(), 1);
        assert_eq!(surface.chart().map(Chart::title), Some("Temperature in First"));
    }

    #[test]
    fn test_render_replaces_previous_chart() {
        let mut surface = ChartSurface::new();
        renderer()
            .render(&mut surface, &series(&[1.0, 2.0]), "First", 5)
            .unwrap();
        renderer()
            .render(&mut surface, &series(&[3.0, 4.0, 5.0]), "Second", 5)
            .unwrap();

        assert_eq!(surface.renders(), 2);
        let chart = surface.chart().unwrap();
        assert_eq!(chart.title(), "Temperature in Second");
        assert_eq!(chart.series().len(), 3);
    }

    #[test]
    fn test_single_sample_gets_padded_domains() {
        let chart = rendered(&[7.0]);
        let (d0, d1) = chart.y_scale().domain();
        assert!(d0 <= 6.0 && d1 >= 8.0);
        let (t0, t1) = chart.x_scale().domain();
        assert!(t0 < millis(0, 0) && t1 > millis(0, 0));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(4.5, 1), "4.5");
        assert_eq!(format_value(-0.0, 0), "0");
        assert_eq!(format_value(-0.04, 1), "0.0");
        assert_eq!(format_value(-2.0, 0), "-2");
    }
}
