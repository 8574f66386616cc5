//! SVG serialization of a chart scene

use anyhow::Result;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use super::curve::{fmt_num, to_svg_path};
use super::pointer::MARKER_RADIUS;
use super::{Chart, ChartError, Tick};

type Xml = Writer<Vec<u8>>;

const GRID_STROKE: [(&str, &str); 2] = [("stroke", "currentColor"), ("stroke-opacity", "0.2")];

fn open(xml: &mut Xml, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
    xml.write_event(Event::Start(
        BytesStart::new(name).with_attributes(attrs.iter().copied()),
    ))?;
    Ok(())
}

fn close(xml: &mut Xml, name: &str) -> Result<()> {
    xml.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn empty(xml: &mut Xml, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
    xml.write_event(Event::Empty(
        BytesStart::new(name).with_attributes(attrs.iter().copied()),
    ))?;
    Ok(())
}

fn text(xml: &mut Xml, attrs: &[(&str, &str)], content: &str) -> Result<()> {
    open(xml, "text", attrs)?;
    xml.write_event(Event::Text(BytesText::new(content)))?;
    close(xml, "text")
}

fn x_axis(xml: &mut Xml, chart: &Chart, ticks: &[Tick]) -> Result<()> {
    let area = chart.plot_area();
    let (top, bottom) = (fmt_num(area.top), fmt_num(area.bottom));
    let label_y = fmt_num(area.bottom + 16.0);

    open(xml, "g", &[("class", "x-axis"), ("style", "font: 7px times")])?;
    for tick in ticks {
        let x = fmt_num(tick.position);
        let mut line = vec![
            ("x1", x.as_str()),
            ("y1", bottom.as_str()),
            ("x2", x.as_str()),
            ("y2", top.as_str()),
        ];
        line.extend(GRID_STROKE);
        empty(xml, "line", &line)?;
        text(
            xml,
            &[("x", x.as_str()), ("y", label_y.as_str()), ("text-anchor", "middle")],
            &tick.label,
        )?;
    }
    close(xml, "g")
}

fn y_axis(xml: &mut Xml, chart: &Chart, ticks: &[Tick]) -> Result<()> {
    let area = chart.plot_area();
    let (left, right) = (fmt_num(area.left), fmt_num(area.right));
    let label_x = fmt_num(area.left - 5.0);

    open(xml, "g", &[("class", "y-axis"), ("style", "font: 7px times")])?;
    for tick in ticks {
        let y = fmt_num(tick.position);
        let mut line = vec![
            ("x1", left.as_str()),
            ("y1", y.as_str()),
            ("x2", right.as_str()),
            ("y2", y.as_str()),
        ];
        line.extend(GRID_STROKE);
        empty(xml, "line", &line)?;
        text(
            xml,
            &[
                ("x", label_x.as_str()),
                ("y", y.as_str()),
                ("text-anchor", "end"),
                ("alignment-baseline", "middle"),
            ],
            &tick.label,
        )?;
    }
    close(xml, "g")
}

fn write_document(xml: &mut Xml, chart: &Chart) -> Result<()> {
    let area = chart.plot_area();
    let margin = chart.margin();

    let view_box = format!("0 0 {} {}", fmt_num(chart.width()), fmt_num(chart.height()));
    open(
        xml,
        "svg",
        &[("xmlns", "http://www.w3.org/2000/svg"), ("viewBox", view_box.as_str())],
    )?;

    let title = chart.title_anchor();
    let (title_x, title_y) = (fmt_num(title.x), fmt_num(title.y));
    text(
        xml,
        &[
            ("class", "svg_title"),
            ("x", title_x.as_str()),
            ("y", title_y.as_str()),
            ("text-anchor", "middle"),
            ("style", "font-size: 22px"),
        ],
        chart.title(),
    )?;

    let rotate = format!(
        "translate({},{}) rotate(-90)",
        fmt_num(margin.left - 50.0),
        fmt_num((chart.height() - margin.top - margin.bottom + 180.0) / 2.0)
    );
    text(
        xml,
        &[
            ("text-anchor", "middle"),
            ("transform", rotate.as_str()),
            ("style", "font-size: 26px"),
        ],
        Chart::Y_LABEL,
    )?;
    let (label_x, label_y) = (fmt_num(area.center_x()), fmt_num(area.bottom + 60.0));
    text(
        xml,
        &[
            ("class", "svg_title"),
            ("x", label_x.as_str()),
            ("y", label_y.as_str()),
            ("text-anchor", "middle"),
            ("style", "font-size: 26px"),
        ],
        Chart::X_LABEL,
    )?;

    x_axis(xml, chart, chart.x_ticks())?;
    y_axis(xml, chart, chart.y_ticks())?;

    let path = to_svg_path(chart.path());
    empty(
        xml,
        "path",
        &[
            ("d", path.as_str()),
            ("fill", "none"),
            ("stroke", "steelblue"),
            ("stroke-width", "2"),
        ],
    )?;

    let focus = chart.focus();
    let opacity = fmt_num(focus.opacity());
    let (marker, anchor, label) = focus.readout().map_or_else(
        || (Default::default(), Default::default(), ""),
        |r| {
            let anchor = r.label_anchor();
            ((r.marker.x, r.marker.y), (anchor.x, anchor.y), r.label.as_str())
        },
    );
    let (cx, cy, r) = (fmt_num(marker.0), fmt_num(marker.1), fmt_num(MARKER_RADIUS));
    empty(
        xml,
        "circle",
        &[
            ("class", "focus"),
            ("cx", cx.as_str()),
            ("cy", cy.as_str()),
            ("r", r.as_str()),
            ("fill", "blue"),
            ("stroke", "black"),
            ("opacity", opacity.as_str()),
        ],
    )?;
    let (text_x, text_y) = (fmt_num(anchor.0), fmt_num(anchor.1));
    text(
        xml,
        &[
            ("class", "focus-text"),
            ("x", text_x.as_str()),
            ("y", text_y.as_str()),
            ("alignment-baseline", "middle"),
            ("opacity", opacity.as_str()),
        ],
        label,
    )?;

    close(xml, "svg")
}

/// Complete `<svg>` document for the chart, hover marker included
pub fn document(chart: &Chart) -> Result<String, ChartError> {
    let mut xml = Writer::new(Vec::new());
    write_document(&mut xml, chart).map_err(|e| ChartError::Svg(e.to_string()))?;
    String::from_utf8(xml.into_inner()).map_err(|e| ChartError::Svg(e.to_string()))
}
