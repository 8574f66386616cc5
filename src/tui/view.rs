//! Drawing: search box, suggestion list, chart canvas and status line.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Circle, Context, Line as CanvasLine};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use super::app::{App, Regions};
use crate::chart::pointer::MARKER_RADIUS;
use crate::chart::{Chart, curve};

const CURVE_STEPS: usize = 8;

/// Draw the whole screen and report where the interactive regions ended up
pub fn draw(frame: &mut Frame, app: &App) -> Regions {
    let controller = app.controller();
    let list_height = if controller.suggestions_visible() {
        controller.suggestions().len() as u16 + 2
    } else {
        0
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(list_height),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_search(frame, rows[0], app);
    let suggestions = (list_height > 0).then(|| {
        draw_suggestions(frame, rows[1], app);
        rows[1]
    });
    let chart = draw_chart(frame, rows[2], app);
    draw_status(frame, rows[3], app);

    Regions { suggestions, chart }
}

fn draw_search(frame: &mut Frame, area: Rect, app: &App) {
    let title = if app.controller().is_searching() {
        " Place (searching...) "
    } else {
        " Place "
    };
    let input = Paragraph::new(Line::from(vec![
        Span::raw(app.controller().text()),
        Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ]))
    .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(input, area);
}

fn draw_suggestions(frame: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .controller()
        .suggestions()
        .iter()
        .map(|location| ListItem::new(location.suggestion_label()))
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan));
    let mut state = ListState::default().with_selected(app.highlighted());
    frame.render_stateful_widget(list, area, &mut state);
}

/// Returns the canvas area so mouse columns can be mapped to chart pixels
fn draw_chart(frame: &mut Frame, area: Rect, app: &App) -> Option<Rect> {
    let Some(chart) = app.surface().chart() else {
        let hint = Paragraph::new("No chart yet")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(hint, area);
        return None;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {} ", chart.title()),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.0, chart.width()])
        .y_bounds([0.0, chart.height()])
        .paint(|ctx| paint_chart(ctx, chart));
    frame.render_widget(canvas, inner);
    Some(inner)
}

fn paint_chart(ctx: &mut Context, chart: &Chart) {
    let area = chart.plot_area();
    let height = chart.height();
    // Scene y grows downwards, canvas y upwards.
    let flip = |y: f64| height - y;
    let grid = Color::DarkGray;

    for tick in chart.x_ticks() {
        ctx.draw(&CanvasLine::new(
            tick.position,
            flip(area.bottom),
            tick.position,
            flip(area.top),
            grid,
        ));
        ctx.print(
            tick.position,
            flip(area.bottom + 16.0),
            Span::styled(tick.label.clone(), Style::default().fg(Color::Gray)),
        );
    }
    for tick in chart.y_ticks() {
        ctx.draw(&CanvasLine::new(
            area.left,
            flip(tick.position),
            area.right,
            flip(tick.position),
            grid,
        ));
        ctx.print(
            0.0,
            flip(tick.position),
            Span::styled(tick.label.clone(), Style::default().fg(Color::Gray)),
        );
    }
    ctx.print(area.center_x(), flip(area.bottom + 40.0), Chart::X_LABEL);
    ctx.print(0.0, flip(area.top / 2.0), Chart::Y_LABEL);

    ctx.layer();
    let points = curve::flatten(chart.path(), CURVE_STEPS);
    for pair in points.windows(2) {
        ctx.draw(&CanvasLine::new(
            pair[0].x,
            flip(pair[0].y),
            pair[1].x,
            flip(pair[1].y),
            Color::LightBlue,
        ));
    }

    if let Some(readout) = chart.focus().displayed() {
        ctx.layer();
        ctx.draw(&Circle {
            x: readout.marker.x,
            y: flip(readout.marker.y),
            radius: MARKER_RADIUS,
            color: Color::Blue,
        });
        let anchor = readout.label_anchor();
        ctx.print(
            anchor.x,
            flip(anchor.y),
            Span::styled(
                readout.label.clone(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        );
    }
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let status = Paragraph::new(Line::from(vec![
        Span::styled(" Enter", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" chart  "),
        Span::styled("Up/Down", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" pick  "),
        Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" clear/quit   "),
        Span::styled(app.status(), Style::default().fg(Color::Cyan)),
    ]));
    frame.render_widget(status, area);
}
