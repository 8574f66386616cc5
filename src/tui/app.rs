//! Terminal application state: maps key and mouse events onto the search controller
//! and the chart pointer.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::debug;

use crate::chart::{ChartRenderer, ChartSurface};
use crate::config::HourcastConfig;
use crate::search::{Applied, Command, Reply, SearchController};

/// Screen regions from the last draw, used to hit-test the mouse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Regions {
    pub suggestions: Option<Rect>,
    pub chart: Option<Rect>,
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

/// Chart pixel x under terminal `column`, sampling the middle of the cell
#[must_use]
pub fn chart_x(column: u16, area: Rect, chart_width: f64) -> Option<f64> {
    if area.width == 0 || column < area.x || column >= area.x.saturating_add(area.width) {
        return None;
    }
    let offset = f64::from(column - area.x) + 0.5;
    Some(offset / f64::from(area.width) * chart_width)
}

pub struct App {
    controller: SearchController,
    surface: ChartSurface,
    highlighted: Option<usize>,
    pointer_inside: bool,
    status: String,
    regions: Regions,
    should_quit: bool,
}

impl App {
    #[must_use]
    pub fn new(config: &HourcastConfig) -> Self {
        let renderer = ChartRenderer::new(config.chart.clone());
        Self {
            controller: SearchController::new(
                renderer,
                config.search.max_suggestions,
                config.chart.tick_count,
            ),
            surface: ChartSurface::new(),
            highlighted: None,
            pointer_inside: false,
            status: "Type a place name, Enter to chart it".to_string(),
            regions: Regions::default(),
            should_quit: false,
        }
    }

    #[must_use]
    pub fn controller(&self) -> &SearchController {
        &self.controller
    }

    #[must_use]
    pub fn surface(&self) -> &ChartSurface {
        &self.surface
    }

    #[must_use]
    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn set_regions(&mut self, regions: Regions) {
        self.regions = regions;
    }

    /// Handle one terminal event, returning the request it triggers, if any
    pub fn handle_event(&mut self, event: &Event) -> Option<Command> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(*key),
            Event::Mouse(mouse) => self.handle_mouse(*mouse),
            _ => None,
        }
    }

    fn edit(&mut self, text: String) -> Option<Command> {
        self.highlighted = None;
        self.controller.input(&text)
    }

    fn submit(&mut self) -> Option<Command> {
        let command = self.controller.submit();
        if command.is_some() {
            self.highlighted = None;
            self.status = "Fetching forecast...".to_string();
        }
        command
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return None;
        }

        match key.code {
            KeyCode::Char(c) => {
                let mut text = self.controller.text().to_string();
                text.push(c);
                self.edit(text)
            }
            KeyCode::Backspace => {
                let mut text = self.controller.text().to_string();
                text.pop();
                self.edit(text)
            }
            KeyCode::Down => {
                self.move_highlight(1);
                None
            }
            KeyCode::Up => {
                self.move_highlight(-1);
                None
            }
            KeyCode::Tab => {
                if self.controller.suggestions_visible() {
                    self.controller.select(self.highlighted.unwrap_or(0));
                    self.highlighted = None;
                }
                None
            }
            KeyCode::Enter => {
                if let Some(index) = self.highlighted {
                    self.controller.select(index);
                }
                self.submit()
            }
            KeyCode::Esc => {
                if self.controller.text().is_empty() {
                    self.should_quit = true;
                    None
                } else {
                    self.edit(String::new())
                }
            }
            _ => None,
        }
    }

    fn move_highlight(&mut self, delta: isize) {
        let count = self.controller.suggestions().len();
        if !self.controller.suggestions_visible() || count == 0 {
            self.highlighted = None;
            return;
        }
        let next = match self.highlighted {
            None if delta > 0 => 0,
            None => count - 1,
            Some(i) => i.saturating_add_signed(delta).min(count - 1),
        };
        self.highlighted = Some(next);
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> Option<Command> {
        let (column, row) = (mouse.column, mouse.row);

        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind
            && let Some(list) = self.regions.suggestions
            && contains(list, column, row)
        {
            // first row is the list's top border
            let index = usize::from(row.saturating_sub(list.y + 1));
            if self.controller.select(index).is_some() {
                self.highlighted = None;
            }
            return None;
        }

        if matches!(mouse.kind, MouseEventKind::Moved | MouseEventKind::Drag(_)) {
            self.track_pointer(column, row);
        }
        None
    }

    fn track_pointer(&mut self, column: u16, row: u16) {
        let Some(area) = self.regions.chart else {
            return;
        };
        let Some(chart) = self.surface.chart_mut() else {
            return;
        };

        if !contains(area, column, row) {
            if self.pointer_inside {
                self.pointer_inside = false;
                chart.pointer_leave();
            }
            return;
        }

        if !self.pointer_inside {
            self.pointer_inside = true;
            chart.pointer_enter();
        }
        if let Some(x) = chart_x(column, area, chart.width()) {
            chart.pointer_move(x);
        }
    }

    pub fn handle_reply(&mut self, reply: Reply) {
        let applied = self.controller.apply(reply, &mut self.surface);
        debug!("Applied reply: {:?}", applied);

        match applied {
            Applied::Suggestions(count) => {
                if self.highlighted.is_some_and(|i| i >= count) {
                    self.highlighted = None;
                }
            }
            Applied::SuggestionsUnchanged => {
                self.status = "Place search failed, keeping previous suggestions".to_string();
            }
            Applied::Stale => {}
            Applied::Rendered { location, samples } => {
                self.pointer_inside = false;
                self.status = format!(
                    "{} hourly samples for {} ({})",
                    samples,
                    location.suggestion_label(),
                    location.format_coordinates()
                );
            }
            Applied::NoData => {
                self.status = "No forecast data for that place".to_string();
            }
            Applied::Failed(message) => {
                self.status = format!("Forecast unusable: {message}");
            }
        }
    }
}
