//! Search box state machine.
//!
//! The controller never performs I/O. Edits and submits produce `Command`s that the
//! caller runs (see `pipeline`), and the resulting `Reply`s are fed back through
//! `apply`. Every command carries a `RequestToken`; a reply only touches displayed
//! state when its token is the latest one issued for its kind, so a slow response
//! can never overwrite a newer one.

use std::fmt;

use tracing::{debug, info, warn};

use crate::chart::{ChartError, ChartRenderer, ChartSurface};
use crate::models::Location;
use crate::series;
use crate::weather::RawForecast;

pub mod pipeline;

pub use pipeline::{Pipeline, execute};

/// Monotonically increasing request id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a forecast request is for
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastTarget {
    /// A known place; its coordinates are used as-is
    Location(Location),
    /// Free text; geocoded first, best match used
    Query(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Geocode {
        token: RequestToken,
        query: String,
    },
    Forecast {
        token: RequestToken,
        target: ForecastTarget,
    },
}

impl Command {
    #[must_use]
    pub fn token(&self) -> RequestToken {
        match self {
            Command::Geocode { token, .. } | Command::Forecast { token, .. } => *token,
        }
    }
}

/// Outcome of a command. `None` payloads mean the request failed and was logged.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Suggestions {
        token: RequestToken,
        locations: Option<Vec<Location>>,
    },
    Forecast {
        token: RequestToken,
        result: Option<(Location, RawForecast)>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    /// Nothing pending; suggestions from the last answered query may be shown
    Idle,
    /// Waiting for suggestions
    Typing { token: RequestToken },
    /// A suggestion was picked; submitting uses it without geocoding again
    Selected { location: Location },
    /// Forecast in flight
    Searching {
        token: RequestToken,
        target: ForecastTarget,
    },
}

/// What `apply` did with a reply
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// Suggestion list replaced, with this many entries
    Suggestions(usize),
    /// Geocoding failed; the previous list stays
    SuggestionsUnchanged,
    /// Superseded by a newer request and dropped
    Stale,
    /// A new chart is on the surface
    Rendered { location: Location, samples: usize },
    /// Nothing to chart
    NoData,
    /// The forecast payload was unusable
    Failed(String),
}

pub struct SearchController {
    state: SearchState,
    text: String,
    suggestions: Vec<Location>,
    suggestions_visible: bool,
    max_suggestions: usize,
    next_token: u64,
    latest_geocode: Option<RequestToken>,
    /// Geocode request the current suggestion list answers
    suggestions_token: Option<RequestToken>,
    latest_forecast: Option<RequestToken>,
    renderer: ChartRenderer,
    tick_count: usize,
}

impl SearchController {
    #[must_use]
    pub fn new(renderer: ChartRenderer, max_suggestions: usize, tick_count: usize) -> Self {
        Self {
            state: SearchState::Idle,
            text: String::new(),
            suggestions: Vec::new(),
            suggestions_visible: false,
            max_suggestions,
            next_token: 0,
            latest_geocode: None,
            suggestions_token: None,
            latest_forecast: None,
            renderer,
            tick_count,
        }
    }

    #[must_use]
    pub fn state(&self) -> &SearchState {
        &self.state
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn suggestions(&self) -> &[Location] {
        &self.suggestions
    }

    /// Whether the suggestion list should be drawn
    #[must_use]
    pub fn suggestions_visible(&self) -> bool {
        self.suggestions_visible && !self.suggestions.is_empty()
    }

    #[must_use]
    pub fn is_searching(&self) -> bool {
        matches!(self.state, SearchState::Searching { .. })
    }

    fn issue(&mut self) -> RequestToken {
        self.next_token += 1;
        RequestToken(self.next_token)
    }

    /// The search text changed
    pub fn input(&mut self, text: &str) -> Option<Command> {
        self.text = text.to_string();

        let query = text.trim();
        if query.is_empty() {
            self.state = SearchState::Idle;
            self.suggestions.clear();
            self.suggestions_visible = false;
            self.latest_geocode = None;
            self.suggestions_token = None;
            return None;
        }

        let token = self.issue();
        self.latest_geocode = Some(token);
        self.state = SearchState::Typing { token };
        self.suggestions_visible = true;
        debug!("Geocode {} for '{}'", token, query);
        Some(Command::Geocode {
            token,
            query: query.to_string(),
        })
    }

    /// Pick the suggestion at `index`; out-of-range indexes change nothing
    pub fn select(&mut self, index: usize) -> Option<&Location> {
        let location = self.suggestions.get(index)?.clone();
        debug!("Selected suggestion {}: {}", index, location.name);

        self.text.clone_from(&location.name);
        self.suggestions_visible = false;
        self.latest_geocode = None;
        self.state = SearchState::Selected { location };
        self.suggestions.get(index)
    }

    /// Whether the suggestion list answers the text currently typed
    fn suggestions_current(&self) -> bool {
        self.latest_geocode.is_some() && self.suggestions_token == self.latest_geocode
    }

    /// Ask for a forecast for the selected place, the first suggestion or the raw text.
    /// Suggestions left over from an earlier query are never used.
    pub fn submit(&mut self) -> Option<Command> {
        let first = self.suggestions.first().filter(|_| self.suggestions_current());
        let target = match &self.state {
            SearchState::Selected { location } => ForecastTarget::Location(location.clone()),
            _ => match first {
                Some(location) => ForecastTarget::Location(location.clone()),
                None => {
                    let query = self.text.trim();
                    if query.is_empty() {
                        return None;
                    }
                    ForecastTarget::Query(query.to_string())
                }
            },
        };

        let token = self.issue();
        self.latest_forecast = Some(token);
        self.latest_geocode = None;
        self.suggestions_visible = false;
        self.state = SearchState::Searching {
            token,
            target: target.clone(),
        };
        info!("Forecast {} requested for {:?}", token, target);
        Some(Command::Forecast { token, target })
    }

    /// Fold a reply into the displayed state
    pub fn apply(&mut self, reply: Reply, surface: &mut ChartSurface) -> Applied {
        match reply {
            Reply::Suggestions { token, locations } => self.apply_suggestions(token, locations),
            Reply::Forecast { token, result } => self.apply_forecast(token, result, surface),
        }
    }

    fn apply_suggestions(
        &mut self,
        token: RequestToken,
        locations: Option<Vec<Location>>,
    ) -> Applied {
        if self.latest_geocode != Some(token) {
            debug!("Dropping stale suggestions {}", token);
            return Applied::Stale;
        }
        if self.state == (SearchState::Typing { token }) {
            self.state = SearchState::Idle;
        }

        let Some(mut locations) = locations else {
            return Applied::SuggestionsUnchanged;
        };
        locations.truncate(self.max_suggestions);
        self.suggestions = locations;
        self.suggestions_token = Some(token);
        Applied::Suggestions(self.suggestions.len())
    }

    fn apply_forecast(
        &mut self,
        token: RequestToken,
        result: Option<(Location, RawForecast)>,
        surface: &mut ChartSurface,
    ) -> Applied {
        if self.latest_forecast != Some(token) {
            debug!("Dropping stale forecast {}", token);
            return Applied::Stale;
        }

        let applied = match &result {
            None => Applied::NoData,
            Some((location, raw)) => match series::build(raw) {
                Err(e) => {
                    warn!("Unusable forecast for {}: {}", location.name, e);
                    Applied::Failed(e.to_string())
                }
                Ok(series) => {
                    match self
                        .renderer
                        .render(surface, &series, &location.name, self.tick_count)
                    {
                        Ok(()) => Applied::Rendered {
                            location: location.clone(),
                            samples: series.len(),
                        },
                        Err(ChartError::EmptySeries) => Applied::NoData,
                        Err(e) => Applied::Failed(e.to_string()),
                    }
                }
            },
        };

        // Typing after submitting moved the state on; only settle our own search.
        let settles = matches!(
            &self.state,
            SearchState::Searching { token: current, .. } if *current == token
        );
        if settles {
            let previous = std::mem::replace(&mut self.state, SearchState::Idle);
            self.state = match (result, previous) {
                (Some((location, _)), _)
                | (
                    None,
                    SearchState::Searching {
                        target: ForecastTarget::Location(location),
                        ..
                    },
                ) => SearchState::Selected { location },
                _ => SearchState::Idle,
            };
        }
        applied
    }
}
