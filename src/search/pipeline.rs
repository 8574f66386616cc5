//! Runs controller commands against the network sources.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use super::{Command, ForecastTarget, Reply};
use crate::models::Location;
use crate::weather::{ForecastProvider, Geocoder};

/// Execute one command. Never fails: every failure has already been logged and
/// shows up as a `None` payload.
pub async fn execute(
    command: Command,
    geocoder: &dyn Geocoder,
    forecaster: &dyn ForecastProvider,
) -> Reply {
    match command {
        Command::Geocode { token, query } => Reply::Suggestions {
            token,
            locations: geocoder.resolve(&query).await,
        },
        Command::Forecast { token, target } => {
            let result = match locate(target, geocoder).await {
                Some(location) => forecaster
                    .fetch_hourly(location.latitude, location.longitude)
                    .await
                    .map(|raw| (location, raw)),
                None => None,
            };
            Reply::Forecast { token, result }
        }
    }
}

async fn locate(target: ForecastTarget, geocoder: &dyn Geocoder) -> Option<Location> {
    match target {
        ForecastTarget::Location(location) => Some(location),
        ForecastTarget::Query(query) => {
            let best = geocoder.resolve(&query).await?.into_iter().next();
            if best.is_none() {
                warn!("No place matches '{}'", query);
            }
            best
        }
    }
}

/// Spawns commands on the runtime and sends their replies back to the UI loop
#[derive(Clone)]
pub struct Pipeline {
    geocoder: Arc<dyn Geocoder>,
    forecaster: Arc<dyn ForecastProvider>,
    replies: UnboundedSender<Reply>,
}

impl Pipeline {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        forecaster: Arc<dyn ForecastProvider>,
        replies: UnboundedSender<Reply>,
    ) -> Self {
        Self {
            geocoder,
            forecaster,
            replies,
        }
    }

    pub fn spawn(&self, command: Command) {
        let geocoder = Arc::clone(&self.geocoder);
        let forecaster = Arc::clone(&self.forecaster);
        let replies = self.replies.clone();

        tokio::spawn(async move {
            let token = command.token();
            let reply = execute(command, geocoder.as_ref(), forecaster.as_ref()).await;
            if replies.send(reply).is_err() {
                debug!("Reply {} dropped, UI loop has exited", token);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartRenderer, ChartSurface};
    use crate::config::ChartConfig;
    use crate::search::{Applied, RequestToken, SearchController, SearchState};
    use crate::weather::{FetchError, RawForecast};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    struct FakeGeocoder {
        places: Vec<Location>,
        fail: bool,
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn search(&self, query: &str) -> Result<Vec<Location>, FetchError> {
            if self.fail {
                return Err(FetchError::Status {
                    status: 503,
                    reason: "unavailable".to_string(),
                });
            }
            Ok(self
                .places
                .iter()
                .filter(|p| p.name.starts_with(query))
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    struct FakeForecaster {
        calls: Mutex<Vec<(f64, f64)>>,
    }

    #[async_trait]
    impl ForecastProvider for FakeForecaster {
        async fn fetch(&self, latitude: f64, longitude: f64) -> Result<RawForecast, FetchError> {
            self.calls.lock().unwrap().push((latitude, longitude));
            Ok(RawForecast::new(
                vec!["2024-01-01T00:00".to_string(), "2024-01-01T01:00".to_string()],
                vec![1.0, 2.0],
                "°C",
            ))
        }
    }

    fn geocoder(fail: bool) -> FakeGeocoder {
        FakeGeocoder {
            places: vec![
                Location::new(39.80, -89.64, "Springfield".to_string()),
                Location::new(37.21, -93.29, "Springfield".to_string()),
            ],
            fail,
        }
    }

    fn controller() -> SearchController {
        SearchController::new(ChartRenderer::new(ChartConfig::default()), 5, 5)
    }

    fn token(controller: &mut SearchController) -> RequestToken {
        controller.input("Spring").map(|c| c.token()).unwrap()
    }

    #[tokio::test]
    async fn test_geocode_command() {
        let mut controller = controller();
        let token = token(&mut controller);
        let forecaster = FakeForecaster::default();

        let reply = execute(
            Command::Geocode {
                token,
                query: "Spring".to_string(),
            },
            &geocoder(false),
            &forecaster,
        )
        .await;
        assert!(matches!(
            reply,
            Reply::Suggestions { locations: Some(ref l), .. } if l.len() == 2
        ));

        let reply = execute(
            Command::Geocode {
                token,
                query: "Spring".to_string(),
            },
            &geocoder(true),
            &forecaster,
        )
        .await;
        assert_eq!(
            reply,
            Reply::Suggestions {
                token,
                locations: None
            }
        );
    }

    #[tokio::test]
    async fn test_forecast_for_location_skips_geocoding() {
        let forecaster = FakeForecaster::default();
        let target = Location::new(37.21, -93.29, "Springfield".to_string());
        let mut controller = controller();

        // A failing geocoder proves the coordinates came from the target itself.
        let reply = execute(
            Command::Forecast {
                token: token(&mut controller),
                target: ForecastTarget::Location(target.clone()),
            },
            &geocoder(true),
            &forecaster,
        )
        .await;

        assert!(matches!(reply, Reply::Forecast { result: Some((ref l, _)), .. } if *l == target));
        assert_eq!(*forecaster.calls.lock().unwrap(), vec![(37.21, -93.29)]);
    }

    #[tokio::test]
    async fn test_forecast_for_query_uses_best_match() {
        let forecaster = FakeForecaster::default();
        let mut controller = controller();
        let t = token(&mut controller);

        let reply = execute(
            Command::Forecast {
                token: t,
                target: ForecastTarget::Query("Spring".to_string()),
            },
            &geocoder(false),
            &forecaster,
        )
        .await;
        assert!(matches!(reply, Reply::Forecast { result: Some(_), .. }));
        assert_eq!(*forecaster.calls.lock().unwrap(), vec![(39.80, -89.64)]);

        let reply = execute(
            Command::Forecast {
                token: t,
                target: ForecastTarget::Query("Nowhere".to_string()),
            },
            &geocoder(false),
            &forecaster,
        )
        .await;
        assert_eq!(reply, Reply::Forecast { token: t, result: None });
        assert_eq!(forecaster.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_pipeline_delivers_replies() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let pipeline = Pipeline::new(
            Arc::new(geocoder(false)),
            Arc::new(FakeForecaster::default()),
            tx,
        );
        let mut controller = controller();

        let command = controller.input("Spring").unwrap();
        pipeline.spawn(command);

        let reply = rx.recv().await.unwrap();
        let mut surface = ChartSurface::new();
        assert_eq!(
            controller.apply(reply, &mut surface),
            Applied::Suggestions(2)
        );
        assert_eq!(controller.state(), &SearchState::Idle);
        assert_eq!(controller.suggestions()[0].name, "Springfield");
    }
}
