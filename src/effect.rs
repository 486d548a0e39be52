//! Effects - side effects declared by the reducer, and the handler that runs them

use std::sync::Arc;
use std::time::Duration;

use tui_dispatch::{TaskKey, TaskManager};

use crate::action::Action;
use crate::api::OpenMeteoClient;
use crate::state::Coordinate;

/// Quiet period before a typed city query is sent
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;

pub const FORECAST_TASK: &str = "forecast";
pub const CITY_SEARCH_TASK: &str = "city_search";

/// Side effects that can be triggered by actions
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Fetch current weather for the coordinate
    FetchWeather { coordinate: Coordinate },
    /// Search for cities matching the query (debounced)
    SearchCities { query: String },
    /// Drop any pending or in-flight city search
    CancelCitySearch,
}

/// Turns effects into keyed async tasks
#[derive(Clone)]
pub struct EffectHandler {
    client: Arc<OpenMeteoClient>,
    search_debounce: Duration,
}

impl EffectHandler {
    pub fn new(client: OpenMeteoClient, search_debounce: Duration) -> Self {
        Self {
            client: Arc::new(client),
            search_debounce,
        }
    }

    pub fn handle(&self, effect: Effect, tasks: &mut TaskManager<Action>) {
        match effect {
            Effect::FetchWeather { coordinate } => {
                let client = Arc::clone(&self.client);
                tasks.spawn(FORECAST_TASK, async move {
                    match client.fetch_current_weather(coordinate).await {
                        Ok(snapshot) => Action::WeatherDidLoad(snapshot),
                        Err(e) => {
                            tracing::warn!(error = %e, "forecast request failed");
                            Action::WeatherDidError(e.to_string())
                        }
                    }
                });
            }
            Effect::SearchCities { query } => {
                let client = Arc::clone(&self.client);
                tasks.debounce(CITY_SEARCH_TASK, self.search_debounce, async move {
                    match client.search_cities(&query).await {
                        Ok(results) => Action::CitySearchDidLoad { query, results },
                        Err(e) => {
                            tracing::warn!(error = %e, %query, "city search failed");
                            Action::CitySearchDidError {
                                query,
                                error: e.to_string(),
                            }
                        }
                    }
                });
            }
            Effect::CancelCitySearch => {
                tasks.cancel(&TaskKey::new(CITY_SEARCH_TASK));
            }
        }
    }
}
