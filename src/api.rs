//! Open-Meteo API client

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;

use crate::state::{CityCandidate, Coordinate, WeatherSnapshot};

pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Maximum number of city candidates requested per search
pub const SEARCH_RESULT_COUNT: usize = 10;

const USER_AGENT: &str = concat!("weather-report/", env!("CARGO_PKG_VERSION"));

/// Endpoints and transport settings
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub forecast_url: String,
    pub geocoding_url: String,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("server returned {0}")]
    Status(StatusCode),
    #[error("unexpected response body: {0}")]
    Decode(#[source] reqwest::Error),
}

// ============================================================================
// Geocoding API
// ============================================================================

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    id: u64,
    name: String,
    latitude: f64,
    longitude: f64,
    admin1: Option<String>,
    country: Option<String>,
}

impl From<GeocodingResult> for CityCandidate {
    fn from(result: GeocodingResult) -> Self {
        CityCandidate {
            id: result.id,
            name: result.name,
            admin1: result.admin1,
            country: result.country,
            latitude: result.latitude,
            longitude: result.longitude,
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// Client for the forecast and geocoding endpoints
#[derive(Clone, Debug)]
pub struct OpenMeteoClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl OpenMeteoClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Fetch current weather for a coordinate, in the location's own timezone
    pub async fn fetch_current_weather(
        &self,
        coordinate: Coordinate,
    ) -> Result<WeatherSnapshot, ApiError> {
        let url = format!(
            "{}?latitude={}&longitude={}&timezone=auto&current_weather=true",
            self.config.forecast_url, coordinate.latitude, coordinate.longitude
        );
        tracing::debug!(%url, "fetching forecast");

        let snapshot: WeatherSnapshot = self.get_json(&url).await?;
        tracing::info!(
            latitude = snapshot.latitude,
            longitude = snapshot.longitude,
            weathercode = snapshot.current_weather.weathercode,
            "forecast loaded"
        );
        Ok(snapshot)
    }

    /// Search for places whose name matches the query
    pub async fn search_cities(&self, query: &str) -> Result<Vec<CityCandidate>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}?name={}&count={}&language=en",
            self.config.geocoding_url,
            urlencoding::encode(query),
            SEARCH_RESULT_COUNT
        );
        tracing::debug!(%url, "searching cities");

        let data: GeocodingResponse = self.get_json(&url).await?;
        let results: Vec<CityCandidate> = data
            .results
            .unwrap_or_default()
            .into_iter()
            .map(CityCandidate::from)
            .collect();
        tracing::debug!(query, count = results.len(), "city search finished");
        Ok(results)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(ApiError::Request)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, %status, "request rejected");
            return Err(ApiError::Status(status));
        }

        response.json().await.map_err(ApiError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenMeteoClient {
        OpenMeteoClient::new(ApiConfig {
            forecast_url: format!("{}/v1/forecast", server.uri()),
            geocoding_url: format!("{}/v1/search", server.uri()),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn forecast_body() -> serde_json::Value {
        serde_json::json!({
            "latitude": 51.5,
            "longitude": -0.120000124,
            "generationtime_ms": 0.05,
            "utc_offset_seconds": 3600,
            "timezone": "Europe/London",
            "timezone_abbreviation": "BST",
            "elevation": 23.0,
            "current_weather": {
                "temperature": 14.2,
                "windspeed": 9.4,
                "winddirection": 250.0,
                "weathercode": 61,
                "is_day": 1,
                "time": "2024-05-01T14:00"
            }
        })
    }

    #[tokio::test]
    async fn test_fetch_sends_exact_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "51.5074"))
            .and(query_param("longitude", "-0.1278"))
            .and(query_param("timezone", "auto"))
            .and(query_param("current_weather", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .expect(1)
            .mount(&server)
            .await;

        let snapshot = client_for(&server)
            .fetch_current_weather(Coordinate {
                latitude: 51.5074,
                longitude: -0.1278,
            })
            .await
            .unwrap();

        assert_eq!(snapshot.timezone, "Europe/London");
        assert_eq!(snapshot.current_weather.weathercode, 61);
        assert_eq!(snapshot.current_weather.time, "2024-05-01T14:00");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": true,
                "reason": "Latitude must be in range of -90 to 90°."
            })))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .fetch_current_weather(Coordinate {
                latitude: 0.0,
                longitude: 0.0,
            })
            .await;

        assert!(matches!(result, Err(ApiError::Status(StatusCode::BAD_REQUEST))));
    }

    #[tokio::test]
    async fn test_fetch_malformed_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .fetch_current_weather(Coordinate {
                latitude: 0.0,
                longitude: 0.0,
            })
            .await;

        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[tokio::test]
    async fn test_search_maps_results() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "New York"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {
                        "id": 5128581,
                        "name": "New York",
                        "latitude": 40.71427,
                        "longitude": -74.00597,
                        "admin1": "New York",
                        "country": "United States"
                    },
                    {
                        "id": 5128638,
                        "name": "New York",
                        "latitude": 43.00035,
                        "longitude": -75.4999,
                        "country": "United States"
                    }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let results = client_for(&server).search_cities("New York").await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, 5128581);
        assert_eq!(results[0].admin1.as_deref(), Some("New York"));
        assert_eq!(results[1].admin1, None);
        assert_eq!(results[1].display_name(), "New York, United States");
    }

    #[tokio::test]
    async fn test_search_without_results_field() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "generationtime_ms": 0.2 })),
            )
            .mount(&server)
            .await;

        let results = client_for(&server).search_cities("Xyzzy").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_blank_query_skips_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let results = client_for(&server).search_cities("   ").await.unwrap();
        assert!(results.is_empty());
    }
}
