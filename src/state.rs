//! Application state - single source of truth

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Latitude bound accepted by the form
pub const MAX_LATITUDE: f64 = 90.0;
/// Longitude bound accepted by the form
pub const MAX_LONGITUDE: f64 = 180.0;

/// Animation timing for the header gradient seam.
pub const LOADING_ANIM_TICK_MS: u64 = 15;
pub const LOADING_ANIM_CYCLE_TICKS: u32 = 60;

// ============================================================================
// Coordinates
// ============================================================================

/// A validated geographic coordinate
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CoordinateError {
    #[error("{field} is not a number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("{field} must be between -{max} and {max}")]
    OutOfRange { field: &'static str, max: f64 },
}

impl Coordinate {
    /// Parse the raw text of the latitude and longitude inputs.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self, CoordinateError> {
        Ok(Self {
            latitude: parse_bounded("Latitude", latitude, MAX_LATITUDE)?,
            longitude: parse_bounded("Longitude", longitude, MAX_LONGITUDE)?,
        })
    }
}

fn parse_bounded(field: &'static str, text: &str, max: f64) -> Result<f64, CoordinateError> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| CoordinateError::InvalidNumber {
            field,
            value: text.to_string(),
        })?;
    if !value.is_finite() || value.abs() > max {
        return Err(CoordinateError::OutOfRange { field, max });
    }
    Ok(value)
}

// ============================================================================
// City search
// ============================================================================

/// A place returned by the geocoding API
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CityCandidate {
    pub id: u64,
    pub name: String,
    pub admin1: Option<String>,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl CityCandidate {
    /// Line shown in the autocomplete list: "name, region, country"
    pub fn label(&self) -> String {
        let mut label = self.name.clone();
        for part in [&self.admin1, &self.country].into_iter().flatten() {
            label.push_str(", ");
            label.push_str(part);
        }
        label
    }

    /// Text placed in the city field once the candidate is chosen
    pub fn display_name(&self) -> String {
        match &self.country {
            Some(country) => format!("{}, {}", self.name, country),
            None => self.name.clone(),
        }
    }
}

// ============================================================================
// Favourites
// ============================================================================

/// A saved location, shown as "lat, lon[, city]"
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Favourite {
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
}

impl Favourite {
    pub fn new(coordinate: Coordinate, city: Option<String>) -> Self {
        Self {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            city,
        }
    }
}

impl fmt::Display for Favourite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)?;
        if let Some(city) = &self.city {
            write!(f, ", {}", city)?;
        }
        Ok(())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FavouriteParseError {
    #[error("expected \"latitude, longitude[, city]\", got {0:?}")]
    MissingLongitude(String),
    #[error(transparent)]
    Coordinate(#[from] CoordinateError),
}

impl FromStr for Favourite {
    type Err = FavouriteParseError;

    /// Only the first two commas separate fields; the rest belongs to the city.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ',');
        let latitude = parts.next().unwrap_or_default();
        let longitude = parts
            .next()
            .ok_or_else(|| FavouriteParseError::MissingLongitude(s.to_string()))?;
        let city = parts
            .next()
            .map(str::trim)
            .filter(|city| !city.is_empty())
            .map(str::to_string);

        let coordinate = Coordinate::parse(latitude, longitude)?;
        Ok(Favourite::new(coordinate, city))
    }
}

// ============================================================================
// Weather
// ============================================================================

/// Forecast API response, kept as-is
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeatherSnapshot {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub current_weather: CurrentWeather,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub weathercode: u8,
    /// ISO 8601 local time, e.g. "2024-05-01T14:00"
    pub time: String,
}

impl CurrentWeather {
    /// Split the timestamp into its date and time parts at the first "T".
    pub fn date_and_time(&self) -> (&str, &str) {
        self.time.split_once('T').unwrap_or((self.time.as_str(), ""))
    }
}

// ============================================================================
// Form focus
// ============================================================================

/// Which form field receives keyboard input
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum FormField {
    #[default]
    Latitude,
    Longitude,
    City,
    Favourites,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::Latitude,
        FormField::Longitude,
        FormField::City,
        FormField::Favourites,
    ];

    pub fn next(self) -> Self {
        match self {
            FormField::Latitude => FormField::Longitude,
            FormField::Longitude => FormField::City,
            FormField::City => FormField::Favourites,
            FormField::Favourites => FormField::Latitude,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormField::Latitude => FormField::Favourites,
            FormField::Longitude => FormField::Latitude,
            FormField::City => FormField::Longitude,
            FormField::Favourites => FormField::City,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::Latitude => "Latitude",
            FormField::Longitude => "Longitude",
            FormField::City => "City",
            FormField::Favourites => "Favourites",
        }
    }
}

// ============================================================================
// AppState
// ============================================================================

/// Initial values for a fresh form
#[derive(Clone, Debug, Default)]
pub struct FormSeed {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub favourites: Vec<Favourite>,
}

/// Application state - everything the UI needs to render
#[derive(Clone, Debug, tui_dispatch::DebugState, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppState {
    // --- Form inputs ---
    /// Latitude text exactly as typed
    #[debug(section = "Form", label = "Latitude")]
    pub latitude: String,

    /// Longitude text exactly as typed
    #[debug(section = "Form", label = "Longitude")]
    pub longitude: String,

    /// City query, or "name, country" once a candidate is chosen
    #[debug(section = "Form", label = "City")]
    pub city: String,

    #[debug(section = "Form", label = "Focus", debug_fmt)]
    pub focus: FormField,

    /// Last validation error from submit / add favourite
    #[debug(section = "Form", label = "Error", debug_fmt)]
    pub form_error: Option<String>,

    // --- City search ---
    #[debug(section = "Search", label = "Candidates", debug_fmt)]
    pub candidates: Vec<CityCandidate>,

    #[debug(skip)]
    pub candidate_selected: usize,

    #[debug(section = "Search", label = "Error", debug_fmt)]
    pub search_error: Option<String>,

    // --- Favourites ---
    #[debug(section = "Favourites", label = "Saved", debug_fmt)]
    pub favourites: Vec<Favourite>,

    #[debug(skip)]
    pub favourite_selected: usize,

    // --- Weather ---
    /// Latest successful forecast; never cleared once set
    #[debug(section = "Weather", label = "Snapshot", debug_fmt)]
    pub weather: Option<WeatherSnapshot>,

    #[debug(section = "Weather", label = "Fetching")]
    pub is_fetching: bool,

    #[debug(section = "Weather", label = "Error", debug_fmt)]
    pub fetch_error: Option<String>,

    /// Coordinate of the most recent submit, used by periodic refresh
    #[debug(section = "Weather", label = "Last submit", debug_fmt)]
    pub last_coordinate: Option<Coordinate>,

    // --- Animation internals (skipped) ---
    #[debug(skip)]
    pub tick_count: u32,

    /// Remaining ticks to finish the current animation cycle after loading
    #[debug(skip)]
    pub loading_anim_ticks_remaining: u32,
}

impl AppState {
    pub fn new(seed: FormSeed) -> Self {
        Self {
            latitude: seed.latitude.unwrap_or(0.0).to_string(),
            longitude: seed.longitude.unwrap_or(0.0).to_string(),
            city: String::new(),
            focus: FormField::default(),
            form_error: None,
            candidates: Vec::new(),
            candidate_selected: 0,
            search_error: None,
            favourites: seed.favourites,
            favourite_selected: 0,
            weather: None,
            is_fetching: false,
            fetch_error: None,
            last_coordinate: None,
            tick_count: 0,
            loading_anim_ticks_remaining: 0,
        }
    }

    /// City text if the user entered one
    pub fn city_label(&self) -> Option<&str> {
        let city = self.city.as_str();
        (!city.is_empty()).then_some(city)
    }

    pub fn loading_anim_active(&self) -> bool {
        self.is_fetching || self.loading_anim_ticks_remaining > 0
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(FormSeed::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_coordinate_parse_trims_and_validates() {
        let coordinate = Coordinate::parse(" 51.5074", "-0.1278 ").unwrap();
        assert_eq!(coordinate.latitude, 51.5074);
        assert_eq!(coordinate.longitude, -0.1278);

        assert!(matches!(
            Coordinate::parse("abc", "0"),
            Err(CoordinateError::InvalidNumber { field: "Latitude", .. })
        ));
        assert!(matches!(
            Coordinate::parse("90.5", "0"),
            Err(CoordinateError::OutOfRange { field: "Latitude", .. })
        ));
        assert!(matches!(
            Coordinate::parse("0", "-180.01"),
            Err(CoordinateError::OutOfRange { field: "Longitude", .. })
        ));
        assert!(Coordinate::parse("-90", "180").is_ok());
    }

    #[test]
    fn test_favourite_display() {
        let favourite = Favourite {
            latitude: 51.5074,
            longitude: -0.1278,
            city: Some("London, United Kingdom".into()),
        };
        assert_eq!(
            favourite.to_string(),
            "51.5074, -0.1278, London, United Kingdom"
        );

        let bare = Favourite {
            latitude: 0.0,
            longitude: 12.5,
            city: None,
        };
        assert_eq!(bare.to_string(), "0, 12.5");
    }

    #[test]
    fn test_favourite_parse_keeps_commas_in_city() {
        let favourite: Favourite = "51.5074, -0.1278, London, United Kingdom".parse().unwrap();
        assert_eq!(favourite.latitude, 51.5074);
        assert_eq!(favourite.longitude, -0.1278);
        assert_eq!(favourite.city.as_deref(), Some("London, United Kingdom"));
    }

    #[test]
    fn test_favourite_parse_without_city() {
        let favourite: Favourite = "10, 20".parse().unwrap();
        assert_eq!(favourite.city, None);

        let favourite: Favourite = "10, 20,  ".parse().unwrap();
        assert_eq!(favourite.city, None);

        assert!(matches!(
            "10".parse::<Favourite>(),
            Err(FavouriteParseError::MissingLongitude(_))
        ));
        assert!(matches!(
            "100, 20".parse::<Favourite>(),
            Err(FavouriteParseError::Coordinate(_))
        ));
    }

    #[test]
    fn test_candidate_labels() {
        let mut candidate = CityCandidate {
            id: 2643743,
            name: "London".into(),
            admin1: Some("England".into()),
            country: Some("United Kingdom".into()),
            latitude: 51.50853,
            longitude: -0.12574,
        };
        assert_eq!(candidate.label(), "London, England, United Kingdom");
        assert_eq!(candidate.display_name(), "London, United Kingdom");

        candidate.admin1 = None;
        candidate.country = None;
        assert_eq!(candidate.label(), "London");
        assert_eq!(candidate.display_name(), "London");
    }

    #[test]
    fn test_date_and_time_split() {
        let current = CurrentWeather {
            temperature: 12.0,
            weathercode: 0,
            time: "2024-05-01T14:00".into(),
        };
        assert_eq!(current.date_and_time(), ("2024-05-01", "14:00"));

        let no_separator = CurrentWeather {
            time: "2024-05-01".into(),
            ..current
        };
        assert_eq!(no_separator.date_and_time(), ("2024-05-01", ""));
    }

    #[test]
    fn test_focus_cycles() {
        for field in FormField::ALL {
            assert_eq!(field.next().prev(), field);
        }
        assert_eq!(FormField::Favourites.next(), FormField::Latitude);
    }
}
