//! Actions - everything that can happen to the form

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::{CityCandidate, WeatherSnapshot};

/// Application actions with automatic category inference
#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[action(infer_categories)]
pub enum Action {
    // ===== Form category =====
    /// Latitude input text changed
    FormLatitudeChange(String),

    /// Longitude input text changed
    FormLongitudeChange(String),

    /// Move keyboard focus to the next field
    FormFocusNext,

    /// Move keyboard focus to the previous field
    FormFocusPrev,

    /// Intent: validate coordinates and fetch the forecast
    FormSubmit,

    // ===== City category =====
    /// City query text changed (debounced search)
    CityQueryChange(String),

    /// Result: candidates found for `query`
    CitySearchDidLoad {
        query: String,
        results: Vec<CityCandidate>,
    },

    /// Result: search for `query` failed
    CitySearchDidError { query: String, error: String },

    /// Highlight a candidate (by index)
    CitySelect(usize),

    /// Apply the highlighted candidate to the form
    CityConfirm,

    // ===== Favourite category =====
    /// Save the current location
    FavouriteAdd,

    /// Highlight a favourite (by index)
    FavouriteSelect(usize),

    /// Restore the highlighted favourite into the form
    FavouriteConfirm,

    // ===== Weather category =====
    /// Re-fetch the last submitted coordinate
    WeatherRefresh,

    /// Result: forecast loaded
    WeatherDidLoad(WeatherSnapshot),

    /// Result: forecast request failed
    WeatherDidError(String),

    // ===== Uncategorized (global) =====
    /// Force a re-render (cursor movement, etc.)
    Render,

    /// Periodic tick for the loading animation
    Tick,

    /// Exit the application
    Quit,
}
