//! Reducer - pure function: (state, action) -> DispatchResult

use tui_dispatch::DispatchResult;

use crate::action::Action;
use crate::effect::Effect;
use crate::state::{AppState, Coordinate, Favourite, LOADING_ANIM_CYCLE_TICKS};

/// The reducer handles all state transitions
pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        // ===== Form actions =====
        Action::FormLatitudeChange(value) => {
            state.latitude = value;
            state.form_error = None;
            DispatchResult::changed()
        }

        Action::FormLongitudeChange(value) => {
            state.longitude = value;
            state.form_error = None;
            DispatchResult::changed()
        }

        Action::FormFocusNext => {
            state.focus = state.focus.next();
            DispatchResult::changed()
        }

        Action::FormFocusPrev => {
            state.focus = state.focus.prev();
            DispatchResult::changed()
        }

        Action::FormSubmit => match Coordinate::parse(&state.latitude, &state.longitude) {
            Ok(coordinate) => {
                state.form_error = None;
                start_fetch(state, coordinate)
            }
            Err(e) => {
                state.form_error = Some(e.to_string());
                DispatchResult::changed()
            }
        },

        // ===== City actions =====
        Action::CityQueryChange(query) => {
            state.city = query;
            state.candidate_selected = 0;
            state.search_error = None;
            if state.city.trim().is_empty() {
                state.candidates.clear();
                DispatchResult::changed_with(Effect::CancelCitySearch)
            } else {
                DispatchResult::changed_with(Effect::SearchCities {
                    query: state.city.clone(),
                })
            }
        }

        Action::CitySearchDidLoad { query, results } => {
            if query != state.city {
                return DispatchResult::unchanged();
            }
            state.candidates = results;
            state.candidate_selected = 0;
            state.search_error = None;
            DispatchResult::changed()
        }

        Action::CitySearchDidError { query, error } => {
            if query != state.city {
                return DispatchResult::unchanged();
            }
            state.candidates.clear();
            state.candidate_selected = 0;
            state.search_error = Some(error);
            DispatchResult::changed()
        }

        Action::CitySelect(index) => {
            if index < state.candidates.len() && index != state.candidate_selected {
                state.candidate_selected = index;
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::CityConfirm => {
            let Some(candidate) = state.candidates.get(state.candidate_selected).cloned() else {
                return DispatchResult::unchanged();
            };

            state.latitude = format!("{:.4}", candidate.latitude);
            state.longitude = format!("{:.4}", candidate.longitude);
            state.city = candidate.display_name();
            state.candidates.clear();
            state.candidate_selected = 0;
            state.search_error = None;
            state.form_error = None;
            DispatchResult::changed_with(Effect::CancelCitySearch)
        }

        // ===== Favourite actions =====
        Action::FavouriteAdd => {
            let coordinate = match Coordinate::parse(&state.latitude, &state.longitude) {
                Ok(coordinate) => coordinate,
                Err(e) => {
                    state.form_error = Some(e.to_string());
                    return DispatchResult::changed();
                }
            };
            let favourite = Favourite::new(coordinate, state.city_label().map(str::to_string));
            if state.favourites.contains(&favourite) {
                return DispatchResult::unchanged();
            }
            state.favourites.push(favourite);
            state.form_error = None;
            DispatchResult::changed()
        }

        Action::FavouriteSelect(index) => {
            if index < state.favourites.len() && index != state.favourite_selected {
                state.favourite_selected = index;
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::FavouriteConfirm => {
            let Some(favourite) = state.favourites.get(state.favourite_selected).cloned() else {
                return DispatchResult::unchanged();
            };

            state.latitude = favourite.latitude.to_string();
            state.longitude = favourite.longitude.to_string();
            if let Some(city) = favourite.city {
                state.city = city;
                state.candidates.clear();
                state.candidate_selected = 0;
            }
            state.form_error = None;
            DispatchResult::changed()
        }

        // ===== Weather actions =====
        Action::WeatherRefresh => match state.last_coordinate {
            Some(coordinate) if !state.is_fetching => start_fetch(state, coordinate),
            _ => DispatchResult::unchanged(),
        },

        Action::WeatherDidLoad(snapshot) => {
            state.weather = Some(snapshot);
            state.is_fetching = false;
            state.fetch_error = None;
            state.loading_anim_ticks_remaining = ticks_to_phase_zero(state.tick_count);
            DispatchResult::changed()
        }

        Action::WeatherDidError(error) => {
            state.is_fetching = false;
            state.fetch_error = Some(error);
            state.loading_anim_ticks_remaining = ticks_to_phase_zero(state.tick_count);
            DispatchResult::changed()
        }

        // ===== Global actions =====
        Action::Render => DispatchResult::changed(),

        Action::Tick => {
            if state.loading_anim_active() {
                state.tick_count = state.tick_count.wrapping_add(1);
                if state.loading_anim_ticks_remaining > 0 {
                    state.loading_anim_ticks_remaining -= 1;
                }
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn start_fetch(state: &mut AppState, coordinate: Coordinate) -> DispatchResult<Effect> {
    state.is_fetching = true;
    state.last_coordinate = Some(coordinate);
    state.tick_count = 0;
    state.loading_anim_ticks_remaining = 0;
    DispatchResult::changed_with(Effect::FetchWeather { coordinate })
}

fn ticks_to_phase_zero(tick_count: u32) -> u32 {
    let cycle = LOADING_ANIM_CYCLE_TICKS.max(1);
    if tick_count == 0 {
        return cycle;
    }
    let remainder = tick_count % cycle;
    if remainder == 0 { 0 } else { cycle - remainder }
}
