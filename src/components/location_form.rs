use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    BaseStyle, Padding, ScrollbarStyle, SelectList, SelectListBehavior, SelectListProps,
    SelectListStyle, SelectionStyle, TextInput, TextInputProps, TextInputStyle,
    highlight_substring,
};

use super::Component;
use crate::action::Action;
use crate::state::{AppState, FormField};

/// Rows of the candidate dropdown
pub const CANDIDATE_ROWS: u16 = 5;
/// Rows of the favourites list
pub const FAVOURITE_ROWS: u16 = 4;

const INPUT_BG: Color = Color::Rgb(50, 50, 60);
const LABEL_DIM: Color = Color::DarkGray;
const LABEL_FOCUSED: Color = Color::Cyan;

/// Latitude, longitude, city search and favourites
#[derive(Default)]
pub struct LocationForm {
    latitude_input: FieldInput,
    longitude_input: FieldInput,
    city_input: FieldInput,
    candidate_list: SelectList,
    favourite_list: SelectList,
}

pub struct LocationFormProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

/// A `TextInput` plus the value it last saw. A value rewritten elsewhere
/// (confirming a city or favourite) rebuilds the input with the cursor at the end.
#[derive(Default)]
struct FieldInput {
    input: TextInput,
    value: String,
}

impl FieldInput {
    fn sync(&mut self, value: &str, on_change: fn(String) -> Action) {
        if self.value == value {
            return;
        }
        self.input = TextInput::new();
        let end = EventKind::Key(KeyEvent::new(KeyCode::End, KeyModifiers::NONE));
        let _ = self.input.handle_event(
            &end,
            LocationForm::text_input_props(value, "", true, on_change),
        );
        self.value = value.to_string();
    }

    fn handle_event(
        &mut self,
        event: &EventKind,
        value: &str,
        placeholder: &str,
        on_change: fn(String) -> Action,
    ) -> Vec<Action> {
        self.sync(value, on_change);
        let actions: Vec<Action> = self
            .input
            .handle_event(
                event,
                LocationForm::text_input_props(value, placeholder, true, on_change),
            )
            .into_iter()
            .collect();
        if let Some(edited) = actions.iter().find_map(edited_text) {
            self.value = edited.to_string();
        }
        actions
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        value: &str,
        placeholder: &str,
        is_focused: bool,
        on_change: fn(String) -> Action,
    ) {
        self.sync(value, on_change);
        self.input.render(
            frame,
            area,
            LocationForm::text_input_props(value, placeholder, is_focused, on_change),
        );
    }
}

fn edited_text(action: &Action) -> Option<&str> {
    match action {
        Action::FormLatitudeChange(text)
        | Action::FormLongitudeChange(text)
        | Action::CityQueryChange(text) => Some(text),
        _ => None,
    }
}

impl LocationForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Height the form needs for the given state
    pub fn height(state: &AppState) -> u16 {
        // label + input for the three text fields, label + list for favourites, error row
        let candidates = if show_candidates(state) {
            CANDIDATE_ROWS
        } else {
            0
        };
        2 * 3 + candidates + 1 + FAVOURITE_ROWS + 1
    }
}

fn show_candidates(state: &AppState) -> bool {
    state.focus == FormField::City && !state.candidates.is_empty()
}

fn submit_form(_: String) -> Action {
    Action::FormSubmit
}

fn ui_render(_: usize) -> Action {
    Action::Render
}

fn render_line(item: &Line<'static>) -> Line<'static> {
    item.clone()
}

fn input_style(is_focused: bool) -> TextInputStyle {
    TextInputStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: Some(if is_focused { INPUT_BG } else { Color::Rgb(35, 35, 45) }),
            fg: None,
        },
        placeholder_style: Some(Style::default().fg(LABEL_DIM)),
        cursor_style: None,
    }
}

fn list_style() -> SelectListStyle {
    SelectListStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: None,
            fg: None,
        },
        selection: SelectionStyle::default(),
        scrollbar: ScrollbarStyle::default(),
    }
}

fn list_behavior() -> SelectListBehavior {
    SelectListBehavior {
        show_scrollbar: false,
        wrap_navigation: true,
    }
}

fn candidate_items(state: &AppState) -> Vec<Line<'static>> {
    let base = Style::default().fg(Color::Reset);
    let highlight = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    state
        .candidates
        .iter()
        .map(|candidate| highlight_substring(&candidate.label(), &state.city, base, highlight))
        .collect()
}

fn favourite_items(state: &AppState) -> Vec<Line<'static>> {
    state
        .favourites
        .iter()
        .map(|favourite| Line::from(favourite.to_string()))
        .collect()
}

fn field_label(field: FormField, focus: FormField, suffix: Option<&str>) -> Line<'static> {
    let color = if field == focus {
        LABEL_FOCUSED
    } else {
        LABEL_DIM
    };
    let mut spans = vec![Span::styled(
        field.label().to_string(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )];
    if let Some(suffix) = suffix {
        spans.push(Span::styled(
            format!("  {}", suffix),
            Style::default().fg(LABEL_DIM),
        ));
    }
    Line::from(spans)
}

impl LocationForm {
    fn text_input_props<'a>(
        value: &'a str,
        placeholder: &'a str,
        is_focused: bool,
        on_change: fn(String) -> Action,
    ) -> TextInputProps<'a, Action> {
        TextInputProps {
            value,
            placeholder,
            is_focused,
            style: input_style(is_focused),
            on_change,
            on_submit: submit_form,
            on_cursor_move: Some(ui_render),
        }
    }

    fn handle_list_event(
        list: &mut SelectList,
        event: &EventKind,
        items: &[Line<'static>],
        selected: usize,
        on_select: fn(usize) -> Action,
    ) -> Vec<Action> {
        if items.is_empty() {
            return Vec::new();
        }
        let props = SelectListProps {
            items,
            count: items.len(),
            selected,
            is_focused: true,
            style: list_style(),
            behavior: list_behavior(),
            on_select,
            render_item: &render_line,
        };
        list.handle_event(event, props).into_iter().collect()
    }
}

impl Component<Action> for LocationForm {
    type Props<'a> = LocationFormProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return Vec::new();
        }

        let EventKind::Key(key) = event else {
            return Vec::new();
        };

        // Form-wide keys
        match key.code {
            KeyCode::Esc => return vec![Action::Quit],
            KeyCode::Tab => return vec![Action::FormFocusNext],
            KeyCode::BackTab => return vec![Action::FormFocusPrev],
            KeyCode::F(2) => return vec![Action::FavouriteAdd],
            KeyCode::F(5) => return vec![Action::FormSubmit],
            _ => {}
        }

        let state = props.state;
        if key.code == KeyCode::Enter {
            return match state.focus {
                FormField::City if !state.candidates.is_empty() => vec![Action::CityConfirm],
                FormField::Favourites if state.favourites.is_empty() => Vec::new(),
                FormField::Favourites => vec![Action::FavouriteConfirm],
                _ => vec![Action::FormSubmit],
            };
        }

        match state.focus {
            FormField::Latitude => self.latitude_input.handle_event(
                event,
                &state.latitude,
                "0",
                Action::FormLatitudeChange,
            ),
            FormField::Longitude => self.longitude_input.handle_event(
                event,
                &state.longitude,
                "0",
                Action::FormLongitudeChange,
            ),
            FormField::City => match key.code {
                KeyCode::Up | KeyCode::Down => Self::handle_list_event(
                    &mut self.candidate_list,
                    event,
                    &candidate_items(state),
                    state.candidate_selected,
                    Action::CitySelect,
                ),
                _ => self.city_input.handle_event(
                    event,
                    &state.city,
                    "Search for a city...",
                    Action::CityQueryChange,
                ),
            },
            FormField::Favourites => match key.code {
                KeyCode::Up | KeyCode::Down => Self::handle_list_event(
                    &mut self.favourite_list,
                    event,
                    &favourite_items(state),
                    state.favourite_selected,
                    Action::FavouriteSelect,
                ),
                _ => Vec::new(),
            },
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let state = props.state;
        let focus = state.focus;
        let candidate_rows = if show_candidates(state) {
            CANDIDATE_ROWS
        } else {
            0
        };

        let chunks = Layout::vertical([
            Constraint::Length(1),              // Latitude label
            Constraint::Length(1),              // Latitude input
            Constraint::Length(1),              // Longitude label
            Constraint::Length(1),              // Longitude input
            Constraint::Length(1),              // City label
            Constraint::Length(1),              // City input
            Constraint::Length(candidate_rows), // Candidates
            Constraint::Length(1),              // Favourites label
            Constraint::Length(FAVOURITE_ROWS), // Favourites list
            Constraint::Length(1),              // Form error
        ])
        .split(area);

        let is_focused = |field: FormField| props.is_focused && focus == field;

        frame.render_widget(
            Paragraph::new(field_label(FormField::Latitude, focus, Some("-90 to 90"))),
            chunks[0],
        );
        self.latitude_input.render(
            frame,
            chunks[1],
            &state.latitude,
            "0",
            is_focused(FormField::Latitude),
            Action::FormLatitudeChange,
        );

        frame.render_widget(
            Paragraph::new(field_label(FormField::Longitude, focus, Some("-180 to 180"))),
            chunks[2],
        );
        self.longitude_input.render(
            frame,
            chunks[3],
            &state.longitude,
            "0",
            is_focused(FormField::Longitude),
            Action::FormLongitudeChange,
        );

        frame.render_widget(
            Paragraph::new(field_label(
                FormField::City,
                focus,
                state.search_error.as_deref(),
            )),
            chunks[4],
        );
        self.city_input.render(
            frame,
            chunks[5],
            &state.city,
            "Search for a city...",
            is_focused(FormField::City),
            Action::CityQueryChange,
        );

        if candidate_rows > 0 {
            let items = candidate_items(state);
            let list_props = SelectListProps {
                items: &items,
                count: items.len(),
                selected: state.candidate_selected,
                is_focused: is_focused(FormField::City),
                style: list_style(),
                behavior: list_behavior(),
                on_select: Action::CitySelect,
                render_item: &render_line,
            };
            self.candidate_list.render(frame, chunks[6], list_props);
        }

        frame.render_widget(
            Paragraph::new(field_label(FormField::Favourites, focus, Some("F2 to add"))),
            chunks[7],
        );
        if state.favourites.is_empty() {
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    "  No favourites yet",
                    Style::default().fg(LABEL_DIM),
                ))),
                chunks[8],
            );
        } else {
            let items = favourite_items(state);
            let list_props = SelectListProps {
                items: &items,
                count: items.len(),
                selected: state.favourite_selected,
                is_focused: is_focused(FormField::Favourites),
                style: list_style(),
                behavior: list_behavior(),
                on_select: Action::FavouriteSelect,
                render_item: &render_line,
            };
            self.favourite_list.render(frame, chunks[8], list_props);
        }

        if let Some(error) = &state.form_error {
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    error.clone(),
                    Style::default().fg(Color::Red),
                ))),
                chunks[9],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducer::reducer;
    use crate::state::{CityCandidate, Favourite};
    use tui_dispatch::testing::*;

    fn props(state: &AppState) -> LocationFormProps<'_> {
        LocationFormProps {
            state,
            is_focused: true,
        }
    }

    fn london() -> CityCandidate {
        CityCandidate {
            id: 2643743,
            name: "London".into(),
            admin1: Some("England".into()),
            country: Some("United Kingdom".into()),
            latitude: 51.50853,
            longitude: -0.12574,
        }
    }

    fn zurich() -> CityCandidate {
        CityCandidate {
            id: 2657896,
            name: "Zürich".into(),
            admin1: Some("Zurich".into()),
            country: Some("Switzerland".into()),
            latitude: 47.36667,
            longitude: 8.55,
        }
    }

    fn send(form: &mut LocationForm, state: &AppState, k: &str) -> Vec<Action> {
        form.handle_event(&EventKind::Key(key(k)), props(state))
            .into_iter()
            .collect()
    }

    /// Send keys and feed the resulting actions through the reducer
    fn type_keys(form: &mut LocationForm, state: &mut AppState, keys: &[&str]) {
        for k in keys {
            for action in send(form, state, k) {
                reducer(state, action);
            }
        }
    }

    #[test]
    fn test_global_keys() {
        let mut form = LocationForm::new();
        let state = AppState::default();

        send(&mut form, &state, "tab").assert_first(Action::FormFocusNext);
        send(&mut form, &state, "shift+tab").assert_first(Action::FormFocusPrev);
        send(&mut form, &state, "f2").assert_first(Action::FavouriteAdd);
        send(&mut form, &state, "f5").assert_first(Action::FormSubmit);
        send(&mut form, &state, "esc").assert_first(Action::Quit);
    }

    #[test]
    fn test_unfocused_ignores_keys() {
        let mut form = LocationForm::new();
        let state = AppState::default();

        let actions: Vec<_> = form
            .handle_event(
                &EventKind::Key(key("tab")),
                LocationFormProps {
                    state: &state,
                    is_focused: false,
                },
            )
            .into_iter()
            .collect();
        actions.assert_empty();
    }

    #[test]
    fn test_typing_in_city_field_changes_query() {
        let mut form = LocationForm::new();
        let state = AppState {
            focus: FormField::City,
            ..Default::default()
        };

        let actions = send(&mut form, &state, "l");
        actions.assert_first(Action::CityQueryChange("l".into()));
    }

    #[test]
    fn test_enter_in_city_field() {
        let mut form = LocationForm::new();
        let mut state = AppState {
            focus: FormField::City,
            candidates: vec![london()],
            ..Default::default()
        };

        send(&mut form, &state, "enter").assert_first(Action::CityConfirm);

        state.candidates.clear();
        send(&mut form, &state, "enter").assert_first(Action::FormSubmit);
    }

    #[test]
    fn test_favourites_field_navigation() {
        let mut form = LocationForm::new();
        let state = AppState {
            focus: FormField::Favourites,
            favourites: vec![
                Favourite {
                    latitude: 1.0,
                    longitude: 2.0,
                    city: None,
                },
                Favourite {
                    latitude: 3.0,
                    longitude: 4.0,
                    city: None,
                },
            ],
            ..Default::default()
        };

        let actions = send(&mut form, &state, "down");
        tui_dispatch::assert_emitted!(actions, Action::FavouriteSelect(_));

        send(&mut form, &state, "enter").assert_first(Action::FavouriteConfirm);
        send(&mut form, &state, "x").assert_empty();
    }

    #[test]
    fn test_render_shows_fields_and_favourites() {
        let mut render = RenderHarness::new(60, 20);
        let mut form = LocationForm::new();
        let state = AppState {
            favourites: vec!["51.5074, -0.1278, London, United Kingdom".parse().unwrap()],
            form_error: Some("Latitude must be between -90 and 90".into()),
            ..Default::default()
        };

        let output = render.render_to_string_plain(|frame| {
            form.render(frame, frame.area(), props(&state));
        });

        assert!(output.contains("Latitude"));
        assert!(output.contains("Longitude"));
        assert!(output.contains("City"));
        assert!(output.contains("51.5074, -0.1278, London, United Kingdom"));
        assert!(output.contains("must be between"));
    }

    #[test]
    fn test_render_candidates_only_when_city_focused() {
        let mut render = RenderHarness::new(60, 24);
        let mut form = LocationForm::new();
        let mut state = AppState {
            city: "Lon".into(),
            candidates: vec![london()],
            ..Default::default()
        };

        let output = render.render_to_string_plain(|frame| {
            form.render(frame, frame.area(), props(&state));
        });
        assert!(!output.contains("England"));

        state.focus = FormField::City;
        let output = render.render_to_string_plain(|frame| {
            form.render(frame, frame.area(), props(&state));
        });
        assert!(output.contains("London, England, United Kingdom"));
    }

    #[test]
    fn test_typing_after_confirming_non_ascii_city() {
        let mut form = LocationForm::new();
        let mut state = AppState {
            focus: FormField::City,
            ..Default::default()
        };

        type_keys(&mut form, &mut state, &["z", "u"]);
        assert_eq!(state.city, "zu");

        reducer(
            &mut state,
            Action::CitySearchDidLoad {
                query: "zu".into(),
                results: vec![zurich()],
            },
        );
        reducer(&mut state, Action::CityConfirm);
        assert_eq!(state.city, "Zürich, Switzerland");

        send(&mut form, &state, "x").assert_first(Action::CityQueryChange(
            "Zürich, Switzerlandx".into(),
        ));
    }

    #[test]
    fn test_typing_after_confirm_appends_to_new_text() {
        let mut form = LocationForm::new();
        let mut state = AppState {
            focus: FormField::City,
            ..Default::default()
        };

        type_keys(&mut form, &mut state, &["l", "o", "n"]);
        reducer(
            &mut state,
            Action::CitySearchDidLoad {
                query: "lon".into(),
                results: vec![london()],
            },
        );
        type_keys(&mut form, &mut state, &["enter", "backspace"]);

        assert_eq!(state.city, "London, United Kingdo");
    }

    #[test]
    fn test_favourite_restore_moves_coordinate_cursor_to_end() {
        let mut form = LocationForm::new();
        let mut state = AppState {
            favourites: vec!["51.5074, -0.1278".parse().unwrap()],
            ..Default::default()
        };

        type_keys(&mut form, &mut state, &["backspace", "4"]);
        assert_eq!(state.latitude, "4");

        reducer(&mut state, Action::FavouriteConfirm);
        type_keys(&mut form, &mut state, &["9"]);

        assert_eq!(state.latitude, "51.50749");
    }
}
