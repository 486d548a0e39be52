use ratatui::layout::{Constraint, Flex, Layout};
use ratatui::prelude::{Frame, Rect};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    StatusBar, StatusBarHint, StatusBarProps, StatusBarSection, StatusBarStyle,
};

use super::{
    Component, LocationForm, LocationFormProps, TitleHeader, TitleHeaderProps, WeatherSummary,
    WeatherSummaryProps,
};
use crate::action::Action;
use crate::state::AppState;

/// Widest the page grows on large terminals
pub const PAGE_WIDTH: u16 = 72;
/// Rows reserved for the FIGlet title
pub const HEADER_HEIGHT: u16 = 6;

/// Props for WeatherReport - read-only view of state
pub struct WeatherReportProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

/// The whole page: title, form, summary and key hints
#[derive(Default)]
pub struct WeatherReport {
    form: LocationForm,
}

impl WeatherReport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component<Action> for WeatherReport {
    type Props<'a> = WeatherReportProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        self.form.handle_event(
            event,
            LocationFormProps {
                state: props.state,
                is_focused: props.is_focused,
            },
        )
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: WeatherReportProps<'_>) {
        let state = props.state;
        let [page] = Layout::horizontal([Constraint::Max(PAGE_WIDTH)])
            .flex(Flex::Center)
            .areas(area);

        let chunks = Layout::vertical([
            Constraint::Max(HEADER_HEIGHT),                  // Title
            Constraint::Length(1),                           // Spacer
            Constraint::Length(LocationForm::height(state)), // Form
            Constraint::Length(1),                           // Spacer
            Constraint::Min(1),                              // Summary
            Constraint::Length(1),                           // Help bar
        ])
        .split(page);

        let mut header = TitleHeader;
        header.render(
            frame,
            chunks[0],
            TitleHeaderProps {
                temperature: state.weather.as_ref().map(|w| w.current_weather.temperature),
                is_animating: state.loading_anim_active(),
                tick_count: state.tick_count,
            },
        );

        self.form.render(
            frame,
            chunks[2],
            LocationFormProps {
                state,
                is_focused: props.is_focused,
            },
        );

        let mut summary = WeatherSummary;
        summary.render(
            frame,
            chunks[4],
            WeatherSummaryProps {
                weather: state.weather.as_ref(),
                is_fetching: state.is_fetching,
                error: state.fetch_error.as_deref(),
            },
        );

        let mut status_bar = StatusBar::new();
        <StatusBar as Component<Action>>::render(
            &mut status_bar,
            frame,
            chunks[5],
            StatusBarProps {
                left: StatusBarSection::empty(),
                center: StatusBarSection::hints(&[
                    StatusBarHint::new("tab", "next field"),
                    StatusBarHint::new("enter", "submit"),
                    StatusBarHint::new("F2", "favourite"),
                    StatusBarHint::new("esc", "quit"),
                ]),
                right: StatusBarSection::empty(),
                style: StatusBarStyle::default(),
                is_focused: false,
            },
        );
    }
}
