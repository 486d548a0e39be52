use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::Component;
use crate::action::Action;
use crate::state::WeatherSnapshot;
use crate::weather_code;

pub const ERROR_ICON: &str = "\u{26a0}\u{fe0f}";
pub const EMPTY_HINT: &str = "Please enter the Latitude and Longitude of your location";

/// Read-only view of the latest forecast
pub struct WeatherSummary;

pub struct WeatherSummaryProps<'a> {
    pub weather: Option<&'a WeatherSnapshot>,
    pub is_fetching: bool,
    pub error: Option<&'a str>,
}

/// The four text rows shown for a snapshot. The description row is blank
/// for codes missing from the table.
pub fn summary_lines(snapshot: &WeatherSnapshot) -> [String; 4] {
    let current = &snapshot.current_weather;
    let (date, time) = current.date_and_time();
    [
        format!(
            "Your location is: Latitude = {}, Longitude = {}",
            snapshot.latitude, snapshot.longitude
        ),
        format!("Local time: {}, {} ({})", date, time, snapshot.timezone),
        format!("Current temperature: {}°C", current.temperature),
        weather_code::describe(current.weathercode)
            .unwrap_or_default()
            .to_string(),
    ]
}

impl Component<Action> for WeatherSummary {
    type Props<'a> = WeatherSummaryProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let mut lines: Vec<Line> = match props.weather {
            Some(snapshot) => summary_lines(snapshot)
                .into_iter()
                .map(|text| Line::from(Span::styled(text, Style::default().fg(Color::Gray))))
                .collect(),
            None => vec![Line::from(Span::styled(
                EMPTY_HINT,
                Style::default().fg(Color::DarkGray),
            ))],
        };

        if props.is_fetching {
            lines.push(Line::from(Span::styled(
                "Fetching weather...",
                Style::default().fg(Color::DarkGray).italic(),
            )));
        }

        if let Some(error) = props.error {
            lines.push(Line::from(vec![
                Span::raw(format!("{} ", ERROR_ICON)),
                Span::styled("Error: ", Style::default().fg(Color::Red).bold()),
                Span::styled(error.to_string(), Style::default().fg(Color::Rgb(200, 100, 100))),
            ]));
        }

        frame.render_widget(Paragraph::new(lines), area);
    }
}
