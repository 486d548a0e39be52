pub mod location_form;
pub mod title_header;
pub mod weather_report;
pub mod weather_summary;

// Re-export core Component trait
pub use tui_dispatch::Component;

pub use location_form::{LocationForm, LocationFormProps};
pub use title_header::{TITLE, TitleHeader, TitleHeaderProps};
pub use weather_report::{WeatherReport, WeatherReportProps};
pub use weather_summary::{EMPTY_HINT, ERROR_ICON, WeatherSummary, WeatherSummaryProps, summary_lines};
