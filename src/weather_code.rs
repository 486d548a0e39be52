//! WMO weather code descriptions

use std::collections::HashMap;
use std::sync::OnceLock;

/// Code groups as published by Open-Meteo, one phrase per group
const WEATHER_CODE_GROUPS: &[(&[u8], &str)] = &[
    (&[0], "Clear sky"),
    (&[1, 2, 3], "Mainly clear, partly cloudy, and overcast"),
    (&[45, 48], "Fog and depositing rime fog"),
    (&[51, 53, 55], "Drizzle: Light, moderate, and dense intensity"),
    (&[56, 57], "Freezing Drizzle: Light and dense intensity"),
    (&[61, 63, 65], "Rain: Slight, moderate and heavy intensity"),
    (&[66, 67], "Freezing Rain: Light and heavy intensity"),
    (&[71, 73, 75], "Snow fall: Slight, moderate, and heavy intensity"),
    (&[77], "Snow grains"),
    (&[80, 81, 82], "Rain showers: Slight, moderate, and violent"),
    (&[85, 86], "Snow showers slight and heavy"),
    (&[95], "Thunderstorm: Slight or moderate"),
    (&[96, 99], "Thunderstorm with slight and heavy hail"),
];

fn table() -> &'static HashMap<u8, &'static str> {
    static TABLE: OnceLock<HashMap<u8, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| {
        WEATHER_CODE_GROUPS
            .iter()
            .flat_map(|(codes, text)| codes.iter().map(move |code| (*code, *text)))
            .collect()
    })
}

/// Human-readable phrase for a weather code, `None` when unmapped
pub fn describe(code: u8) -> Option<&'static str> {
    table().get(&code).copied()
}
