//! Display glyphs and labels for raw weather fields.

/// Glyph shown for descriptions the table does not know.
pub const GENERIC_GLYPH: &str = "🌡️";

const DESCRIPTION_GLYPHS: &[(&str, &str)] = &[
    ("clear sky", "☀️"),
    ("few clouds", "🌤️"),
    ("scattered clouds", "⛅"),
    ("broken clouds", "☁️"),
    ("shower rain", "🌦️"),
    ("rain", "🌧️"),
    ("thunderstorm", "⛈️"),
    ("snow", "🌨️"),
    ("mist", "🌫️"),
    ("haze", "🌫️"),
    ("fog", "🌫️"),
    ("smoke", "🌫️"),
    ("dust", "💨"),
    ("sand", "💨"),
    ("drizzle", "🌧️"),
];

const COMPASS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

pub fn emoji_for_description(description: &str) -> &'static str {
    let lower = description.to_lowercase();

    DESCRIPTION_GLYPHS
        .iter()
        .find(|(phrase, _)| *phrase == lower)
        .map(|(_, glyph)| *glyph)
        .unwrap_or(GENERIC_GLYPH)
}

/// 16-point compass label, clockwise from North in 22.5° sectors.
pub fn wind_direction_label(degrees: f64) -> &'static str {
    let index = ((degrees / 22.5).round() as i64).rem_euclid(16);
    COMPASS[index as usize]
}

pub fn wind_emoji(speed_ms: f64) -> &'static str {
    if speed_ms < 1.0 {
        "🌫️"
    } else if speed_ms < 5.0 {
        "🌬️"
    } else if speed_ms < 10.0 {
        "💨"
    } else {
        "🌪️"
    }
}
