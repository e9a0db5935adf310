//! Categorical Simplification
//!
//! Weather strings collapse into six coarse classes; wind direction maps to
//! one of the compass categories seen in training.

use serde::Serialize;

use crate::schema::Feature;

/// Simplified weather class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WeatherCategory {
    SnowIce,
    Storm,
    Rain,
    FogObscured,
    Cloudy,
    /// Baseline category, encoded as all-zero
    Clear,
}

impl WeatherCategory {
    /// Label used in the training data
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCategory::SnowIce => "Snow/Ice",
            WeatherCategory::Storm => "Storm",
            WeatherCategory::Rain => "Rain",
            WeatherCategory::FogObscured => "Fog/Obscured",
            WeatherCategory::Cloudy => "Cloudy",
            WeatherCategory::Clear => "Clear",
        }
    }

    /// One-hot column for this category, `None` for the baseline
    pub fn column(&self) -> Option<Feature> {
        match self {
            WeatherCategory::SnowIce => Some(Feature::WeatherSnowIce),
            WeatherCategory::Storm => Some(Feature::WeatherStorm),
            WeatherCategory::Rain => Some(Feature::WeatherRain),
            WeatherCategory::FogObscured => Some(Feature::WeatherFogObscured),
            WeatherCategory::Cloudy => Some(Feature::WeatherCloudy),
            WeatherCategory::Clear => None,
        }
    }
}

/// Weather one-hot columns (drop-first; Clear has none)
pub const WEATHER_COLUMNS: [Feature; 5] = [
    Feature::WeatherCloudy,
    Feature::WeatherFogObscured,
    Feature::WeatherRain,
    Feature::WeatherSnowIce,
    Feature::WeatherStorm,
];

/// A substring rule: any needle present selects the category
#[derive(Debug, Clone, Copy)]
pub struct WeatherRule {
    pub category: WeatherCategory,
    pub needles: &'static [&'static str],
}

/// Evaluated top to bottom, first match wins
pub const WEATHER_RULES: [WeatherRule; 5] = [
    WeatherRule {
        category: WeatherCategory::SnowIce,
        needles: &["snow", "sleet", "ice", "freezing", "wintry", "hail"],
    },
    WeatherRule {
        category: WeatherCategory::Storm,
        needles: &["thunder", "t-storm", "tornado", "squall"],
    },
    WeatherRule {
        category: WeatherCategory::Rain,
        needles: &["rain", "drizzle", "shower"],
    },
    WeatherRule {
        category: WeatherCategory::FogObscured,
        needles: &["fog", "mist", "haze", "smoke", "dust", "sand"],
    },
    WeatherRule {
        category: WeatherCategory::Cloudy,
        needles: &["cloudy", "overcast"],
    },
];

/// Classify a raw weather condition string
pub fn simplify_weather(condition: &str) -> WeatherCategory {
    let condition = condition.to_lowercase();
    WEATHER_RULES
        .iter()
        .find(|rule| rule.needles.iter().any(|needle| condition.contains(needle)))
        .map(|rule| rule.category)
        .unwrap_or(WeatherCategory::Clear)
}

/// Wind direction categories with a one-hot column.
///
/// `CALM` was the drop-first baseline, so it has no column and lands in the
/// same all-zero encoding as unrecognised values.
pub const WIND_DIRECTIONS: [(&str, Feature); 17] = [
    ("E", Feature::WindDirectionE),
    ("ENE", Feature::WindDirectionEne),
    ("ESE", Feature::WindDirectionEse),
    ("N", Feature::WindDirectionN),
    ("NE", Feature::WindDirectionNe),
    ("NNE", Feature::WindDirectionNne),
    ("NNW", Feature::WindDirectionNnw),
    ("NW", Feature::WindDirectionNw),
    ("S", Feature::WindDirectionS),
    ("SE", Feature::WindDirectionSe),
    ("SSE", Feature::WindDirectionSse),
    ("SSW", Feature::WindDirectionSsw),
    ("SW", Feature::WindDirectionSw),
    ("VAR", Feature::WindDirectionVar),
    ("W", Feature::WindDirectionW),
    ("WNW", Feature::WindDirectionWnw),
    ("WSW", Feature::WindDirectionWsw),
];

/// Exact, case-insensitive lookup of a wind direction column
pub fn wind_direction_column(direction: &str) -> Option<Feature> {
    WIND_DIRECTIONS
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(direction))
        .map(|(_, feature)| *feature)
}
