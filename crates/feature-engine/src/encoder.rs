//! Feature Encoder
//!
//! Pure derivations from a raw record: physics, time, text, categorical.

use chrono::{Datelike, Timelike};
use std::f64::consts::PI;

use crate::categorical::{simplify_weather, wind_direction_column, WEATHER_COLUMNS, WIND_DIRECTIONS};
use crate::features::FeatureMap;
use crate::record::RawAccidentRecord;
use crate::schema::Feature;
use crate::text::keyword_flags;

/// Wind chill in °F.
///
/// The NWS formula only applies below 50 °F with wind above 3 mph; outside
/// that range the air temperature is used unchanged.
pub fn wind_chill(temperature_f: f64, wind_speed_mph: f64) -> f64 {
    if temperature_f < 50.0 && wind_speed_mph > 3.0 {
        let v = wind_speed_mph.powf(0.16);
        35.74 + (0.6215 * temperature_f) - (35.75 * v) + (0.4275 * temperature_f * v)
    } else {
        temperature_f
    }
}

/// (sin, cos) of a value on a cycle of the given period
pub fn cyclical(value: u32, period: u32) -> (f64, f64) {
    let angle = 2.0 * PI * value as f64 / period as f64;
    (angle.sin(), angle.cos())
}

/// 1.0 from 18:00 through 05:59, else 0.0
pub fn night_flag(hour: u32) -> f64 {
    if hour >= 18 || hour < 6 {
        1.0
    } else {
        0.0
    }
}

/// ln(1 + precipitation)
pub fn log_precipitation(precipitation_in: f64) -> f64 {
    precipitation_in.ln_1p()
}

fn flag(on: bool) -> f64 {
    if on {
        1.0
    } else {
        0.0
    }
}

/// Encode a raw record into every raw-passthrough and engineered column
pub fn encode(record: &RawAccidentRecord) -> FeatureMap {
    let mut map = FeatureMap::new();

    // Raw weather measurements
    map.insert(Feature::TemperatureF, record.temperature_f);
    map.insert(Feature::HumidityPercent, record.humidity_percent);
    map.insert(Feature::PressureIn, record.pressure_in);
    map.insert(Feature::VisibilityMi, record.visibility_mi);
    map.insert(Feature::WindSpeedMph, record.wind_speed_mph);
    map.insert(
        Feature::WindChillF,
        wind_chill(record.temperature_f, record.wind_speed_mph),
    );

    for (feature, on) in record.poi.columns() {
        map.insert(feature, flag(on));
    }

    // Time
    let hour = record.start_time.hour();
    let month = record.start_time.month();
    let (hour_sin, hour_cos) = cyclical(hour, 24);
    let (month_sin, month_cos) = cyclical(month, 12);
    map.insert(Feature::HourSin, hour_sin);
    map.insert(Feature::HourCos, hour_cos);
    map.insert(Feature::MonthSin, month_sin);
    map.insert(Feature::MonthCos, month_cos);
    map.insert(Feature::IsNight, night_flag(hour));

    for (feature, hit) in keyword_flags(&record.description) {
        map.insert(feature, flag(hit));
    }

    map.insert(
        Feature::LogPrecipitationIn,
        log_precipitation(record.precipitation()),
    );

    // Categorical one-hot blocks
    for feature in WEATHER_COLUMNS {
        map.insert(feature, 0.0);
    }
    if let Some(feature) = simplify_weather(&record.weather_condition).column() {
        map.insert(feature, 1.0);
    }

    for (_, feature) in WIND_DIRECTIONS {
        map.insert(feature, 0.0);
    }
    if let Some(feature) = wind_direction_column(&record.wind_direction) {
        map.insert(feature, 1.0);
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{parse_timestamp, PoiFlags};
    use crate::schema::FEATURE_COUNT;

    fn record() -> RawAccidentRecord {
        RawAccidentRecord {
            start_time: parse_timestamp("2023-12-25 23:30:00").unwrap(),
            description: "Road blocked due to heavy accident. Queueing traffic.".to_string(),
            street: Some("I-95 N".to_string()),
            weather_condition: "Heavy Thunderstorms".to_string(),
            temperature_f: 30.0,
            humidity_percent: 90.0,
            pressure_in: 29.0,
            visibility_mi: 0.5,
            wind_speed_mph: 35.0,
            precipitation_in: Some(0.5),
            wind_direction: "NW".to_string(),
            poi: PoiFlags {
                junction: true,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_wind_chill_formula() {
        let v = 35.0_f64.powf(0.16);
        let expected = 35.74 + 0.6215 * 30.0 - 35.75 * v + 0.4275 * 30.0 * v;
        assert_eq!(wind_chill(30.0, 35.0), expected);
        assert!((wind_chill(30.0, 35.0) - 13.893_838_813_690_255).abs() < 1e-9);
    }

    #[test]
    fn test_wind_chill_outside_range() {
        assert_eq!(wind_chill(70.0, 10.0), 70.0);
        assert_eq!(wind_chill(40.0, 3.0), 40.0);
        assert_eq!(wind_chill(50.0, 20.0), 50.0);
    }

    #[test]
    fn test_night_flag_boundaries() {
        assert_eq!(night_flag(23), 1.0);
        assert_eq!(night_flag(12), 0.0);
        assert_eq!(night_flag(6), 0.0);
        assert_eq!(night_flag(5), 1.0);
        assert_eq!(night_flag(17), 0.0);
        assert_eq!(night_flag(18), 1.0);
        assert_eq!(night_flag(0), 1.0);
    }

    #[test]
    fn test_cyclical_encoding() {
        let (s, c) = cyclical(6, 24);
        assert!((s - 1.0).abs() < 1e-12);
        assert!(c.abs() < 1e-12);

        let (s, c) = cyclical(0, 24);
        assert_eq!((s, c), (0.0, 1.0));

        let (s, c) = cyclical(12, 12);
        assert!(s.abs() < 1e-12);
        assert!((c - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_log_precipitation_zero_is_exact() {
        assert_eq!(log_precipitation(0.0), 0.0);
        assert!((log_precipitation(0.5) - 1.5_f64.ln()).abs() < 1e-15);
    }

    #[test]
    fn test_encode_covers_every_column() {
        let map = encode(&record());
        assert_eq!(map.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_encode_severe_scenario() {
        let map = encode(&record());

        assert_eq!(map.get(Feature::IsNight), Some(1.0));
        assert_eq!(map.get(Feature::WeatherStorm), Some(1.0));
        assert_eq!(map.get(Feature::WeatherRain), Some(0.0));
        assert_eq!(map.get(Feature::WindDirectionNw), Some(1.0));
        assert_eq!(map.get(Feature::WindDirectionN), Some(0.0));
        assert_eq!(map.get(Feature::Junction), Some(1.0));
        assert_eq!(map.get(Feature::TrafficSignal), Some(0.0));
        assert_eq!(map.get(Feature::WindChillF), Some(wind_chill(30.0, 35.0)));

        for feature in [
            Feature::DescBlocked,
            Feature::DescHeavy,
            Feature::DescAccident,
            Feature::DescQueue,
        ] {
            assert_eq!(map.get(feature), Some(1.0), "{feature}");
        }
        for feature in [
            Feature::DescRamp,
            Feature::DescHazard,
            Feature::DescCaution,
            Feature::DescFire,
        ] {
            assert_eq!(map.get(feature), Some(0.0), "{feature}");
        }
    }

    #[test]
    fn test_unknown_wind_direction_is_all_zero() {
        let mut raw = record();
        raw.wind_direction = "XX".to_string();
        let map = encode(&raw);
        for (_, feature) in WIND_DIRECTIONS {
            assert_eq!(map.get(feature), Some(0.0));
        }
    }

    #[test]
    fn test_clear_weather_is_all_zero() {
        let mut raw = record();
        raw.weather_condition = "Fair".to_string();
        let map = encode(&raw);
        for feature in WEATHER_COLUMNS {
            assert_eq!(map.get(feature), Some(0.0));
        }
    }

    #[test]
    fn test_missing_precipitation_is_zero() {
        let mut raw = record();
        raw.precipitation_in = None;
        assert_eq!(encode(&raw).get(Feature::LogPrecipitationIn), Some(0.0));
    }
}
