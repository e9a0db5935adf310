//! Property tests over the encode + assemble path

use chrono::{NaiveDate, NaiveDateTime};
use feature_engine::{
    extract, wind_chill, Feature, PoiFlags, RawAccidentRecord, FEATURE_COUNT, FEATURE_NAMES,
    WIND_DIRECTIONS,
};
use proptest::prelude::*;

const WEATHER: [&str; 8] = [
    "Fair",
    "Light Rain",
    "Heavy Thunderstorms",
    "Light Snow",
    "Haze",
    "Mostly Cloudy",
    "Wintry Mix",
    "",
];

prop_compose! {
    fn arb_start_time()(
        month in 1u32..=12,
        day in 1u32..=28,
        hour in 0u32..24,
        minute in 0u32..60,
    ) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .unwrap()
    }
}

prop_compose! {
    fn arb_poi()(flags in prop::array::uniform13(any::<bool>())) -> PoiFlags {
        PoiFlags {
            amenity: flags[0],
            bump: flags[1],
            crossing: flags[2],
            give_way: flags[3],
            junction: flags[4],
            no_exit: flags[5],
            railway: flags[6],
            roundabout: flags[7],
            station: flags[8],
            stop: flags[9],
            traffic_calming: flags[10],
            traffic_signal: flags[11],
            turning_loop: flags[12],
        }
    }
}

prop_compose! {
    fn arb_record()(
        start_time in arb_start_time(),
        description in "[a-zA-Z .,]{0,80}",
        weather in prop::sample::select(WEATHER.to_vec()),
        temperature_f in -40.0f64..120.0,
        humidity_percent in 0.0f64..=100.0,
        pressure_in in 20.0f64..32.0,
        visibility_mi in 0.0f64..20.0,
        wind_speed_mph in 0.0f64..80.0,
        precipitation_in in prop::option::of(0.0f64..5.0),
        wind_direction in "[A-Za-z]{0,4}",
        poi in arb_poi(),
    ) -> RawAccidentRecord {
        RawAccidentRecord {
            start_time,
            description,
            street: None,
            weather_condition: weather.to_string(),
            temperature_f,
            humidity_percent,
            pressure_in,
            visibility_mi,
            wind_speed_mph,
            precipitation_in,
            wind_direction,
            poi,
        }
    }
}

proptest! {
    #[test]
    fn vector_is_complete_and_finite(record in arb_record()) {
        let assembly = extract(&record);
        prop_assert!(assembly.missing.is_empty());
        prop_assert_eq!(assembly.vector.as_slice().len(), FEATURE_COUNT);
        for ((feature, value), name) in assembly.vector.iter().zip(FEATURE_NAMES) {
            prop_assert_eq!(feature.name(), name);
            prop_assert!(value.is_finite(), "{} = {}", name, value);
        }
    }

    #[test]
    fn one_hot_blocks_have_at_most_one_hit(record in arb_record()) {
        let vector = extract(&record).vector;
        let weather: f64 = [
            Feature::WeatherCloudy,
            Feature::WeatherFogObscured,
            Feature::WeatherRain,
            Feature::WeatherSnowIce,
            Feature::WeatherStorm,
        ]
        .iter()
        .map(|f| vector.get(*f))
        .sum();
        let wind: f64 = WIND_DIRECTIONS.iter().map(|(_, f)| vector.get(*f)).sum();
        prop_assert!(weather == 0.0 || weather == 1.0);
        prop_assert!(wind == 0.0 || wind == 1.0);
    }

    #[test]
    fn cyclical_pairs_lie_on_unit_circle(record in arb_record()) {
        let v = extract(&record).vector;
        let hour = v.get(Feature::HourSin).powi(2) + v.get(Feature::HourCos).powi(2);
        let month = v.get(Feature::MonthSin).powi(2) + v.get(Feature::MonthCos).powi(2);
        prop_assert!((hour - 1.0).abs() < 1e-12);
        prop_assert!((month - 1.0).abs() < 1e-12);
    }

    #[test]
    fn wind_chill_never_exceeds_temperature(t in -40.0f64..50.0, v in 3.1f64..80.0) {
        prop_assert!(wind_chill(t, v) <= t);
    }

    #[test]
    fn extraction_is_deterministic(record in arb_record()) {
        prop_assert_eq!(extract(&record).vector, extract(&record).vector);
    }
}
