//! Feature Engineering Engine
//!
//! Turns a raw accident report into the fixed 54-column vector the scaler
//! and classifier were fitted on.

mod categorical;
mod encoder;
mod features;
mod record;
mod schema;
mod text;

pub use categorical::{
    simplify_weather, wind_direction_column, WeatherCategory, WeatherRule, WEATHER_COLUMNS,
    WEATHER_RULES, WIND_DIRECTIONS,
};
pub use encoder::{cyclical, encode, log_precipitation, night_flag, wind_chill};
pub use features::{assemble, extract, Assembly, FeatureMap, FeatureVector};
pub use record::{parse_timestamp, PoiFlags, RawAccidentRecord, RecordError};
pub use schema::{validate_columns, Feature, SchemaError, FEATURE_COUNT, FEATURE_NAMES};
pub use text::{keyword_flags, KeywordRule, KEYWORD_RULES};
