//! Raw Accident Record
//!
//! The human-entered accident report as it arrives on the wire. Field names
//! follow the training data columns; the snake-case spellings are accepted
//! as aliases.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::schema::Feature;

/// Errors while reading a raw record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("Start_Time '{0}' is not a recognised date-time")]
    InvalidTimestamp(String),
}

/// Naive layouts tried after RFC 3339, most specific first
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a start timestamp into local wall-clock time.
///
/// An explicit UTC offset is kept as written: the hour and month that feed
/// the cyclical features are the ones the reporter saw, not UTC.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, RecordError> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Ok(dt.naive_local());
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(dt);
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight);
    }

    Err(RecordError::InvalidTimestamp(raw.to_string()))
}

fn deserialize_start_time<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

fn default_wind_direction() -> String {
    "Calm".to_string()
}

/// Point-of-interest flags near the accident
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PoiFlags {
    #[serde(rename = "Amenity", default)]
    pub amenity: bool,
    /// Accepted for client compatibility; not a model input
    #[serde(rename = "Bump", default)]
    pub bump: bool,
    #[serde(rename = "Crossing", default)]
    pub crossing: bool,
    #[serde(rename = "Give_Way", default)]
    pub give_way: bool,
    #[serde(rename = "Junction", default)]
    pub junction: bool,
    #[serde(rename = "No_Exit", default)]
    pub no_exit: bool,
    #[serde(rename = "Railway", default)]
    pub railway: bool,
    #[serde(rename = "Roundabout", default)]
    pub roundabout: bool,
    #[serde(rename = "Station", default)]
    pub station: bool,
    #[serde(rename = "Stop", default)]
    pub stop: bool,
    #[serde(rename = "Traffic_Calming", default)]
    pub traffic_calming: bool,
    #[serde(rename = "Traffic_Signal", default)]
    pub traffic_signal: bool,
    #[serde(rename = "Turning_Loop", default)]
    pub turning_loop: bool,
}

impl PoiFlags {
    /// The twelve model-input flags paired with their columns
    pub fn columns(&self) -> [(Feature, bool); 12] {
        [
            (Feature::Amenity, self.amenity),
            (Feature::Crossing, self.crossing),
            (Feature::GiveWay, self.give_way),
            (Feature::Junction, self.junction),
            (Feature::NoExit, self.no_exit),
            (Feature::Railway, self.railway),
            (Feature::Roundabout, self.roundabout),
            (Feature::Station, self.station),
            (Feature::Stop, self.stop),
            (Feature::TrafficCalming, self.traffic_calming),
            (Feature::TrafficSignal, self.traffic_signal),
            (Feature::TurningLoop, self.turning_loop),
        ]
    }
}

/// A single accident report, immutable once parsed
#[derive(Debug, Clone, Deserialize)]
pub struct RawAccidentRecord {
    #[serde(rename = "Start_Time", deserialize_with = "deserialize_start_time")]
    pub start_time: NaiveDateTime,

    #[serde(rename = "Description")]
    pub description: String,

    /// Carried for logging only
    #[serde(rename = "Street", default)]
    pub street: Option<String>,

    #[serde(rename = "Weather_Condition")]
    pub weather_condition: String,

    #[serde(rename = "Temperature(F)", alias = "Temperature_F")]
    pub temperature_f: f64,

    #[serde(rename = "Humidity(%)", alias = "Humidity_Percent")]
    pub humidity_percent: f64,

    #[serde(rename = "Pressure(in)", alias = "Pressure_in")]
    pub pressure_in: f64,

    #[serde(rename = "Visibility(mi)", alias = "Visibility_mi")]
    pub visibility_mi: f64,

    #[serde(rename = "Wind_Speed(mph)", alias = "Wind_Speed_mph")]
    pub wind_speed_mph: f64,

    #[serde(rename = "Precipitation(in)", alias = "Precipitation_in", default)]
    pub precipitation_in: Option<f64>,

    #[serde(rename = "Wind_Direction", default = "default_wind_direction")]
    pub wind_direction: String,

    #[serde(flatten)]
    pub poi: PoiFlags,
}

impl RawAccidentRecord {
    /// Precipitation in inches, 0.0 when not reported
    pub fn precipitation(&self) -> f64 {
        self.precipitation_in.unwrap_or(0.0)
    }
}
