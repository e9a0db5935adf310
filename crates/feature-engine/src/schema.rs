//! Canonical Feature Schema
//!
//! The column order the robust scaler and the classifier were fitted on.
//! Reordering this table invalidates both artifacts without any visible
//! error, so every artifact is checked against it at startup.

use serde::Serialize;
use thiserror::Error;

/// Number of columns in the fitted schema
pub const FEATURE_COUNT: usize = 54;

macro_rules! feature_schema {
    ($($variant:ident => $name:literal,)+) => {
        /// One column of the fitted schema
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[repr(usize)]
        pub enum Feature {
            $($variant,)+
        }

        impl Feature {
            /// All features in canonical order
            pub const ALL: [Feature; FEATURE_COUNT] = [$(Feature::$variant,)+];

            /// Column name as it appears in the training data
            pub fn name(self) -> &'static str {
                match self {
                    $(Feature::$variant => $name,)+
                }
            }
        }

        /// Column names in canonical order
        pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [$($name,)+];
    };
}

feature_schema! {
    TemperatureF => "Temperature(F)",
    WindChillF => "Wind_Chill(F)",
    HumidityPercent => "Humidity(%)",
    PressureIn => "Pressure(in)",
    VisibilityMi => "Visibility(mi)",
    WindSpeedMph => "Wind_Speed(mph)",
    Amenity => "Amenity",
    Crossing => "Crossing",
    GiveWay => "Give_Way",
    Junction => "Junction",
    NoExit => "No_Exit",
    Railway => "Railway",
    Roundabout => "Roundabout",
    Station => "Station",
    Stop => "Stop",
    TrafficCalming => "Traffic_Calming",
    TrafficSignal => "Traffic_Signal",
    TurningLoop => "Turning_Loop",
    IsNight => "Is_Night",
    DescQueue => "Desc_Queue",
    DescHeavy => "Desc_Heavy",
    DescBlocked => "Desc_Blocked",
    DescRamp => "Desc_Ramp",
    DescAccident => "Desc_Accident",
    DescHazard => "Desc_Hazard",
    DescCaution => "Desc_Caution",
    DescFire => "Desc_Fire",
    HourSin => "Hour_Sin",
    HourCos => "Hour_Cos",
    MonthSin => "Month_Sin",
    MonthCos => "Month_Cos",
    LogPrecipitationIn => "Log_Precipitation(in)",
    WeatherCloudy => "Weather_Simplified_Cloudy",
    WeatherFogObscured => "Weather_Simplified_Fog/Obscured",
    WeatherRain => "Weather_Simplified_Rain",
    WeatherSnowIce => "Weather_Simplified_Snow/Ice",
    WeatherStorm => "Weather_Simplified_Storm",
    WindDirectionE => "Wind_Direction_E",
    WindDirectionEne => "Wind_Direction_ENE",
    WindDirectionEse => "Wind_Direction_ESE",
    WindDirectionN => "Wind_Direction_N",
    WindDirectionNe => "Wind_Direction_NE",
    WindDirectionNne => "Wind_Direction_NNE",
    WindDirectionNnw => "Wind_Direction_NNW",
    WindDirectionNw => "Wind_Direction_NW",
    WindDirectionS => "Wind_Direction_S",
    WindDirectionSe => "Wind_Direction_SE",
    WindDirectionSse => "Wind_Direction_SSE",
    WindDirectionSsw => "Wind_Direction_SSW",
    WindDirectionSw => "Wind_Direction_SW",
    WindDirectionVar => "Wind_Direction_VAR",
    WindDirectionW => "Wind_Direction_W",
    WindDirectionWnw => "Wind_Direction_WNW",
    WindDirectionWsw => "Wind_Direction_WSW",
}

impl Feature {
    /// Position of this feature in the fitted vector
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up a feature by its training column name
    pub fn from_name(name: &str) -> Option<Feature> {
        Feature::ALL.iter().copied().find(|f| f.name() == name)
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Artifact column order disagrees with the canonical schema
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("{artifact} expects {actual} columns, schema has {expected}")]
    ColumnCount {
        artifact: String,
        expected: usize,
        actual: usize,
    },

    #[error("{artifact} column {index} is '{actual}', schema expects '{expected}'")]
    ColumnMismatch {
        artifact: String,
        index: usize,
        expected: &'static str,
        actual: String,
    },
}

/// Check an artifact's expected input columns against the canonical order.
///
/// `artifact` is only used to label the error.
pub fn validate_columns<S: AsRef<str>>(artifact: &str, columns: &[S]) -> Result<(), SchemaError> {
    if columns.len() != FEATURE_COUNT {
        return Err(SchemaError::ColumnCount {
            artifact: artifact.to_string(),
            expected: FEATURE_COUNT,
            actual: columns.len(),
        });
    }

    for (index, (expected, actual)) in FEATURE_NAMES.iter().zip(columns).enumerate() {
        if *expected != actual.as_ref() {
            return Err(SchemaError::ColumnMismatch {
                artifact: artifact.to_string(),
                index,
                expected,
                actual: actual.as_ref().to_string(),
            });
        }
    }

    Ok(())
}
