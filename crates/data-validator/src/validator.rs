//! Data Validator for Range Checking

use crate::error::ValidationError;
use feature_engine::RawAccidentRecord;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Temperature valid range (°F)
    pub temperature_range: (f64, f64),
    /// Relative humidity valid range (%)
    pub humidity_range: (f64, f64),
    /// Barometric pressure valid range (inHg)
    pub pressure_range: (f64, f64),
    /// Visibility valid range (mi)
    pub visibility_range: (f64, f64),
    /// Wind speed valid range (mph)
    pub wind_speed_range: (f64, f64),
    /// Precipitation valid range (in)
    pub precipitation_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            temperature_range: (-100.0, 150.0),
            humidity_range: (0.0, 100.0),
            pressure_range: (0.0, 60.0),
            visibility_range: (0.0, 200.0),
            wind_speed_range: (0.0, 1100.0),
            precipitation_range: (0.0, 50.0),
        }
    }
}

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid(fields_checked: usize) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            fields_checked,
        }
    }

    /// Create an invalid result with errors
    pub fn invalid(errors: Vec<ValidationError>, fields_checked: usize) -> Self {
        Self {
            valid: false,
            errors,
            fields_checked,
        }
    }

    /// Convert into a `Result`, keeping every field error
    pub fn into_result(self) -> Result<(), Vec<ValidationError>> {
        if self.valid {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Range validator for raw accident records
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            Err(ValidationError::NotFinite { field })
        } else if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate every continuous measurement of a record
    pub fn validate(&self, record: &RawAccidentRecord) -> ValidationResult {
        let checks = [
            ("Temperature(F)", record.temperature_f, self.config.temperature_range),
            ("Humidity(%)", record.humidity_percent, self.config.humidity_range),
            ("Pressure(in)", record.pressure_in, self.config.pressure_range),
            ("Visibility(mi)", record.visibility_mi, self.config.visibility_range),
            ("Wind_Speed(mph)", record.wind_speed_mph, self.config.wind_speed_range),
            ("Precipitation(in)", record.precipitation(), self.config.precipitation_range),
        ];

        let errors: Vec<ValidationError> = checks
            .iter()
            .filter_map(|(field, value, range)| self.validate_range(*field, *value, *range).err())
            .collect();

        if errors.is_empty() {
            ValidationResult::valid(checks.len())
        } else {
            debug!("Record failed validation on {} field(s)", errors.len());
            ValidationResult::invalid(errors, checks.len())
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::{parse_timestamp, PoiFlags};

    fn record() -> RawAccidentRecord {
        RawAccidentRecord {
            start_time: parse_timestamp("2023-03-15 08:30:00").unwrap(),
            description: "Accident reported".to_string(),
            street: None,
            weather_condition: "Clear".to_string(),
            temperature_f: 70.0,
            humidity_percent: 50.0,
            pressure_in: 30.0,
            visibility_mi: 10.0,
            wind_speed_mph: 5.0,
            precipitation_in: None,
            wind_direction: "Calm".to_string(),
            poi: PoiFlags::default(),
        }
    }

    #[test]
    fn test_valid_record() {
        let result = Validator::default().validate(&record());
        assert!(result.valid);
        assert_eq!(result.fields_checked, 6);
        assert!(result.into_result().is_ok());
    }

    #[test]
    fn test_range_edges_are_inclusive() {
        let validator = Validator::default();
        assert!(validator.validate_range("Humidity(%)", 0.0, (0.0, 100.0)).is_ok());
        assert!(validator.validate_range("Humidity(%)", 100.0, (0.0, 100.0)).is_ok());
        assert!(validator.validate_range("Humidity(%)", 100.1, (0.0, 100.0)).is_err());
    }

    #[test]
    fn test_negative_precipitation() {
        let mut raw = record();
        raw.precipitation_in = Some(-0.1);
        let errors = Validator::default().validate(&raw).into_result().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field(), "Precipitation(in)");
    }

    #[test]
    fn test_reports_every_bad_field() {
        let mut raw = record();
        raw.humidity_percent = 140.0;
        raw.wind_speed_mph = -3.0;
        raw.temperature_f = f64::NAN;

        let result = Validator::default().validate(&raw);
        assert!(!result.valid);
        let fields: Vec<&str> = result.errors.iter().map(|e| e.field()).collect();
        assert_eq!(fields, vec!["Temperature(F)", "Humidity(%)", "Wind_Speed(mph)"]);
        assert_eq!(
            result.errors[0],
            ValidationError::NotFinite { field: "Temperature(F)" }
        );
    }

    #[test]
    fn test_custom_config() {
        let validator = Validator::new(ValidationConfig {
            temperature_range: (0.0, 100.0),
            ..Default::default()
        });
        let mut raw = record();
        raw.temperature_f = -5.0;
        assert!(!validator.validate(&raw).valid);
    }
}
