//! Feature Vector Assembly

use tracing::warn;

use crate::encoder::encode;
use crate::record::RawAccidentRecord;
use crate::schema::{Feature, FEATURE_COUNT};

/// Partial mapping from schema column to value
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMap {
    slots: [Option<f64>; FEATURE_COUNT],
}

impl FeatureMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self {
            slots: [None; FEATURE_COUNT],
        }
    }

    /// Set a column, returning the previous value
    pub fn insert(&mut self, feature: Feature, value: f64) -> Option<f64> {
        self.slots[feature.index()].replace(value)
    }

    /// Get a column if it has been set
    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.slots[feature.index()]
    }

    /// Unset a column
    pub fn remove(&mut self, feature: Feature) -> Option<f64> {
        self.slots[feature.index()].take()
    }

    /// Number of columns set
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether no column is set
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for FeatureMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-order model input, one value per schema column
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Wrap values already in canonical order
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    /// Value of one column
    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    /// Values in canonical order
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// (column, value) pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.iter().copied().zip(self.values.iter().copied())
    }

    /// Number of columns, always [`FEATURE_COUNT`]
    pub fn len(&self) -> usize {
        FEATURE_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self {
            values: [0.0; FEATURE_COUNT],
        }
    }
}

/// Assembled vector plus the columns that had to be zero-filled
#[derive(Debug, Clone)]
pub struct Assembly {
    pub vector: FeatureVector,
    /// Columns absent from the map; non-empty means encoder/schema drift
    pub missing: Vec<Feature>,
}

/// Order a feature map into the fitted schema.
///
/// A column the map does not carry becomes 0.0 and is reported, never an
/// error.
pub fn assemble(map: &FeatureMap) -> Assembly {
    let mut values = [0.0; FEATURE_COUNT];
    let mut missing = Vec::new();

    for feature in Feature::ALL {
        match map.get(feature) {
            Some(value) => values[feature.index()] = value,
            None => {
                warn!(feature = feature.name(), "Feature missing in processing, defaulting to 0");
                missing.push(feature);
            }
        }
    }

    Assembly {
        vector: FeatureVector { values },
        missing,
    }
}

/// Encode and assemble a raw record in one step
pub fn extract(record: &RawAccidentRecord) -> Assembly {
    assemble(&encode(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{parse_timestamp, PoiFlags};
    use crate::schema::FEATURE_NAMES;

    fn record() -> RawAccidentRecord {
        RawAccidentRecord {
            start_time: parse_timestamp("2023-03-15 08:30:00").unwrap(),
            description: "Accident on I-95 North. Queueing traffic.".to_string(),
            street: None,
            weather_condition: "Light Rain".to_string(),
            temperature_f: 45.5,
            humidity_percent: 82.0,
            pressure_in: 29.9,
            visibility_mi: 10.0,
            wind_speed_mph: 12.5,
            precipitation_in: Some(0.02),
            wind_direction: "NW".to_string(),
            poi: PoiFlags {
                traffic_signal: true,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_extract_full_vector() {
        let assembly = extract(&record());
        assert!(assembly.missing.is_empty());
        assert_eq!(assembly.vector.len(), FEATURE_COUNT);
        assert!(assembly.vector.as_slice().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_order_follows_schema() {
        let assembly = extract(&record());
        let names: Vec<&str> = assembly.vector.iter().map(|(f, _)| f.name()).collect();
        assert_eq!(names, FEATURE_NAMES.to_vec());
        assert_eq!(assembly.vector.as_slice()[0], 45.5);
        assert_eq!(assembly.vector.get(Feature::TrafficSignal), 1.0);
        assert_eq!(assembly.vector.get(Feature::WeatherRain), 1.0);
    }

    #[test]
    fn test_missing_feature_defaults_to_zero() {
        let mut map = encode(&record());
        map.remove(Feature::HumidityPercent);
        map.remove(Feature::DescQueue);

        let assembly = assemble(&map);
        assert_eq!(assembly.vector.get(Feature::HumidityPercent), 0.0);
        assert_eq!(assembly.vector.get(Feature::DescQueue), 0.0);
        assert_eq!(
            assembly.missing,
            vec![Feature::HumidityPercent, Feature::DescQueue]
        );
        // untouched slots keep their values
        assert_eq!(assembly.vector.get(Feature::TemperatureF), 45.5);
    }

    #[test]
    fn test_empty_map_zero_fills_everything() {
        let assembly = assemble(&FeatureMap::new());
        assert_eq!(assembly.missing.len(), FEATURE_COUNT);
        assert_eq!(assembly.vector, FeatureVector::default());
    }

    #[test]
    fn test_feature_map_insert_replace() {
        let mut map = FeatureMap::new();
        assert!(map.is_empty());
        assert_eq!(map.insert(Feature::Stop, 1.0), None);
        assert_eq!(map.insert(Feature::Stop, 0.0), Some(1.0));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_extract_is_deterministic() {
        assert_eq!(extract(&record()).vector, extract(&record()).vector);
    }
}
