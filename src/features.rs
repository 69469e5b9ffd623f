use std::fmt;

/// Number of measurements the model was trained on.
pub const FEATURE_COUNT: usize = 7;

/// One agronomic measurement accepted by the predict endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Nitrogen,
    Phosphorus,
    Potassium,
    Temperature,
    Humidity,
    Ph,
    Rainfall,
}

impl Feature {
    /// Column order used when the model was trained. Feeding the model any
    /// other order silently corrupts predictions.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Nitrogen,
        Feature::Phosphorus,
        Feature::Potassium,
        Feature::Temperature,
        Feature::Humidity,
        Feature::Ph,
        Feature::Rainfall,
    ];

    /// Key used for this measurement in request bodies.
    pub const fn name(self) -> &'static str {
        match self {
            Feature::Nitrogen => "N",
            Feature::Phosphorus => "P",
            Feature::Potassium => "K",
            Feature::Temperature => "temperature",
            Feature::Humidity => "humidity",
            Feature::Ph => "ph",
            Feature::Rainfall => "rainfall",
        }
    }

    /// Inclusive `(min, max)` bound accepted for this measurement.
    pub const fn range(self) -> (f64, f64) {
        match self {
            Feature::Nitrogen | Feature::Phosphorus | Feature::Potassium => (0.0, 3000.0),
            Feature::Temperature => (-10.0, 60.0),
            Feature::Humidity => (0.0, 100.0),
            Feature::Ph => (0.0, 14.0),
            Feature::Rainfall => (0.0, 500.0),
        }
    }

    pub fn contains(self, value: f64) -> bool {
        let (min, max) = self.range();
        (min..=max).contains(&value)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Measurements laid out in [`Feature::ALL`] order, ready for the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Single precision copy, for runtimes whose graphs take `f32` inputs.
    pub fn to_f32(&self) -> Vec<f32> {
        self.0.iter().map(|v| *v as f32).collect()
    }
}
