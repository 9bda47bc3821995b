use chrono::{DateTime, Utc};

/// Coordinates resolved for a city name.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoLocation {
    pub name: String,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    /// "New York, US", or just the name when no country is known.
    pub fn display_name(&self) -> String {
        match &self.country {
            Some(country) if !country.is_empty() => format!("{}, {}", self.name, country),
            _ => self.name.clone(),
        }
    }
}

/// One forecast data point for a specific hour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourlySample {
    pub time: DateTime<Utc>,
    /// Short condition label, e.g. "Rain" or "Clouds".
    pub condition: String,
    /// Free-text description, e.g. "light rain".
    pub description: String,
}

/// Hourly samples in chronological order. The first sample describes "now".
///
/// The sequence cannot be modified once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HourlyForecast {
    samples: Vec<HourlySample>,
}

impl HourlyForecast {
    pub fn new(samples: Vec<HourlySample>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[HourlySample] {
        &self.samples
    }

    pub fn current(&self) -> Option<&HourlySample> {
        self.samples.first()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
