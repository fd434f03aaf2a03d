//! Threshold alerts that require two time-adjacent breaching observations.

use std::collections::HashMap;

use crate::{
    error::CoreError,
    model::{AlertEvent, Observation},
};

/// Default alert threshold in degrees Celsius.
pub const DEFAULT_THRESHOLD_C: f64 = 35.0;

/// Which cities to scan and at what threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertSettings {
    pub cities: Vec<String>,
    pub default_threshold: f64,
    pub thresholds: HashMap<String, f64>,
}

impl AlertSettings {
    pub fn new(cities: Vec<String>, default_threshold: f64) -> Self {
        Self {
            cities,
            default_threshold,
            thresholds: HashMap::new(),
        }
    }

    pub fn with_threshold(mut self, city: impl Into<String>, threshold: f64) -> Self {
        self.thresholds.insert(city.into(), threshold);
        self
    }

    pub fn threshold_for(&self, city: &str) -> f64 {
        self.thresholds
            .get(city)
            .copied()
            .unwrap_or(self.default_threshold)
    }
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self::new(Vec::new(), DEFAULT_THRESHOLD_C)
    }
}

/// Scans `city`'s observations in time order and emits one event for every
/// adjacent pair where both readings are strictly above `threshold`.
///
/// Observations for other cities are ignored. Equal timestamps keep their
/// input order. A run of N breaching readings yields N - 1 events.
pub fn evaluate(
    observations: &[Observation],
    city: &str,
    threshold: f64,
) -> Result<Vec<AlertEvent>, CoreError> {
    if !threshold.is_finite() {
        return Err(CoreError::malformed(
            city,
            format!("alert threshold is not a finite number ({threshold})"),
        ));
    }

    let mut series = Vec::new();
    for obs in observations.iter().filter(|o| o.city == city) {
        obs.validate()?;
        series.push(obs);
    }
    series.sort_by_key(|o| o.observed_at);

    let events = series
        .windows(2)
        .filter(|pair| {
            pair[0].temperature_celsius > threshold && pair[1].temperature_celsius > threshold
        })
        .map(|pair| AlertEvent {
            city: city.to_string(),
            threshold,
            triggered_at: pair[1].observed_at,
            observed_temp: pair[1].temperature_celsius,
        })
        .collect();

    Ok(events)
}

/// Runs [`evaluate`] independently for each configured city, in configured order.
pub fn evaluate_cities(
    observations: &[Observation],
    settings: &AlertSettings,
) -> Result<Vec<AlertEvent>, CoreError> {
    let mut events = Vec::new();
    for city in &settings.cities {
        events.extend(evaluate(observations, city, settings.threshold_for(city))?);
    }
    Ok(events)
}
