use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Offset between the Kelvin and Celsius scales.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Converts a raw provider reading in Kelvin into degrees Celsius.
pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

/// One weather reading for one city at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub city: String,
    pub condition: String,
    pub temperature_celsius: f64,
    pub feels_like_celsius: f64,
    pub observed_at: DateTime<Utc>,
}

impl Observation {
    /// Builds an observation, dropping any sub-second part of `observed_at`.
    pub fn new(
        city: impl Into<String>,
        condition: impl Into<String>,
        temperature_celsius: f64,
        feels_like_celsius: f64,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            city: city.into(),
            condition: condition.into(),
            temperature_celsius,
            feels_like_celsius,
            observed_at: observed_at.trunc_subsecs(0),
        }
    }

    /// Builds an observation from readings reported in Kelvin.
    pub fn from_kelvin(
        city: impl Into<String>,
        condition: impl Into<String>,
        temperature_kelvin: f64,
        feels_like_kelvin: f64,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self::new(
            city,
            condition,
            kelvin_to_celsius(temperature_kelvin),
            kelvin_to_celsius(feels_like_kelvin),
            observed_at,
        )
    }

    /// Rejects observations the rollup and alert engines cannot order or average.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.city.trim().is_empty() {
            return Err(CoreError::malformed(&self.city, "city name is empty"));
        }
        if !self.temperature_celsius.is_finite() {
            return Err(CoreError::malformed(
                &self.city,
                format!(
                    "temperature at {} is not a finite number ({})",
                    self.observed_at, self.temperature_celsius
                ),
            ));
        }
        if !self.feels_like_celsius.is_finite() {
            return Err(CoreError::malformed(
                &self.city,
                format!(
                    "feels-like temperature at {} is not a finite number ({})",
                    self.observed_at, self.feels_like_celsius
                ),
            ));
        }
        Ok(())
    }
}

/// Aggregated statistics for one city over one local calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub city: String,
    pub date: NaiveDate,
    pub avg_temp: f64,
    pub max_temp: f64,
    pub min_temp: f64,
    pub dominant_condition: String,
}

/// Emitted when two time-adjacent observations both exceed the threshold.
///
/// `triggered_at` and `observed_temp` belong to the second observation of the pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub city: String,
    pub threshold: f64,
    pub triggered_at: DateTime<Utc>,
    pub observed_temp: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn kelvin_conversion() {
        assert!(kelvin_to_celsius(273.15).abs() < 1e-9);
        assert!((kelvin_to_celsius(308.15) - 35.0).abs() < 1e-9);
    }

    #[test]
    fn new_truncates_to_whole_seconds() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 7).unwrap()
            + chrono::Duration::milliseconds(640);
        let obs = Observation::new("Delhi", "Clear", 30.0, 31.0, at);

        assert_eq!(
            obs.observed_at,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 7).unwrap()
        );
    }

    #[test]
    fn from_kelvin_converts_both_temperatures() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let obs = Observation::from_kelvin("Delhi", "Haze", 303.15, 305.15, at);

        assert!((obs.temperature_celsius - 30.0).abs() < 1e-9);
        assert!((obs.feels_like_celsius - 32.0).abs() < 1e-9);
    }

    #[test]
    fn validate_rejects_nan_temperature() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let obs = Observation::new("Delhi", "Clear", f64::NAN, 30.0, at);

        let err = obs.validate().unwrap_err();
        assert!(matches!(err, CoreError::MalformedInput { ref city, .. } if city == "Delhi"));
    }

    #[test]
    fn validate_rejects_infinite_feels_like_and_empty_city() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        assert!(Observation::new("Delhi", "Clear", 30.0, f64::INFINITY, at).validate().is_err());
        assert!(Observation::new("  ", "Clear", 30.0, 30.0, at).validate().is_err());
        assert!(Observation::new("Delhi", "Clear", 30.0, 30.0, at).validate().is_ok());
    }
}
