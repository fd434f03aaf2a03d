//! One pass of fetch → store → summarize → alert.
//!
//! There is no loop or timer here; callers decide how often to run a pass.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    Config,
    aggregate::summarize,
    alert::evaluate_cities,
    model::{AlertEvent, DailySummary},
    notify::AlertSink,
    provider::WeatherProvider,
    store::ObservationStore,
};

/// Outcome of a single fetch round.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PollReport {
    pub stored: usize,
    /// (city, error message) for every city whose fetch failed.
    pub failures: Vec<(String, String)>,
}

/// Rollups and alerts computed from one store snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub summaries: Vec<DailySummary>,
    pub alerts: Vec<AlertEvent>,
}

/// Fetches each city once and appends what succeeds.
///
/// A failed fetch is logged and recorded, then skipped. A failed write aborts
/// the round, since the store is unusable.
pub async fn poll_once(
    provider: &dyn WeatherProvider,
    store: &dyn ObservationStore,
    cities: &[String],
) -> Result<PollReport> {
    let mut report = PollReport::default();

    for city in cities {
        match provider.current(city).await {
            Ok(obs) => {
                store.append(&obs)?;
                report.stored += 1;
            }
            Err(err) => {
                let message = format!("{err:#}");
                warn!(city = %city, error = %message, "fetch failed; skipping city this round");
                report.failures.push((city.clone(), message));
            }
        }
    }

    info!(
        stored = report.stored,
        failed = report.failures.len(),
        "poll round finished"
    );
    Ok(report)
}

/// Summarizes the current store contents and runs the alert scan for every
/// configured city, passing each alert to `sink`.
pub fn analyze(
    store: &dyn ObservationStore,
    config: &Config,
    sink: &mut dyn AlertSink,
) -> Result<Analysis> {
    let tz = config.timezone()?;
    let snapshot = store.read_all()?;

    let summaries = summarize(&snapshot, &tz).context("Failed to compute daily summaries")?;
    let alerts =
        evaluate_cities(&snapshot, &config.alert_settings()).context("Failed to evaluate alerts")?;

    for event in &alerts {
        sink.notify(event)?;
    }

    info!(
        observations = snapshot.len(),
        summaries = summaries.len(),
        alerts = alerts.len(),
        "analysis finished"
    );

    Ok(Analysis { summaries, alerts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::Observation,
        notify::CollectingSink,
        store::SqliteStore,
    };
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::collections::HashMap;

    /// Serves fixed readings; cities without one fail.
    #[derive(Debug)]
    struct FixedProvider {
        readings: HashMap<String, f64>,
        at: DateTime<Utc>,
    }

    #[async_trait]
    impl WeatherProvider for FixedProvider {
        async fn current(&self, city: &str) -> Result<Observation> {
            let temp = self
                .readings
                .get(city)
                .ok_or_else(|| anyhow!("city not found: {city}"))?;
            Ok(Observation::new(city, "Clear", *temp, *temp, self.at))
        }
    }

    fn cities(names: &[&str]) -> Vec<String> {
        names.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn poll_once_stores_successes_and_skips_failures() {
        let store = SqliteStore::in_memory().unwrap();
        let provider = FixedProvider {
            readings: HashMap::from([("Delhi".to_string(), 36.0)]),
            at: Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap(),
        };

        let report = poll_once(&provider, &store, &cities(&["Delhi", "Atlantis"]))
            .await
            .unwrap();

        assert_eq!(report.stored, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "Atlantis");
        assert_eq!(store.read_all().unwrap().len(), 1);
    }

    #[test]
    fn analyze_summarizes_and_notifies() {
        let store = SqliteStore::in_memory().unwrap();
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap();
        for (i, t) in [36.0, 37.0, 38.0, 20.0].iter().enumerate() {
            let at = start + Duration::minutes(5 * i as i64);
            store.append(&Observation::new("Mumbai", "Clear", *t, *t, at)).unwrap();
            store.append(&Observation::new("Delhi", "Haze", 30.0, 30.0, at)).unwrap();
        }

        let config = Config {
            cities: cities(&["Delhi", "Mumbai"]),
            timezone: "UTC".into(),
            ..Config::default()
        };
        let mut sink = CollectingSink::default();

        let analysis = analyze(&store, &config, &mut sink).unwrap();

        assert_eq!(analysis.summaries.len(), 2);
        assert_eq!(analysis.summaries[0].city, "Delhi");
        assert_eq!(analysis.summaries[1].max_temp, 38.0);
        assert_eq!(analysis.alerts.len(), 2);
        assert_eq!(sink.events, analysis.alerts);
    }

    #[test]
    fn analyze_ignores_unconfigured_cities_for_alerts() {
        let store = SqliteStore::in_memory().unwrap();
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap();
        for i in 0..3 {
            let at = start + Duration::minutes(5 * i);
            store.append(&Observation::new("Jaipur", "Clear", 45.0, 47.0, at)).unwrap();
        }

        let config = Config {
            cities: cities(&["Delhi"]),
            timezone: "UTC".into(),
            ..Config::default()
        };
        let mut sink = CollectingSink::default();

        let analysis = analyze(&store, &config, &mut sink).unwrap();

        assert_eq!(analysis.summaries.len(), 1);
        assert!(analysis.alerts.is_empty());
        assert!(sink.events.is_empty());
    }
}
