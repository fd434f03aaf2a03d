//! Daily rollups: per-city, per-local-day temperature statistics.
//!
//! Output is sorted by city name, then by date. Within a group, observations
//! are put in chronological order (stable, so equal timestamps keep their
//! input order) before the dominant condition is chosen.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::{
    error::CoreError,
    model::{DailySummary, Observation},
};

/// Groups observations by (city, local calendar day in `tz`) and summarizes each group.
///
/// Empty input yields an empty result. A single malformed observation fails
/// the whole call.
pub fn summarize(observations: &[Observation], tz: &Tz) -> Result<Vec<DailySummary>, CoreError> {
    let mut groups: BTreeMap<(&str, NaiveDate), Vec<&Observation>> = BTreeMap::new();

    for obs in observations {
        obs.validate()?;
        let local_date = obs.observed_at.with_timezone(tz).date_naive();
        groups
            .entry((obs.city.as_str(), local_date))
            .or_default()
            .push(obs);
    }

    let summaries = groups
        .into_iter()
        .map(|((city, date), mut group)| {
            group.sort_by_key(|o| o.observed_at);
            summarize_group(city, date, &group)
        })
        .collect();

    Ok(summaries)
}

/// `group` must be non-empty and chronologically ordered.
fn summarize_group(city: &str, date: NaiveDate, group: &[&Observation]) -> DailySummary {
    let mut sum = 0.0;
    let mut max_temp = f64::NEG_INFINITY;
    let mut min_temp = f64::INFINITY;

    for obs in group {
        sum += obs.temperature_celsius;
        max_temp = max_temp.max(obs.temperature_celsius);
        min_temp = min_temp.min(obs.temperature_celsius);
    }

    // Summing can drift a few ulps past the extrema (three readings of 0.1).
    let avg_temp = (sum / group.len() as f64).clamp(min_temp, max_temp);

    DailySummary {
        city: city.to_string(),
        date,
        avg_temp,
        max_temp,
        min_temp,
        dominant_condition: dominant_condition(group),
    }
}

/// Most frequent condition; ties go to the one seen first in time.
fn dominant_condition(group: &[&Observation]) -> String {
    // Kept in order of first appearance.
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for obs in group {
        match counts.iter_mut().find(|(c, _)| *c == obs.condition) {
            Some((_, n)) => *n += 1,
            None => counts.push((obs.condition.as_str(), 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (condition, n) in counts {
        if best.is_none_or(|(_, best_n)| n > best_n) {
            best = Some((condition, n));
        }
    }

    best.map(|(c, _)| c.to_string()).unwrap_or_default()
}
