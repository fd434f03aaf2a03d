//! Human-readable and JSON renderings of rollups and alerts.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write;

use crate::model::{AlertEvent, DailySummary};

/// Fixed-width table, one row per summary, in the order given.
pub fn render_summaries(summaries: &[DailySummary]) -> String {
    if summaries.is_empty() {
        return "No observations to summarize.\n".to_string();
    }

    let city_w = column_width(summaries.iter().map(|s| s.city.as_str()), "City");
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{:<city_w$}  {:<10}  {:>7}  {:>7}  {:>7}  Condition",
        "City", "Date", "Avg °C", "Max °C", "Min °C"
    );
    for s in summaries {
        let _ = writeln!(
            out,
            "{:<city_w$}  {:<10}  {:>7.1}  {:>7.1}  {:>7.1}  {}",
            s.city, s.date, s.avg_temp, s.max_temp, s.min_temp, s.dominant_condition
        );
    }
    out
}

pub fn render_alerts(alerts: &[AlertEvent]) -> String {
    if alerts.is_empty() {
        return "No alerts.\n".to_string();
    }

    let city_w = column_width(alerts.iter().map(|a| a.city.as_str()), "City");
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{:<city_w$}  {:<20}  {:>7}  {:>9}",
        "City", "Triggered (UTC)", "Temp °C", "Limit °C"
    );
    for a in alerts {
        let _ = writeln!(
            out,
            "{:<city_w$}  {:<20}  {:>7.1}  {:>9.1}",
            a.city,
            a.triggered_at.format("%Y-%m-%d %H:%M:%S"),
            a.observed_temp,
            a.threshold
        );
    }
    out
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize report to JSON")
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str) -> usize {
    values
        .map(|v| v.chars().count())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(header.len())
}
