//! Alert delivery.
//!
//! Sinks receive every event the evaluator produces. The evaluator does not
//! deduplicate, so a sink that wants cooldowns has to keep its own state.

use anyhow::Result;
use tracing::warn;

use crate::model::AlertEvent;

pub trait AlertSink {
    fn notify(&mut self, event: &AlertEvent) -> Result<()>;
}

/// Writes each alert to the `tracing` subscriber at WARN level.
#[derive(Debug, Default)]
pub struct LogSink;

impl AlertSink for LogSink {
    fn notify(&mut self, event: &AlertEvent) -> Result<()> {
        warn!(
            city = %event.city,
            threshold = event.threshold,
            observed_temp = event.observed_temp,
            triggered_at = %event.triggered_at,
            "temperature above threshold for two consecutive readings"
        );
        Ok(())
    }
}

/// Keeps alerts in memory for later inspection.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub events: Vec<AlertEvent>,
}

impl AlertSink for CollectingSink {
    fn notify(&mut self, event: &AlertEvent) -> Result<()> {
        self.events.push(event.clone());
        Ok(())
    }
}
