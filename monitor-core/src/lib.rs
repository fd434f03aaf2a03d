//! Core library for the `weather-monitor` tool.
//!
//! This crate defines:
//! - The observation, daily summary and alert models
//! - Daily rollups (`aggregate`) and consecutive-breach alerts (`alert`)
//! - Configuration, the OpenWeather provider and the SQLite observation store
//! - A single-pass driver (`monitor`) tying fetch, store and analysis together
//!
//! `aggregate` and `alert` are pure functions over an already-materialized
//! slice of observations; everything with I/O lives around them.

pub mod aggregate;
pub mod alert;
pub mod config;
pub mod error;
pub mod model;
pub mod monitor;
pub mod notify;
pub mod provider;
pub mod report;
pub mod store;

pub use aggregate::summarize;
pub use alert::{AlertSettings, evaluate, evaluate_cities};
pub use config::Config;
pub use error::CoreError;
pub use model::{AlertEvent, DailySummary, Observation};
pub use provider::WeatherProvider;
pub use store::{ObservationStore, SqliteStore};
