use crate::{Config, Observation, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of fresh observations, one city at a time.
///
/// Implementations make a single attempt per call; retrying is left to the caller.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, city: &str) -> anyhow::Result<Observation>;
}

/// Construct the OpenWeather provider from the configured API key.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.require_api_key()?;
    Ok(Box::new(OpenWeatherProvider::new(api_key.to_owned())))
}
