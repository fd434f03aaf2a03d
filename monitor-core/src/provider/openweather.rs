use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::model::Observation;

use super::WeatherProvider;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::new_with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn new_with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    async fn fetch_current(&self, city: &str) -> Result<Observation> {
        let url = format!("{}/data/2.5/weather", self.base_url);

        // No `units` parameter: OpenWeather answers in Kelvin.
        let res = self
            .http
            .get(&url)
            .query(&[("q", city), ("appid", self.api_key.as_str())])
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeather for '{city}'"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather current response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather request for '{}' failed with status {}: {}",
                city,
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather current JSON")?;

        let observed_at = unix_to_utc(parsed.dt)
            .ok_or_else(|| anyhow!("OpenWeather returned an invalid timestamp: {}", parsed.dt))?;

        let condition = parsed
            .weather
            .first()
            .map(|w| w.main.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        // Keep the configured spelling so grouping stays on the configured city set.
        let obs = Observation::from_kelvin(
            city,
            condition,
            parsed.main.temp,
            parsed.main.feels_like,
            observed_at,
        );
        obs.validate()?;

        debug!(
            city,
            reported_name = %parsed.name,
            temp_c = obs.temperature_celsius,
            condition = %obs.condition,
            "fetched current weather"
        );

        Ok(obs)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, city: &str) -> Result<Observation> {
        self.fetch_current(city).await
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
