use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use inquire::{CustomType, Password, Text};
use monitor_core::{
    Config, ObservationStore, SqliteStore, evaluate, evaluate_cities,
    monitor::{analyze, poll_once},
    notify::LogSink,
    provider::provider_from_config,
    report::{render_alerts, render_summaries, to_json},
    summarize,
};
use tracing::debug;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-monitor", version, about = "City weather rollups and heat alerts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the API key, city list, timezone and alert threshold.
    Configure,

    /// Print the config file location and its current contents.
    ShowConfig,

    /// Fetch every configured city once, store the readings, then report.
    Poll {
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Daily rollups from stored observations.
    Summary {
        /// Restrict to one city.
        #[arg(long)]
        city: Option<String>,

        /// Restrict to one local date, e.g. 2024-05-01.
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        json: bool,
    },

    /// Consecutive-breach alerts from stored observations.
    Alerts {
        /// Restrict to one city (need not be in the configured list).
        #[arg(long)]
        city: Option<String>,

        /// Override the configured threshold, in °C.
        #[arg(long)]
        threshold: Option<f64>,

        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::ShowConfig => show_config(),
            Command::Poll { json } => poll(json).await,
            Command::Summary { city, date, json } => summary(city, date, json),
            Command::Alerts {
                city,
                threshold,
                json,
            } => alerts(city, threshold, json),
        }
    }
}

fn configure() -> Result<()> {
    let mut cfg = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()?;
    if !api_key.trim().is_empty() {
        cfg.api_key = Some(api_key.trim().to_string());
    }

    let current_cities = cfg.cities.join(", ");
    let cities = Text::new("Cities (comma separated):")
        .with_default(&current_cities)
        .prompt()?;
    cfg.cities = cities
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect();

    let current_tz = cfg.timezone.clone();
    cfg.timezone = Text::new("Timezone for day boundaries:")
        .with_default(&current_tz)
        .prompt()?;

    cfg.default_threshold = CustomType::<f64>::new("Alert threshold (°C):")
        .with_default(cfg.default_threshold)
        .with_error_message("Please enter a number, e.g. 35")
        .prompt()?;

    cfg.validate()?;
    cfg.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn show_config() -> Result<()> {
    let path = Config::config_file_path()?;
    let mut cfg = Config::load()?;
    if cfg.api_key.is_some() {
        cfg.api_key = Some("********".to_string());
    }

    println!("# {}", path.display());
    print!("{}", cfg.to_toml()?);
    Ok(())
}

async fn poll(json: bool) -> Result<()> {
    let cfg = Config::load()?;
    let provider = provider_from_config(&cfg)?;
    let store = open_store(&cfg)?;

    let report = poll_once(provider.as_ref(), &store, &cfg.cities).await?;
    for (city, err) in &report.failures {
        eprintln!("warning: could not fetch {city}: {err}");
    }

    let analysis = analyze(&store, &cfg, &mut LogSink)?;

    if json {
        println!("{}", to_json(&analysis)?);
    } else {
        print!("{}", render_summaries(&analysis.summaries));
        println!();
        print!("{}", render_alerts(&analysis.alerts));
    }
    Ok(())
}

fn summary(city: Option<String>, date: Option<NaiveDate>, json: bool) -> Result<()> {
    let cfg = Config::load()?;
    let store = open_store(&cfg)?;

    let snapshot = match &city {
        Some(city) => store.read_city(city, None, None)?,
        None => store.read_all()?,
    };

    let mut summaries = summarize(&snapshot, &cfg.timezone()?)?;
    if let Some(date) = date {
        summaries.retain(|s| s.date == date);
    }

    if json {
        println!("{}", to_json(&summaries)?);
    } else {
        print!("{}", render_summaries(&summaries));
    }
    Ok(())
}

fn alerts(city: Option<String>, threshold: Option<f64>, json: bool) -> Result<()> {
    let cfg = Config::load()?;
    let store = open_store(&cfg)?;

    let events = match city {
        Some(city) => {
            let snapshot = store.read_city(&city, None, None)?;
            let threshold = threshold.unwrap_or_else(|| cfg.threshold_for(&city));
            evaluate(&snapshot, &city, threshold)?
        }
        None => {
            let snapshot = store.read_all()?;
            let mut settings = cfg.alert_settings();
            if let Some(threshold) = threshold {
                settings.default_threshold = threshold;
                settings.thresholds.clear();
            }
            evaluate_cities(&snapshot, &settings)?
        }
    };

    if json {
        println!("{}", to_json(&events)?);
    } else {
        print!("{}", render_alerts(&events));
    }
    Ok(())
}

fn open_store(cfg: &Config) -> Result<SqliteStore> {
    let path = cfg.database_file_path()?;
    debug!(path = %path.display(), "opening observation store");
    SqliteStore::open(&path)
}
