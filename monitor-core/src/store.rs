//! Append-only SQLite persistence for raw observations.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use std::{fs, path::Path};
use tracing::debug;

use crate::model::Observation;

/// Where the rollup and alert engines get their snapshot from.
///
/// Every read returns a fully materialized `Vec`, so later appends never
/// affect a snapshot already handed out.
pub trait ObservationStore {
    fn append(&self, observation: &Observation) -> Result<()>;

    /// All observations in storage (insertion) order.
    fn read_all(&self) -> Result<Vec<Observation>>;

    /// Observations for `city` with `from <= observed_at < to`; open bounds when `None`.
    fn read_city(
        &self,
        city: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Observation>>;
}

/// SQLite-backed observation store.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path`, creating parent directories as needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory database, mostly for tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS observations (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    city TEXT NOT NULL,
                    condition TEXT NOT NULL,
                    temperature_c REAL NOT NULL,
                    feels_like_c REAL NOT NULL,
                    observed_at INTEGER NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_observations_city_time
                    ON observations(city, observed_at);
                "#,
            )
            .context("Failed to initialize observation schema")?;
        Ok(())
    }

    fn query(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Observation>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })?;

        let mut observations = Vec::new();
        for row in rows {
            let (city, condition, temp, feels_like, ts) = row?;
            let observed_at = DateTime::from_timestamp(ts, 0)
                .ok_or_else(|| anyhow!("Stored observation for '{city}' has invalid timestamp {ts}"))?;
            observations.push(Observation {
                city,
                condition,
                temperature_celsius: temp,
                feels_like_celsius: feels_like,
                observed_at,
            });
        }
        Ok(observations)
    }
}

impl ObservationStore for SqliteStore {
    fn append(&self, observation: &Observation) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO observations (city, condition, temperature_c, feels_like_c, observed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    observation.city,
                    observation.condition,
                    observation.temperature_celsius,
                    observation.feels_like_celsius,
                    observation.observed_at.timestamp(),
                ],
            )
            .with_context(|| format!("Failed to store observation for '{}'", observation.city))?;

        debug!(city = %observation.city, at = %observation.observed_at, "stored observation");
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<Observation>> {
        self.query(
            "SELECT city, condition, temperature_c, feels_like_c, observed_at
             FROM observations ORDER BY id",
            params![],
        )
        .context("Failed to read observations")
    }

    fn read_city(
        &self,
        city: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Observation>> {
        let from = from.map_or(i64::MIN, |t| t.timestamp());
        let to = to.map_or(i64::MAX, |t| t.timestamp());

        self.query(
            "SELECT city, condition, temperature_c, feels_like_c, observed_at
             FROM observations
             WHERE city = ?1 AND observed_at >= ?2 AND observed_at < ?3
             ORDER BY id",
            params![city, from, to],
        )
        .with_context(|| format!("Failed to read observations for '{city}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn read_all_keeps_insertion_order() {
        let store = SqliteStore::in_memory().unwrap();
        let later = Observation::new("Delhi", "Clear", 36.0, 38.0, at(10));
        let earlier = Observation::new("Delhi", "Haze", 34.0, 35.0, at(8));

        store.append(&later).unwrap();
        store.append(&earlier).unwrap();

        assert_eq!(store.read_all().unwrap(), vec![later, earlier]);
    }

    #[test]
    fn read_city_filters_by_city_and_range() {
        let store = SqliteStore::in_memory().unwrap();
        for h in 0..6 {
            store.append(&Observation::new("Delhi", "Clear", 30.0 + h as f64, 30.0, at(h))).unwrap();
            store.append(&Observation::new("Mumbai", "Rain", 28.0, 29.0, at(h))).unwrap();
        }

        let all_delhi = store.read_city("Delhi", None, None).unwrap();
        assert_eq!(all_delhi.len(), 6);
        assert!(all_delhi.iter().all(|o| o.city == "Delhi"));

        let window = store.read_city("Delhi", Some(at(2)), Some(at(4))).unwrap();
        let hours: Vec<f64> = window.iter().map(|o| o.temperature_celsius).collect();
        assert_eq!(hours, vec![32.0, 33.0]);

        assert!(store.read_city("Chennai", None, None).unwrap().is_empty());
    }

    #[test]
    fn snapshot_is_not_affected_by_later_appends() {
        let store = SqliteStore::in_memory().unwrap();
        store.append(&Observation::new("Delhi", "Clear", 30.0, 30.0, at(1))).unwrap();

        let snapshot = store.read_all().unwrap();
        store
            .append(&Observation::new("Delhi", "Clear", 31.0, 31.0, at(1) + Duration::hours(1)))
            .unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.read_all().unwrap().len(), 2);
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("observations.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.append(&Observation::new("Kolkata", "Mist", 27.5, 30.0, at(3))).unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        let all = reopened.read_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].condition, "Mist");
        assert_eq!(all[0].observed_at, at(3));
    }
}
