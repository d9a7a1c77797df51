use std::path::Path;

use log::{debug, info};
use rusqlite::{params, Connection, Row};
use thiserror::Error;

use crate::fetch::Location;
use crate::stats::DayStatistics;
use crate::week::DayResult;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS weather_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    date TEXT NOT NULL,
    avg_temp REAL NOT NULL,
    min_temp REAL NOT NULL,
    max_temp REAL NOT NULL,
    avg_wind_speed REAL NOT NULL,
    min_wind_speed REAL NOT NULL,
    max_wind_speed REAL NOT NULL,
    sum_precipitation REAL NOT NULL,
    min_precipitation REAL NOT NULL,
    max_precipitation REAL NOT NULL
)";

/// A stored day of the week.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekRecord {
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
    /// `MM-DD`
    pub date_label: String,
    pub stats: DayStatistics,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Could not open database {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Where a week's results are kept between collection and reporting.
///
/// Only the latest run is kept: every write wipes what was there.
pub trait WeekStore {
    /// Replace everything stored with `days`, all at once or not at all.
    fn replace_week(&mut self, location: Location, days: &[DayResult]) -> Result<(), StoreError>;

    /// Stored rows, in the order they were written.
    fn load_week(&self) -> Result<Vec<WeekRecord>, StoreError>;
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.display().to_string(),
            source,
        })?;
        info!("Using database {}", path.display());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM weather_data", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn record_from_row(row: &Row) -> rusqlite::Result<WeekRecord> {
    Ok(WeekRecord {
        id: row.get(0)?,
        latitude: row.get(1)?,
        longitude: row.get(2)?,
        date_label: row.get(3)?,
        stats: DayStatistics {
            avg_temp: row.get(4)?,
            min_temp: row.get(5)?,
            max_temp: row.get(6)?,
            avg_wind: row.get(7)?,
            min_wind: row.get(8)?,
            max_wind: row.get(9)?,
            sum_precip: row.get(10)?,
            min_precip: row.get(11)?,
            max_precip: row.get(12)?,
        },
    })
}

impl WeekStore for SqliteStore {
    fn replace_week(&mut self, location: Location, days: &[DayResult]) -> Result<(), StoreError> {
        // Dropping the transaction on an early return rolls it back.
        let tx = self.conn.transaction()?;

        let deleted = tx.execute("DELETE FROM weather_data", [])?;
        debug!("Deleted {deleted} previous rows");

        {
            let mut insert = tx.prepare(
                "INSERT INTO weather_data (
                    latitude, longitude, date,
                    avg_temp, min_temp, max_temp,
                    avg_wind_speed, min_wind_speed, max_wind_speed,
                    sum_precipitation, min_precipitation, max_precipitation
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;

            for day in days {
                let s = &day.stats;
                insert.execute(params![
                    location.latitude,
                    location.longitude,
                    day.date_label,
                    s.avg_temp,
                    s.min_temp,
                    s.max_temp,
                    s.avg_wind,
                    s.min_wind,
                    s.max_wind,
                    s.sum_precip,
                    s.min_precip,
                    s.max_precip,
                ])?;
            }
        }

        tx.commit()?;
        info!("Stored {} days", days.len());
        Ok(())
    }

    fn load_week(&self) -> Result<Vec<WeekRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, latitude, longitude, date,
                    avg_temp, min_temp, max_temp,
                    avg_wind_speed, min_wind_speed, max_wind_speed,
                    sum_precipitation, min_precipitation, max_precipitation
             FROM weather_data ORDER BY id",
        )?;

        let records = stmt
            .query_map([], record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}
