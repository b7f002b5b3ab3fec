// Lap timing tables - map a race day and lap number to an event window
use super::event::EventWindow;
use super::time::{iso_string_from_datetime, parse_iso_datetime};
use crate::error::DataError;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LapTableError {
    #[error("could not open lap table {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed lap table: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Data(#[from] DataError),
}

/// One row of a timing table as stored on disk.
#[derive(Debug, Deserialize)]
struct LapRow {
    lap: usize,
    driver: String,
    start: String,
    finish: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LapRecord {
    pub lap: usize,
    pub driver: String,
    pub start: DateTime<Utc>,
    pub finish: DateTime<Utc>,
}

/// Lap timings for a single race day. Laps are numbered from 1.
#[derive(Debug, Clone)]
pub struct LapTable {
    day: u32,
    laps: Vec<LapRecord>,
}

impl LapTable {
    pub fn file_name(day: u32) -> String {
        format!("timing_day_{day}.csv")
    }

    /// Read `timing_day_{day}.csv` from `dir`.
    pub fn load(dir: impl AsRef<Path>, day: u32) -> Result<Self, LapTableError> {
        let path = dir.as_ref().join(Self::file_name(day));
        let file = std::fs::File::open(&path).map_err(|source| LapTableError::Io {
            path: path.clone(),
            source,
        })?;
        let table = Self::from_reader(day, file)?;
        tracing::debug!("Loaded {} laps for day {} from {}", table.lap_count(), day, path.display());
        Ok(table)
    }

    /// Parse a CSV table with the header `lap,driver,start,finish`.
    pub fn from_reader<R: Read>(day: u32, reader: R) -> Result<Self, LapTableError> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let mut laps = Vec::new();
        for row in csv_reader.deserialize::<LapRow>() {
            let row = row?;
            laps.push(LapRecord {
                lap: row.lap,
                driver: row.driver,
                start: parse_iso_datetime(&row.start)?,
                finish: parse_iso_datetime(&row.finish)?,
            });
        }
        laps.sort_by_key(|record| record.lap);

        Ok(Self { day, laps })
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn lap_count(&self) -> usize {
        self.laps.len()
    }

    pub fn lap(&self, lap: usize) -> Result<&LapRecord, DataError> {
        self.laps
            .iter()
            .find(|record| record.lap == lap)
            .ok_or(DataError::UnknownLap {
                day: self.day,
                lap,
                count: self.laps.len(),
            })
    }

    pub fn start(&self, lap: usize) -> Result<DateTime<Utc>, DataError> {
        Ok(self.lap(lap)?.start)
    }

    pub fn finish(&self, lap: usize) -> Result<DateTime<Utc>, DataError> {
        Ok(self.lap(lap)?.finish)
    }

    pub fn start_iso(&self, lap: usize) -> Result<String, DataError> {
        Ok(iso_string_from_datetime(&self.start(lap)?))
    }

    pub fn finish_iso(&self, lap: usize) -> Result<String, DataError> {
        Ok(iso_string_from_datetime(&self.finish(lap)?))
    }

    pub fn driver(&self, lap: usize) -> Result<&str, DataError> {
        Ok(&self.lap(lap)?.driver)
    }

    pub fn event(&self, lap: usize) -> Result<EventWindow, DataError> {
        let record = self.lap(lap)?;
        Self::window(self.day, record)
    }

    /// Event windows for every lap, in lap order.
    pub fn events(&self) -> impl Iterator<Item = Result<EventWindow, DataError>> + '_ {
        self.laps.iter().map(|record| Self::window(self.day, record))
    }

    fn window(day: u32, record: &LapRecord) -> Result<EventWindow, DataError> {
        let name = format!("Day {} Lap {}", day, record.lap);
        EventWindow::new(record.start, record.finish, Some(&name))
    }
}
