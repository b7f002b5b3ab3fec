// Event window domain model - a named [start, stop) UTC interval
use super::time::{iso_string_from_datetime, DateLike};
use crate::error::DataError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const UNNAMED_EVENT: &str = "Unnamed Event";

/// A value stored in an event mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum MappingValue {
    Text(String),
    Instant(DateTime<Utc>),
}

impl From<&str> for MappingValue {
    fn from(text: &str) -> Self {
        MappingValue::Text(text.to_string())
    }
}

impl From<DateTime<Utc>> for MappingValue {
    fn from(instant: DateTime<Utc>) -> Self {
        MappingValue::Instant(instant)
    }
}

pub type EventMapping = BTreeMap<String, MappingValue>;

/// A named time interval used to bound queries.
///
/// `stop` is not required to follow `start`; consumers that need an ordered
/// window must check it themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "EventRecord", into = "EventRecord")]
pub struct EventWindow {
    start: DateTime<Utc>,
    stop: DateTime<Utc>,
    name: String,
}

impl EventWindow {
    pub fn new(
        start: impl Into<DateLike>,
        stop: impl Into<DateLike>,
        name: Option<&str>,
    ) -> Result<Self, DataError> {
        Ok(Self {
            start: start.into().to_utc()?,
            stop: stop.into().to_utc()?,
            name: name.unwrap_or(UNNAMED_EVENT).to_string(),
        })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn stop(&self) -> DateTime<Utc> {
        self.stop
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start_iso(&self) -> String {
        iso_string_from_datetime(&self.start)
    }

    pub fn stop_iso(&self) -> String {
        iso_string_from_datetime(&self.stop)
    }

    /// Build a window from a mapping holding `start`, `stop` and optionally `name`.
    pub fn from_mapping(mapping: &EventMapping) -> Result<Self, DataError> {
        let missing: Vec<String> = ["start", "stop"]
            .into_iter()
            .filter(|key| !mapping.contains_key(*key))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(DataError::MissingKeys(missing));
        }

        let start = Self::date_like(mapping, "start")?;
        let stop = Self::date_like(mapping, "stop")?;
        let name = match mapping.get("name") {
            None => None,
            Some(MappingValue::Text(name)) => Some(name.as_str()),
            Some(MappingValue::Instant(_)) => {
                return Err(DataError::WrongMappingType {
                    key: "name".to_string(),
                    expected: "a string",
                });
            }
        };

        Self::new(start, stop, name)
    }

    pub fn to_mapping(&self) -> EventMapping {
        let mut mapping = EventMapping::new();
        mapping.insert("start".to_string(), MappingValue::Text(self.start_iso()));
        mapping.insert("stop".to_string(), MappingValue::Text(self.stop_iso()));
        mapping.insert("name".to_string(), MappingValue::Text(self.name.clone()));
        mapping
    }

    fn date_like(mapping: &EventMapping, key: &str) -> Result<DateLike, DataError> {
        match mapping.get(key) {
            Some(MappingValue::Text(text)) => Ok(DateLike::Iso(text.clone())),
            Some(MappingValue::Instant(instant)) => Ok(DateLike::Instant(*instant)),
            None => Err(DataError::MissingKeys(vec![key.to_string()])),
        }
    }
}

/// Serialized form of an [`EventWindow`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EventRecord {
    start: String,
    stop: String,
    #[serde(default)]
    name: Option<String>,
}

impl TryFrom<EventRecord> for EventWindow {
    type Error = DataError;

    fn try_from(record: EventRecord) -> Result<Self, Self::Error> {
        EventWindow::new(record.start, record.stop, record.name.as_deref())
    }
}

impl From<EventWindow> for EventRecord {
    fn from(window: EventWindow) -> Self {
        EventRecord {
            start: window.start_iso(),
            stop: window.stop_iso(),
            name: Some(window.name),
        }
    }
}
